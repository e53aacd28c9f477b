//! Keycodes and keymap entries.
//!
//! [`Keycode`] is a USB HID usage from the Keyboard/Keypad page (0x07). A
//! keymap cell is a [`Key`]: either one of those usages, a transparent
//! marker, an explicit no-op or an index into the function (action) table.

/// USB HID keycodes.
/// See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Keycode {
    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Keypad
    NumLock = 0x53,
    KpSlash = 0x54,
    KpAsterisk = 0x55,
    KpMinus = 0x56,
    KpPlus = 0x57,
    KpEnter = 0x58,
    Kp1 = 0x59,
    Kp2 = 0x5A,
    Kp3 = 0x5B,
    Kp4 = 0x5C,
    Kp5 = 0x5D,
    Kp6 = 0x5E,
    Kp7 = 0x5F,
    Kp8 = 0x60,
    Kp9 = 0x61,
    Kp0 = 0x62,
    KpDot = 0x63,

    /// Non-US \ and | (ISO key left of Z)
    NonUsBackslash = 0x64,
    /// Compose / context menu key
    Application = 0x65,

    // Volume controls from the keyboard page (not the consumer page)
    Mute = 0x7F,
    VolumeUp = 0x80,
    VolumeDown = 0x81,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

impl Keycode {
    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        let v = self as u8;
        (0xE0..=0xE7).contains(&v)
    }

    /// Modifier bits this keycode contributes to the report's modifier byte.
    pub fn modifier_bits(self) -> Mods {
        if self.is_modifier() {
            Mods(1 << (self as u8 - 0xE0))
        } else {
            Mods::NONE
        }
    }
}

/// HID modifier byte: bit 0 = LCtrl, bit 7 = RGui.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Mods(pub u8);

impl Mods {
    pub const NONE: Mods = Mods(0);
    pub const LCTRL: Mods = Mods(1 << 0);
    pub const LSHIFT: Mods = Mods(1 << 1);
    pub const LALT: Mods = Mods(1 << 2);
    pub const LGUI: Mods = Mods(1 << 3);
    pub const RCTRL: Mods = Mods(1 << 4);
    pub const RSHIFT: Mods = Mods(1 << 5);
    pub const RALT: Mods = Mods(1 << 6);
    pub const RGUI: Mods = Mods(1 << 7);

    const KEYCODES: [Keycode; 8] = [
        Keycode::LCtrl,
        Keycode::LShift,
        Keycode::LAlt,
        Keycode::LGui,
        Keycode::RCtrl,
        Keycode::RShift,
        Keycode::RAlt,
        Keycode::RGui,
    ];

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Mods) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Mods) -> Mods {
        Mods(self.0 | other.0)
    }

    pub fn difference(self, other: Mods) -> Mods {
        Mods(self.0 & !other.0)
    }

    /// Modifier keycodes for every set bit, LCtrl first.
    pub fn keycodes(self) -> impl Iterator<Item = Keycode> {
        Self::KEYCODES
            .into_iter()
            .filter(move |kc| self.contains(kc.modifier_bits()))
    }
}

/// One keymap cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Explicitly does nothing; also the result of an all-transparent lookup.
    No,
    /// Defer to the next layer down.
    Trans,
    /// Plain keycode reported to the host.
    Code(Keycode),
    /// Index into the function (action) table.
    Fn(u8),
}

impl Key {
    /// Check if this is a transparent key.
    pub fn is_transparent(self) -> bool {
        self == Key::Trans
    }
}

impl From<Keycode> for Key {
    fn from(kc: Keycode) -> Self {
        Key::Code(kc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_modifier_bits_follow_hid_order() {
        assert_eq!(Keycode::LCtrl.modifier_bits(), Mods::LCTRL);
        assert_eq!(Keycode::RGui.modifier_bits(), Mods::RGUI);
        assert_eq!(Keycode::A.modifier_bits(), Mods::NONE);
        assert!(!Keycode::Application.is_modifier());
    }

    #[test]
    fn test_mods_expand_to_keycodes() {
        let mods = Mods::LSHIFT.union(Mods::RALT);
        let codes: Vec<_> = mods.keycodes().collect();
        assert_eq!(codes, [Keycode::LShift, Keycode::RAlt]);
        assert!(mods.contains(Mods::LSHIFT));
        assert_eq!(mods.difference(Mods::LSHIFT), Mods::RALT);
    }
}
