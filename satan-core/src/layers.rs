//! Built-in keymap for the Satan GH60.
//!
//! Layers 0-3 are alternative base layouts selected with the `SetDefaultLayer`
//! keys on the function layer. Layer 4 is unused. Layer 5 holds function and
//! navigation keys, layer 6 the number pad and layer 7 a few special
//! overrides toggled from the function layer.
//!
//! Mouse keys and system sleep are not supported by the report this firmware
//! builds, so those cells do nothing.

use crate::action::{Action, Effect};
use crate::keycode::Keycode::{self, *};
use crate::keycode::{Key, Mods};
use crate::keymap::Layer;
use crate::{COLS, ROWS};

const fn k(code: Keycode) -> Key {
    Key::Code(code)
}

const ___: Key = Key::Trans;
const XXX: Key = Key::No;

// Function slots
const FN0: Key = Key::Fn(0);
const FN2: Key = Key::Fn(2);
const FN3: Key = Key::Fn(3);
const FN5: Key = Key::Fn(5);
const FN6: Key = Key::Fn(6);
const FN10: Key = Key::Fn(10);
const FN11: Key = Key::Fn(11);
const FN12: Key = Key::Fn(12);
const FN13: Key = Key::Fn(13);
const FN20: Key = Key::Fn(20);
const FN21: Key = Key::Fn(21);

/// Number of tables in [`LAYERS`].
pub const NUM_LAYERS: usize = 8;

/// Bottom row shared by every base layer.
#[rustfmt::skip]
const BASE_BOTTOM: [Key; COLS] = [
    k(LCtrl), k(LGui), k(LAlt), XXX, XXX, k(Space), XXX,
    XXX, XXX, k(Delete), FN0, k(RAlt), k(Application), k(RCtrl),
];

/// Number row shared by every base layer.
#[rustfmt::skip]
const BASE_TOP: [Key; COLS] = [
    k(Grave), k(N1), k(N2), k(N3), k(N4), k(N5), k(N6),
    k(N7), k(N8), k(N9), k(N0), k(Minus), k(Equal), k(Backslash),
];

#[rustfmt::skip]
pub static LAYERS: [Layer; NUM_LAYERS] = [
    // Layer 0: QWERTY
    [
        BASE_TOP,
        [k(Tab), k(Q), k(W), k(E), k(R), k(T), k(Y),
         k(U), k(I), k(O), k(P), k(LBracket), k(RBracket), k(Backspace)],
        // Esc/number pad, ..., Enter
        [FN3, k(A), k(S), k(D), k(F), k(G), k(H),
         k(J), k(K), k(L), k(Semicolon), k(Quote), XXX, k(Enter)],
        // One-shot LShift, ..., tap-toggle Fn, one-shot RShift
        [FN5, XXX, k(Z), k(X), k(C), k(V), k(B),
         k(N), k(M), k(Comma), k(Dot), k(Slash), FN2, FN6],
        BASE_BOTTOM,
    ],

    // Layer 1: Carpalx QFMLWY
    [
        BASE_TOP,
        [k(Tab), k(Q), k(F), k(M), k(L), k(W), k(Y),
         k(U), k(O), k(B), k(J), k(LBracket), k(RBracket), k(Backspace)],
        [FN3, k(D), k(S), k(T), k(N), k(R), k(I),
         k(A), k(E), k(H), k(Semicolon), k(Quote), XXX, k(Enter)],
        [FN5, XXX, k(Z), k(V), k(G), k(C), k(X),
         k(P), k(K), k(Comma), k(Dot), k(Slash), FN2, FN6],
        BASE_BOTTOM,
    ],

    // Layer 2: Workman
    [
        BASE_TOP,
        [k(Tab), k(Q), k(D), k(R), k(W), k(B), k(J),
         k(F), k(U), k(P), k(Semicolon), k(LBracket), k(RBracket), k(Backspace)],
        [FN3, k(A), k(S), k(H), k(T), k(G), k(Y),
         k(N), k(E), k(O), k(I), k(Quote), XXX, k(Enter)],
        [FN5, XXX, k(Z), k(X), k(M), k(C), k(V),
         k(K), k(L), k(Comma), k(Dot), k(Slash), FN2, FN6],
        BASE_BOTTOM,
    ],

    // Layer 3: Carpalx QGMLWY
    [
        BASE_TOP,
        [k(Tab), k(Q), k(G), k(M), k(L), k(W), k(Y),
         k(F), k(U), k(B), k(Semicolon), k(LBracket), k(RBracket), k(Backspace)],
        [FN3, k(D), k(S), k(T), k(N), k(R), k(I),
         k(A), k(E), k(O), k(H), k(Quote), XXX, k(Enter)],
        [FN5, XXX, k(Z), k(X), k(C), k(V), k(J),
         k(K), k(P), k(Comma), k(Dot), k(Slash), FN2, FN6],
        BASE_BOTTOM,
    ],

    // Layer 4: unused
    [[XXX; COLS]; ROWS],

    // Layer 5: function
    [
        // Special layer toggle, F1-F12, (sleep)
        [FN20, k(F1), k(F2), k(F3), k(F4), k(F5), k(F6),
         k(F7), k(F8), k(F9), k(F10), k(F11), k(F12), XXX],
        // ..., navigation, default layer QWERTY / QFMLWY, Delete
        [___, XXX, XXX, XXX, ___, ___, ___,
         k(Home), k(PageDown), k(PageUp), k(End), FN10, FN11, k(Delete)],
        // ..., mute, arrows, scroll lock, default layer Workman
        [___, XXX, XXX, XXX, ___, k(Mute), k(Left),
         k(Down), k(Up), k(Right), k(ScrollLock), FN12, ___, ___],
        // (mouse), volume, (wheel), print screen, default layer QGMLWY
        [XXX, XXX, XXX, XXX, XXX, k(VolumeDown), k(VolumeUp),
         XXX, XXX, XXX, XXX, k(PrintScreen), ___, FN13],
        [___, k(RGui), ___, ___, ___, ___, ___,
         ___, ___, k(Insert), ___, ___, ___, ___],
    ],

    // Layer 6: number pad
    [
        // Backlight step, F1-F6, keypad
        [FN21, k(F1), k(F2), k(F3), k(F4), k(F5), k(F6),
         k(Kp7), k(Kp8), k(Kp9), k(KpSlash), k(KpMinus), k(KpPlus), k(KpSlash)],
        [___, ___, ___, ___, ___, ___, ___,
         k(Kp4), k(Kp5), k(Kp6), k(KpMinus), ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___,
         k(Kp1), k(Kp2), k(Kp3), k(KpPlus), ___, ___, ___],
        [k(CapsLock), ___, ___, ___, ___, ___, ___,
         ___, k(Kp0), k(KpAsterisk), k(KpDot), k(KpEnter), ___, k(NumLock)],
        [___; COLS],
    ],

    // Layer 7: special, plain Shift and Esc in place of the dual-role keys
    [
        [___; COLS],
        [___; COLS],
        [k(LShift), ___, ___, ___, ___, ___, ___,
         ___, ___, ___, ___, ___, ___, ___],
        [___, ___, ___, ___, ___, ___, ___,
         ___, ___, ___, ___, ___, k(Escape), ___],
        [___; COLS],
    ],
];

pub static FN_ACTIONS: [Option<Action>; 22] = [
    Some(Action::MomentaryLayer(5)),                    // 0
    None,                                               // 1
    Some(Action::TapToggleLayer(5, 2)),                 // 2
    Some(Action::TapOrHoldKey(6, Keycode::Escape)),     // 3: Esc, number pad
    None,                                               // 4
    Some(Action::OneShotModifier(Mods::LSHIFT)),        // 5
    Some(Action::OneShotModifier(Mods::RSHIFT)),        // 6
    None,                                               // 7
    None,                                               // 8
    None,                                               // 9
    Some(Action::SetDefaultLayer(0)),                   // 10: QWERTY
    Some(Action::SetDefaultLayer(1)),                   // 11: Carpalx QFMLWY
    Some(Action::SetDefaultLayer(2)),                   // 12: Workman
    Some(Action::SetDefaultLayer(3)),                   // 13: Carpalx QGMLWY
    None,                                               // 14
    None,                                               // 15
    None,                                               // 16
    None,                                               // 17
    None,                                               // 18
    None,                                               // 19
    Some(Action::ToggleLayer(7)),                       // 20
    Some(Action::TriggerEffect(Effect::BacklightStep)), // 21
];

/// Plain QWERTY without any function keys.
#[rustfmt::skip]
pub static FALLBACK: [Layer; 1] = [[
    BASE_TOP,
    [k(Tab), k(Q), k(W), k(E), k(R), k(T), k(Y),
     k(U), k(I), k(O), k(P), k(LBracket), k(RBracket), k(Backspace)],
    [k(Escape), k(A), k(S), k(D), k(F), k(G), k(H),
     k(J), k(K), k(L), k(Semicolon), k(Quote), XXX, k(Enter)],
    [k(LShift), XXX, k(Z), k(X), k(C), k(V), k(B),
     k(N), k(M), k(Comma), k(Dot), k(Slash), k(RShift), XXX],
    [k(LCtrl), k(LGui), k(LAlt), XXX, XXX, k(Space), XXX,
     XXX, XXX, k(Delete), k(RGui), k(RAlt), k(Application), k(RCtrl)],
]];
