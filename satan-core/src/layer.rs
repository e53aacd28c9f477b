//! Layer stack and keycode resolution.
//!
//! The stack is an ordered set of overlay layers on top of one default
//! layer. Resolution walks the overlays from the most recently activated one
//! down to the default layer and stops at the first cell that is not
//! transparent.

use heapless::Vec;

use crate::keycode::Key;
use crate::keymap::Keymap;
use crate::matrix::KeyPosition;
use crate::MAX_LAYERS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerStack {
    default: u8,
    /// Active overlays, oldest first.
    overlays: Vec<u8, MAX_LAYERS>,
}

impl LayerStack {
    pub const fn new(default: u8) -> Self {
        Self {
            default,
            overlays: Vec::new(),
        }
    }

    pub fn default_layer(&self) -> u8 {
        self.default
    }

    /// Replace the default layer; overlays stay as they are.
    pub fn set_default(&mut self, layer: u8) {
        self.default = layer;
    }

    /// Check if `layer` is active as an overlay.
    pub fn is_active(&self, layer: u8) -> bool {
        self.overlays.contains(&layer)
    }

    /// Topmost overlay, or the default layer if there is none.
    pub fn current(&self) -> u8 {
        self.overlays.last().copied().unwrap_or(self.default)
    }

    /// Activate `layer` on top. Returns false if it was already active.
    pub fn push(&mut self, layer: u8) -> bool {
        if self.is_active(layer) {
            return false;
        }
        // Capacity equals the number of distinct layers, so this cannot fail
        // for a validated keymap.
        self.overlays.push(layer).is_ok()
    }

    /// Deactivate `layer`. Returns false if it was not active.
    pub fn pop(&mut self, layer: u8) -> bool {
        match self.overlays.iter().position(|&l| l == layer) {
            Some(index) => {
                self.overlays.remove(index);
                true
            }
            None => false,
        }
    }

    /// Flip `layer`; returns whether it is now active.
    pub fn toggle(&mut self, layer: u8) -> bool {
        if self.pop(layer) {
            false
        } else {
            self.push(layer)
        }
    }

    /// Layers in lookup order: overlays newest first, then the default layer.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.overlays
            .iter()
            .rev()
            .copied()
            .chain(core::iter::once(self.default))
    }

    /// Active overlays, oldest first.
    pub fn overlays(&self) -> &[u8] {
        &self.overlays
    }
}

/// Effective key for `pos` under the current stack.
///
/// Transparent cells fall through to the layer below; if every layer
/// including the default one is transparent the position does nothing.
pub fn resolve(pos: KeyPosition, stack: &LayerStack, keymap: &Keymap) -> Key {
    stack
        .iter()
        .map(|layer| keymap.key(layer, pos))
        .find(|key| !key.is_transparent())
        .unwrap_or(Key::No)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::Keycode;
    use crate::keymap::Layer;
    use crate::{COLS, ROWS};

    const ___: Key = Key::Trans;
    const POS: KeyPosition = KeyPosition::new(2, 3);

    static LAYERS: [Layer; 3] = {
        let mut layers = [[[___; COLS]; ROWS]; 3];
        layers[0][2][3] = Key::Code(Keycode::X);
        layers[1][2][3] = Key::Code(Keycode::Y);
        layers[0][0][0] = Key::Code(Keycode::Escape);
        layers[2][0][0] = Key::No;
        layers
    };

    fn keymap() -> Keymap {
        Keymap::new(&LAYERS, &[]).unwrap()
    }

    #[test]
    fn test_transparent_falls_through_to_default() {
        let mut stack = LayerStack::new(0);
        stack.push(2);
        assert_eq!(resolve(POS, &stack, &keymap()), Key::Code(Keycode::X));
    }

    #[test]
    fn test_topmost_overlay_wins() {
        let mut stack = LayerStack::new(0);
        stack.push(1);
        stack.push(2);
        assert_eq!(resolve(POS, &stack, &keymap()), Key::Code(Keycode::Y));
        // Explicit no-op on an overlay shadows the layers below
        assert_eq!(resolve(KeyPosition::new(0, 0), &stack, &keymap()), Key::No);
    }

    #[test]
    fn test_all_transparent_resolves_to_no_op() {
        let mut stack = LayerStack::new(2);
        stack.push(1);
        assert_eq!(resolve(KeyPosition::new(4, 13), &stack, &keymap()), Key::No);
        // Default layer's own transparent cells are no-ops too
        let stack = LayerStack::new(1);
        assert_eq!(resolve(KeyPosition::new(0, 0), &stack, &keymap()), Key::No);
    }

    #[test]
    fn test_default_layer_is_consulted_last() {
        let mut stack = LayerStack::new(1);
        assert_eq!(resolve(POS, &stack, &keymap()), Key::Code(Keycode::Y));
        stack.push(0);
        assert_eq!(resolve(POS, &stack, &keymap()), Key::Code(Keycode::X));
        assert_eq!(stack.iter().collect::<std::vec::Vec<_>>(), [0, 1]);
    }

    #[test]
    fn test_set_default_keeps_overlays() {
        let mut stack = LayerStack::new(0);
        stack.push(2);
        stack.set_default(1);
        assert_eq!(stack.default_layer(), 1);
        assert_eq!(stack.overlays(), [2]);
    }

    #[test]
    fn test_stacked_pushes_pop_in_any_order() {
        let before = LayerStack::new(0);
        let mut stack = before.clone();
        assert!(stack.push(1));
        assert!(stack.push(2));
        assert!(!stack.push(1));
        assert_eq!(stack.current(), 2);

        assert!(stack.pop(2));
        assert_eq!(stack.current(), 1);
        assert!(stack.pop(1));
        assert_eq!(stack, before);
        assert!(!stack.pop(1));
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut stack = LayerStack::new(0);
        assert!(stack.toggle(2));
        assert!(stack.is_active(2));
        assert!(!stack.toggle(2));
        assert!(!stack.is_active(2));
    }
}
