//! Function-slot actions.
//!
//! A [`crate::keycode::Key::Fn`] cell is an index into a static table of
//! [`Action`]s, selected once at configuration time.

use crate::keycode::{Keycode, Mods};

/// What a function key does when pressed and released.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Layer is active only while the key is held.
    MomentaryLayer(u8),
    /// Each press flips the layer on or off.
    ToggleLayer(u8),
    /// `count` quick taps flip the layer; otherwise momentary.
    TapToggleLayer(u8, u8),
    /// Tap sends the keycode, hold activates the layer.
    TapOrHoldKey(u8, Keycode),
    /// Modifiers for the next key only (regular modifiers while held).
    OneShotModifier(Mods),
    /// Replace the base layer.
    SetDefaultLayer(u8),
    /// Device-local effect.
    TriggerEffect(Effect),
}

impl Action {
    /// Layer this action refers to, if any.
    pub fn layer(&self) -> Option<u8> {
        match *self {
            Action::MomentaryLayer(layer)
            | Action::ToggleLayer(layer)
            | Action::TapToggleLayer(layer, _)
            | Action::TapOrHoldKey(layer, _)
            | Action::SetDefaultLayer(layer) => Some(layer),
            Action::OneShotModifier(_) | Action::TriggerEffect(_) => None,
        }
    }
}

/// Backlight effects.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Cycle off, constant, breathing.
    BacklightStep,
    BacklightIncrease,
    BacklightDecrease,
    /// Switch between off and the last lit mode.
    BacklightToggle,
}

/// Receiver of [`Action::TriggerEffect`].
pub trait EffectSink {
    fn trigger(&mut self, effect: Effect);
}
