//! Configuration errors.
//!
//! Everything the core consumes is static configuration, so these are only
//! produced once while the keymap and [`crate::config::KeyboardConfig`] are
//! checked. Nothing at runtime can fail.

use core::fmt;

use crate::matrix::KeyPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The keymap has no layers at all.
    NoLayers,
    /// More layers than the layer stack can hold.
    TooManyLayers { count: usize, max: usize },
    /// A layer index (default layer or action target) past the last layer.
    LayerOutOfRange { layer: u8, layers: usize },
    /// A keymap cell refers to a function slot that is missing or empty.
    UnknownFunction { layer: u8, pos: KeyPosition, index: u8 },
    /// A tap-toggle action that can never be reached.
    ZeroTapCount { index: u8 },
    /// The debounce window must be at least one scan pass.
    DebounceWindow,
    /// Backlight bounds leave no room for breathing.
    BacklightBounds { lower: u8, upper: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLayers => write!(f, "keymap has no layers"),
            Self::TooManyLayers { count, max } => {
                write!(f, "keymap has {count} layers, at most {max} supported")
            }
            Self::LayerOutOfRange { layer, layers } => {
                write!(f, "layer {layer} out of range, keymap has {layers} layers")
            }
            Self::UnknownFunction { layer, pos, index } => write!(
                f,
                "layer {layer} ({}, {}) uses undefined function slot {index}",
                pos.row, pos.col
            ),
            Self::ZeroTapCount { index } => {
                write!(f, "function slot {index}: tap-toggle needs at least one tap")
            }
            Self::DebounceWindow => write!(f, "debounce window must be at least 1 scan"),
            Self::BacklightBounds { lower, upper } => {
                write!(f, "invalid backlight bounds {lower}..={upper}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
