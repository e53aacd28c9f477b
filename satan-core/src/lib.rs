//! Keyboard core for the Satan GH60.
//!
//! Scans the switch matrix, debounces it, resolves key presses through a
//! stack of keymap layers and dispatches the result to the host, the layer
//! stack or the breathing backlight. The hardware is reached only through
//! [`PinDriver`], so the same core runs in the AVR firmware and in the native
//! CLI tool.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod action;
pub mod backlight;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod keyboard;
pub mod keycode;
pub mod keymap;
pub mod layer;
pub mod layers;
pub mod matrix;
pub mod report;

/// Number of rows in the matrix.
pub const ROWS: usize = 5;
/// Number of columns in the matrix.
pub const COLS: usize = 14;
/// Most layers a keymap can have.
pub const MAX_LAYERS: usize = 8;

pub use action::{Action, Effect, EffectSink};
pub use backlight::{Backlight, Mode};
pub use config::{BacklightConfig, KeyboardConfig};
pub use dispatch::{HostSink, KeyEvent};
pub use error::ConfigError;
pub use keyboard::Keyboard;
pub use keycode::{Key, Keycode, Mods};
pub use keymap::Keymap;
pub use layer::LayerStack;
pub use matrix::{KeyPosition, MatrixSnapshot, PinDriver, RowBits};
pub use report::{KeyboardReport, ReportBuilder};
