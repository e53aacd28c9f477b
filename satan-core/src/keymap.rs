//! Keymap tables and their one-time validation.
//!
//! A [`Keymap`] pairs the per-layer key grids with the function (action)
//! table. Both are static data; [`Keymap::new`] checks every cross reference
//! up front so that resolution and dispatch never meet a dangling index.

use crate::action::Action;
use crate::error::ConfigError;
use crate::keycode::Key;
use crate::layers;
use crate::matrix::KeyPosition;
use crate::{COLS, MAX_LAYERS, ROWS};

/// One full keymap layer, `[row][col]`.
pub type Layer = [[Key; COLS]; ROWS];

/// Validated keymap: layers plus function table.
#[derive(Copy, Clone)]
pub struct Keymap {
    layers: &'static [Layer],
    actions: &'static [Option<Action>],
}

impl Keymap {
    /// Check the tables and build a keymap.
    ///
    /// Fails on the first out-of-range layer, undefined function slot or
    /// unreachable tap-toggle count.
    pub fn new(
        layers: &'static [Layer],
        actions: &'static [Option<Action>],
    ) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        if layers.len() > MAX_LAYERS {
            return Err(ConfigError::TooManyLayers {
                count: layers.len(),
                max: MAX_LAYERS,
            });
        }

        for (index, action) in actions.iter().enumerate() {
            let Some(action) = action else { continue };
            if let Some(layer) = action.layer() {
                if layer as usize >= layers.len() {
                    return Err(ConfigError::LayerOutOfRange {
                        layer,
                        layers: layers.len(),
                    });
                }
            }
            if let Action::TapToggleLayer(_, 0) = action {
                return Err(ConfigError::ZeroTapCount { index: index as u8 });
            }
        }

        for (layer, grid) in layers.iter().enumerate() {
            for (row, keys) in grid.iter().enumerate() {
                for (col, key) in keys.iter().enumerate() {
                    if let Key::Fn(index) = *key {
                        let defined = matches!(actions.get(index as usize), Some(Some(_)));
                        if !defined {
                            return Err(ConfigError::UnknownFunction {
                                layer: layer as u8,
                                pos: KeyPosition::new(row as u8, col as u8),
                                index,
                            });
                        }
                    }
                }
            }
        }

        Ok(Self { layers, actions })
    }

    /// Minimal single-layer QWERTY map without any actions, used when the
    /// configured keymap fails validation.
    pub fn fallback() -> Self {
        Self {
            layers: &layers::FALLBACK,
            actions: &[],
        }
    }

    /// Built-in Satan keymap.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(&layers::LAYERS, &layers::FN_ACTIONS)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of defined function slots.
    pub fn num_actions(&self) -> usize {
        self.actions.iter().filter(|a| a.is_some()).count()
    }

    /// Raw cell lookup. Anything outside the tables reads as transparent.
    pub fn key(&self, layer: u8, pos: KeyPosition) -> Key {
        let (row, col) = pos.index();
        self.layers
            .get(layer as usize)
            .and_then(|grid| grid.get(row))
            .and_then(|keys| keys.get(col))
            .copied()
            .unwrap_or(Key::Trans)
    }

    /// Action bound to a function slot.
    pub fn action(&self, index: u8) -> Option<Action> {
        self.actions.get(index as usize).copied().flatten()
    }
}
