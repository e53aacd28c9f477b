//! Keyboard configuration.
//!
//! All timing values are counted in scan passes ("ticks"), which keeps them
//! deterministic regardless of how long a pass actually takes. On the Satan
//! board one pass is roughly 1 ms.

use crate::backlight::Mode;
use crate::error::ConfigError;
use crate::keymap::Keymap;

/// Timing and behaviour knobs of the whole keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardConfig {
    /// Quiet scan passes before a matrix change is committed.
    pub debounce: u8,
    /// Ticks after which a dual-role key counts as held.
    pub tapping_term: u16,
    /// Max ticks between a release and the next press of a tap streak.
    pub tap_window: u16,
    /// Layer used as the base of the stack after power-up.
    pub default_layer: u8,
    pub backlight: BacklightConfig,
}

/// Breathing backlight parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BacklightConfig {
    /// Lowest breathing level.
    pub lower: u8,
    /// Highest breathing level.
    pub upper: u8,
    /// Added to the level on every key press.
    pub boost: u8,
    /// Steps to rest at the bottom of each breath.
    pub cool_down: u8,
    /// Step back applied after overshooting `upper`.
    pub correction: u8,
    /// Ticks per step are `cycle_scale / level + cycle_base`.
    pub cycle_base: u16,
    pub cycle_scale: u16,
    /// Level change of one increase/decrease effect in constant mode.
    pub constant_step: u8,
    pub mode: Mode,
}

impl KeyboardConfig {
    pub const DEFAULT: KeyboardConfig = KeyboardConfig {
        debounce: 5,
        tapping_term: 200,
        tap_window: 200,
        default_layer: 0,
        backlight: BacklightConfig::DEFAULT,
    };

    /// Check the values that the state machines rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce == 0 {
            return Err(ConfigError::DebounceWindow);
        }
        self.backlight.validate()
    }

    /// [`Self::validate`], plus the default layer must exist in `keymap`.
    pub fn validate_for(&self, keymap: &Keymap) -> Result<(), ConfigError> {
        self.validate()?;
        if usize::from(self.default_layer) >= keymap.num_layers() {
            return Err(ConfigError::LayerOutOfRange {
                layer: self.default_layer,
                layers: keymap.num_layers(),
            });
        }
        Ok(())
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BacklightConfig {
    pub const DEFAULT: BacklightConfig = BacklightConfig {
        lower: 5,
        upper: 200,
        boost: 50,
        cool_down: 24,
        correction: 4,
        cycle_base: 120,
        cycle_scale: 200,
        constant_step: 25,
        mode: Mode::Breathing,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Overshooting `upper` by one and stepping back must land above `lower`
        let room = self.upper.saturating_sub(self.lower);
        if self.lower == 0 || self.correction == 0 || room <= self.correction {
            return Err(ConfigError::BacklightBounds {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(KeyboardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_debounce_is_rejected() {
        let config = KeyboardConfig {
            debounce: 0,
            ..KeyboardConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::DebounceWindow));
    }

    #[test]
    fn test_backlight_bounds_need_room() {
        let mut backlight = BacklightConfig::DEFAULT;
        backlight.lower = 0;
        assert!(backlight.validate().is_err());

        backlight.lower = 100;
        backlight.upper = 104;
        assert!(backlight.validate().is_err());

        backlight.upper = 105;
        assert!(backlight.validate().is_ok());

        backlight.correction = 0;
        assert!(backlight.validate().is_err());
    }

    #[test]
    fn test_default_layer_checked_against_keymap() {
        let keymap = Keymap::fallback();
        assert_eq!(KeyboardConfig::DEFAULT.validate_for(&keymap), Ok(()));
        let config = KeyboardConfig {
            default_layer: 1,
            ..KeyboardConfig::DEFAULT
        };
        assert_eq!(
            config.validate_for(&keymap),
            Err(ConfigError::LayerOutOfRange { layer: 1, layers: 1 })
        );
    }
}
