//! Breathing backlight.
//!
//! The level creeps up and down by one step at a time between the configured
//! bounds. Each step happens after `cycle` ticks, and `cycle` is recomputed
//! from the level after every step, so the LED breathes faster when bright
//! and lingers when dim. At the bottom it rests for a few steps before rising
//! again. Every key press adds a boost on top.

use crate::action::{Effect, EffectSink};
use crate::config::BacklightConfig;

/// Backlight output mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Off,
    Constant,
    Breathing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trend {
    Rising,
    Falling,
}

pub struct Backlight {
    config: BacklightConfig,
    mode: Mode,
    /// Mode restored by [`Effect::BacklightToggle`].
    lit: Mode,
    level: u8,
    constant: u8,
    trend: Trend,
    cool_down: u8,
    /// Ticks per breathing step.
    cycle: u16,
    divider: u16,
}

impl Backlight {
    pub fn new(config: BacklightConfig) -> Self {
        let lit = match config.mode {
            Mode::Off => Mode::Breathing,
            mode => mode,
        };
        let mut backlight = Self {
            config,
            mode: config.mode,
            lit,
            level: config.lower,
            constant: config.upper,
            trend: Trend::Rising,
            cool_down: 0,
            cycle: 0,
            divider: 0,
        };
        backlight.cycle = backlight.cycle_for_level();
        backlight
    }

    /// Advance time by one tick. Returns true if the breathing level stepped.
    pub fn tick(&mut self) -> bool {
        if self.mode != Mode::Breathing {
            return false;
        }
        self.divider += 1;
        if self.divider < self.cycle {
            return false;
        }
        self.divider = 0;
        self.step();
        true
    }

    fn step(&mut self) {
        let lower = i16::from(self.config.lower);
        let upper = i16::from(self.config.upper);
        // Wide enough to overshoot a full-range upper bound
        let mut level = i16::from(self.level);

        if self.cool_down > 0 {
            self.cool_down -= 1;
        } else {
            level += match self.trend {
                Trend::Rising => 1,
                Trend::Falling => -1,
            };
        }

        if level > upper {
            self.trend = Trend::Falling;
            level -= i16::from(self.config.correction);
        }

        if level < lower && self.cool_down == 0 {
            self.trend = Trend::Rising;
            self.cool_down = self.config.cool_down;
            level = lower;
        }

        self.level = level.clamp(0, i16::from(u8::MAX)) as u8;
        self.cycle = self.cycle_for_level();
        log::trace!("backlight level = {}, cycle = {}", self.level, self.cycle);
    }

    fn cycle_for_level(&self) -> u16 {
        let scaled = self.config.cycle_scale / u16::from(self.level.max(1));
        scaled.saturating_add(self.config.cycle_base)
    }

    /// Brighten in response to a key press, saturating at the upper bound.
    pub fn boost(&mut self) {
        self.level = self
            .level
            .saturating_add(self.config.boost)
            .min(self.config.upper);
    }

    /// Current breathing level, always within the configured bounds.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// PWM duty to output for the current mode.
    pub fn duty(&self) -> u8 {
        match self.mode {
            Mode::Off => 0,
            Mode::Constant => self.constant,
            Mode::Breathing => self.level,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != Mode::Off {
            self.lit = mode;
        }
        self.mode = mode;
        log::debug!("backlight mode {:?}", mode);
    }

    pub fn is_rising(&self) -> bool {
        self.trend == Trend::Rising
    }

    /// Steps left to rest at the bottom.
    pub fn cool_down(&self) -> u8 {
        self.cool_down
    }

    /// Ticks until the next breathing step.
    pub fn cycle(&self) -> u16 {
        self.cycle
    }
}

impl EffectSink for Backlight {
    fn trigger(&mut self, effect: Effect) {
        let BacklightConfig { lower, upper, constant_step, .. } = self.config;
        match effect {
            Effect::BacklightStep => {
                let next = match self.mode {
                    Mode::Off => Mode::Constant,
                    Mode::Constant => Mode::Breathing,
                    Mode::Breathing => Mode::Off,
                };
                self.set_mode(next);
            }
            Effect::BacklightIncrease => {
                self.constant = self.constant.saturating_add(constant_step).min(upper);
                if self.mode == Mode::Off {
                    self.set_mode(Mode::Constant);
                }
            }
            Effect::BacklightDecrease => {
                self.constant = self.constant.saturating_sub(constant_step).max(lower);
            }
            Effect::BacklightToggle => {
                let next = match self.mode {
                    Mode::Off => self.lit,
                    _ => Mode::Off,
                };
                self.set_mode(next);
            }
        }
    }
}
