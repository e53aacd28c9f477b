//! The complete keyboard pipeline.
//!
//! One [`Keyboard::tick`] is one pass of the main loop: scan the matrix,
//! debounce, resolve and dispatch every committed key change, then advance
//! the dispatcher and backlight clocks and write the new backlight duty.

use crate::backlight::Backlight;
use crate::config::KeyboardConfig;
use crate::debounce::Debouncer;
use crate::dispatch::{Dispatcher, HostSink, KeyEvent};
use crate::error::ConfigError;
use crate::keycode::Key;
use crate::keymap::Keymap;
use crate::layer::{resolve, LayerStack};
use crate::matrix::{MatrixSnapshot, PinDriver, Scanner};
use crate::{COLS, ROWS};

pub struct Keyboard<P> {
    scanner: Scanner<P>,
    debouncer: Debouncer,
    keymap: Keymap,
    layers: LayerStack,
    dispatcher: Dispatcher,
    backlight: Backlight,
    /// Key each held position resolved to when it was pressed.
    pressed: [[Key; COLS]; ROWS],
}

impl<P: PinDriver> Keyboard<P> {
    pub fn new(pins: P, keymap: Keymap, config: &KeyboardConfig) -> Result<Self, ConfigError> {
        config.validate_for(&keymap)?;

        Ok(Self {
            scanner: Scanner::new(pins),
            debouncer: Debouncer::new(config.debounce),
            keymap,
            layers: LayerStack::new(config.default_layer),
            dispatcher: Dispatcher::new(config),
            backlight: Backlight::new(config.backlight),
            pressed: [[Key::No; COLS]; ROWS],
        })
    }

    /// Run one scan pass. Returns true if any key changed state.
    pub fn tick<H: HostSink>(&mut self, host: &mut H) -> bool {
        let raw = self.scanner.scan();
        let (_, changed) = self.debouncer.update(&raw);

        if changed {
            for transition in self.debouncer.transitions() {
                let pos = transition.pos;
                let (row, col) = pos.index();

                let key = if transition.pressed {
                    self.dispatcher.interrupt(&mut self.layers);
                    let key = resolve(pos, &self.layers, &self.keymap);
                    self.pressed[row][col] = key;
                    self.backlight.boost();
                    key
                } else {
                    // Undo whatever the press did, even if the layers moved
                    core::mem::replace(&mut self.pressed[row][col], Key::No)
                };

                log::trace!(
                    "{:?} {} -> {:?} (layer {})",
                    pos,
                    if transition.pressed { "down" } else { "up" },
                    key,
                    self.layers.current()
                );

                let event = KeyEvent {
                    pos,
                    key,
                    pressed: transition.pressed,
                };
                self.dispatcher
                    .dispatch(event, &self.keymap, &mut self.layers, host, &mut self.backlight);
            }
        }

        self.dispatcher.tick(&mut self.layers);
        self.backlight.tick();
        let duty = self.backlight.duty();
        self.scanner.pins_mut().set_output_level(duty);

        changed
    }

    /// Committed matrix state.
    pub fn debounced(&self) -> &MatrixSnapshot {
        self.debouncer.state()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn backlight(&self) -> &Backlight {
        &self.backlight
    }

    pub fn backlight_mut(&mut self) -> &mut Backlight {
        &mut self.backlight
    }

    pub fn pins(&self) -> &P {
        self.scanner.pins()
    }

    pub fn pins_mut(&mut self) -> &mut P {
        self.scanner.pins_mut()
    }
}
