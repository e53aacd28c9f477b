//! Action dispatcher.
//!
//! Turns resolved keys into host key events, layer stack changes and
//! effects. Plain keycodes pass straight through to the [`HostSink`]; function
//! keys are looked up in the keymap's action table. Actions that behave
//! differently when tapped and when held keep a record in a small table of
//! held function keys until they are released.
//!
//! Time is counted in ticks, one per scan pass, see [`Dispatcher::tick`].

use heapless::Vec;

use crate::action::{Action, EffectSink};
use crate::config::KeyboardConfig;
use crate::keycode::{Key, Keycode, Mods};
use crate::keymap::Keymap;
use crate::layer::LayerStack;
use crate::matrix::KeyPosition;

/// Function keys that can be held down at the same time.
pub const MAX_HELD: usize = 8;

/// Receiver of plain key events.
pub trait HostSink {
    /// `oneshot` modifiers apply to this key press only.
    fn press(&mut self, code: Keycode, oneshot: Mods);
    fn release(&mut self, code: Keycode);
}

/// One resolved key change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub pos: KeyPosition,
    pub key: Key,
    pub pressed: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum HeldState {
    /// Layer pushed for the duration of the hold. `pushed` is false if it was
    /// already active, in which case the release leaves it alone.
    Momentary { layer: u8, pushed: bool },
    /// Non-final press of a tap-toggle streak.
    Streak {
        layer: u8,
        pushed: bool,
        count: u8,
        interrupted: bool,
    },
    /// Tap-or-hold key waiting for the tapping term or another key.
    Pending { layer: u8, code: Keycode },
    OneShot { mods: Mods, interrupted: bool },
}

#[derive(Copy, Clone, Debug)]
struct HeldKey {
    pos: KeyPosition,
    index: u8,
    since: u32,
    state: HeldState,
}

/// Taps counted towards a tap-toggle.
#[derive(Copy, Clone, Debug)]
struct TapStreak {
    index: u8,
    count: u8,
    released: u32,
}

pub struct Dispatcher {
    tapping_term: u16,
    tap_window: u16,
    now: u32,
    held: Vec<HeldKey, MAX_HELD>,
    streak: Option<TapStreak>,
    oneshot: Mods,
}

impl Dispatcher {
    pub fn new(config: &KeyboardConfig) -> Self {
        Self {
            tapping_term: config.tapping_term,
            tap_window: config.tap_window,
            now: 0,
            held: Vec::new(),
            streak: None,
            oneshot: Mods::NONE,
        }
    }

    /// Modifiers waiting for the next key press.
    pub fn pending_oneshot(&self) -> Mods {
        self.oneshot
    }

    /// Number of function keys currently held.
    pub fn held_keys(&self) -> usize {
        self.held.len()
    }

    fn elapsed(&self, since: u32) -> u32 {
        self.now.wrapping_sub(since)
    }

    /// Advance the clock by one scan pass and turn tap-or-hold keys held
    /// past the tapping term into holds.
    pub fn tick(&mut self, stack: &mut LayerStack) {
        self.now = self.now.wrapping_add(1);
        let term = u32::from(self.tapping_term);
        for i in 0..self.held.len() {
            let held = self.held[i];
            if let HeldState::Pending { layer, .. } = held.state {
                if self.elapsed(held.since) >= term {
                    self.held[i].state = hold_layer(layer, stack);
                }
            }
        }
    }

    /// Another key is about to be pressed.
    ///
    /// Pending tap-or-hold keys become holds, so the new key resolves on
    /// their layer, and held one-shot or tap-toggle keys no longer count as
    /// taps. Call this before resolving the new key.
    pub fn interrupt(&mut self, stack: &mut LayerStack) {
        for held in self.held.iter_mut() {
            match held.state {
                HeldState::Pending { layer, .. } => held.state = hold_layer(layer, stack),
                HeldState::OneShot { ref mut interrupted, .. }
                | HeldState::Streak { ref mut interrupted, .. } => *interrupted = true,
                HeldState::Momentary { .. } => {}
            }
        }
    }

    pub fn dispatch<H, E>(
        &mut self,
        event: KeyEvent,
        keymap: &Keymap,
        stack: &mut LayerStack,
        host: &mut H,
        effects: &mut E,
    ) where
        H: HostSink,
        E: EffectSink,
    {
        if event.pressed {
            if let Some(streak) = self.streak {
                if event.key != Key::Fn(streak.index) {
                    self.streak = None;
                }
            }
        }

        match event.key {
            Key::No | Key::Trans => {}
            Key::Code(code) => {
                if event.pressed {
                    host.press(code, core::mem::take(&mut self.oneshot));
                } else {
                    host.release(code);
                }
            }
            Key::Fn(index) => match keymap.action(index) {
                Some(action) if event.pressed => {
                    self.press_action(event.pos, index, action, stack, host, effects)
                }
                Some(_) => self.release_action(event.pos, stack, host),
                None => log::warn!("undefined function {} at {:?}", index, event.pos),
            },
        }
    }

    fn press_action<H, E>(
        &mut self,
        pos: KeyPosition,
        index: u8,
        action: Action,
        stack: &mut LayerStack,
        host: &mut H,
        effects: &mut E,
    ) where
        H: HostSink,
        E: EffectSink,
    {
        let state = match action {
            Action::MomentaryLayer(layer) => hold_layer(layer, stack),
            Action::ToggleLayer(layer) => {
                toggle_layer(layer, stack);
                return;
            }
            Action::TapToggleLayer(layer, target) => {
                let count = match self.streak {
                    Some(streak)
                        if streak.index == index
                            && self.elapsed(streak.released) <= u32::from(self.tap_window) =>
                    {
                        streak.count.saturating_add(1)
                    }
                    _ => 1,
                };
                if count >= target {
                    self.streak = None;
                    toggle_layer(layer, stack);
                    return;
                }
                HeldState::Streak {
                    layer,
                    pushed: push_layer(layer, stack),
                    count,
                    interrupted: false,
                }
            }
            Action::TapOrHoldKey(layer, code) => HeldState::Pending { layer, code },
            Action::OneShotModifier(mods) => {
                for code in mods.keycodes() {
                    host.press(code, Mods::NONE);
                }
                HeldState::OneShot {
                    mods,
                    interrupted: false,
                }
            }
            Action::SetDefaultLayer(layer) => {
                stack.set_default(layer);
                log::debug!("default layer {}", layer);
                return;
            }
            Action::TriggerEffect(effect) => {
                effects.trigger(effect);
                return;
            }
        };

        let held = HeldKey {
            pos,
            index,
            since: self.now,
            state,
        };
        if self.held.push(held).is_err() {
            log::warn!("too many held function keys, dropping {:?}", pos);
            self.undo(state, stack, host);
        }
    }

    fn release_action<H: HostSink>(&mut self, pos: KeyPosition, stack: &mut LayerStack, host: &mut H) {
        let Some(i) = self.held.iter().position(|held| held.pos == pos) else {
            // Toggle, default-layer and effect keys keep nothing on release
            return;
        };
        let held = self.held.remove(i);
        let tapped = self.elapsed(held.since) < u32::from(self.tapping_term);

        match held.state {
            HeldState::Pending { code, .. } => {
                host.press(code, core::mem::take(&mut self.oneshot));
                host.release(code);
            }
            HeldState::Streak {
                count, interrupted, ..
            } => {
                self.undo(held.state, stack, host);
                self.streak = (tapped && !interrupted).then_some(TapStreak {
                    index: held.index,
                    count,
                    released: self.now,
                });
            }
            HeldState::OneShot { mods, interrupted } => {
                self.undo(held.state, stack, host);
                if tapped && !interrupted {
                    self.oneshot = self.oneshot.union(mods);
                    log::debug!("one-shot armed: {:#04x}", self.oneshot.0);
                }
            }
            HeldState::Momentary { .. } => self.undo(held.state, stack, host),
        }
    }

    /// Revert what holding a key did.
    fn undo<H: HostSink>(&mut self, state: HeldState, stack: &mut LayerStack, host: &mut H) {
        match state {
            HeldState::Momentary { layer, pushed } | HeldState::Streak { layer, pushed, .. } => {
                if pushed {
                    stack.pop(layer);
                    log::debug!("layer {} off", layer);
                }
            }
            HeldState::OneShot { mods, .. } => {
                for code in mods.keycodes() {
                    host.release(code);
                }
            }
            HeldState::Pending { .. } => {}
        }
    }
}

fn push_layer(layer: u8, stack: &mut LayerStack) -> bool {
    let pushed = stack.push(layer);
    if pushed {
        log::debug!("layer {} on", layer);
    }
    pushed
}

fn hold_layer(layer: u8, stack: &mut LayerStack) -> HeldState {
    HeldState::Momentary {
        layer,
        pushed: push_layer(layer, stack),
    }
}

fn toggle_layer(layer: u8, stack: &mut LayerStack) {
    let active = stack.toggle(layer);
    log::debug!("layer {} {}", layer, if active { "on" } else { "off" });
}
