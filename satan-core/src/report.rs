//! Boot keyboard report assembly.
//!
//! [`ReportBuilder`] is the [`HostSink`] used by the firmware: it tracks the
//! pressed keycodes and modifiers and queues a standard 8-byte 6KRO report
//! for every change, so a press and release within one scan pass still reach
//! the host as two reports. Handing them to a USB endpoint is up to the caller.

use heapless::{Deque, Vec};

use crate::dispatch::HostSink;
use crate::keycode::{Keycode, Mods};

/// Keys reported at once by the boot protocol.
pub const ROLLOVER: usize = 6;

/// Reports waiting to be sent.
const QUEUE: usize = 8;

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; ROLLOVER],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; ROLLOVER],
        }
    }

    /// Wire layout of the report.
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0; 8];
        bytes[0] = self.modifiers;
        bytes[1] = self.reserved;
        bytes[2..].copy_from_slice(&self.keys);
        bytes
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Default)]
pub struct ReportBuilder {
    /// Physically held modifiers.
    mods: Mods,
    /// One-shot modifiers of the last press, dropped on the next change.
    weak: Mods,
    keys: Vec<Keycode, ROLLOVER>,
    /// Last report queued.
    last: KeyboardReport,
    queue: Deque<KeyboardReport, QUEUE>,
}

impl ReportBuilder {
    pub const fn new() -> Self {
        Self {
            mods: Mods::NONE,
            weak: Mods::NONE,
            keys: Vec::new(),
            last: KeyboardReport::empty(),
            queue: Deque::new(),
        }
    }

    pub fn report(&self) -> KeyboardReport {
        let mut report = KeyboardReport::empty();
        report.modifiers = self.mods.union(self.weak).0;
        for (slot, code) in report.keys.iter_mut().zip(self.keys.iter()) {
            *slot = *code as u8;
        }
        report
    }

    /// Oldest queued report not handed out yet.
    pub fn take_changed(&mut self) -> Option<KeyboardReport> {
        self.queue.pop_front()
    }

    fn enqueue(&mut self) {
        let report = self.report();
        if report == self.last {
            return;
        }
        self.last = report;
        // A full queue folds the newest state into its last entry
        if let Err(report) = self.queue.push_back(report) {
            log::warn!("report queue full");
            if let Some(back) = self.queue.back_mut() {
                *back = report;
            }
        }
    }
}

impl HostSink for ReportBuilder {
    fn press(&mut self, code: Keycode, oneshot: Mods) {
        self.weak = oneshot;
        if code.is_modifier() {
            self.mods = self.mods.union(code.modifier_bits());
        } else if !self.keys.contains(&code) && self.keys.push(code).is_err() {
            log::warn!("report full, dropping {:?}", code);
        }
        self.enqueue();
    }

    fn release(&mut self, code: Keycode) {
        self.weak = Mods::NONE;
        if code.is_modifier() {
            self.mods = self.mods.difference(code.modifier_bits());
        } else if let Some(i) = self.keys.iter().position(|&k| k == code) {
            self.keys.remove(i);
        }
        self.enqueue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_fill_slots_in_press_order() {
        let mut builder = ReportBuilder::new();
        builder.press(Keycode::B, Mods::NONE);
        builder.press(Keycode::A, Mods::NONE);
        builder.press(Keycode::LShift, Mods::NONE);
        let report = builder.report();
        assert_eq!(report.modifiers, 0x02);
        assert_eq!(report.keys, [0x05, 0x04, 0, 0, 0, 0]);
        assert_eq!(report.to_bytes(), [0x02, 0, 0x05, 0x04, 0, 0, 0, 0]);
    }

    #[test]
    fn test_release_compacts_slots() {
        let mut builder = ReportBuilder::new();
        builder.press(Keycode::A, Mods::NONE);
        builder.press(Keycode::B, Mods::NONE);
        builder.press(Keycode::C, Mods::NONE);
        builder.release(Keycode::B);
        assert_eq!(builder.report().keys, [0x04, 0x06, 0, 0, 0, 0]);
    }

    #[test]
    fn test_seventh_key_is_dropped() {
        let mut builder = ReportBuilder::new();
        let codes = [
            Keycode::A,
            Keycode::B,
            Keycode::C,
            Keycode::D,
            Keycode::E,
            Keycode::F,
            Keycode::G,
        ];
        for code in codes {
            builder.press(code, Mods::NONE);
        }
        assert_eq!(builder.report().keys, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
        builder.release(Keycode::G);
        builder.release(Keycode::A);
        assert_eq!(builder.report().keys, [0x05, 0x06, 0x07, 0x08, 0x09, 0]);
    }

    #[test]
    fn test_oneshot_mods_last_until_next_change() {
        let mut builder = ReportBuilder::new();
        builder.press(Keycode::A, Mods::LSHIFT);
        assert_eq!(builder.report().modifiers, Mods::LSHIFT.0);
        builder.release(Keycode::A);
        assert_eq!(builder.report(), KeyboardReport::empty());
    }

    #[test]
    fn test_take_changed_reports_once() {
        let mut builder = ReportBuilder::new();
        assert_eq!(builder.take_changed(), None);
        builder.press(Keycode::RCtrl, Mods::NONE);
        let report = builder.take_changed().unwrap();
        assert_eq!(report.modifiers, Mods::RCTRL.0);
        assert_eq!(builder.take_changed(), None);
        builder.press(Keycode::RCtrl, Mods::NONE);
        assert_eq!(builder.take_changed(), None);
        builder.release(Keycode::RCtrl);
        assert_eq!(builder.take_changed(), Some(KeyboardReport::empty()));
    }

    #[test]
    fn test_tap_within_one_pass_queues_both_reports() {
        let mut builder = ReportBuilder::new();
        builder.press(Keycode::Escape, Mods::NONE);
        builder.release(Keycode::Escape);
        let pressed = builder.take_changed().unwrap();
        assert_eq!(pressed.keys[0], Keycode::Escape as u8);
        assert_eq!(builder.take_changed(), Some(KeyboardReport::empty()));
        assert_eq!(builder.take_changed(), None);
    }

    #[test]
    fn test_full_queue_keeps_latest_state() {
        let mut builder = ReportBuilder::new();
        for _ in 0..QUEUE {
            builder.press(Keycode::A, Mods::NONE);
            builder.release(Keycode::A);
        }
        builder.press(Keycode::B, Mods::NONE);
        let mut last = None;
        let mut sent = 0;
        while let Some(report) = builder.take_changed() {
            last = Some(report);
            sent += 1;
        }
        assert_eq!(sent, QUEUE);
        assert_eq!(last.unwrap().keys[0], Keycode::B as u8);
    }
}
