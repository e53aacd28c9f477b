//! Matrix-wide debounce logic.
//!
//! Raw snapshots are compared against a candidate snapshot. Any difference
//! replaces the candidate and re-arms a countdown of `window` scan passes;
//! the candidate is committed only once the countdown runs out. A switch that
//! keeps chattering therefore never commits until it has been quiet for a full
//! window.

use crate::matrix::{is_pressed, KeyPosition, MatrixSnapshot, RowBits};
use crate::ROWS;

/// One debounced key change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub pos: KeyPosition,
    pub pressed: bool,
}

pub struct Debouncer {
    window: u8,
    countdown: u8,
    /// State currently being debounced.
    candidate: MatrixSnapshot,
    /// Last committed state.
    stable: MatrixSnapshot,
    /// Bits flipped by the most recent [`Debouncer::update`].
    flipped: MatrixSnapshot,
}

impl Debouncer {
    /// Create a debouncer requiring `window` quiet scan passes.
    ///
    /// The countdown starts armed, so the all-released power-up state is
    /// committed after the first window.
    pub const fn new(window: u8) -> Self {
        Self {
            window,
            countdown: window,
            candidate: [0; ROWS],
            stable: [0; ROWS],
            flipped: [0; ROWS],
        }
    }

    /// Feed one raw scan. Returns the committed state and whether any key
    /// changed with this pass.
    pub fn update(&mut self, raw: &MatrixSnapshot) -> (&MatrixSnapshot, bool) {
        self.flipped = [0; ROWS];

        for (candidate, &bits) in self.candidate.iter_mut().zip(raw.iter()) {
            if *candidate != bits {
                if self.countdown != 0 {
                    log::debug!("bounce: {}", self.countdown);
                }
                *candidate = bits;
                self.countdown = self.window;
            }
        }

        if self.countdown == 0 {
            return (&self.stable, false);
        }

        self.countdown -= 1;
        if self.countdown != 0 {
            return (&self.stable, false);
        }

        let mut changed = false;
        for ((stable, flipped), &candidate) in self
            .stable
            .iter_mut()
            .zip(self.flipped.iter_mut())
            .zip(self.candidate.iter())
        {
            *flipped = *stable ^ candidate;
            changed |= *flipped != 0;
            *stable = candidate;
        }

        (&self.stable, changed)
    }

    /// Committed matrix state.
    pub fn state(&self) -> &MatrixSnapshot {
        &self.stable
    }

    /// Check if a commit is still pending.
    pub fn is_settling(&self) -> bool {
        self.countdown != 0
    }

    /// Key changes committed by the most recent update, in row-major order.
    pub fn transitions(&self) -> Transitions<'_> {
        Transitions {
            stable: &self.stable,
            flipped: self.flipped,
            row: 0,
        }
    }
}

/// Iterator over the positions flipped by the last commit.
pub struct Transitions<'a> {
    stable: &'a MatrixSnapshot,
    flipped: MatrixSnapshot,
    row: usize,
}

impl Iterator for Transitions<'_> {
    type Item = Transition;

    fn next(&mut self) -> Option<Transition> {
        while self.row < ROWS {
            let bits: RowBits = self.flipped[self.row];
            if bits == 0 {
                self.row += 1;
                continue;
            }
            let col = bits.trailing_zeros();
            self.flipped[self.row] &= !(1 << col);
            let pos = KeyPosition::new(self.row as u8, col as u8);
            return Some(Transition {
                pos,
                pressed: is_pressed(self.stable, pos),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    const WINDOW: u8 = 5;

    fn snapshot_with(row: usize, col: usize) -> MatrixSnapshot {
        let mut snapshot = [0; ROWS];
        snapshot[row] |= 1 << col;
        snapshot
    }

    fn settle_idle(debouncer: &mut Debouncer) {
        for _ in 0..WINDOW {
            debouncer.update(&[0; ROWS]);
        }
        assert!(!debouncer.is_settling());
    }

    #[test]
    fn test_press_commits_on_fifth_pass() {
        let mut debouncer = Debouncer::new(WINDOW);
        settle_idle(&mut debouncer);

        let raw = snapshot_with(2, 3);
        for pass in 1..WINDOW {
            let (state, changed) = debouncer.update(&raw);
            assert!(!changed, "committed early on pass {pass}");
            assert_eq!(*state, [0; ROWS]);
        }

        let (state, changed) = debouncer.update(&raw);
        assert!(changed);
        assert_eq!(*state, raw);

        let transitions: Vec<_> = debouncer.transitions().collect();
        assert_eq!(
            transitions,
            [Transition { pos: KeyPosition::new(2, 3), pressed: true }]
        );
    }

    #[test]
    fn test_commit_without_flips_is_not_a_change() {
        let mut debouncer = Debouncer::new(WINDOW);
        for _ in 0..WINDOW - 1 {
            assert!(!debouncer.update(&[0; ROWS]).1);
        }
        let (_, changed) = debouncer.update(&[0; ROWS]);
        assert!(!changed);
        assert!(!debouncer.is_settling());
        assert_eq!(debouncer.transitions().count(), 0);
    }

    #[test]
    fn test_bounce_rearms_the_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        settle_idle(&mut debouncer);

        let raw = snapshot_with(0, 0);
        debouncer.update(&raw);
        debouncer.update(&raw);
        // Contact bounces open for one pass
        debouncer.update(&[0; ROWS]);
        // ... and closes again: a full window is needed from here
        for _ in 1..WINDOW {
            assert!(!debouncer.update(&raw).1);
        }
        assert!(debouncer.update(&raw).1);
    }

    #[test]
    fn test_release_reported_as_transition() {
        let mut debouncer = Debouncer::new(WINDOW);
        settle_idle(&mut debouncer);
        let raw = snapshot_with(4, 13);
        for _ in 0..WINDOW {
            debouncer.update(&raw);
        }
        for _ in 0..WINDOW {
            debouncer.update(&[0; ROWS]);
        }
        let transitions: Vec<_> = debouncer.transitions().collect();
        assert_eq!(
            transitions,
            [Transition { pos: KeyPosition::new(4, 13), pressed: false }]
        );
    }

    #[test]
    fn test_transitions_are_row_major() {
        let mut debouncer = Debouncer::new(1);
        let mut raw = [0; ROWS];
        raw[3] = 0b101;
        raw[1] = 1 << 7;
        assert!(debouncer.update(&raw).1);
        let positions: Vec<_> = debouncer.transitions().map(|t| t.pos).collect();
        assert_eq!(
            positions,
            [KeyPosition::new(1, 7), KeyPosition::new(3, 0), KeyPosition::new(3, 2)]
        );
    }

    proptest! {
        #[test]
        fn test_constant_input_commits_after_exactly_one_window(
            row in 0..ROWS,
            bits in 1u32..(1 << crate::COLS),
            window in 1u8..10,
        ) {
            let mut debouncer = Debouncer::new(window);
            let mut raw = [0; ROWS];
            raw[row] = bits;
            for _ in 1..window {
                let (state, changed) = debouncer.update(&raw);
                prop_assert!(!changed);
                prop_assert_eq!(*state, [0; ROWS]);
            }
            let (state, changed) = debouncer.update(&raw);
            prop_assert!(changed);
            prop_assert_eq!(*state, raw);
        }

        #[test]
        fn test_continuous_chatter_never_commits(
            start in any::<bool>(),
            passes in 1usize..200,
            window in 2u8..10,
        ) {
            let mut debouncer = Debouncer::new(window);
            let pressed = snapshot_with(1, 1);
            let mut closed = start;
            for _ in 0..passes {
                closed = !closed;
                let raw = if closed { pressed } else { [0; ROWS] };
                let (state, changed) = debouncer.update(&raw);
                prop_assert!(!changed);
                prop_assert_eq!(*state, [0; ROWS]);
            }
        }
    }
}
