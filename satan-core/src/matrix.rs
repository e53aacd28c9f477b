//! Key matrix scanning.
//!
//! Rows are selected one at a time through a [`PinDriver`]; the column lines
//! are pulled up, so a pressed switch on the selected row reads low. The
//! scanner inverts that into a per-row bitmask where `1` means pressed.

use crate::{COLS, ROWS};

/// One bit per column of a single row.
pub type RowBits = u32;

/// Complete matrix state, `1` = pressed.
pub type MatrixSnapshot = [RowBits; ROWS];

const _: () = assert!(COLS <= RowBits::BITS as usize, "too many columns for RowBits");

/// Bits of a [`RowBits`] that correspond to real columns.
pub const COL_MASK: RowBits = if COLS == RowBits::BITS as usize {
    RowBits::MAX
} else {
    (1 << COLS) - 1
};

/// Identifies one switch of the matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPosition {
    pub row: u8,
    pub col: u8,
}

impl KeyPosition {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub(crate) fn index(self) -> (usize, usize) {
        (self.row as usize, self.col as usize)
    }
}

/// Board-specific pin access used by the scanner and the backlight output.
///
/// Implementations own the GPIO registers; the core never sees addresses or
/// electrical modes.
pub trait PinDriver {
    /// Select `row` (drive it low).
    fn assert_row(&mut self, row: usize);
    /// Return `row` to high impedance.
    fn release_row(&mut self, row: usize);
    /// Busy-wait until the column lines of the selected row are stable.
    fn settle(&mut self);
    /// Raw column levels, bit set = line high.
    fn sample_columns(&mut self) -> RowBits;
    /// Set the backlight PWM duty.
    fn set_output_level(&mut self, level: u8);
}

/// Drives a [`PinDriver`] to produce one [`MatrixSnapshot`] per scan pass.
pub struct Scanner<P> {
    pins: P,
}

impl<P: PinDriver> Scanner<P> {
    pub fn new(mut pins: P) -> Self {
        for row in 0..ROWS {
            pins.release_row(row);
        }
        Self { pins }
    }

    /// Scan the entire matrix, one row at a time.
    pub fn scan(&mut self) -> MatrixSnapshot {
        let mut snapshot = [0; ROWS];

        for (row, bits) in snapshot.iter_mut().enumerate() {
            self.pins.assert_row(row);
            self.pins.settle();
            // Pressed keys pull their column low
            *bits = !self.pins.sample_columns() & COL_MASK;
            self.pins.release_row(row);
        }

        snapshot
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }
}

/// Check a single position of a snapshot.
pub fn is_pressed(snapshot: &MatrixSnapshot, pos: KeyPosition) -> bool {
    let (row, col) = pos.index();
    row < ROWS && col < COLS && snapshot[row] & (1 << col) != 0
}

/// In-memory pin driver for host tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Op {
        Assert(usize),
        Release(usize),
        Settle,
        Sample,
    }

    #[derive(Default)]
    pub struct MockPins {
        /// Switches currently closed, `1` = pressed.
        pub closed: MatrixSnapshot,
        pub selected: Option<usize>,
        pub ops: Vec<Op>,
        pub duty: u8,
    }

    impl MockPins {
        pub fn press(&mut self, row: usize, col: usize) {
            self.closed[row] |= 1 << col;
        }

        pub fn release(&mut self, row: usize, col: usize) {
            self.closed[row] &= !(1 << col);
        }
    }

    impl PinDriver for MockPins {
        fn assert_row(&mut self, row: usize) {
            assert!(self.selected.is_none(), "row {row} asserted while another row is selected");
            self.selected = Some(row);
            self.ops.push(Op::Assert(row));
        }

        fn release_row(&mut self, row: usize) {
            if self.selected == Some(row) {
                self.selected = None;
            }
            self.ops.push(Op::Release(row));
        }

        fn settle(&mut self) {
            self.ops.push(Op::Settle);
        }

        fn sample_columns(&mut self) -> RowBits {
            self.ops.push(Op::Sample);
            match self.selected {
                // Unused high bits float high, as pulled-up inputs would
                Some(row) => !self.closed[row],
                None => RowBits::MAX,
            }
        }

        fn set_output_level(&mut self, level: u8) {
            self.duty = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockPins, Op};
    use super::*;

    #[test]
    fn test_scan_inverts_active_low_columns() {
        let mut pins = MockPins::default();
        pins.press(2, 3);
        pins.press(4, 13);
        let mut scanner = Scanner::new(pins);

        let snapshot = scanner.scan();

        assert_eq!(snapshot, [0, 0, 1 << 3, 0, 1 << 13]);
        assert!(is_pressed(&snapshot, KeyPosition::new(2, 3)));
        assert!(!is_pressed(&snapshot, KeyPosition::new(2, 4)));
    }

    #[test]
    fn test_scan_masks_unused_columns() {
        let mut scanner = Scanner::new(MockPins::default());
        let snapshot = scanner.scan();
        assert_eq!(snapshot, [0; ROWS]);
    }

    #[test]
    fn test_rows_are_selected_one_at_a_time() {
        let mut scanner = Scanner::new(MockPins::default());
        scanner.pins_mut().ops.clear();
        scanner.scan();

        let ops = &scanner.pins().ops;
        assert_eq!(ops.len(), ROWS * 4);
        for (row, chunk) in ops.chunks(4).enumerate() {
            assert_eq!(chunk, [Op::Assert(row), Op::Settle, Op::Sample, Op::Release(row)]);
        }
        assert_eq!(scanner.pins().selected, None);
    }

    #[test]
    fn test_out_of_range_positions_read_released() {
        let snapshot = [RowBits::MAX; ROWS];
        assert!(!is_pressed(&snapshot, KeyPosition::new(ROWS as u8, 0)));
        assert!(!is_pressed(&snapshot, KeyPosition::new(0, COLS as u8)));
    }
}
