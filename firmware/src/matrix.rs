//! Key matrix wiring of the Satan GH60 PCB.
//!
//! 5 rows × 14 columns, all wired straight to the ATmega32U4:
//!   Rows (selected by driving low, Hi-Z otherwise): PD0, PD1, PD2, PD3, PD5
//!   Columns (inputs w/ pull-up): PF0, PF1, PE6, PC7, PC6, PB7, PD4, PB1,
//!                                PB0, PB5, PB4, PD7, PD6, PB3

use avr_device::atmega32u4::Peripherals;
use satan_core::{PinDriver, RowBits};

use crate::backlight;

/// PORTD bits of the five row lines.
const ROW_BITS: [u8; 5] = [1 << 0, 1 << 1, 1 << 2, 1 << 3, 1 << 5];
const ALL_ROWS: u8 = 0b0010_1111;

// Column pins per port
const COLS_B: u8 = 1 << 0 | 1 << 1 | 1 << 3 | 1 << 4 | 1 << 5 | 1 << 7;
const COLS_C: u8 = 1 << 6 | 1 << 7;
const COLS_D: u8 = 1 << 4 | 1 << 6 | 1 << 7;
const COLS_E: u8 = 1 << 6;
const COLS_F: u8 = 1 << 0 | 1 << 1;

/// Pin driver owning the GPIO ports and Timer1.
pub struct SatanPins {
    dp: Peripherals,
}

impl SatanPins {
    /// Configure the matrix pins and the backlight PWM.
    pub fn new(dp: Peripherals) -> Self {
        // Rows: Hi-Z (DDR:0, PORT:0) until selected
        dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !ALL_ROWS) });
        dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !ALL_ROWS) });

        // Columns: input with pull-up (DDR:0, PORT:1)
        dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !COLS_B) });
        dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() | COLS_B) });
        dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() & !COLS_C) });
        dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() | COLS_C) });
        dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !COLS_D) });
        dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | COLS_D) });
        dp.PORTE.ddre.modify(|r, w| unsafe { w.bits(r.bits() & !COLS_E) });
        dp.PORTE.porte.modify(|r, w| unsafe { w.bits(r.bits() | COLS_E) });
        dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !COLS_F) });
        dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() | COLS_F) });

        backlight::init(&dp);

        Self { dp }
    }
}

impl PinDriver for SatanPins {
    fn assert_row(&mut self, row: usize) {
        let Some(&bit) = ROW_BITS.get(row) else { return };
        // Output low (DDR:1, PORT:0)
        self.dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | bit) });
        self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    }

    fn release_row(&mut self, row: usize) {
        let Some(&bit) = ROW_BITS.get(row) else { return };
        self.dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
        self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
    }

    /// Without this wait the columns read unstable values.
    fn settle(&mut self) {
        delay_us(30);
    }

    /// Raw column levels, bit set = line high (released).
    fn sample_columns(&mut self) -> RowBits {
        let pinb = self.dp.PORTB.pinb.read().bits();
        let pinc = self.dp.PORTC.pinc.read().bits();
        let pind = self.dp.PORTD.pind.read().bits();
        let pine = self.dp.PORTE.pine.read().bits();
        let pinf = self.dp.PORTF.pinf.read().bits();

        // (port value, pin) for columns 0..14
        let pins = [
            (pinf, 0),
            (pinf, 1),
            (pine, 6),
            (pinc, 7),
            (pinc, 6),
            (pinb, 7),
            (pind, 4),
            (pinb, 1),
            (pinb, 0),
            (pinb, 5),
            (pinb, 4),
            (pind, 7),
            (pind, 6),
            (pinb, 3),
        ];

        let mut levels = RowBits::MAX;
        for (col, &(port, pin)) in pins.iter().enumerate() {
            if port & (1 << pin) == 0 {
                levels &= !(1 << col);
            }
        }
        levels
    }

    fn set_output_level(&mut self, level: u8) {
        backlight::set_level(&self.dp, level);
    }
}

/// Busy-wait delay in microseconds (approximate, at 16MHz).
fn delay_us(us: u8) {
    for _ in 0..us {
        // 16 cycles per microsecond, ~4 per iteration
        for _ in 0..4u8 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
