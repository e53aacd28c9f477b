//! Backlight LED on PB6 (OC1B), driven by Timer1 in 8-bit fast PWM mode.

use avr_device::atmega32u4::Peripherals;

// TCCR1A
const WGM10: u8 = 1 << 0;
const COM1B1: u8 = 1 << 5;
// TCCR1B
const CS11: u8 = 1 << 1;
const WGM12: u8 = 1 << 3;

pub fn init(dp: &Peripherals) {
    // PB6 output
    dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | 1 << 6) });

    // 8-bit fast PWM, clear OC1B on compare match, 1/8 prescale
    dp.TC1.tccr1a.modify(|r, w| unsafe { w.bits(r.bits() | WGM10 | COM1B1) });
    dp.TC1.tccr1b.modify(|r, w| unsafe { w.bits(r.bits() | WGM12 | CS11) });

    set_level(dp, 0);
}

pub fn set_level(dp: &Peripherals, level: u8) {
    dp.TC1.ocr1b.write(|w| unsafe { w.bits(u16::from(level)) });
}
