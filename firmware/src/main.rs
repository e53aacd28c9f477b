//! Satan GH60 keyboard firmware for ATmega32U4.
//!
//! Scans the 5×14 matrix, runs it through the `satan-core` pipeline
//! (debounce, layers, dual-role keys, breathing backlight) and keeps a 6KRO
//! boot keyboard report up to date.

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod backlight;
mod matrix;

use avr_device::atmega32u4::Peripherals;
use satan_core::{Keyboard, KeyboardConfig, Keymap, ReportBuilder};

use matrix::SatanPins;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Built-in keymap, or plain QWERTY if it does not pass validation.
fn select_keymap() -> (Keymap, KeyboardConfig) {
    let config = KeyboardConfig::DEFAULT;
    match Keymap::builtin() {
        Ok(keymap) if config.validate_for(&keymap).is_ok() => (keymap, config),
        _ => {
            log::error!("built-in keymap rejected, using fallback");
            (Keymap::fallback(), KeyboardConfig::DEFAULT)
        }
    }
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR), run at the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    let pins = SatanPins::new(dp);
    let (keymap, config) = select_keymap();
    let Ok(mut keyboard) = Keyboard::new(pins, keymap, &config) else {
        loop {}
    };
    let mut host = ReportBuilder::new();

    loop {
        keyboard.tick(&mut host);

        // Queued reports go out to the host in order
        while let Some(report) = host.take_changed() {
            log::trace!("report {:?}", report.to_bytes());
        }

        // ~1ms between scans
        delay_ms(1);
    }
}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn delay_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
