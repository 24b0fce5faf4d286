//! Reference firmware for an electrostatic capacitive test board on
//! ATmega32U4 (Teensy 2.0).
//!
//! - Analog matrix scanning through `esc-matrix` (mux + strobe + ADC)
//! - Status LED hook that toggles on every matrix change
//! - Matrix dump on USART1 whenever a key latches or unlatches

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod adc;
mod board;
mod gpio;
mod serial;

use avr_device::atmega32u4::Peripherals;

use serial::Serial;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Configure system clock (should already be 16MHz from Teensy bootloader fuses)
    // Disable clock prescaler (CLKPR)
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1

    let mut console = Serial::new();
    console.init();

    let mut matrix = board::matrix();
    matrix.init();

    console.print(format_args!(
        "EC matrix {}x{}, latch {} unlatch {}\n",
        matrix.row_count(),
        matrix.col_count(),
        board::THRESHOLDS.latch(),
        board::THRESHOLDS.unlatch(),
    ));

    loop {
        if matrix.scan() {
            console.print(format_args!("{}", matrix.state()));
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
