//! USART1 transmit-only console for the matrix dump.
//!
//! TXD1 is PD3 on the Teensy 2.0. 115200 baud, 8N1, double-speed mode.

use core::fmt;

use avr_device::atmega32u4::USART1;

/// UBRR for 115200 baud at 16 MHz with U2X1 set (2.1% error).
const UBRR_VALUE: u16 = 16;

// UCSR1A bits
const U2X1: u8 = 1 << 1;
const UDRE1: u8 = 1 << 5;
// UCSR1B bits
const TXEN1: u8 = 1 << 3;
// UCSR1C: asynchronous, no parity, 1 stop bit, 8 data bits
const UCSZ_8N1: u8 = 0x06;

pub struct Serial {
    usart: &'static avr_device::atmega32u4::usart1::RegisterBlock,
}

impl Serial {
    pub fn new() -> Self {
        // Only the console writes to USART1.
        Self {
            usart: unsafe { &*USART1::ptr() },
        }
    }

    pub fn init(&self) {
        self.usart.ubrr1.write(|w| unsafe { w.bits(UBRR_VALUE) });
        self.usart.ucsr1a.write(|w| unsafe { w.bits(U2X1) });
        self.usart.ucsr1c.write(|w| unsafe { w.bits(UCSZ_8N1) });
        self.usart.ucsr1b.write(|w| unsafe { w.bits(TXEN1) });
    }

    /// Formatted output for `format_args!`. `write_str` never fails, so
    /// there is no result to hand back.
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::Write::write_fmt(self, args);
    }

    pub fn write_byte(&self, byte: u8) {
        while self.usart.ucsr1a.read().bits() & UDRE1 == 0 {}
        self.usart.udr1.write(|w| unsafe { w.bits(byte) });
    }
}

impl fmt::Write for Serial {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}
