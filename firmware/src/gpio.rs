//! Register-level GPIO for the Teensy 2.0 (ATmega32U4).
//!
//! Pins are plain (port, bit) pairs. All register access goes through a
//! read-modify-write on the port's PORTx/DDRx registers, so a pin handle
//! only touches its own bit.

use core::convert::Infallible;

use avr_device::atmega32u4::{PORTB, PORTC, PORTD, PORTF};
use embedded_hal::digital::{ErrorType, OutputPin};
use esc_matrix::DrainLine;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Port {
    B,
    C,
    D,
    F,
}

/// One GPIO pin, used as a push-pull output by the matrix.
#[derive(Clone, Copy)]
pub struct Gpio {
    port: Port,
    mask: u8,
}

impl Gpio {
    pub const fn new(port: Port, bit: u8) -> Self {
        Self {
            port,
            mask: 1 << bit,
        }
    }

    pub const fn same_pin(&self, other: &Gpio) -> bool {
        self.port as u8 == other.port as u8 && self.mask == other.mask
    }

    /// DDRx bit set: output.
    pub fn make_output(&self) {
        self.modify_ddr(|bits| bits | self.mask);
    }

    /// DDRx bit clear: input.
    pub fn make_input(&self) {
        self.modify_ddr(|bits| bits & !self.mask);
    }

    pub fn write(&self, high: bool) {
        if high {
            self.modify_port(|bits| bits | self.mask);
        } else {
            self.modify_port(|bits| bits & !self.mask);
        }
    }

    fn modify_port(&self, f: impl Fn(u8) -> u8) {
        // Single-threaded, no interrupt touches these ports.
        unsafe {
            match self.port {
                Port::B => (*PORTB::ptr()).portb.modify(|r, w| w.bits(f(r.bits()))),
                Port::C => (*PORTC::ptr()).portc.modify(|r, w| w.bits(f(r.bits()))),
                Port::D => (*PORTD::ptr()).portd.modify(|r, w| w.bits(f(r.bits()))),
                Port::F => (*PORTF::ptr()).portf.modify(|r, w| w.bits(f(r.bits()))),
            }
        }
    }

    fn modify_ddr(&self, f: impl Fn(u8) -> u8) {
        unsafe {
            match self.port {
                Port::B => (*PORTB::ptr()).ddrb.modify(|r, w| w.bits(f(r.bits()))),
                Port::C => (*PORTC::ptr()).ddrc.modify(|r, w| w.bits(f(r.bits()))),
                Port::D => (*PORTD::ptr()).ddrd.modify(|r, w| w.bits(f(r.bits()))),
                Port::F => (*PORTF::ptr()).ddrf.modify(|r, w| w.bits(f(r.bits()))),
            }
        }
    }
}

impl ErrorType for Gpio {
    type Error = Infallible;
}

impl OutputPin for Gpio {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

/// The drain line switches between a floating input and a low output.
pub struct DrainPin(Gpio);

impl DrainPin {
    pub const fn new(pin: Gpio) -> Self {
        Self(pin)
    }
}

impl DrainLine for DrainPin {
    fn float(&mut self) {
        // Input with PORTx low: no pull-up, high-Z.
        self.0.make_input();
        self.0.write(false);
    }

    fn sink(&mut self) {
        self.0.write(false);
        self.0.make_output();
    }
}
