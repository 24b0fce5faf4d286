//! Single-channel ADC reads for the EC sense input.
//!
//! The board thresholds are on a 6-bit scale, so the 10-bit conversion
//! result is shifted down before it reaches the matrix.

use avr_device::atmega32u4::ADC;
use esc_matrix::AnalogSense;

use crate::gpio::{Gpio, Port};

/// ADMUX: AVcc reference (REFS0).
const REFS0: u8 = 0x40;
/// ADCSRA: enable (ADEN) with a /128 prescaler (125 kHz at 16 MHz).
const ADCSRA_ENABLE: u8 = 0x80 | 0x07;
/// ADCSRA: start conversion.
const ADSC: u8 = 0x40;
/// 10-bit result down to the 6-bit threshold scale.
const RESULT_SHIFT: u8 = 4;

pub struct SenseAdc {
    channel: u8,
    pin: Gpio,
}

impl SenseAdc {
    /// `channel` is the ADC0..ADC7 input on port F.
    pub const fn new(channel: u8) -> Self {
        Self {
            channel,
            pin: Gpio::new(Port::F, channel),
        }
    }

    /// The port F pin behind this channel.
    pub const fn pin(&self) -> Gpio {
        self.pin
    }

    /// Power up the converter. Call once before `select`.
    pub fn enable(&self) {
        let adc = Self::regs();
        adc.adcsra.write(|w| unsafe { w.bits(ADCSRA_ENABLE) });
    }

    fn regs() -> &'static avr_device::atmega32u4::adc::RegisterBlock {
        // The matrix owns the converter for the lifetime of the firmware.
        unsafe { &*ADC::ptr() }
    }
}

impl AnalogSense for SenseAdc {
    fn select(&mut self) {
        // High-Z input, no pull-up.
        self.pin.make_input();
        self.pin.write(false);

        let adc = Self::regs();
        // Disable the digital input buffer on the analog pin.
        adc.didr0
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << self.channel)) });
        adc.admux
            .write(|w| unsafe { w.bits(REFS0 | (self.channel & 0x07)) });
    }

    fn sample(&mut self) -> u16 {
        let adc = Self::regs();
        adc.adcsra.modify(|r, w| unsafe { w.bits(r.bits() | ADSC) });
        while adc.adcsra.read().bits() & ADSC != 0 {}
        adc.adc.read().bits() >> RESULT_SHIFT
    }
}
