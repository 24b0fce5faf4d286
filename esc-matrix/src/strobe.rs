//! The charge / sample / discharge cycle for a single switch.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::config::Thresholds;
use crate::hal::{AnalogSense, DrainLine};
use crate::infallible;

/// Samples one switch at a time through a shared drain and ADC input.
pub struct AnalogStrobe<D, A> {
    drain: D,
    sense: A,
    thresholds: Thresholds,
}

impl<D: DrainLine, A: AnalogSense> AnalogStrobe<D, A> {
    pub const fn new(drain: D, sense: A, thresholds: Thresholds) -> Self {
        Self {
            drain,
            sense,
            thresholds,
        }
    }

    /// Route the ADC to the sense input and pull the sensors to ground.
    pub fn prepare(&mut self) {
        self.sense.select();
        self.drain.sink();
    }

    /// Read the switch behind `line` and apply hysteresis.
    ///
    /// `was_active` must be the switch's state from the previous scan cycle;
    /// it picks the unlatch point for a held key and the latch point for a
    /// released one. No delay is inserted between charging and sampling:
    /// the RC path is slow compared to the converter.
    pub fn strobe<P>(&mut self, line: &mut P, was_active: bool) -> bool
    where
        P: OutputPin<Error = Infallible>,
    {
        // Stop loading the circuit so it can charge.
        self.drain.float();
        infallible(line.set_high());

        let value = self.sense.sample();

        infallible(line.set_low());
        self.drain.sink();

        self.thresholds.is_active(value, was_active)
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn release(self) -> (D, A) {
        (self.drain, self.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Bench, DrainState, Event, PinRole};

    const THRESHOLDS: Thresholds = Thresholds::new(58, 48);

    fn single_key(level: u16) -> (Bench, AnalogStrobe<crate::mock::MockDrain, crate::mock::MockAdc>) {
        let bench = Bench::new();
        bench.set_level(0, 0, level);
        let strobe = AnalogStrobe::new(bench.drain(), bench.adc(), THRESHOLDS);
        (bench, strobe)
    }

    #[test]
    fn strobe_runs_steps_in_order() {
        let (bench, mut strobe) = single_key(60);
        let mut line = bench.sense_line(0);

        assert!(strobe.strobe(&mut line, false));

        assert_eq!(
            bench.events(),
            vec![
                Event::Drain(DrainState::Floating),
                Event::Line {
                    role: PinRole::Sense(0),
                    high: true
                },
                Event::Sample {
                    address: 0,
                    line: Some(0),
                    value: 60
                },
                Event::Line {
                    role: PinRole::Sense(0),
                    high: false
                },
                Event::Drain(DrainState::Sinking),
            ]
        );
    }

    #[test]
    fn above_latch_is_sticky() {
        let (bench, mut strobe) = single_key(59);
        let mut line = bench.sense_line(0);

        assert!(strobe.strobe(&mut line, false));
        assert!(strobe.strobe(&mut line, true));
    }

    #[test]
    fn band_between_thresholds_keeps_previous_state() {
        let (bench, mut strobe) = single_key(53);
        let mut line = bench.sense_line(0);

        assert!(strobe.strobe(&mut line, true));
        assert!(!strobe.strobe(&mut line, false));
    }

    #[test]
    fn thresholds_themselves_do_not_trigger() {
        let (bench, mut strobe) = single_key(58);
        let mut line = bench.sense_line(0);
        assert!(!strobe.strobe(&mut line, false));

        bench.set_level(0, 0, 48);
        assert!(!strobe.strobe(&mut line, true));
    }

    #[test]
    fn prepare_selects_input_and_drains() {
        let (bench, mut strobe) = single_key(0);

        strobe.prepare();

        assert_eq!(
            bench.events(),
            vec![Event::AdcSelect, Event::Drain(DrainState::Sinking)]
        );
    }
}
