//! Hardware seams the engine needs beyond plain output pins.
//!
//! Mux address lines and sense lines are ordinary
//! [`embedded_hal::digital::OutputPin`]s. The drain line changes direction
//! during a strobe and the ADC has no `embedded-hal` 1.0 trait, so both get
//! a small trait of their own here.

/// The shared line used to discharge the sensing circuit.
pub trait DrainLine {
    /// High-Z input with no pull resistor, so the line does not load the
    /// sensor while it charges.
    fn float(&mut self);

    /// Output driven low, discharging the sensor.
    fn sink(&mut self);
}

/// The converter input every switch is sampled through.
pub trait AnalogSense {
    /// Route the converter to the sense input.
    fn select(&mut self);

    /// Take one blocking sample.
    fn sample(&mut self) -> u16;
}

impl<T: DrainLine + ?Sized> DrainLine for &mut T {
    fn float(&mut self) {
        T::float(self)
    }

    fn sink(&mut self) {
        T::sink(self)
    }
}

impl<T: AnalogSense + ?Sized> AnalogSense for &mut T {
    fn select(&mut self) {
        T::select(self)
    }

    fn sample(&mut self) -> u16 {
        T::sample(self)
    }
}
