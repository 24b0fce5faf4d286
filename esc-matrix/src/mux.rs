//! Analog multiplexer address lines.

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::MAX_MUX_LINES;
use crate::infallible;

/// Drives the select lines of the analog multiplexer.
///
/// Line `i` carries bit `i` of the selected address. The RC charge phase of
/// the strobe gives the multiplexer time to settle, so no delay follows a
/// change of address.
pub struct MuxAddress<P, const LINES: usize> {
    lines: [P; LINES],
    selected: u8,
}

impl<P, const LINES: usize> MuxAddress<P, LINES>
where
    P: OutputPin<Error = Infallible>,
{
    const LINE_COUNT: () = assert!(
        LINES >= 1 && LINES <= MAX_MUX_LINES,
        "an analog multiplexer is driven by one to four address lines"
    );

    pub fn new(lines: [P; LINES]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LINE_COUNT;
        Self { lines, selected: 0 }
    }

    /// Drive every address line high. Used once at init.
    pub fn park(&mut self) {
        for line in self.lines.iter_mut() {
            infallible(line.set_high());
        }
        self.selected = Self::last_address();
    }

    /// Address unit `target`.
    ///
    /// Every line is re-driven on each call, highest index first, even when
    /// its level does not change.
    pub fn select(&mut self, target: u8) {
        debug_assert!(target <= Self::last_address(), "mux address out of range");

        for (bit, line) in self.lines.iter_mut().enumerate().rev() {
            let level = PinState::from(target & (1 << bit) != 0);
            infallible(line.set_state(level));
        }
        self.selected = target;
    }

    /// The address most recently driven onto the lines.
    pub fn selected(&self) -> u8 {
        self.selected
    }

    pub const fn line_count(&self) -> usize {
        LINES
    }

    /// Give the pins back.
    pub fn release(self) -> [P; LINES] {
        self.lines
    }

    const fn last_address() -> u8 {
        ((1u16 << LINES) - 1) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Bench, Event, PinRole};

    fn mux_events(bench: &Bench) -> Vec<(usize, bool)> {
        bench
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Line {
                    role: PinRole::Mux(line),
                    high,
                } => Some((line, high)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn select_drives_binary_address_highest_line_first() {
        let bench = Bench::new();
        let mut mux = MuxAddress::new([bench.mux_line(0), bench.mux_line(1), bench.mux_line(2)]);

        mux.select(0b101);

        assert_eq!(mux_events(&bench), vec![(2, true), (1, false), (0, true)]);
        assert_eq!(bench.address(), 0b101);
        assert_eq!(mux.selected(), 0b101);
    }

    #[test]
    fn select_redrives_unchanged_lines() {
        let bench = Bench::new();
        let mut mux = MuxAddress::new([bench.mux_line(0), bench.mux_line(1)]);

        mux.select(2);
        bench.clear_events();
        mux.select(2);

        assert_eq!(mux_events(&bench), vec![(1, true), (0, false)]);
    }

    #[test]
    fn only_configured_lines_are_touched() {
        let bench = Bench::new();
        let mut mux = MuxAddress::new([bench.mux_line(0)]);

        mux.select(1);

        assert_eq!(mux_events(&bench), vec![(0, true)]);
        assert_eq!(mux.line_count(), 1);
    }

    #[test]
    fn park_raises_all_lines() {
        let bench = Bench::new();
        let mut mux = MuxAddress::new([
            bench.mux_line(0),
            bench.mux_line(1),
            bench.mux_line(2),
            bench.mux_line(3),
        ]);

        mux.park();

        assert_eq!(bench.address(), 0x0F);
        assert_eq!(mux.selected(), 15);
    }
}
