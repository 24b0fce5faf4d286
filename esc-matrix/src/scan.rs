//! Row-major and column-major scan drivers.
//!
//! Both topologies share the same mux and strobe hardware and differ in
//! which dimension sits behind the multiplexer:
//!
//! - [`RowMajor`]: rows are addressed through the mux, every column has its
//!   own sense line. One pass produces a whole row.
//! - [`ColumnMajor`]: columns are addressed through the mux, every row has
//!   its own sense line. A row is filled in one bit per column pass.
//!
//! The topology is a type parameter of [`crate::AnalogMatrix`], so exactly
//! one driver is compiled into an engine.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::hal::{AnalogSense, DrainLine};
use crate::mux::MuxAddress;
use crate::state::{MatrixState, RowBits};
use crate::strobe::AnalogStrobe;

/// Which dimension is multiplexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topology {
    /// Rows on the mux, columns on sense lines.
    RowMajor,
    /// Columns on the mux, rows on sense lines.
    ColumnMajor,
}

impl Topology {
    /// Size of the dimension selected through the multiplexer.
    pub const fn addressed_units(self, rows: usize, cols: usize) -> usize {
        match self {
            Self::RowMajor => rows,
            Self::ColumnMajor => cols,
        }
    }

    /// Size of the dimension wired to individual sense lines.
    pub const fn sensed_units(self, rows: usize, cols: usize) -> usize {
        match self {
            Self::RowMajor => cols,
            Self::ColumnMajor => rows,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::RowMajor => "row-major",
            Self::ColumnMajor => "column-major",
        }
    }
}

/// The pins a scan pass drives: mux address lines, one sense line per
/// unit of the sensed dimension, and the strobe hardware.
pub struct Frontend<P, D, A, const MUX: usize, const SENSE: usize> {
    pub(crate) mux: MuxAddress<P, MUX>,
    pub(crate) sense_lines: [P; SENSE],
    pub(crate) strobe: AnalogStrobe<D, A>,
}

impl<P, D, A, const MUX: usize, const SENSE: usize> Frontend<P, D, A, MUX, SENSE>
where
    P: OutputPin<Error = Infallible>,
    D: DrainLine,
    A: AnalogSense,
{
    pub fn new(mux: MuxAddress<P, MUX>, sense_lines: [P; SENSE], strobe: AnalogStrobe<D, A>) -> Self {
        Self {
            mux,
            sense_lines,
            strobe,
        }
    }

    /// Put every pin in its idle state: sense lines low, address lines
    /// high, ADC on the sense input, sensors drained.
    pub fn init(&mut self) {
        for line in self.sense_lines.iter_mut() {
            crate::infallible(line.set_low());
        }
        self.mux.park();
        self.strobe.prepare();
    }

    pub fn mux(&self) -> &MuxAddress<P, MUX> {
        &self.mux
    }

    pub fn strobe(&self) -> &AnalogStrobe<D, A> {
        &self.strobe
    }
}

/// One scan strategy. Implemented by [`RowMajor`] and [`ColumnMajor`] only.
pub trait ScanOrder: sealed::Sealed {
    const TOPOLOGY: Topology;

    /// Scan every cell of addressed unit `unit` (a row for [`RowMajor`], a
    /// column for [`ColumnMajor`]) and return whether any bit changed.
    fn scan_unit<P, D, A, const ROWS: usize, const COLS: usize, const MUX: usize, const SENSE: usize>(
        unit: usize,
        state: &mut MatrixState<ROWS, COLS>,
        frontend: &mut Frontend<P, D, A, MUX, SENSE>,
    ) -> bool
    where
        P: OutputPin<Error = Infallible>,
        D: DrainLine,
        A: AnalogSense;
}

/// Rows on the multiplexer, columns sensed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowMajor;

/// Columns on the multiplexer, rows sensed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMajor;

impl ScanOrder for RowMajor {
    const TOPOLOGY: Topology = Topology::RowMajor;

    fn scan_unit<P, D, A, const ROWS: usize, const COLS: usize, const MUX: usize, const SENSE: usize>(
        row: usize,
        state: &mut MatrixState<ROWS, COLS>,
        frontend: &mut Frontend<P, D, A, MUX, SENSE>,
    ) -> bool
    where
        P: OutputPin<Error = Infallible>,
        D: DrainLine,
        A: AnalogSense,
    {
        // The whole row is rebuilt from zero; the old value only supplies
        // the hysteresis direction for each column.
        let last = state.row(row);
        let mut value: RowBits = 0;

        frontend.mux.select(row as u8);

        for (col, line) in frontend.sense_lines.iter_mut().enumerate().take(COLS) {
            let was_active = (last >> col) & 1 != 0;
            if frontend.strobe.strobe(line, was_active) {
                value |= 1 << col;
            }
        }

        state.commit_row(row, value)
    }
}

impl ScanOrder for ColumnMajor {
    const TOPOLOGY: Topology = Topology::ColumnMajor;

    fn scan_unit<P, D, A, const ROWS: usize, const COLS: usize, const MUX: usize, const SENSE: usize>(
        col: usize,
        state: &mut MatrixState<ROWS, COLS>,
        frontend: &mut Frontend<P, D, A, MUX, SENSE>,
    ) -> bool
    where
        P: OutputPin<Error = Infallible>,
        D: DrainLine,
        A: AnalogSense,
    {
        // Rows are filled one column per pass, so only this column's bit
        // may be touched.
        let mut changed = false;

        frontend.mux.select(col as u8);

        for (row, line) in frontend.sense_lines.iter_mut().enumerate().take(ROWS) {
            let was_active = state.is_on(row, col);
            let active = frontend.strobe.strobe(line, was_active);
            changed |= state.write_bit(row, col, active);
        }

        changed
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::RowMajor {}
    impl Sealed for super::ColumnMajor {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::mock::{Bench, MockAdc, MockDrain, MockPin};

    const THRESHOLDS: Thresholds = Thresholds::new(58, 48);

    fn frontend<const MUX: usize, const SENSE: usize>(
        bench: &Bench,
    ) -> Frontend<MockPin, MockDrain, MockAdc, MUX, SENSE> {
        Frontend::new(
            MuxAddress::new(core::array::from_fn(|i| bench.mux_line(i))),
            core::array::from_fn(|i| bench.sense_line(i)),
            AnalogStrobe::new(bench.drain(), bench.adc(), THRESHOLDS),
        )
    }

    #[test]
    fn row_major_rebuilds_row_from_scratch() {
        let bench = Bench::new();
        let mut frontend = frontend::<1, 4>(&bench);
        let mut state = MatrixState::<2, 4>::new();
        state.commit_row(1, 0b1111);

        // Row 1: col 0 held in the band, col 2 pressed hard, others released.
        bench.set_level(1, 0, 50);
        bench.set_level(1, 2, 60);

        assert!(RowMajor::scan_unit(1, &mut state, &mut frontend));
        assert_eq!(state.row(1), 0b0101);
        assert_eq!(state.row(0), 0);
        assert_eq!(bench.address(), 1);
    }

    #[test]
    fn row_major_reports_no_change_for_same_row() {
        let bench = Bench::new();
        let mut frontend = frontend::<1, 2>(&bench);
        let mut state = MatrixState::<2, 2>::new();
        bench.set_level(0, 1, 60);

        assert!(RowMajor::scan_unit(0, &mut state, &mut frontend));
        assert!(!RowMajor::scan_unit(0, &mut state, &mut frontend));
        assert_eq!(state.row(0), 0b10);
    }

    #[test]
    fn column_major_preserves_other_columns() {
        let bench = Bench::new();
        let mut frontend = frontend::<2, 2>(&bench);
        let mut state = MatrixState::<2, 4>::new();
        state.commit_row(0, 0b1001);
        state.commit_row(1, 0b0100);

        // Column 3, row 0 sits in the band: it stays on because it was on.
        // Column 3, row 1 is well above latch.
        bench.set_level(3, 0, 50);
        bench.set_level(3, 1, 60);

        assert!(ColumnMajor::scan_unit(3, &mut state, &mut frontend));
        assert_eq!(state.row(0), 0b1001);
        assert_eq!(state.row(1), 0b1100);
        assert_eq!(bench.address(), 3);
    }

    #[test]
    fn column_major_clears_released_bit() {
        let bench = Bench::new();
        let mut frontend = frontend::<2, 2>(&bench);
        let mut state = MatrixState::<2, 4>::new();
        state.commit_row(0, 0b0110);

        bench.set_level(1, 0, 48);

        assert!(ColumnMajor::scan_unit(1, &mut state, &mut frontend));
        assert_eq!(state.row(0), 0b0100);
        assert!(!ColumnMajor::scan_unit(1, &mut state, &mut frontend));
    }

    #[test]
    fn init_idles_every_pin() {
        let bench = Bench::new();
        let mut frontend = frontend::<2, 3>(&bench);

        frontend.init();

        assert_eq!(bench.address(), 0b11);
        assert!((0..3).all(|line| !bench.sense_high(line)));
        assert!(bench.adc_selected());
        assert_eq!(bench.drain_state(), crate::mock::DrainState::Sinking);
    }

    #[test]
    fn topology_dimensions() {
        assert_eq!(Topology::RowMajor.addressed_units(6, 18), 6);
        assert_eq!(Topology::RowMajor.sensed_units(6, 18), 18);
        assert_eq!(Topology::ColumnMajor.addressed_units(6, 18), 18);
        assert_eq!(Topology::ColumnMajor.sensed_units(6, 18), 6);
    }
}
