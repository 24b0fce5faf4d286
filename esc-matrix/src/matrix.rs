//! The scan engine: one matrix, one topology, one set of pins.

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;

use embedded_hal::digital::OutputPin;

use crate::config::{self, Thresholds};
use crate::hal::{AnalogSense, DrainLine};
use crate::hooks::{MatrixHooks, NoHooks};
use crate::mux::MuxAddress;
use crate::print;
use crate::scan::{Frontend, ScanOrder, Topology};
use crate::state::{MatrixState, RowBits};
use crate::strobe::AnalogStrobe;

/// An EC key matrix of `ROWS` x `COLS` switches.
///
/// - `O`: scan topology, [`crate::RowMajor`] or [`crate::ColumnMajor`].
/// - `P`: output pin type for mux address lines and sense lines.
/// - `D`, `A`: drain line and ADC input.
/// - `H`: lifecycle hooks.
/// - `MUX`: address line count, `SENSE`: sense line count.
///
/// The layout is checked when the engine is built: `MUX` must match the
/// multiplexed dimension and `SENSE` the other one, or compilation fails.
///
/// A 4x2 row-major matrix puts its 4 rows behind 2 address lines and has one
/// sense line per column:
///
/// ```
/// # #[derive(Clone, Copy)]
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = core::convert::Infallible; }
/// # impl embedded_hal::digital::OutputPin for Pin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct Drain;
/// # impl esc_matrix::DrainLine for Drain { fn float(&mut self) {} fn sink(&mut self) {} }
/// # struct Adc;
/// # impl esc_matrix::AnalogSense for Adc { fn select(&mut self) {} fn sample(&mut self) -> u16 { 0 } }
/// use esc_matrix::{AnalogMatrix, RowMajor, Thresholds};
///
/// let mut matrix: AnalogMatrix<RowMajor, Pin, Drain, Adc, _, 4, 2, 2, 2> =
///     AnalogMatrix::new([Pin; 2], [Pin; 2], Drain, Adc, Thresholds::new(58, 48));
/// matrix.init();
/// assert!(!matrix.scan());
/// ```
///
/// One address line cannot select 4 rows:
///
/// ```compile_fail,E0080
/// # #[derive(Clone, Copy)]
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = core::convert::Infallible; }
/// # impl embedded_hal::digital::OutputPin for Pin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct Drain;
/// # impl esc_matrix::DrainLine for Drain { fn float(&mut self) {} fn sink(&mut self) {} }
/// # struct Adc;
/// # impl esc_matrix::AnalogSense for Adc { fn select(&mut self) {} fn sample(&mut self) -> u16 { 0 } }
/// use esc_matrix::{AnalogMatrix, RowMajor, Thresholds};
///
/// let matrix: AnalogMatrix<RowMajor, Pin, Drain, Adc, _, 4, 2, 1, 2> =
///     AnalogMatrix::new([Pin; 1], [Pin; 2], Drain, Adc, Thresholds::new(58, 48));
/// ```
///
/// 17 rows are more than any multiplexer here can address:
///
/// ```compile_fail,E0080
/// # #[derive(Clone, Copy)]
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = core::convert::Infallible; }
/// # impl embedded_hal::digital::OutputPin for Pin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct Drain;
/// # impl esc_matrix::DrainLine for Drain { fn float(&mut self) {} fn sink(&mut self) {} }
/// # struct Adc;
/// # impl esc_matrix::AnalogSense for Adc { fn select(&mut self) {} fn sample(&mut self) -> u16 { 0 } }
/// use esc_matrix::{AnalogMatrix, RowMajor, Thresholds};
///
/// let matrix: AnalogMatrix<RowMajor, Pin, Drain, Adc, _, 17, 2, 4, 2> =
///     AnalogMatrix::new([Pin; 4], [Pin; 2], Drain, Adc, Thresholds::new(58, 48));
/// ```
///
/// Every column needs its own sense line:
///
/// ```compile_fail,E0080
/// # #[derive(Clone, Copy)]
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = core::convert::Infallible; }
/// # impl embedded_hal::digital::OutputPin for Pin {
/// #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # struct Drain;
/// # impl esc_matrix::DrainLine for Drain { fn float(&mut self) {} fn sink(&mut self) {} }
/// # struct Adc;
/// # impl esc_matrix::AnalogSense for Adc { fn select(&mut self) {} fn sample(&mut self) -> u16 { 0 } }
/// use esc_matrix::{AnalogMatrix, RowMajor, Thresholds};
///
/// let matrix: AnalogMatrix<RowMajor, Pin, Drain, Adc, _, 4, 2, 2, 3> =
///     AnalogMatrix::new([Pin; 2], [Pin; 3], Drain, Adc, Thresholds::new(58, 48));
/// ```
///
/// Scanning takes `&mut self` and the engine owns all of its pins, so only
/// one scan can be in progress at a time.
pub struct AnalogMatrix<
    O,
    P,
    D,
    A,
    H,
    const ROWS: usize,
    const COLS: usize,
    const MUX: usize,
    const SENSE: usize,
> {
    frontend: Frontend<P, D, A, MUX, SENSE>,
    state: MatrixState<ROWS, COLS>,
    hooks: H,
    _order: PhantomData<O>,
}

impl<O, P, D, A, const ROWS: usize, const COLS: usize, const MUX: usize, const SENSE: usize>
    AnalogMatrix<O, P, D, A, NoHooks, ROWS, COLS, MUX, SENSE>
where
    O: ScanOrder,
    P: OutputPin<Error = Infallible>,
    D: DrainLine,
    A: AnalogSense,
{
    pub fn new(
        mux_lines: [P; MUX],
        sense_lines: [P; SENSE],
        drain: D,
        sense: A,
        thresholds: Thresholds,
    ) -> Self {
        Self::with_hooks(mux_lines, sense_lines, drain, sense, thresholds, NoHooks)
    }
}

impl<O, P, D, A, H, const ROWS: usize, const COLS: usize, const MUX: usize, const SENSE: usize>
    AnalogMatrix<O, P, D, A, H, ROWS, COLS, MUX, SENSE>
where
    O: ScanOrder,
    P: OutputPin<Error = Infallible>,
    D: DrainLine,
    A: AnalogSense,
    H: MatrixHooks,
{
    const WIRING: () = config::assert_wiring(O::TOPOLOGY, ROWS, COLS, MUX, SENSE);

    pub fn with_hooks(
        mux_lines: [P; MUX],
        sense_lines: [P; SENSE],
        drain: D,
        sense: A,
        thresholds: Thresholds,
        hooks: H,
    ) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WIRING;

        Self {
            frontend: Frontend::new(
                MuxAddress::new(mux_lines),
                sense_lines,
                AnalogStrobe::new(drain, sense, thresholds),
            ),
            state: MatrixState::new(),
            hooks,
            _order: PhantomData,
        }
    }

    /// Configure the pins, drain the sensors, then run the init hook.
    pub fn init(&mut self) {
        self.frontend.init();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "EC matrix {=usize}x{=usize} ({=str}) ready, latch {=u16} unlatch {=u16}",
            ROWS,
            COLS,
            O::TOPOLOGY.name(),
            self.frontend.strobe().thresholds().latch(),
            self.frontend.strobe().thresholds().unlatch()
        );

        self.hooks.after_init();
    }

    /// Run one full scan cycle. Returns whether any switch changed state.
    pub fn scan(&mut self) -> bool {
        let units = O::TOPOLOGY.addressed_units(ROWS, COLS);

        let mut changed = false;
        for unit in 0..units {
            changed |= O::scan_unit(unit, &mut self.state, &mut self.frontend);
        }

        // Hysteresis stands in for debounce; the scan is slow enough that
        // a second temporal filter is not needed.
        if changed {
            #[cfg(feature = "defmt")]
            defmt::trace!("matrix changed, {=u32} keys active", self.state.key_count());
        }

        self.hooks.after_scan(changed);
        changed
    }

    pub const fn row_count(&self) -> usize {
        ROWS
    }

    pub const fn col_count(&self) -> usize {
        COLS
    }

    /// Packed value of `row`, column 0 in the least-significant bit.
    ///
    /// # Panics
    ///
    /// Panics if `row >= ROWS`.
    pub fn row_value(&self, row: usize) -> RowBits {
        self.state.row(row)
    }

    pub fn state(&self) -> &MatrixState<ROWS, COLS> {
        &self.state
    }

    pub fn topology(&self) -> Topology {
        O::TOPOLOGY
    }

    pub fn thresholds(&self) -> Thresholds {
        self.frontend.strobe().thresholds()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Write the diagnostic dump of the current snapshot.
    pub fn print<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        print::write_matrix(out, self.state.rows(), COLS)
    }
}
