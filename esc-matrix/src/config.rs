//! Configuration rules for an EC matrix.
//!
//! Everything here is checked at compile time on the firmware side: the
//! `const fn` validators are evaluated in `const` items, and a failure turns
//! into a compile error carrying the same message as [`ConfigError`]'s
//! `Display`. Host tools call the same functions at runtime.

use core::fmt;

use crate::scan::Topology;

/// Most rows or columns the address lines can select.
pub const MAX_ADDRESSED_UNITS: usize = 16;
/// Most address lines a multiplexer may use.
pub const MAX_MUX_LINES: usize = 4;
/// Widest packed row, in columns.
pub const MAX_COLS: usize = 32;

/// Number of address lines needed to select one of `units` rows or columns.
///
/// | units | lines |
/// |-------|-------|
/// | 1-2   | 1     |
/// | 3-4   | 2     |
/// | 5-8   | 3     |
/// | 9-16  | 4     |
///
/// Returns `None` for zero units or more than [`MAX_ADDRESSED_UNITS`].
pub const fn mux_lines_for(units: usize) -> Option<usize> {
    match units {
        1..=2 => Some(1),
        3..=4 => Some(2),
        5..=8 => Some(3),
        9..=16 => Some(4),
        _ => None,
    }
}

/// Latch/unlatch comparison points for one device.
///
/// A switch turns on when its sample rises above `latch` and turns off only
/// once it falls to `unlatch` or below. The gap between the two absorbs
/// converter noise around the actuation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    latch: u16,
    unlatch: u16,
}

impl Thresholds {
    /// Build a threshold pair for use in a `const` item.
    ///
    /// # Panics
    ///
    /// Panics if `unlatch >= latch`. In a `const` context this is a
    /// compile error:
    ///
    /// ```compile_fail,E0080
    /// use esc_matrix::Thresholds;
    ///
    /// const INVERTED: Thresholds = Thresholds::new(48, 58);
    /// assert_eq!(INVERTED.latch(), 48);
    /// ```
    pub const fn new(latch: u16, unlatch: u16) -> Self {
        assert!(
            unlatch < latch,
            "the unlatch threshold must be lower than the latch threshold"
        );
        Self { latch, unlatch }
    }

    /// Build a threshold pair from values only known at runtime.
    pub const fn try_new(latch: u16, unlatch: u16) -> Result<Self, ConfigError> {
        if unlatch < latch {
            Ok(Self { latch, unlatch })
        } else {
            Err(ConfigError::ThresholdOrder { latch, unlatch })
        }
    }

    pub const fn latch(&self) -> u16 {
        self.latch
    }

    pub const fn unlatch(&self) -> u16 {
        self.unlatch
    }

    /// The point a sample must exceed, given the switch's previous state.
    pub const fn comparison_point(&self, was_active: bool) -> u16 {
        if was_active {
            self.unlatch
        } else {
            self.latch
        }
    }

    /// Whether `sample` reads as an active switch.
    pub const fn is_active(&self, sample: u16, was_active: bool) -> bool {
        sample > self.comparison_point(was_active)
    }
}

/// A rejected matrix configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The matrix has no rows or no columns.
    EmptyMatrix,
    /// More columns than fit in a packed row.
    TooManyColumns { cols: usize },
    /// More units on the multiplexer than four address lines can select.
    TooManyAddressedUnits { units: usize },
    /// The address line count does not match the multiplexed dimension.
    MuxLineMismatch {
        units: usize,
        expected: usize,
        found: usize,
    },
    /// One sense line is needed per unit of the non-multiplexed dimension.
    SenseLineMismatch { expected: usize, found: usize },
    /// `unlatch` is not strictly below `latch`.
    ThresholdOrder { latch: u16, unlatch: u16 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMatrix => f.write_str("the matrix needs at least one row and one column"),
            Self::TooManyColumns { cols } => {
                write!(f, "{cols} columns do not fit in a packed row (max {MAX_COLS})")
            }
            Self::TooManyAddressedUnits { units } => write!(
                f,
                "{units} multiplexed units is more than the supported {MAX_ADDRESSED_UNITS}"
            ),
            Self::MuxLineMismatch {
                units,
                expected,
                found,
            } => write!(
                f,
                "{units} multiplexed units need {expected} address line(s), but {found} are defined"
            ),
            Self::SenseLineMismatch { expected, found } => {
                write!(f, "expected {expected} sense line(s), but {found} are defined")
            }
            Self::ThresholdOrder { latch, unlatch } => write!(
                f,
                "unlatch threshold {unlatch} must be lower than latch threshold {latch}"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Validate the shape of a matrix and its wiring.
pub const fn check_wiring(
    topology: Topology,
    rows: usize,
    cols: usize,
    mux_lines: usize,
    sense_lines: usize,
) -> Result<(), ConfigError> {
    if rows == 0 || cols == 0 {
        return Err(ConfigError::EmptyMatrix);
    }
    if cols > MAX_COLS {
        return Err(ConfigError::TooManyColumns { cols });
    }

    let units = topology.addressed_units(rows, cols);
    let expected = match mux_lines_for(units) {
        Some(lines) => lines,
        None => return Err(ConfigError::TooManyAddressedUnits { units }),
    };
    if mux_lines != expected {
        return Err(ConfigError::MuxLineMismatch {
            units,
            expected,
            found: mux_lines,
        });
    }

    let sensed = topology.sensed_units(rows, cols);
    if sense_lines != sensed {
        return Err(ConfigError::SenseLineMismatch {
            expected: sensed,
            found: sense_lines,
        });
    }

    Ok(())
}

/// [`check_wiring`] for `const` contexts: fails the build on a bad layout.
///
/// ```
/// use esc_matrix::config::assert_wiring;
/// use esc_matrix::Topology;
///
/// const WIRING: () = assert_wiring(Topology::RowMajor, 6, 18, 3, 18);
/// let () = WIRING;
/// ```
///
/// Six rows need three address lines, not two:
///
/// ```compile_fail,E0080
/// use esc_matrix::config::assert_wiring;
/// use esc_matrix::Topology;
///
/// const WIRING: () = assert_wiring(Topology::RowMajor, 6, 18, 2, 18);
/// let () = WIRING;
/// ```
pub const fn assert_wiring(
    topology: Topology,
    rows: usize,
    cols: usize,
    mux_lines: usize,
    sense_lines: usize,
) {
    match check_wiring(topology, rows, cols, mux_lines, sense_lines) {
        Ok(()) => {}
        Err(ConfigError::EmptyMatrix) => {
            panic!("the matrix needs at least one row and one column")
        }
        Err(ConfigError::TooManyColumns { .. }) => {
            panic!("an EC matrix supports at most 32 columns per packed row")
        }
        Err(ConfigError::TooManyAddressedUnits { .. }) => {
            panic!("EC matrices do not support more than 16 multiplexed rows or columns")
        }
        Err(ConfigError::MuxLineMismatch { .. }) => panic!(
            "wrong number of mux address lines: 1-2 units need 1, 3-4 need 2, 5-8 need 3, 9-16 need 4"
        ),
        Err(ConfigError::SenseLineMismatch { .. }) => panic!(
            "define one sense line per unit of the dimension that is not multiplexed"
        ),
        Err(ConfigError::ThresholdOrder { .. }) => {
            panic!("the unlatch threshold must be lower than the latch threshold")
        }
    }
}
