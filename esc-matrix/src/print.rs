//! Human-readable matrix dump for debugging.
//!
//! ```text
//! r/c 01234567
//! 00: 00000000
//! 01: 01000000
//! ```
//!
//! Column 0 is the leftmost character. The header and row width follow the
//! column count: 8, 16 or 32 characters.

use core::fmt;

use crate::state::{MatrixState, RowBits};

/// Bit-width of the row renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    Bits8,
    Bits16,
    Bits32,
}

impl Renderer {
    /// The smallest renderer that fits `cols` columns.
    pub const fn for_cols(cols: usize) -> Self {
        if cols <= 8 {
            Self::Bits8
        } else if cols <= 16 {
            Self::Bits16
        } else {
            Self::Bits32
        }
    }

    pub const fn width(self) -> usize {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    pub const fn header(self) -> &'static str {
        match self {
            Self::Bits8 => "r/c 01234567",
            Self::Bits16 => "r/c 0123456789ABCDEF",
            Self::Bits32 => "r/c 0123456789ABCDEF0123456789ABCDEF",
        }
    }

    /// Write `bits` least-significant first, `width()` characters.
    pub fn write_row<W: fmt::Write>(self, out: &mut W, bits: RowBits) -> fmt::Result {
        for col in 0..self.width() {
            let c = if (bits >> col) & 1 != 0 { '1' } else { '0' };
            out.write_char(c)?;
        }
        Ok(())
    }
}

/// Write the header line and one line per row.
pub fn write_matrix<W: fmt::Write>(out: &mut W, rows: &[RowBits], cols: usize) -> fmt::Result {
    let renderer = Renderer::for_cols(cols);
    writeln!(out, "{}", renderer.header())?;
    for (row, &bits) in rows.iter().enumerate() {
        write!(out, "{row:02X}: ")?;
        renderer.write_row(out, bits)?;
        out.write_char('\n')?;
    }
    Ok(())
}

impl<const ROWS: usize, const COLS: usize> fmt::Display for MatrixState<ROWS, COLS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_matrix(f, self.rows(), COLS)
    }
}
