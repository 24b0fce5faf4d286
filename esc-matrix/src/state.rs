//! The packed key-state snapshot.

/// One row of the matrix: bit `c` is column `c`.
pub type RowBits = u32;

/// Current state of every switch, one packed row per matrix row.
///
/// Allocated zeroed and rewritten in place by the scan driver. There is no
/// public way to modify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixState<const ROWS: usize, const COLS: usize> {
    rows: [RowBits; ROWS],
}

impl<const ROWS: usize, const COLS: usize> MatrixState<ROWS, COLS> {
    pub const fn new() -> Self {
        Self { rows: [0; ROWS] }
    }

    pub const fn row_count(&self) -> usize {
        ROWS
    }

    pub const fn col_count(&self) -> usize {
        COLS
    }

    /// Packed value of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= ROWS`.
    pub fn row(&self, row: usize) -> RowBits {
        self.rows[row]
    }

    pub fn rows(&self) -> &[RowBits; ROWS] {
        &self.rows
    }

    /// Whether the switch at (`row`, `col`) is active.
    pub fn is_on(&self, row: usize, col: usize) -> bool {
        (self.rows[row] >> col) & 1 != 0
    }

    /// Number of active switches in the whole matrix.
    pub fn key_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// Replace a whole row. Returns whether it differs from the old value.
    pub(crate) fn commit_row(&mut self, row: usize, value: RowBits) -> bool {
        let changed = self.rows[row] != value;
        self.rows[row] = value;
        changed
    }

    /// Set or clear a single bit, leaving the rest of the row alone.
    /// Returns whether the row changed.
    pub(crate) fn write_bit(&mut self, row: usize, col: usize, on: bool) -> bool {
        let last = self.rows[row];
        let mask: RowBits = 1 << col;
        let value = if on { last | mask } else { last & !mask };
        self.rows[row] = value;
        last != value
    }
}

impl<const ROWS: usize, const COLS: usize> Default for MatrixState<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let state = MatrixState::<4, 6>::new();
        assert_eq!(state.rows(), &[0; 4]);
        assert_eq!(state.row_count(), 4);
        assert_eq!(state.col_count(), 6);
        assert_eq!(state.key_count(), 0);
    }

    #[test]
    fn write_bit_touches_one_column() {
        let mut state = MatrixState::<2, 8>::new();
        assert!(state.commit_row(1, 0b1010_0000));

        assert!(state.write_bit(1, 0, true));
        assert_eq!(state.row(1), 0b1010_0001);
        assert!(!state.write_bit(1, 0, true));

        assert!(state.write_bit(1, 7, false));
        assert_eq!(state.row(1), 0b0010_0001);
        assert!(state.is_on(1, 5));
        assert!(!state.is_on(1, 7));
        assert_eq!(state.key_count(), 2);
    }

    #[test]
    fn commit_row_reports_change_only_when_different() {
        let mut state = MatrixState::<1, 4>::new();
        assert!(!state.commit_row(0, 0));
        assert!(state.commit_row(0, 0b0110));
        assert!(!state.commit_row(0, 0b0110));
    }
}
