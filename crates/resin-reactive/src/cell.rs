//! Per-position cell state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One addressable unit of a [`Grid`](crate::Grid).
///
/// Cells are owned by the grid and only change during
/// [`Grid::advance`](crate::Grid::advance). Renderers read the public
/// accessors; the previous-frame shadows stay internal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    index: usize,
    row: usize,
    column: usize,
    pub(crate) value: f32,
    pub(crate) state: bool,
    pub(crate) previous_state: bool,
    pub(crate) previous_value: f32,
    pub(crate) last_off: Option<f64>,
}

impl Cell {
    /// Creates a blank cell at `index` in a grid with `columns` columns.
    pub(crate) fn new(index: usize, columns: usize) -> Self {
        let (row, column) = if columns == 0 {
            (0, 0)
        } else {
            (index / columns, index % columns)
        };
        Self {
            index,
            row,
            column,
            value: 0.0,
            state: false,
            previous_state: false,
            previous_value: 0.0,
            last_off: None,
        }
    }

    /// Linear row-major position.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Row of this cell.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of this cell.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Continuous value, nominally in [0, 1].
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Binary on/off state.
    #[inline]
    pub fn state(&self) -> bool {
        self.state
    }

    /// Timestamp of the most recent on -> off transition.
    #[inline]
    pub fn last_off(&self) -> Option<f64> {
        self.last_off
    }

    /// Time elapsed since the last on -> off transition.
    pub fn trace(&self, now: f64) -> Option<f64> {
        self.last_off.map(|t| now - t)
    }

    /// Value as it was before the current frame's mapping ran.
    #[inline]
    pub(crate) fn previous_value(&self) -> f32 {
        self.previous_value
    }

    /// Records the transition against the previous frame and rolls the shadow forward.
    ///
    /// Returns true when the cell just switched off.
    pub(crate) fn commit(&mut self, now: f64) -> bool {
        let switched_off = self.previous_state && !self.state;
        if switched_off {
            self.last_off = Some(now);
        }
        self.previous_state = self.state;
        switched_off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_position() {
        let cell = Cell::new(7, 3);
        assert_eq!((cell.row(), cell.column()), (2, 1));
        assert!(!cell.state());
        assert_eq!(cell.value(), 0.0);
        assert_eq!(cell.last_off(), None);
    }

    #[test]
    fn test_commit_records_falling_edge_only() {
        let mut cell = Cell::new(0, 1);

        cell.state = true;
        assert!(!cell.commit(1.0));
        assert_eq!(cell.last_off(), None);

        cell.state = false;
        assert!(cell.commit(2.0));
        assert_eq!(cell.last_off(), Some(2.0));

        // Staying off leaves the timestamp alone.
        assert!(!cell.commit(3.0));
        assert_eq!(cell.last_off(), Some(2.0));
        assert_eq!(cell.trace(3.5), Some(1.5));
    }
}
