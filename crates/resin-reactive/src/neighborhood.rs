//! Neighbor connectivity and bounded neighbor counting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which surrounding cells count as neighbors.
///
/// The grid never wraps: positions past an edge are simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Connectivity {
    /// 4 neighbors (orthogonal only).
    ///
    /// ```text
    /// ┌───┬───┬───┐
    /// │   │ X │   │
    /// ├───┼───┼───┤
    /// │ X │ · │ X │
    /// ├───┼───┼───┤
    /// │   │ X │   │
    /// └───┴───┴───┘
    /// ```
    #[default]
    VonNeumann,
    /// 8 neighbors (orthogonal + diagonal).
    Moore,
}

impl Connectivity {
    /// Relative `(d_column, d_row)` offsets of the neighbors.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::VonNeumann => &[(0, -1), (-1, 0), (1, 0), (0, 1)],
            Connectivity::Moore => &[
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1),
            ],
        }
    }

    /// Maximum neighbor count.
    pub fn max_neighbors(self) -> u8 {
        self.offsets().len() as u8
    }
}

/// Counts on-neighbors of `index` in a row-major grid.
///
/// `is_on` is only called with in-bounds indices.
pub(crate) fn count_on(
    is_on: impl Fn(usize) -> bool,
    rows: usize,
    columns: usize,
    index: usize,
    connectivity: Connectivity,
) -> u8 {
    let row = (index / columns) as i64;
    let column = (index % columns) as i64;
    let mut count = 0u8;

    for &(dc, dr) in connectivity.offsets() {
        let nr = row + dr as i64;
        let nc = column + dc as i64;
        if nr < 0 || nc < 0 || nr >= rows as i64 || nc >= columns as i64 {
            continue;
        }
        if is_on(nr as usize * columns + nc as usize) {
            count += 1;
        }
    }

    count
}
