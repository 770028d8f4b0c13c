//! Error types for resin-reactive.

use crate::level::Level;
use thiserror::Error;

/// Errors raised by grid construction, control and frame advancement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A frame was advanced with a signal holding no samples.
    #[error("signal must contain at least one sample")]
    EmptySignal,

    /// Resize was requested with a negative dimension.
    #[error("negative grid dimension: {rows} rows x {columns} columns")]
    NegativeDimension {
        /// Requested row count.
        rows: i64,
        /// Requested column count.
        columns: i64,
    },

    /// Level number outside the known mapping levels.
    #[error("invalid level {0}, expected 0..={max}", max = Level::MAX)]
    InvalidLevel(i64),

    /// The level has no parameter with this name.
    #[error("level {level} has no parameter named `{name}`")]
    UnknownParameter {
        /// Level that was queried.
        level: Level,
        /// Parameter name.
        name: String,
    },

    /// The value is outside the parameter's valid range.
    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Rejected value.
        value: f32,
        /// Constraint that was violated.
        reason: &'static str,
    },

    /// A cell index past the end of the grid.
    #[error("cell {index} out of bounds for grid of {len} cells")]
    CellOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of cells in the grid.
        len: usize,
    },

    /// Viewport fitting needs a positive, finite cell size.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f32),

    /// The requested dimensions hold more cells than can be allocated.
    #[error("grid of {rows} rows x {columns} columns is too large")]
    TooManyCells {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        columns: usize,
    },

    /// Viewport fitting needs finite viewport dimensions.
    #[error("viewport must be finite, got {width} x {height}")]
    InvalidViewport {
        /// Viewport width.
        width: f32,
        /// Viewport height.
        height: f32,
    },
}

/// Result alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
