//! Mapping level selection.

use crate::error::GridError;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The active mapping strategy of a grid.
///
/// Each level turns the per-frame signal into cell state with a different
/// formula. See [`crate::mapping`] for the formulas themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Level {
    /// `state = d > threshold`, `value = d`.
    #[default]
    Direct = 0,
    /// `value = d`, always on. The renderer maps value to opacity.
    Opacity = 1,
    /// Exponentially smoothed value, thresholded.
    Smoothed = 2,
    /// Independent coin flip per cell, weighted by the sample.
    Probabilistic = 3,
    /// Each cell reads a uniformly random signal position.
    Scatter = 4,
    /// Ordered rule list, first match wins.
    Rules = 5,
    /// Occupancy thresholds gated by neighbor count.
    NeighborGate = 6,
}

impl Level {
    /// Highest level number.
    pub const MAX: u8 = 6;

    /// Every level in numeric order.
    pub const ALL: [Level; 7] = [
        Level::Direct,
        Level::Opacity,
        Level::Smoothed,
        Level::Probabilistic,
        Level::Scatter,
        Level::Rules,
        Level::NeighborGate,
    ];

    /// Returns the level number.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Returns a short human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Level::Direct => "direct",
            Level::Opacity => "opacity",
            Level::Smoothed => "smoothed",
            Level::Probabilistic => "probabilistic",
            Level::Scatter => "scatter",
            Level::Rules => "rules",
            Level::NeighborGate => "neighbor_gate",
        }
    }

    /// Whether this level reads neighbor counts during a frame.
    pub fn uses_neighbors(self) -> bool {
        matches!(self, Level::Rules | Level::NeighborGate)
    }
}

impl TryFrom<i64> for Level {
    type Error = GridError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        u8::try_from(n)
            .ok()
            .and_then(|n| Level::ALL.get(n as usize).copied())
            .ok_or(GridError::InvalidLevel(n))
    }
}

impl TryFrom<u8> for Level {
    type Error = GridError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Level::try_from(n as i64)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_match_position() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.number() as usize, i);
            assert_eq!(Level::try_from(i as u8), Ok(*level));
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(Level::try_from(7u8), Err(GridError::InvalidLevel(7)));
        assert_eq!(Level::try_from(-1i64), Err(GridError::InvalidLevel(-1)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Level::Rules.to_string(), "5 (rules)");
    }
}
