//! Tunable parameters for every mapping level.
//!
//! Each level owns a plain struct of public fields with documented defaults.
//! [`Params`] bundles them and offers name-based access for control surfaces:
//!
//! ```
//! use rhizome_resin_reactive::{Level, Params};
//!
//! let mut params = Params::default();
//! params.set(Level::Smoothed, "alpha", 0.5).unwrap();
//! assert_eq!(params.get(Level::Smoothed, "alpha").unwrap(), 0.5);
//! assert!(params.set(Level::Smoothed, "alpha", 0.0).is_err());
//! ```

use crate::error::{GridError, Result};
use crate::level::Level;
use crate::neighborhood::Connectivity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Level 0: direct threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectParams {
    /// A cell is on when its sample exceeds this.
    pub threshold: f32,
}

impl Default for DirectParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Level 2: smoothed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SmoothedParams {
    /// Smoothing rate in (0, 1]. 1.0 tracks the signal exactly.
    pub alpha: f32,
    /// A cell is on when its smoothed value exceeds this.
    pub threshold: f32,
}

impl Default for SmoothedParams {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            threshold: 0.5,
        }
    }
}

/// Level 3: probabilistic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProbabilisticParams {
    /// Multiplier on the sample before it is used as an on-probability.
    pub gain: f32,
}

impl Default for ProbabilisticParams {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

/// Level 4: entropy scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScatterParams {
    /// A cell is on when its randomly chosen sample exceeds this.
    pub threshold: f32,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Level 5: rule engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleParams {
    /// Samples above this count as loud.
    pub loud_threshold: f32,
    /// Samples below this count as quiet.
    pub quiet_threshold: f32,
    /// Lower bound (exclusive) of the mid band.
    pub flip_min: f32,
    /// Upper bound (exclusive) of the mid band.
    pub flip_max: f32,
    /// A mid-band cell flips when a uniform draw exceeds this.
    pub flip_chance: f32,
    /// Multiplier applied by the decay action, in [0, 1].
    pub decay_factor: f32,
    /// Decayed values below this switch the cell off.
    pub decay_floor: f32,
    /// Frames the ripple offset advances per frame.
    pub ripple_speed: usize,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            loud_threshold: 0.7,
            quiet_threshold: 0.3,
            flip_min: 0.4,
            flip_max: 0.6,
            flip_chance: 0.5,
            decay_factor: 0.9,
            decay_floor: 0.05,
            ripple_speed: 1,
        }
    }
}

/// Named rule parameters a condition operand can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RuleParam {
    /// [`RuleParams::loud_threshold`].
    LoudThreshold,
    /// [`RuleParams::quiet_threshold`].
    QuietThreshold,
    /// [`RuleParams::flip_min`].
    FlipMin,
    /// [`RuleParams::flip_max`].
    FlipMax,
    /// [`RuleParams::flip_chance`].
    FlipChance,
    /// [`RuleParams::decay_factor`].
    DecayFactor,
    /// [`RuleParams::decay_floor`].
    DecayFloor,
}

impl RuleParam {
    /// Reads the parameter's current value.
    #[inline]
    pub fn read(self, params: &RuleParams) -> f32 {
        match self {
            RuleParam::LoudThreshold => params.loud_threshold,
            RuleParam::QuietThreshold => params.quiet_threshold,
            RuleParam::FlipMin => params.flip_min,
            RuleParam::FlipMax => params.flip_max,
            RuleParam::FlipChance => params.flip_chance,
            RuleParam::DecayFactor => params.decay_factor,
            RuleParam::DecayFloor => params.decay_floor,
        }
    }
}

/// Level 6: neighbor gate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NeighborGateParams {
    /// An off cell above this turns on regardless of neighbors.
    pub birth_threshold: f32,
    /// Below this an on cell dies and an off cell cannot spread in.
    pub sustain_threshold: f32,
    /// On-neighbors needed to spread into an off cell above `sustain_threshold`.
    pub min_neighbors: u8,
    /// An on cell with more on-neighbors than this dies.
    pub max_neighbors: u8,
}

impl Default for NeighborGateParams {
    fn default() -> Self {
        Self {
            birth_threshold: 0.6,
            sustain_threshold: 0.3,
            min_neighbors: 2,
            max_neighbors: 3,
        }
    }
}

/// Parameters for all levels.
///
/// Edits take effect on the next [`Grid::advance`](crate::Grid::advance).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Params {
    /// Level 0.
    pub direct: DirectParams,
    /// Level 2.
    pub smoothed: SmoothedParams,
    /// Level 3.
    pub probabilistic: ProbabilisticParams,
    /// Level 4.
    pub scatter: ScatterParams,
    /// Level 5.
    pub rules: RuleParams,
    /// Level 6.
    pub neighbor_gate: NeighborGateParams,
}

impl Params {
    /// Names of the parameters a level exposes.
    pub fn names(level: Level) -> &'static [&'static str] {
        match level {
            Level::Direct | Level::Scatter => &["threshold"],
            Level::Opacity => &[],
            Level::Smoothed => &["alpha", "threshold"],
            Level::Probabilistic => &["gain"],
            Level::Rules => &[
                "loud_threshold",
                "quiet_threshold",
                "flip_min",
                "flip_max",
                "flip_chance",
                "decay_factor",
                "decay_floor",
                "ripple_speed",
            ],
            Level::NeighborGate => &[
                "birth_threshold",
                "sustain_threshold",
                "min_neighbors",
                "max_neighbors",
            ],
        }
    }

    /// Reads a named parameter.
    pub fn get(&self, level: Level, name: &str) -> Result<f32> {
        let value = match (level, name) {
            (Level::Direct, "threshold") => self.direct.threshold,
            (Level::Smoothed, "alpha") => self.smoothed.alpha,
            (Level::Smoothed, "threshold") => self.smoothed.threshold,
            (Level::Probabilistic, "gain") => self.probabilistic.gain,
            (Level::Scatter, "threshold") => self.scatter.threshold,
            (Level::Rules, "loud_threshold") => self.rules.loud_threshold,
            (Level::Rules, "quiet_threshold") => self.rules.quiet_threshold,
            (Level::Rules, "flip_min") => self.rules.flip_min,
            (Level::Rules, "flip_max") => self.rules.flip_max,
            (Level::Rules, "flip_chance") => self.rules.flip_chance,
            (Level::Rules, "decay_factor") => self.rules.decay_factor,
            (Level::Rules, "decay_floor") => self.rules.decay_floor,
            (Level::Rules, "ripple_speed") => self.rules.ripple_speed as f32,
            (Level::NeighborGate, "birth_threshold") => self.neighbor_gate.birth_threshold,
            (Level::NeighborGate, "sustain_threshold") => self.neighbor_gate.sustain_threshold,
            (Level::NeighborGate, "min_neighbors") => self.neighbor_gate.min_neighbors as f32,
            (Level::NeighborGate, "max_neighbors") => self.neighbor_gate.max_neighbors as f32,
            _ => return Err(unknown(level, name)),
        };
        Ok(value)
    }

    /// Writes a named parameter after validating it.
    ///
    /// On error the parameters are left unchanged.
    pub fn set(&mut self, level: Level, name: &str, value: f32) -> Result<()> {
        if !Params::names(level).contains(&name) {
            return Err(unknown(level, name));
        }
        check(name, value)?;

        match (level, name) {
            (Level::Direct, "threshold") => self.direct.threshold = value,
            (Level::Smoothed, "alpha") => self.smoothed.alpha = value,
            (Level::Smoothed, "threshold") => self.smoothed.threshold = value,
            (Level::Probabilistic, "gain") => self.probabilistic.gain = value,
            (Level::Scatter, "threshold") => self.scatter.threshold = value,
            (Level::Rules, "loud_threshold") => self.rules.loud_threshold = value,
            (Level::Rules, "quiet_threshold") => self.rules.quiet_threshold = value,
            (Level::Rules, "flip_min") => self.rules.flip_min = value,
            (Level::Rules, "flip_max") => self.rules.flip_max = value,
            (Level::Rules, "flip_chance") => self.rules.flip_chance = value,
            (Level::Rules, "decay_factor") => self.rules.decay_factor = value,
            (Level::Rules, "decay_floor") => self.rules.decay_floor = value,
            (Level::Rules, "ripple_speed") => self.rules.ripple_speed = value as usize,
            (Level::NeighborGate, "birth_threshold") => self.neighbor_gate.birth_threshold = value,
            (Level::NeighborGate, "sustain_threshold") => {
                self.neighbor_gate.sustain_threshold = value
            }
            (Level::NeighborGate, "min_neighbors") => self.neighbor_gate.min_neighbors = value as u8,
            (Level::NeighborGate, "max_neighbors") => self.neighbor_gate.max_neighbors = value as u8,
            _ => return Err(unknown(level, name)),
        }
        Ok(())
    }

    /// Checks every parameter of every level against its valid range.
    pub fn validate(&self) -> Result<()> {
        for level in Level::ALL {
            for name in Params::names(level) {
                check(name, self.get(level, name)?)?;
            }
        }
        Ok(())
    }
}

fn unknown(level: Level, name: &str) -> GridError {
    GridError::UnknownParameter {
        level,
        name: name.to_string(),
    }
}

/// Range constraints by parameter name.
fn check(name: &str, value: f32) -> Result<()> {
    let invalid = |reason| GridError::InvalidParameter {
        name: name.to_string(),
        value,
        reason,
    };

    if !value.is_finite() {
        return Err(invalid("must be finite"));
    }
    match name {
        "alpha" if !(value > 0.0 && value <= 1.0) => Err(invalid("must be in (0, 1]")),
        "decay_factor" if !(0.0..=1.0).contains(&value) => Err(invalid("must be in [0, 1]")),
        "gain" if value < 0.0 => Err(invalid("must be >= 0")),
        "ripple_speed" if value < 0.0 || value.fract() != 0.0 => {
            Err(invalid("must be a whole number >= 0"))
        }
        "min_neighbors" | "max_neighbors"
            if !(0.0..=f32::from(Connectivity::Moore.max_neighbors())).contains(&value)
                || value.fract() != 0.0 =>
        {
            Err(invalid("must be a whole number in 0..=8"))
        }
        _ => Ok(()),
    }
}
