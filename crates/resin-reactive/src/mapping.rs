//! Per-level mapping formulas.
//!
//! Every formula is a function of the cell, the frame's signal, the cell's
//! neighbor count and the level's parameters, returning the cell's next
//! `(value, state)`. Stochastic levels draw from the supplied RNG.
//!
//! | Level | Formula |
//! |---|---|
//! | 0 Direct | `state = d > threshold`, `value = d` |
//! | 1 Opacity | `value = d`, `state = true` |
//! | 2 Smoothed | `value = lerp(value, d, alpha)`, `state = value > threshold` |
//! | 3 Probabilistic | `state = uniform() < d * gain`, `value = d` |
//! | 4 Scatter | `j = uniform index`, `state = signal[j] > threshold`, `value = signal[j]` |
//! | 5 Rules | first matching rule's action on the rippled sample |
//! | 6 Neighbor gate | occupancy thresholds gated by on-neighbor count |

use crate::cell::Cell;
use crate::params::{
    DirectParams, NeighborGateParams, ProbabilisticParams, RuleParams, ScatterParams,
    SmoothedParams,
};
use crate::rules::{RuleInput, RuleSet};
use crate::signal::SignalView;
use rand::{Rng, RngCore};

/// The next value and state of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellUpdate {
    /// Continuous value.
    pub value: f32,
    /// On/off state.
    pub state: bool,
}

impl CellUpdate {
    /// Leaves the cell as it is.
    #[inline]
    pub fn keep(cell: &Cell) -> Self {
        Self {
            value: cell.value(),
            state: cell.state(),
        }
    }
}

/// Linear interpolation from `a` toward `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Level 0.
pub fn direct(d: f32, params: &DirectParams) -> CellUpdate {
    CellUpdate {
        value: d,
        state: d > params.threshold,
    }
}

/// Level 1.
pub fn opacity(d: f32) -> CellUpdate {
    CellUpdate {
        value: d,
        state: true,
    }
}

/// Level 2. Smooths from the value the cell held at the start of the frame.
///
/// The distance to `d` shrinks every frame until the value lands on `d`.
pub fn smoothed(cell: &Cell, d: f32, params: &SmoothedParams) -> CellUpdate {
    let previous = cell.previous_value();
    let mut value = lerp(previous, d, params.alpha);
    // The step rounds away once it is under half an ulp.
    if value == previous {
        value = d;
    }
    CellUpdate {
        value,
        state: value > params.threshold,
    }
}

/// Level 3.
pub fn probabilistic(d: f32, params: &ProbabilisticParams, rng: &mut dyn RngCore) -> CellUpdate {
    CellUpdate {
        value: d,
        state: rng.random::<f32>() < d * params.gain,
    }
}

/// Level 4. The sampled position is independent of the cell's index.
pub fn scatter(
    signal: &SignalView<'_>,
    params: &ScatterParams,
    rng: &mut dyn RngCore,
) -> CellUpdate {
    let j = rng.random_range(0..signal.len());
    let d = signal.at(j);
    CellUpdate {
        value: d,
        state: d > params.threshold,
    }
}

/// Level 5.
///
/// The cell reads the sample `frame_offset` positions past its own index; that
/// sample is patched into the signal at the cell's index before the rules run.
/// With no matching rule the cell is unchanged.
pub fn rules(
    cell: &Cell,
    signal: &SignalView<'_>,
    frame_offset: usize,
    neighbors: u8,
    rule_set: &RuleSet,
    params: &RuleParams,
    rng: &mut dyn RngCore,
) -> CellUpdate {
    let own = signal.wrap(cell.index());
    let rippled = signal.at(own + frame_offset);
    let input = RuleInput {
        cell,
        signal: signal.with_override(own, rippled),
        neighbors,
        params,
    };

    match rule_set.first_match(&input, rng) {
        Some((_, action)) => action.apply(cell, params, rng),
        None => CellUpdate::keep(cell),
    }
}

/// Level 6.
pub fn neighbor_gate(
    cell: &Cell,
    d: f32,
    neighbors: u8,
    params: &NeighborGateParams,
) -> CellUpdate {
    let state = if cell.state() {
        d > params.sustain_threshold && neighbors <= params.max_neighbors
    } else {
        d > params.birth_threshold
            || (d > params.sustain_threshold && neighbors >= params.min_neighbors)
    };
    CellUpdate { value: d, state }
}
