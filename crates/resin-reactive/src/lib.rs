//! Signal-driven reactive cell grids.
//!
//! A [`Grid`] holds a row-major array of [`Cell`]s. Once per frame a caller
//! hands it a normalized signal (values in `[0, 1]`, typically live audio
//! amplitude) and the active [`Level`] decides how every cell's value and
//! on/off state follow that signal:
//!
//! - [`Level::Direct`] - threshold the sample
//! - [`Level::Opacity`] - carry the sample as a continuous value
//! - [`Level::Smoothed`] - exponentially smoothed threshold
//! - [`Level::Probabilistic`] - sample-weighted coin flip
//! - [`Level::Scatter`] - threshold a random signal position
//! - [`Level::Rules`] - ordered [`RuleSet`], first match wins, with a
//!   traveling ripple over the signal
//! - [`Level::NeighborGate`] - occupancy thresholds gated by neighbor count
//!
//! After mapping, cells that just switched off record the frame's timestamp,
//! which renderers use for fading traces.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_reactive::{Grid, GridConfig, Level};
//!
//! let mut grid = Grid::from_config(GridConfig::new(2, 2).with_seed(1)).unwrap();
//! grid.advance(&[0.9, 0.2, 0.9, 0.2], 0.0).unwrap();
//! assert_eq!(grid.states(), vec![true, false, true, false]);
//!
//! // Switch to the rule engine and tweak a rule parameter.
//! grid.set_level(Level::Rules);
//! grid.set_param("loud_threshold", 0.8).unwrap();
//! grid.shuffle_rules();
//! grid.advance(&[0.9, 0.2, 0.9, 0.2], 1.0).unwrap();
//!
//! for cell in grid.cells() {
//!     let _ = (cell.row(), cell.column(), cell.value(), cell.state(), cell.trace(1.0));
//! }
//! ```

mod cell;
mod config;
mod error;
mod grid;
mod level;
mod mapping;
mod neighborhood;
mod params;
mod rules;
mod signal;

pub use cell::Cell;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::Grid;
pub use level::Level;
pub use mapping::CellUpdate;
pub use neighborhood::Connectivity;
pub use params::{
    DirectParams, NeighborGateParams, Params, ProbabilisticParams, RuleParam, RuleParams,
    ScatterParams, SmoothedParams,
};
pub use rules::{
    Action, Condition, ConditionFn, CustomCondition, Operand, Rule, RuleInput, RuleSet,
};
pub use signal::SignalView;
