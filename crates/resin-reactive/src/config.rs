//! Grid configuration.

use crate::error::Result;
use crate::level::Level;
use crate::neighborhood::Connectivity;
use crate::params::Params;
use crate::rules::RuleSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything needed to build a [`Grid`](crate::Grid).
///
/// With the `serde` feature, missing fields fall back to their defaults, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub columns: usize,
    /// Initial mapping level.
    pub level: Level,
    /// Neighbor connectivity for neighbor-aware levels.
    pub connectivity: Connectivity,
    /// Per-level parameters.
    pub params: Params,
    /// Rule list for [`Level::Rules`].
    pub rules: RuleSet,
    /// RNG seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 0,
            columns: 0,
            level: Level::default(),
            connectivity: Connectivity::default(),
            params: Params::default(),
            rules: RuleSet::defaults(),
            seed: None,
        }
    }
}

impl GridConfig {
    /// Default configuration at the given size.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Self::default()
        }
    }

    /// Sets the initial level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the neighbor connectivity.
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Sets the parameters.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the rule list.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates every parameter range.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid;
    use crate::error::GridError;

    #[test]
    fn test_default_has_stock_rules() {
        let config = GridConfig::new(4, 5);
        assert_eq!(config.rules.labels(), vec!["loud", "quiet", "flicker"]);
        assert_eq!(config.level, Level::Direct);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = Params::default();
        params.smoothed.alpha = 0.0;
        let config = GridConfig::new(2, 2).with_params(params);

        assert!(matches!(
            Grid::from_config(config),
            Err(GridError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let config = GridConfig::new(8, 8)
            .with_level(Level::Probabilistic)
            .with_seed(99);
        let mut a = Grid::from_config(config.clone()).unwrap();
        let mut b = Grid::from_config(config).unwrap();
        let signal: Vec<f32> = (0..32).map(|i| (i as f32 * 0.37).fract()).collect();

        for frame in 0..5 {
            a.advance(&signal, frame as f64).unwrap();
            b.advance(&signal, frame as f64).unwrap();
            assert_eq!(a.states(), b.states());
        }
    }

    #[test]
    fn test_moore_connectivity() {
        let config = GridConfig::new(3, 3).with_connectivity(Connectivity::Moore);
        let mut grid = Grid::from_config(config).unwrap();
        for i in [0, 2, 6, 8] {
            grid.set_state(i, true).unwrap();
        }
        assert_eq!(grid.neighbor_count(4).unwrap(), 4);

        grid.set_connectivity(Connectivity::VonNeumann);
        assert_eq!(grid.neighbor_count(4).unwrap(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json() {
        let json = r#"{
            "rows": 2,
            "columns": 3,
            "level": "rules",
            "params": { "rules": { "loud_threshold": 0.8 } },
            "rules": [
                { "condition": { "sample_above": { "param": "loud_threshold" } }, "action": "on", "label": "loud" },
                { "condition": { "all": [ { "neighbors_at_least": 2 }, { "not": "always" } ] }, "action": "flip" }
            ],
            "seed": 5
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();

        assert_eq!((config.rows, config.columns), (2, 3));
        assert_eq!(config.level, Level::Rules);
        assert_eq!(config.params.rules.loud_threshold, 0.8);
        assert_eq!(config.params.rules.quiet_threshold, 0.3);
        assert_eq!(config.params.direct.threshold, 0.5);
        assert_eq!(config.rules.labels(), vec!["loud", "?"]);
        assert_eq!(config.connectivity, Connectivity::VonNeumann);

        let mut grid = Grid::from_config(config).unwrap();
        grid.advance(&[0.9, 0.1, 0.85, 0.0, 0.81, 0.5], 0.0).unwrap();
        assert_eq!(grid.states(), vec![true, false, true, false, true, false]);
    }
}
