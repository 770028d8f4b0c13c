//! The reactive cell grid.

use crate::cell::Cell;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::level::Level;
use crate::mapping::{self, CellUpdate};
use crate::neighborhood::{Connectivity, count_on};
use crate::params::Params;
use crate::rules::RuleSet;
use crate::signal::SignalView;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

/// A rectangular, row-major grid of [`Cell`]s driven by a normalized signal.
///
/// One call to [`advance`](Self::advance) per frame maps the signal onto the
/// cells through the active [`Level`], then records on -> off transitions.
/// All simulation state (level, parameters, rules, ripple offset, RNG) lives
/// on the instance, so independent grids never interfere.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
    level: Level,
    connectivity: Connectivity,
    params: Params,
    rules: RuleSet,
    frame_offset: usize,
    rng: StdRng,
    /// Frame-start states, reused between frames.
    scratch: Vec<bool>,
}

impl Grid {
    /// Creates a grid with default parameters and stock rules, seeded from the OS.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        Self::build(GridConfig::new(rows, columns), StdRng::from_os_rng())
    }

    /// Creates a grid from a validated configuration.
    pub fn from_config(config: GridConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::build(config, rng)
    }

    fn build(config: GridConfig, rng: StdRng) -> Result<Self> {
        let (rows, columns) = (config.rows, config.columns);
        let grid = Self {
            rows,
            columns,
            cells: blank_cells(rows, columns)?,
            level: config.level,
            connectivity: config.connectivity,
            params: config.params,
            rules: config.rules,
            frame_offset: 0,
            rng,
            scratch: Vec::new(),
        };
        debug!(rows, columns, level = %grid.level, "grid created");
        Ok(grid)
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advances one frame.
    ///
    /// `signal` must hold at least one sample; it is only read. Every cell
    /// reads `signal[index % len]` (level 4 reads a random position, level 5
    /// a ripple-shifted one). After all cells are mapped, cells that went from
    /// on to off get `now` as their last-off timestamp. Finally the ripple
    /// offset moves forward by `ripple_speed`, modulo the signal length.
    pub fn advance(&mut self, signal: &[f32], now: f64) -> Result<()> {
        let signal = SignalView::new(signal)?;
        let len = signal.len();

        let Grid {
            rows,
            columns,
            cells,
            level,
            connectivity,
            params,
            rules,
            frame_offset,
            rng,
            scratch,
        } = self;
        let (rows, columns, connectivity) = (*rows, *columns, *connectivity);

        for cell in cells.iter_mut() {
            cell.previous_value = cell.value;
        }
        if level.uses_neighbors() {
            scratch.clear();
            scratch.extend(cells.iter().map(|c| c.state));
        }
        let states: &[bool] = scratch;
        let neighbors =
            |index: usize| count_on(|i| states[i], rows, columns, index, connectivity);
        let sample = |cell: &Cell| signal.at(cell.index());

        match *level {
            Level::Direct => update_each(cells, |cell| {
                mapping::direct(sample(cell), &params.direct)
            }),
            Level::Opacity => update_each(cells, |cell| mapping::opacity(sample(cell))),
            Level::Smoothed => update_each(cells, |cell| {
                mapping::smoothed(cell, sample(cell), &params.smoothed)
            }),
            Level::Probabilistic => update_each(cells, |cell| {
                mapping::probabilistic(sample(cell), &params.probabilistic, rng)
            }),
            Level::Scatter => update_each(cells, |_| {
                mapping::scatter(&signal, &params.scatter, rng)
            }),
            Level::Rules => {
                let offset = *frame_offset % len;
                update_each(cells, |cell| {
                    mapping::rules(
                        cell,
                        &signal,
                        offset,
                        neighbors(cell.index()),
                        rules,
                        &params.rules,
                        rng,
                    )
                })
            }
            Level::NeighborGate => update_each(cells, |cell| {
                mapping::neighbor_gate(
                    cell,
                    sample(cell),
                    neighbors(cell.index()),
                    &params.neighbor_gate,
                )
            }),
        }

        // Transitions are read only after every cell has its new state.
        let mut switched_off = 0usize;
        for cell in cells.iter_mut() {
            if cell.commit(now) {
                switched_off += 1;
            }
        }

        *frame_offset = (*frame_offset % len + params.rules.ripple_speed % len) % len;

        trace!(
            level = level.number(),
            on = cells.iter().filter(|c| c.state).count(),
            switched_off,
            frame_offset = *frame_offset,
            "frame advanced"
        );
        Ok(())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Rebuilds every cell at the new dimensions. Prior cell history is lost;
    /// level, parameters, rules and ripple offset are kept. On error the grid
    /// is unchanged.
    pub fn resize(&mut self, rows: i64, columns: i64) -> Result<()> {
        let (Ok(r), Ok(c)) = (usize::try_from(rows), usize::try_from(columns)) else {
            return Err(GridError::NegativeDimension { rows, columns });
        };
        self.cells = blank_cells(r, c)?;
        self.rows = r;
        self.columns = c;
        self.scratch.clear();
        debug!(rows = r, columns = c, cells = self.cells.len(), "grid resized");
        Ok(())
    }

    /// Resizes to as many whole `cell_size` squares as fit in the viewport.
    pub fn fit_viewport(&mut self, width: f32, height: f32, cell_size: f32) -> Result<()> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if !(width.is_finite() && height.is_finite()) {
            return Err(GridError::InvalidViewport { width, height });
        }
        let rows = (height / cell_size).floor() as i64;
        let columns = (width / cell_size).floor() as i64;
        self.resize(rows, columns)
    }

    /// Clears every cell and the ripple offset, keeping dimensions and settings.
    pub fn reset(&mut self) {
        let columns = self.columns;
        for cell in &mut self.cells {
            *cell = Cell::new(cell.index(), columns);
        }
        self.frame_offset = 0;
        self.scratch.clear();
        debug!("grid reset");
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Active mapping level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Switches the mapping level. Takes effect on the next frame.
    pub fn set_level(&mut self, level: Level) {
        if level != self.level {
            debug!(from = %self.level, to = %level, "level changed");
        }
        self.level = level;
    }

    /// Switches the mapping level by number, rejecting unknown numbers.
    pub fn set_level_number(&mut self, level: i64) -> Result<()> {
        self.set_level(Level::try_from(level)?);
        Ok(())
    }

    /// Reads a named parameter of the active level.
    pub fn param(&self, name: &str) -> Result<f32> {
        self.params.get(self.level, name)
    }

    /// Writes a named parameter of the active level.
    pub fn set_param(&mut self, name: &str, value: f32) -> Result<()> {
        self.params.set(self.level, name, value)?;
        debug!(level = %self.level, name, value, "parameter changed");
        Ok(())
    }

    /// All parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Mutable access to all parameters. Values are not re-validated.
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// The rule list used by [`Level::Rules`].
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Mutable access to the rule list.
    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// Replaces the rule list.
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    /// Randomly permutes the rule order using the grid's RNG.
    pub fn shuffle_rules(&mut self) {
        self.rules.shuffle(&mut self.rng);
        debug!(order = ?self.rules.labels(), "rules shuffled");
    }

    /// Neighbor connectivity used by neighbor-aware levels.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Changes the neighbor connectivity.
    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    /// Seeds a cell's state without recording a transition.
    pub fn set_state(&mut self, index: usize, on: bool) -> Result<()> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(GridError::CellOutOfBounds { index, len })?;
        cell.state = on;
        cell.previous_state = on;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Counts on-neighbors of a cell from the current states. Edges do not wrap.
    pub fn neighbor_count(&self, index: usize) -> Result<u8> {
        if index >= self.cells.len() {
            return Err(GridError::CellOutOfBounds {
                index,
                len: self.cells.len(),
            });
        }
        Ok(count_on(
            |i| self.cells[i].state,
            self.rows,
            self.columns,
            index,
            self.connectivity,
        ))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell by linear index.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Cell by row and column.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<&Cell> {
        if row < self.rows && column < self.columns {
            self.cells.get(row * self.columns + column)
        } else {
            None
        }
    }

    /// On-state of every cell, row-major.
    pub fn states(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.state).collect()
    }

    /// Number of cells currently on.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.state).count()
    }

    /// Current ripple offset.
    pub fn frame_offset(&self) -> usize {
        self.frame_offset
    }
}

fn blank_cells(rows: usize, columns: usize) -> Result<Vec<Cell>> {
    let too_large = || GridError::TooManyCells { rows, columns };
    let len = rows.checked_mul(columns).ok_or_else(too_large)?;
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|_| too_large())?;
    cells.extend((0..len).map(|i| Cell::new(i, columns)));
    Ok(cells)
}

fn update_each(cells: &mut [Cell], mut f: impl FnMut(&Cell) -> CellUpdate) {
    for cell in cells {
        let update = f(cell);
        cell.value = update.value;
        cell.state = update.state;
    }
}
