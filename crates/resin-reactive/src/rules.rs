//! Rule engine for the expression-grammar level.
//!
//! A [`RuleSet`] is an ordered list of `(condition, action)` pairs. For each
//! cell the rules are tried in order and the first matching rule's action is
//! applied; nothing else runs for that cell. When no rule matches the cell is
//! left as it was.
//!
//! Conditions see the cell, the signal (with the cell's own index replaced by
//! its ripple-shifted sample), the neighbor count and the live rule
//! parameters. Operands may refer to those parameters by name, so edits reach
//! existing rules on the next frame.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_reactive::{Action, Condition, Rule, RuleParam, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.push(Rule::new(Condition::SampleAbove(RuleParam::LoudThreshold.into()), Action::On).labeled("loud"));
//! rules.push(Rule::new(Condition::NeighborsAtLeast(3), Action::Off).labeled("crowded"));
//! assert_eq!(rules.labels(), vec!["loud", "crowded"]);
//! ```

use crate::cell::Cell;
use crate::mapping::CellUpdate;
use crate::params::{RuleParam, RuleParams};
use crate::signal::SignalView;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A number a condition compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operand {
    /// A literal.
    Const(f32),
    /// A live rule parameter.
    Param(RuleParam),
}

impl Operand {
    /// Resolves the operand against the current parameters.
    #[inline]
    pub fn resolve(self, params: &RuleParams) -> f32 {
        match self {
            Operand::Const(v) => v,
            Operand::Param(p) => p.read(params),
        }
    }
}

impl From<f32> for Operand {
    fn from(v: f32) -> Self {
        Operand::Const(v)
    }
}

impl From<RuleParam> for Operand {
    fn from(p: RuleParam) -> Self {
        Operand::Param(p)
    }
}

/// Everything a condition may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// The cell being evaluated.
    pub cell: &'a Cell,
    /// Signal view with the cell's own position overridden by its rippled sample.
    pub signal: SignalView<'a>,
    /// On-neighbors at the start of the frame.
    pub neighbors: u8,
    /// Current rule parameters.
    pub params: &'a RuleParams,
}

impl RuleInput<'_> {
    /// The signal at this cell's own index.
    #[inline]
    pub fn sample(&self) -> f32 {
        self.signal.at(self.cell.index())
    }
}

/// Closure signature for [`Condition::Custom`].
pub type ConditionFn = dyn Fn(&RuleInput<'_>, &mut dyn RngCore) -> bool + Send + Sync;

/// A shared user-supplied condition.
#[derive(Clone)]
pub struct CustomCondition(Arc<ConditionFn>);

impl fmt::Debug for CustomCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCondition(..)")
    }
}

/// Condition expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Condition {
    /// Always matches.
    Always,
    /// Own sample strictly above the operand.
    SampleAbove(Operand),
    /// Own sample strictly below the operand.
    SampleBelow(Operand),
    /// Own sample strictly between the operands.
    SampleBetween(Operand, Operand),
    /// A fresh uniform draw in [0, 1) strictly above the operand.
    RandomAbove(Operand),
    /// At least this many on-neighbors.
    NeighborsAtLeast(u8),
    /// At most this many on-neighbors.
    NeighborsAtMost(u8),
    /// Cell's current state equals this.
    StateIs(bool),
    /// Cell's value strictly below the operand.
    ValueBelow(Operand),
    /// Every sub-condition matches, checked left to right.
    All(Vec<Condition>),
    /// Some sub-condition matches, checked left to right.
    Any(Vec<Condition>),
    /// Negation.
    Not(Box<Condition>),
    /// Arbitrary closure. Not serializable.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomCondition),
}

impl Condition {
    /// Wraps a closure as a condition.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&RuleInput<'_>, &mut dyn RngCore) -> bool + Send + Sync + 'static,
    {
        Condition::Custom(CustomCondition(Arc::new(f)))
    }

    /// Evaluates the condition. Random draws come from `rng`.
    pub fn evaluate(&self, input: &RuleInput<'_>, rng: &mut dyn RngCore) -> bool {
        let params = input.params;
        match self {
            Condition::Always => true,
            Condition::SampleAbove(t) => input.sample() > t.resolve(params),
            Condition::SampleBelow(t) => input.sample() < t.resolve(params),
            Condition::SampleBetween(lo, hi) => {
                let d = input.sample();
                lo.resolve(params) < d && d < hi.resolve(params)
            }
            Condition::RandomAbove(p) => rng.random::<f32>() > p.resolve(params),
            Condition::NeighborsAtLeast(n) => input.neighbors >= *n,
            Condition::NeighborsAtMost(n) => input.neighbors <= *n,
            Condition::StateIs(s) => input.cell.state() == *s,
            Condition::ValueBelow(t) => input.cell.value() < t.resolve(params),
            Condition::All(parts) => parts.iter().all(|c| c.evaluate(input, rng)),
            Condition::Any(parts) => parts.iter().any(|c| c.evaluate(input, rng)),
            Condition::Not(inner) => !inner.evaluate(input, rng),
            Condition::Custom(f) => (f.0)(input, rng),
        }
    }
}

/// What a matching rule does to its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Action {
    /// Switch on.
    On,
    /// Switch off.
    Off,
    /// Invert the state.
    Flip,
    /// Random state with even odds.
    Scatter,
    /// Scale the value by `decay_factor`; below `decay_floor` the cell goes off.
    Decay,
}

impl Action {
    /// Applies the action to a cell's current value and state.
    pub fn apply(self, cell: &Cell, params: &RuleParams, rng: &mut dyn RngCore) -> CellUpdate {
        let mut update = CellUpdate::keep(cell);
        match self {
            Action::On => update.state = true,
            Action::Off => update.state = false,
            Action::Flip => update.state = !update.state,
            Action::Scatter => update.state = rng.random::<f32>() > 0.5,
            Action::Decay => {
                update.value *= params.decay_factor;
                if update.value < params.decay_floor {
                    update.state = false;
                }
            }
        }
        update
    }
}

/// A condition paired with an action.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    /// When the rule fires.
    pub condition: Condition,
    /// What it does.
    pub action: Action,
    /// Optional name for inspection and logs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
}

impl Rule {
    /// Creates an unlabeled rule.
    pub fn new(condition: Condition, action: Action) -> Self {
        Self {
            condition,
            action,
            label: None,
        }
    }

    /// Attaches a label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An ordered rule list. Order matters: the first match wins.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule list.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock rules: loud turns on, quiet turns off, mid band flips by chance.
    pub fn defaults() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    Condition::SampleAbove(RuleParam::LoudThreshold.into()),
                    Action::On,
                )
                .labeled("loud"),
                Rule::new(
                    Condition::SampleBelow(RuleParam::QuietThreshold.into()),
                    Action::Off,
                )
                .labeled("quiet"),
                Rule::new(
                    Condition::All(vec![
                        Condition::SampleBetween(
                            RuleParam::FlipMin.into(),
                            RuleParam::FlipMax.into(),
                        ),
                        Condition::RandomAbove(RuleParam::FlipChance.into()),
                    ]),
                    Action::Flip,
                )
                .labeled("flicker"),
            ],
        }
    }

    /// Appends a rule at the lowest priority.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Inserts a rule at `index`, clamped to the end of the list.
    pub fn insert(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Removes the rule at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Swaps two rules. Out-of-range indices are ignored.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.rules.len() && b < self.rules.len() {
            self.rules.swap(a, b);
        }
    }

    /// Removes every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Labels in priority order; unlabeled rules show as `"?"`.
    pub fn labels(&self) -> Vec<&str> {
        self.iter()
            .map(|r| r.label.as_deref().unwrap_or("?"))
            .collect()
    }

    /// Uniformly permutes the rule order. Conditions and actions are untouched.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.rules.shuffle(rng);
    }

    /// Returns the position and action of the first rule whose condition holds.
    ///
    /// Conditions after the first match are not evaluated.
    pub fn first_match(
        &self,
        input: &RuleInput<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<(usize, Action)> {
        self.iter()
            .enumerate()
            .find(|(_, rule)| rule.condition.evaluate(input, rng))
            .map(|(i, rule)| (i, rule.action))
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cell_with(state: bool, value: f32) -> Cell {
        let mut cell = Cell::new(1, 4);
        cell.state = state;
        cell.value = value;
        cell
    }

    fn input<'a>(cell: &'a Cell, signal: SignalView<'a>, params: &'a RuleParams) -> RuleInput<'a> {
        RuleInput {
            cell,
            signal,
            neighbors: 2,
            params,
        }
    }

    #[test]
    fn test_defaults_cover_loud_and_quiet() {
        let params = RuleParams::default();
        let rules = RuleSet::defaults();
        let mut rng = StdRng::seed_from_u64(1);
        let cell = cell_with(false, 0.0);

        let loud = [0.0, 0.9];
        let view = SignalView::new(&loud).unwrap();
        assert_eq!(
            rules.first_match(&input(&cell, view, &params), &mut rng),
            Some((0, Action::On))
        );

        let quiet = [0.0, 0.1];
        let view = SignalView::new(&quiet).unwrap();
        assert_eq!(
            rules.first_match(&input(&cell, view, &params), &mut rng),
            Some((1, Action::Off))
        );

        // Between quiet and the flip band: nothing matches.
        let dead_zone = [0.0, 0.35];
        let view = SignalView::new(&dead_zone).unwrap();
        assert_eq!(
            rules.first_match(&input(&cell, view, &params), &mut rng),
            None
        );
    }

    #[test]
    fn test_first_match_stops_evaluation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let rules: RuleSet = [
            Rule::new(Condition::Always, Action::On),
            Rule::new(
                Condition::custom(move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    true
                }),
                Action::Off,
            ),
        ]
        .into_iter()
        .collect();

        let params = RuleParams::default();
        let cell = cell_with(false, 0.0);
        let data = [0.5];
        let view = SignalView::new(&data).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            rules.first_match(&input(&cell, view, &params), &mut rng),
            Some((0, Action::On))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_operands_follow_parameter_edits() {
        let mut params = RuleParams::default();
        let cond = Condition::SampleAbove(RuleParam::LoudThreshold.into());
        let cell = cell_with(false, 0.0);
        let data = [0.0, 0.8];
        let view = SignalView::new(&data).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(cond.evaluate(&input(&cell, view, &params), &mut rng));
        params.loud_threshold = 0.85;
        assert!(!cond.evaluate(&input(&cell, view, &params), &mut rng));
    }

    #[test]
    fn test_condition_sees_override() {
        let params = RuleParams::default();
        let cell = cell_with(false, 0.0);
        let data = [0.0, 0.1];
        let view = SignalView::new(&data).unwrap().with_override(1, 0.99);
        let mut rng = StdRng::seed_from_u64(0);

        let cond = Condition::SampleAbove(Operand::Const(0.9));
        assert!(cond.evaluate(&input(&cell, view, &params), &mut rng));
    }

    #[test]
    fn test_compound_conditions() {
        let params = RuleParams::default();
        let cell = cell_with(true, 0.2);
        let data = [0.0, 0.5];
        let view = SignalView::new(&data).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let inp = input(&cell, view, &params);

        assert!(Condition::All(vec![
            Condition::StateIs(true),
            Condition::NeighborsAtLeast(2),
            Condition::NeighborsAtMost(2),
            Condition::ValueBelow(Operand::Const(0.3)),
        ])
        .evaluate(&inp, &mut rng));
        assert!(
            Condition::Any(vec![Condition::StateIs(false), Condition::Always])
                .evaluate(&inp, &mut rng)
        );
        assert!(!Condition::Not(Box::new(Condition::Always)).evaluate(&inp, &mut rng));
        assert!(Condition::All(vec![]).evaluate(&inp, &mut rng));
    }

    #[test]
    fn test_random_above_extremes() {
        let params = RuleParams::default();
        let cell = cell_with(false, 0.0);
        let data = [0.5];
        let view = SignalView::new(&data).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let inp = input(&cell, view, &params);

        for _ in 0..100 {
            assert!(!Condition::RandomAbove(Operand::Const(1.0)).evaluate(&inp, &mut rng));
            assert!(Condition::RandomAbove(Operand::Const(-0.1)).evaluate(&inp, &mut rng));
        }
    }

    #[test]
    fn test_actions() {
        let params = RuleParams::default();
        let mut rng = StdRng::seed_from_u64(9);
        let on = cell_with(true, 0.5);

        assert!(Action::On.apply(&cell_with(false, 0.5), &params, &mut rng).state);
        assert!(!Action::Off.apply(&on, &params, &mut rng).state);
        assert!(!Action::Flip.apply(&on, &params, &mut rng).state);

        let decayed = Action::Decay.apply(&on, &params, &mut rng);
        assert!((decayed.value - 0.45).abs() < 1e-6);
        assert!(decayed.state);

        let faint = cell_with(true, 0.05);
        let decayed = Action::Decay.apply(&faint, &params, &mut rng);
        assert!(decayed.value < params.decay_floor);
        assert!(!decayed.state);

        let ons = (0..1000)
            .filter(|_| Action::Scatter.apply(&on, &params, &mut rng).state)
            .count();
        assert!((350..650).contains(&ons), "scatter on-count {ons}");
    }

    #[test]
    fn test_list_editing() {
        let mut rules = RuleSet::defaults();
        rules.swap(0, 2);
        assert_eq!(rules.labels(), vec!["flicker", "quiet", "loud"]);

        rules.insert(99, Rule::new(Condition::Always, Action::Decay));
        assert_eq!(rules.labels(), vec!["flicker", "quiet", "loud", "?"]);

        assert!(rules.remove(10).is_none());
        assert_eq!(rules.remove(0).and_then(|r| r.label).as_deref(), Some("flicker"));
        assert_eq!(rules.len(), 3);

        rules.clear();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rules = RuleSet::defaults();
        let mut seen_other_order = false;

        for _ in 0..32 {
            rules.shuffle(&mut rng);
            let mut labels = rules.labels();
            if labels != vec!["loud", "quiet", "flicker"] {
                seen_other_order = true;
            }
            labels.sort_unstable();
            assert_eq!(labels, vec!["flicker", "loud", "quiet"]);
        }
        assert!(seen_other_order);
    }
}
