//! Rule engine for greedy dispatching.
//!
//! Optionally gates the dispatchable set to its earliest-startable
//! operations, then ranks the survivors with a chain of rules and a final
//! tie-breaker.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{DispatchContext, DispatchingRule, RuleScore};
use crate::models::Task;

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// First in the dispatchable set wins (default).
    #[default]
    Arrival,
    /// Lowest job index wins.
    ByJob,
}

/// A composable rule engine for dispatching.
///
/// Rules are applied in sequence: a later rule is consulted only when all
/// earlier rules tie.
///
/// # Example
/// ```
/// use u_jobshop::dispatching::{rules, RuleEngine, TieBreaker};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Srpt)
///     .with_rule(rules::Spt)
///     .with_final_tie_breaker(TieBreaker::ByJob)
///     .with_earliest_start_gate();
/// assert!(engine.is_earliest_start_gated());
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    earliest_start_gate: bool,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::Arrival,
            earliest_start_gate: false,
            epsilon: 1e-9,
        }
    }

    /// Appends a rule to the chain.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Restricts every choice to the operations with minimal earliest start.
    pub fn with_earliest_start_gate(mut self) -> Self {
        self.earliest_start_gate = true;
        self
    }

    /// Whether the earliest-start gate is enabled.
    pub fn is_earliest_start_gated(&self) -> bool {
        self.earliest_start_gate
    }

    /// Indices of `ready` that survive the earliest-start gate.
    ///
    /// Without the gate every index survives. With it, all operations
    /// attaining the minimal earliest start are kept.
    pub fn candidates(&self, ready: &[Task], context: &DispatchContext) -> Vec<usize> {
        if !self.earliest_start_gate {
            return (0..ready.len()).collect();
        }
        let Some(earliest) = ready.iter().map(|&t| context.earliest_start(t)).min() else {
            return Vec::new();
        };
        (0..ready.len())
            .filter(|&i| context.earliest_start(ready[i]) == earliest)
            .collect()
    }

    /// Returns the index in `ready` of the highest-priority task.
    pub fn select(&self, ready: &[Task], context: &DispatchContext) -> Option<usize> {
        self.candidates(ready, context)
            .into_iter()
            .min_by(|&a, &b| self.compare(a, b, ready, context))
    }

    /// Removes and returns the highest-priority task of `ready`.
    ///
    /// The remaining tasks keep their relative order.
    pub fn dispatch(&self, ready: &mut Vec<Task>, context: &DispatchContext) -> Option<Task> {
        self.select(ready, context).map(|i| ready.remove(i))
    }

    /// Evaluates a single task and returns scores from each rule.
    pub fn evaluate(&self, task: Task, context: &DispatchContext) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(task, context))
            .collect()
    }

    fn compare(&self, a: usize, b: usize, ready: &[Task], context: &DispatchContext) -> Ordering {
        let (task_a, task_b) = (ready[a], ready[b]);
        for rule in &self.rules {
            let score_a = rule.evaluate(task_a, context);
            let score_b = rule.evaluate(task_b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        // All rules tied → use final tie-breaker
        match self.tie_breaker {
            TieBreaker::Arrival => a.cmp(&b),
            TieBreaker::ByJob => task_a.job.cmp(&task_b.job).then(a.cmp(&b)),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .field("earliest_start_gate", &self.earliest_start_gate)
            .finish()
    }
}
