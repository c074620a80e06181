//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Operation time**: SPT, LPT (duration of the dispatchable operation)
//! - **Job remaining time**: SRPT, LRPT (work of the job not yet dispatched)
//!
//! The `EST_*` variants are not separate rules: they are these rules behind
//! the engine's earliest-start gate (see [`RuleEngine`](super::RuleEngine)).
//!
//! # Score Convention
//! All rules return lower scores for higher priority tasks.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7.4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{DispatchContext, DispatchingRule, RuleScore};
use crate::models::Task;

// ======================== Operation-time rules ========================

/// Shortest Processing Time.
///
/// Prioritizes the operation with the shortest duration.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, task: Task, context: &DispatchContext) -> RuleScore {
        context.instance().duration_of(task) as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
///
/// Prioritizes the operation with the longest duration.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, task: Task, context: &DispatchContext) -> RuleScore {
        -(context.instance().duration_of(task) as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

// ======================== Remaining-time rules ========================

/// Shortest Remaining Processing Time.
///
/// Prioritizes the job closest to completion, measured by the processing
/// time of its operations not yet dispatched.
#[derive(Debug, Clone, Copy)]
pub struct Srpt;

impl DispatchingRule for Srpt {
    fn name(&self) -> &'static str {
        "SRPT"
    }

    fn evaluate(&self, task: Task, context: &DispatchContext) -> RuleScore {
        context.remaining_work(task.job) as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Remaining Processing Time"
    }
}

/// Longest Remaining Processing Time.
///
/// Prioritizes the job with the most work left. Keeps long jobs from
/// finishing last, which usually shortens the makespan.
#[derive(Debug, Clone, Copy)]
pub struct Lrpt;

impl DispatchingRule for Lrpt {
    fn name(&self) -> &'static str {
        "LRPT"
    }

    fn evaluate(&self, task: Task, context: &DispatchContext) -> RuleScore {
        -(context.remaining_work(task.job) as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Remaining Processing Time"
    }
}
