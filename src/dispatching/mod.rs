//! Dispatching rules and rule engine for greedy construction.
//!
//! Provides priority-based dispatching rules (SPT, LPT, SRPT, LRPT), an
//! earliest-start gate that turns each of them into its `EST_*` variant,
//! and a rule engine that picks one operation out of the dispatchable set.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use u_jobshop::dispatching::{DispatchContext, PriorityRule};
//! use u_jobshop::models::{Instance, Task};
//!
//! let instance = Arc::new(
//!     Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap(),
//! );
//! let engine = PriorityRule::Spt.engine();
//! let context = DispatchContext::new(instance);
//! let mut ready = vec![Task::new(0, 0), Task::new(1, 0)];
//! assert_eq!(engine.dispatch(&mut ready, &context), Some(Task::new(1, 0)));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7.4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"
//! - Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"

mod context;
mod engine;
pub mod rules;

pub use context::DispatchContext;
pub use engine::{RuleEngine, TieBreaker};

use std::fmt::Debug;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A dispatching rule that evaluates the priority of a dispatchable task.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for tasks that should be dispatched first.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 7.4: Dispatching Rules
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "LRPT").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a task given the current dispatch state.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, task: Task, context: &DispatchContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// The eight built-in priority rules of the greedy constructor.
///
/// `Est*` variants first restrict the dispatchable set to the operations
/// that can start earliest, then apply the base rule. Defaults to
/// `EstLrpt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityRule {
    /// Shortest processing time.
    Spt,
    /// Longest processing time.
    Lpt,
    /// Shortest remaining processing time of the job.
    Srpt,
    /// Longest remaining processing time of the job.
    Lrpt,
    /// SPT among earliest-startable operations.
    EstSpt,
    /// LPT among earliest-startable operations.
    EstLpt,
    /// SRPT among earliest-startable operations.
    EstSrpt,
    /// LRPT among earliest-startable operations.
    #[default]
    EstLrpt,
}

impl PriorityRule {
    /// All rules, in declaration order.
    pub const ALL: [PriorityRule; 8] = [
        Self::Spt,
        Self::Lpt,
        Self::Srpt,
        Self::Lrpt,
        Self::EstSpt,
        Self::EstLpt,
        Self::EstSrpt,
        Self::EstLrpt,
    ];

    /// Rule name (e.g., "EST_LRPT").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spt => "SPT",
            Self::Lpt => "LPT",
            Self::Srpt => "SRPT",
            Self::Lrpt => "LRPT",
            Self::EstSpt => "EST_SPT",
            Self::EstLpt => "EST_LPT",
            Self::EstSrpt => "EST_SRPT",
            Self::EstLrpt => "EST_LRPT",
        }
    }

    /// Whether the earliest-start gate applies.
    pub fn is_est_gated(&self) -> bool {
        matches!(
            self,
            Self::EstSpt | Self::EstLpt | Self::EstSrpt | Self::EstLrpt
        )
    }

    /// Builds the rule engine for this rule.
    ///
    /// Processing-time rules break ties by arrival in the dispatchable set,
    /// remaining-time rules by lowest job index.
    pub fn engine(&self) -> RuleEngine {
        let engine = match self {
            Self::Spt | Self::EstSpt => {
                RuleEngine::new().with_rule(rules::Spt).with_final_tie_breaker(TieBreaker::Arrival)
            }
            Self::Lpt | Self::EstLpt => {
                RuleEngine::new().with_rule(rules::Lpt).with_final_tie_breaker(TieBreaker::Arrival)
            }
            Self::Srpt | Self::EstSrpt => {
                RuleEngine::new().with_rule(rules::Srpt).with_final_tie_breaker(TieBreaker::ByJob)
            }
            Self::Lrpt | Self::EstLrpt => {
                RuleEngine::new().with_rule(rules::Lrpt).with_final_tie_breaker(TieBreaker::ByJob)
            }
        };
        if self.is_est_gated() {
            engine.with_earliest_start_gate()
        } else {
            engine
        }
    }
}

impl std::fmt::Display for PriorityRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriorityRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|rule| rule.name() == normalized)
            .ok_or_else(|| format!("unknown priority rule '{s}'"))
    }
}
