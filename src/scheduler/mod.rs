//! Job-shop solvers and KPI evaluation.
//!
//! Every solver implements [`Solver`]: given an instance and a wall-clock
//! deadline it returns a [`Solution`] tagged with why the search stopped.
//!
//! # Solvers
//!
//! | Solver | Strategy | Exit cause |
//! |--------|----------|------------|
//! | [`GreedySolver`] | One pass of a priority rule | `Blocked` |
//! | [`ExhaustiveSolver`] | Enumerates every encoding | `ProvedOptimal` / `Timeout` |
//! | [`DescentSolver`] | Steepest descent over critical blocks | `Blocked` / `Timeout` |
//! | [`TabuSolver`] | Tabu walk over critical blocks | `Blocked` / `Timeout` |
//!
//! Deadlines are checked cooperatively once per outer iteration, so a solver
//! may overrun by one neighborhood evaluation.
//!
//! # KPI
//!
//! [`ScheduleKpi`] computes makespan, gap to the lower bound, utilization,
//! idle time and flow time of a schedule.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7
//! - Nowicki & Smutnicki (1996), "A Fast Taboo Search Algorithm for the Job Shop Problem"

mod config;
mod descent;
mod exhaustive;
mod greedy;
mod kpi;
mod tabu;

pub use config::SolverConfig;
pub use descent::{DescentConfig, DescentSolver};
pub use exhaustive::ExhaustiveSolver;
pub use greedy::GreedySolver;
pub use kpi::ScheduleKpi;
pub use tabu::{TabuConfig, TabuSolver};

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Instance, Schedule, Time};

/// Why a solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCause {
    /// The whole search space was explored.
    ProvedOptimal,
    /// The solver ran out of moves or iterations before the deadline.
    Blocked,
    /// The deadline elapsed; the best schedule found so far is returned.
    Timeout,
}

impl std::fmt::Display for ExitCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProvedOptimal => f.write_str("proved optimal"),
            Self::Blocked => f.write_str("blocked"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// A schedule returned by a solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    /// The best schedule found.
    pub schedule: Schedule,
    /// Why the search stopped.
    pub exit_cause: ExitCause,
}

impl Solution {
    /// Creates a solution.
    pub fn new(schedule: Schedule, exit_cause: ExitCause) -> Self {
        Self {
            schedule,
            exit_cause,
        }
    }

    /// The instance that was solved.
    pub fn instance(&self) -> &Arc<Instance> {
        self.schedule.instance()
    }

    /// Makespan of the schedule.
    pub fn makespan(&self) -> Time {
        self.schedule.makespan()
    }

    /// Quality metrics of the schedule.
    pub fn kpi(&self) -> ScheduleKpi {
        ScheduleKpi::calculate(&self.schedule)
    }
}

/// A job-shop solver.
///
/// Implementations hold configuration only; all search state lives in the
/// call, so one solver value may be reused across instances and threads.
pub trait Solver: Send + Sync + Debug {
    /// Solver name (e.g., "greedy", "tabu").
    fn name(&self) -> &'static str;

    /// Solves `instance`, stopping at the first check past `deadline`.
    fn solve(&self, instance: &Arc<Instance>, deadline: Instant) -> Result<Solution>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// 3 jobs × 3 machines, identity routing, unit durations. Optimum 5.
    pub fn unit_identity() -> Arc<Instance> {
        Arc::new(Instance::new(vec![vec![0, 1, 2]; 3], vec![vec![1, 1, 1]; 3]).unwrap())
    }

    /// J0: m0(3) → m1(2); J1: m1(2) → m0(3). Optimum 6.
    pub fn two_by_two() -> Arc<Instance> {
        Arc::new(
            Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap(),
        )
    }

    /// Deadline far enough away to never trigger in tests.
    pub fn far_deadline() -> Instant {
        Instant::now() + std::time::Duration::from_secs(3600)
    }
}
