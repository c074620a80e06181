//! Tabu search over the critical-block neighborhood.
//!
//! # Mechanisms
//!
//! 1. **Walk split:** `current` always moves to its best non-tabu neighbor,
//!    even a worsening one, while `best` only ever improves.
//! 2. **Tabu matrix:** a square matrix over raw slot pairs. A swap applied at
//!    iteration `k` stores `k + tabu_duration` and is forbidden while that
//!    entry is not below the iteration number, i.e. for iterations
//!    `k + 1 ..= k + tabu_duration`. The key ignores the machine and the
//!    operations occupying the slots.
//!
//! Among equally good candidates the first one found wins, scanning blocks
//! in critical-path order and each block's front swap before its back swap.
//!
//! When every candidate is tabu the iteration passes without a move, so the
//! entries expire and the walk resumes. The walk ends early only when the
//! critical path has no block, since no swap can ever apply again.
//!
//! # Reference
//! Nowicki & Smutnicki (1996), "A Fast Taboo Search Algorithm for the Job
//! Shop Problem", Management Science 42(6)

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{ExitCause, GreedySolver, Solution, Solver};
use crate::dispatching::PriorityRule;
use crate::encoding::ResourceOrder;
use crate::error::Result;
use crate::models::{Instance, Schedule};
use crate::neighborhood::{self, Block, Swap};

/// Tabu search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuConfig {
    /// Iterations before the search stops.
    pub max_iterations: usize,
    /// Iterations a just-applied swap stays forbidden.
    pub tabu_duration: usize,
    /// Rule of the greedy seed.
    pub seed_rule: PriorityRule,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tabu_duration: 10,
            seed_rule: PriorityRule::EstLrpt,
        }
    }
}

/// Forbidden-move memory of one run.
#[derive(Debug, Clone)]
struct TabuMemory {
    size: usize,
    until: Vec<usize>,
    duration: usize,
}

impl TabuMemory {
    fn new(size: usize, duration: usize) -> Self {
        Self {
            size,
            until: vec![0; size * size],
            duration,
        }
    }

    #[inline]
    fn index(&self, swap: &Swap) -> usize {
        swap.slot1 * self.size + swap.slot2
    }

    fn is_allowed(&self, swap: &Swap, iteration: usize) -> bool {
        self.until[self.index(swap)] < iteration
    }

    fn forbid(&mut self, swap: &Swap, iteration: usize) {
        let index = self.index(swap);
        self.until[index] = iteration + self.duration;
    }
}

/// Tabu search seeded by a greedy construction.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::{Solver, TabuConfig, TabuSolver};
///
/// let instance = Arc::new(
///     Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap(),
/// );
/// let solver = TabuSolver::with_config(TabuConfig {
///     max_iterations: 50,
///     ..TabuConfig::default()
/// });
/// let solution = solver.solve(&instance, Instant::now() + Duration::from_secs(1)).unwrap();
/// assert_eq!(solution.makespan(), 6);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabuSolver {
    config: TabuConfig,
}

impl TabuSolver {
    /// Creates a tabu solver with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tabu solver from a config.
    pub fn with_config(config: TabuConfig) -> Self {
        Self { config }
    }

    /// Sets the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Sets how long an applied swap stays forbidden.
    pub fn with_tabu_duration(mut self, tabu_duration: usize) -> Self {
        self.config.tabu_duration = tabu_duration;
        self
    }

    /// Sets the rule of the greedy seed.
    pub fn with_seed_rule(mut self, rule: PriorityRule) -> Self {
        self.config.seed_rule = rule;
        self
    }

    /// The solver's parameters.
    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// Runs the tabu walk from `order`.
    ///
    /// # Errors
    /// [`crate::JobShopError::InvalidEncoding`] if `order` itself does not
    /// decode. Failing candidates are skipped.
    pub fn search_from(&self, order: ResourceOrder, deadline: Instant) -> Result<Solution> {
        self.run(order, deadline, |_, _| {})
    }

    /// The walk. `on_move` sees every applied swap with its iteration.
    fn run<F>(
        &self,
        mut current: ResourceOrder,
        deadline: Instant,
        mut on_move: F,
    ) -> Result<Solution>
    where
        F: FnMut(usize, &Swap),
    {
        let instance = Arc::clone(current.instance());
        let mut memory = TabuMemory::new(instance.num_operations(), self.config.tabu_duration);
        let mut current_schedule = current.decode()?;
        let mut best = current_schedule.clone();

        for iteration in 1..=self.config.max_iterations {
            if Instant::now() >= deadline {
                trace!(iteration, "tabu deadline elapsed");
                return Ok(self.finish(best, ExitCause::Timeout, iteration - 1));
            }

            let path = current.critical_path(&current_schedule);
            let blocks = neighborhood::blocks(&current, &path);
            if blocks.is_empty() {
                trace!(iteration, "critical path has no block");
                return Ok(self.finish(best, ExitCause::Blocked, iteration - 1));
            }

            let Some((swap, candidate)) = best_allowed_swap(&current, &blocks, &memory, iteration)
            else {
                trace!(iteration, "every move is tabu");
                continue;
            };

            swap.apply_on(&mut current)?;
            memory.forbid(&swap, iteration);
            on_move(iteration, &swap);
            trace!(
                iteration,
                machine = swap.machine,
                slot1 = swap.slot1,
                slot2 = swap.slot2,
                makespan = candidate.makespan(),
                "tabu move"
            );

            if candidate.makespan() < best.makespan() {
                trace!(iteration, makespan = candidate.makespan(), "new best");
                best = candidate.clone();
            }
            current_schedule = candidate;
        }

        Ok(self.finish(best, ExitCause::Blocked, self.config.max_iterations))
    }

    fn finish(&self, schedule: Schedule, exit_cause: ExitCause, iterations: usize) -> Solution {
        debug!(
            makespan = schedule.makespan(),
            iterations,
            exit_cause = %exit_cause,
            "tabu search finished"
        );
        Solution::new(schedule, exit_cause)
    }
}

/// The lowest-makespan non-tabu swap of `blocks`, improving or not.
fn best_allowed_swap(
    order: &ResourceOrder,
    blocks: &[Block],
    memory: &TabuMemory,
    iteration: usize,
) -> Option<(Swap, Schedule)> {
    let mut best: Option<(Swap, Schedule)> = None;

    for block in blocks {
        for swap in neighborhood::neighbors(block) {
            if !memory.is_allowed(&swap, iteration) {
                continue;
            }
            match swap.evaluate(order) {
                Ok(candidate) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |(_, b)| candidate.makespan() < b.makespan());
                    if better {
                        best = Some((swap, candidate));
                    }
                }
                Err(e) => trace!(error = %e, "candidate discarded"),
            }
        }
    }

    best
}

impl Solver for TabuSolver {
    fn name(&self) -> &'static str {
        "tabu"
    }

    fn solve(&self, instance: &Arc<Instance>, deadline: Instant) -> Result<Solution> {
        let order = GreedySolver::new(self.config.seed_rule).construct(instance)?;
        debug!(
            seed_rule = %self.config.seed_rule,
            max_iterations = self.config.max_iterations,
            tabu_duration = self.config.tabu_duration,
            "tabu search started"
        );
        self.search_from(order, deadline)
    }
}
