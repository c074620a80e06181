//! Steepest descent over the critical-block neighborhood.
//!
//! # Algorithm
//!
//! 1. Seed with the greedy construction of `seed_rule`.
//! 2. Evaluate every boundary swap of every block of the incumbent's
//!    critical path.
//! 3. Move to the best strictly improving candidate and repeat; stop when
//!    none improves (local optimum) or the deadline elapses.
//!
//! Among equally good candidates the first one found wins, scanning blocks
//! in critical-path order and each block's front swap before its back swap.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{ExitCause, GreedySolver, Solution, Solver};
use crate::dispatching::PriorityRule;
use crate::encoding::ResourceOrder;
use crate::error::Result;
use crate::models::{Instance, Schedule};
use crate::neighborhood::{self, Swap};

/// Descent parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescentConfig {
    /// Rule of the greedy seed.
    pub seed_rule: PriorityRule,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            seed_rule: PriorityRule::Lrpt,
        }
    }
}

/// Steepest local search seeded by a greedy construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescentSolver {
    config: DescentConfig,
}

impl DescentSolver {
    /// Creates a descent solver with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a descent solver from a config.
    pub fn with_config(config: DescentConfig) -> Self {
        Self { config }
    }

    /// Sets the rule of the greedy seed.
    pub fn with_seed_rule(mut self, rule: PriorityRule) -> Self {
        self.config.seed_rule = rule;
        self
    }

    /// The solver's parameters.
    pub fn config(&self) -> &DescentConfig {
        &self.config
    }

    /// Descends from `order` until a local optimum or the deadline.
    ///
    /// # Errors
    /// [`crate::JobShopError::InvalidEncoding`] if `order` itself does not
    /// decode. Failing candidates are skipped.
    pub fn descend(&self, mut order: ResourceOrder, deadline: Instant) -> Result<Solution> {
        let mut schedule = order.decode()?;
        let mut steps = 0usize;

        loop {
            if Instant::now() >= deadline {
                trace!(steps, "descent deadline elapsed");
                return Ok(self.finish(schedule, ExitCause::Timeout, steps));
            }

            let Some((swap, candidate)) = best_improving_swap(&order, &schedule) else {
                return Ok(self.finish(schedule, ExitCause::Blocked, steps));
            };
            swap.apply_on(&mut order)?;
            steps += 1;
            trace!(
                machine = swap.machine,
                slot1 = swap.slot1,
                slot2 = swap.slot2,
                makespan = candidate.makespan(),
                "descent step"
            );
            schedule = candidate;
        }
    }

    fn finish(&self, schedule: Schedule, exit_cause: ExitCause, steps: usize) -> Solution {
        debug!(
            makespan = schedule.makespan(),
            steps,
            exit_cause = %exit_cause,
            "descent finished"
        );
        Solution::new(schedule, exit_cause)
    }
}

/// The lowest-makespan swap that strictly improves on `schedule`.
fn best_improving_swap(order: &ResourceOrder, schedule: &Schedule) -> Option<(Swap, Schedule)> {
    let mut best: Option<(Swap, Schedule)> = None;
    let mut bound = schedule.makespan();

    for block in neighborhood::blocks(order, &order.critical_path(schedule)) {
        for swap in neighborhood::neighbors(&block) {
            match swap.evaluate(order) {
                Ok(candidate) if candidate.makespan() < bound => {
                    bound = candidate.makespan();
                    best = Some((swap, candidate));
                }
                Ok(_) => {}
                Err(e) => trace!(error = %e, "candidate discarded"),
            }
        }
    }

    best
}

impl Solver for DescentSolver {
    fn name(&self) -> &'static str {
        "descent"
    }

    fn solve(&self, instance: &Arc<Instance>, deadline: Instant) -> Result<Solution> {
        let order = GreedySolver::new(self.config.seed_rule).construct(instance)?;
        debug!(seed_rule = %self.config.seed_rule, "descent started");
        self.descend(order, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;
    use crate::scheduler::fixtures;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    // J0 first on both machines: makespan 10
    fn bad_order(instance: &Arc<Instance>) -> ResourceOrder {
        ResourceOrder::from_machine_orders(
            Arc::clone(instance),
            vec![
                vec![Task::new(0, 0), Task::new(1, 1)],
                vec![Task::new(0, 1), Task::new(1, 0)],
            ],
        )
    }

    #[test]
    fn test_descends_to_optimum() {
        let instance = fixtures::two_by_two();
        let order = bad_order(&instance);
        assert_eq!(order.decode().unwrap().makespan(), 10);

        let solution = DescentSolver::new()
            .descend(order, fixtures::far_deadline())
            .unwrap();
        assert_eq!(solution.makespan(), 6);
        assert_eq!(solution.exit_cause, ExitCause::Blocked);
    }

    #[test]
    fn test_elapsed_deadline_returns_seed() {
        let instance = fixtures::two_by_two();
        let solution = DescentSolver::new()
            .descend(bad_order(&instance), Instant::now())
            .unwrap();
        assert_eq!(solution.makespan(), 10);
        assert_eq!(solution.exit_cause, ExitCause::Timeout);
    }

    #[test]
    fn test_never_worse_than_seed() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..5 {
            let instance = Arc::new(Instance::random(6, 5, 30, &mut rng));
            for rule in [PriorityRule::Spt, PriorityRule::Lrpt, PriorityRule::EstSrpt] {
                let seed = GreedySolver::new(rule)
                    .solve(&instance, fixtures::far_deadline())
                    .unwrap();
                let solution = DescentSolver::new()
                    .with_seed_rule(rule)
                    .solve(&instance, fixtures::far_deadline())
                    .unwrap();
                assert!(solution.makespan() <= seed.makespan());
                assert!(solution.schedule.is_valid());
            }
        }
    }

    #[test]
    fn test_never_worse_than_seed_with_zero_lengths() {
        let mut rng = SmallRng::seed_from_u64(41);
        for _ in 0..10 {
            let instance = Arc::new(Instance::random_with_durations(6, 4, 0..=2, &mut rng));
            for rule in PriorityRule::ALL {
                let seed = GreedySolver::new(rule)
                    .solve(&instance, fixtures::far_deadline())
                    .unwrap();
                let solution = DescentSolver::new()
                    .with_seed_rule(rule)
                    .solve(&instance, fixtures::far_deadline())
                    .unwrap();
                assert!(solution.makespan() <= seed.makespan());
                assert!(solution.schedule.is_valid());
            }
        }
    }

    #[test]
    fn test_descend_through_zero_length_ties() {
        // J0: m0(0) → m1(1); J1: m0(0) → m1(5); J1 first on both machines
        let instance = Arc::new(
            Instance::new(vec![vec![0, 1], vec![0, 1]], vec![vec![0, 1], vec![0, 5]]).unwrap(),
        );
        let order = ResourceOrder::from_machine_orders(
            Arc::clone(&instance),
            vec![
                vec![Task::new(1, 0), Task::new(0, 0)],
                vec![Task::new(1, 1), Task::new(0, 1)],
            ],
        );
        let solution = DescentSolver::new()
            .descend(order, fixtures::far_deadline())
            .unwrap();
        assert_eq!(solution.makespan(), 6);
        assert_eq!(solution.exit_cause, ExitCause::Blocked);
    }

    #[test]
    fn test_local_optimum_has_no_improving_swap() {
        let mut rng = SmallRng::seed_from_u64(5);
        let instance = Arc::new(Instance::random(5, 4, 20, &mut rng));
        let solution = DescentSolver::new()
            .solve(&instance, fixtures::far_deadline())
            .unwrap();
        assert_eq!(solution.exit_cause, ExitCause::Blocked);

        let order = ResourceOrder::from_schedule(&solution.schedule);
        assert!(best_improving_swap(&order, &solution.schedule).is_none());
    }

    #[test]
    fn test_default_config() {
        assert_eq!(DescentSolver::new().config().seed_rule, PriorityRule::Lrpt);
    }
}
