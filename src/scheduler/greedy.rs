//! Priority-rule greedy constructor.
//!
//! # Algorithm
//!
//! 1. The dispatchable set starts with the first operation of every job.
//! 2. The rule engine removes one operation from the set.
//! 3. The operation is appended to its machine's row of a [`ResourceOrder`]
//!    and the job's next operation, if any, joins the set.
//! 4. After `num_jobs * num_tasks` picks the order is decoded.
//!
//! # Complexity
//! O(n² · m²) where n = jobs, m = machines (each pick scans the set).
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 7.4: Priority Dispatching

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::{ExitCause, Solution, Solver};
use crate::dispatching::{DispatchContext, PriorityRule};
use crate::encoding::ResourceOrder;
use crate::error::Result;
use crate::models::{Instance, Task};

/// Builds one schedule in one pass using a priority rule.
///
/// Never proves optimality; the result is always tagged
/// [`ExitCause::Blocked`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use u_jobshop::dispatching::PriorityRule;
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::{GreedySolver, Solver};
///
/// let instance = Arc::new(
///     Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap(),
/// );
/// let solver = GreedySolver::new(PriorityRule::EstSpt);
/// let solution = solver.solve(&instance, Instant::now() + Duration::from_secs(1)).unwrap();
/// assert!(solution.schedule.is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreedySolver {
    rule: PriorityRule,
}

impl GreedySolver {
    /// Creates a greedy solver for `rule`.
    pub fn new(rule: PriorityRule) -> Self {
        Self { rule }
    }

    /// The rule driving the construction.
    pub fn rule(&self) -> PriorityRule {
        self.rule
    }

    /// Builds the resource order picked by the rule.
    pub fn construct(&self, instance: &Arc<Instance>) -> Result<ResourceOrder> {
        let engine = self.rule.engine();
        let mut context = DispatchContext::new(Arc::clone(instance));
        let mut order = ResourceOrder::new(Arc::clone(instance));
        let mut ready: Vec<Task> = (0..instance.num_jobs()).map(|j| Task::new(j, 0)).collect();

        while let Some(task) = engine.dispatch(&mut ready, &context) {
            context.commit(task);
            order.push(task)?;
            if let Some(next) = task.next(instance) {
                ready.push(next);
            }
        }

        Ok(order)
    }
}

impl Solver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, instance: &Arc<Instance>, _deadline: Instant) -> Result<Solution> {
        let schedule = self.construct(instance)?.decode()?;
        debug!(
            rule = %self.rule,
            makespan = schedule.makespan(),
            "greedy construction finished"
        );
        Ok(Solution::new(schedule, ExitCause::Blocked))
    }
}
