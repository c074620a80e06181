//! Exhaustive enumeration of encodings.
//!
//! Depth-first over partial encodings with an explicit cursor stack: slot
//! `d` of the encoding is filled with the candidate at `cursor[d]`, and the
//! cursor advances on backtrack. Every complete encoding is decoded; cyclic
//! resource orders are skipped.
//!
//! Exponential in the instance size. Intended as a verification baseline
//! for tiny instances.
//!
//! | Encoding | Leaves |
//! |----------|--------|
//! | Job sequence | (n·m)! / (m!)ⁿ |
//! | Resource order | (n!)ᵐ, cyclic ones skipped |

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use super::{ExitCause, Solution, Solver};
use crate::encoding::{Encoding, EncodingKind, JobSequence, ResourceOrder};
use crate::error::{JobShopError, Result};
use crate::models::{Instance, Schedule, Task};

/// Solver that enumerates every complete encoding.
///
/// Reports [`ExitCause::ProvedOptimal`] when the enumeration completes and
/// [`ExitCause::Timeout`] with the best leaf seen when the deadline elapses
/// first. At least one decodable leaf is evaluated regardless of the
/// deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExhaustiveSolver {
    kind: EncodingKind,
}

impl ExhaustiveSolver {
    /// Creates an exhaustive solver over job sequences.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which encoding is enumerated.
    pub fn with_encoding(mut self, kind: EncodingKind) -> Self {
        self.kind = kind;
        self
    }

    /// The enumerated encoding.
    pub fn encoding(&self) -> EncodingKind {
        self.kind
    }

    /// Calls `visit` on every complete encoding of `instance`, in
    /// lexicographic order, until it returns [`ControlFlow::Break`].
    pub fn for_each_leaf<F>(&self, instance: &Arc<Instance>, mut visit: F)
    where
        F: FnMut(&Encoding) -> ControlFlow<()>,
    {
        match self.kind {
            EncodingKind::JobSequence => enumerate_job_sequences(instance, |seq| {
                visit(&Encoding::JobSequence(seq.clone()))
            }),
            EncodingKind::ResourceOrder => enumerate_resource_orders(instance, |order| {
                visit(&Encoding::ResourceOrder(order.clone()))
            }),
        }
    }
}

/// Job `j` may fill the next slot while fewer than `num_tasks` of its
/// operations are placed.
fn enumerate_job_sequences<F>(instance: &Arc<Instance>, mut visit: F)
where
    F: FnMut(&JobSequence) -> ControlFlow<()>,
{
    let num_jobs = instance.num_jobs();
    let depth = instance.num_operations();
    let mut placed = vec![0usize; num_jobs];
    let mut jobs: Vec<usize> = Vec::with_capacity(depth);
    let mut cursor = vec![0usize; depth + 1];

    loop {
        if jobs.len() == depth {
            let seq = JobSequence::from_jobs(Arc::clone(instance), jobs.clone());
            if visit(&seq).is_break() {
                return;
            }
        } else {
            let d = jobs.len();
            if let Some(job) = (cursor[d]..num_jobs).find(|&j| placed[j] < instance.num_tasks()) {
                cursor[d] = job + 1;
                placed[job] += 1;
                jobs.push(job);
                cursor[d + 1] = 0;
                continue;
            }
        }

        // Backtrack
        match jobs.pop() {
            Some(job) => placed[job] -= 1,
            None => return,
        }
    }
}

/// Slot `d` is row `d / num_jobs`, position `d % num_jobs`; a job may fill
/// it while it has no operation on that machine yet.
fn enumerate_resource_orders<F>(instance: &Arc<Instance>, mut visit: F)
where
    F: FnMut(&ResourceOrder) -> ControlFlow<()>,
{
    let num_jobs = instance.num_jobs();
    let num_machines = instance.num_machines();
    let depth = instance.num_operations();
    let mut used = vec![vec![false; num_jobs]; num_machines];
    let mut rows: Vec<Vec<Task>> = vec![Vec::with_capacity(num_jobs); num_machines];
    let mut cursor = vec![0usize; depth + 1];
    let mut filled = 0usize;

    loop {
        if filled == depth {
            let order = ResourceOrder::from_machine_orders(Arc::clone(instance), rows.clone());
            if visit(&order).is_break() {
                return;
            }
        } else {
            let machine = filled / num_jobs;
            if let Some(job) = (cursor[filled]..num_jobs).find(|&j| !used[machine][j]) {
                cursor[filled] = job + 1;
                used[machine][job] = true;
                rows[machine].push(Task::new(job, instance.task_with_machine(job, machine)));
                filled += 1;
                cursor[filled] = 0;
                continue;
            }
        }

        // Backtrack
        if filled == 0 {
            return;
        }
        filled -= 1;
        let machine = filled / num_jobs;
        if let Some(task) = rows[machine].pop() {
            used[machine][task.job] = false;
        }
    }
}

impl Solver for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, instance: &Arc<Instance>, deadline: Instant) -> Result<Solution> {
        debug!(encoding = ?self.kind, "exhaustive search started");
        let mut best: Option<Schedule> = None;
        let mut exit_cause = ExitCause::ProvedOptimal;
        let mut leaves = 0usize;

        self.for_each_leaf(instance, |encoding| {
            if best.is_some() && Instant::now() >= deadline {
                trace!(leaves, "exhaustive search deadline elapsed");
                exit_cause = ExitCause::Timeout;
                return ControlFlow::Break(());
            }
            leaves += 1;
            match encoding.decode() {
                Ok(schedule) => {
                    if best.as_ref().map_or(true, |b| schedule.makespan() < b.makespan()) {
                        trace!(makespan = schedule.makespan(), leaves, "new incumbent");
                        best = Some(schedule);
                    }
                }
                Err(e) => trace!(error = %e, "leaf discarded"),
            }
            ControlFlow::Continue(())
        });

        let schedule = best.ok_or_else(|| {
            JobShopError::InvalidEncoding("no complete encoding could be decoded".into())
        })?;
        debug!(
            makespan = schedule.makespan(),
            leaves,
            exit_cause = %exit_cause,
            "exhaustive search finished"
        );
        Ok(Solution::new(schedule, exit_cause))
    }
}
