//! Schedule (solution) model.
//!
//! A schedule is a table of start times, one per operation, for a given
//! instance. Completion times, the makespan and the critical path are
//! derived from it.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7.2

use std::sync::Arc;

use serde::Serialize;

use super::{Instance, Task, Time};
use crate::error::{JobShopError, Result};

/// A timed schedule: `start[job][pos]` for every operation.
///
/// Immutable once built. Shares its [`Instance`] through an `Arc`, so
/// cloning a schedule copies only the start-time table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    instance: Arc<Instance>,
    start_times: Vec<Vec<Time>>,
}

/// A constraint violation found in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// The operation that violates the constraint.
    pub task: Task,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    /// Operation started before its job predecessor finished.
    PrecedenceViolation,
    /// Two operations overlap on the same machine.
    MachineOverlap,
}

impl Schedule {
    /// Creates a schedule from a start-time table.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if the table does not have one row
    /// per job and one entry per operation, or an operation would end past
    /// `Time::MAX`.
    pub fn new(instance: Arc<Instance>, start_times: Vec<Vec<Time>>) -> Result<Self> {
        let well_formed = start_times.len() == instance.num_jobs()
            && start_times.iter().all(|row| row.len() == instance.num_tasks());
        if !well_formed {
            return Err(JobShopError::InvalidEncoding(format!(
                "start-time table must be {}x{}",
                instance.num_jobs(),
                instance.num_tasks()
            )));
        }
        for (job, row) in start_times.iter().enumerate() {
            for (pos, &start) in row.iter().enumerate() {
                if start.checked_add(instance.duration(job, pos)).is_none() {
                    return Err(JobShopError::InvalidEncoding(format!(
                        "{} starting at {start} ends past the time range",
                        Task::new(job, pos)
                    )));
                }
            }
        }
        Ok(Self::from_parts(instance, start_times))
    }

    /// Builds a schedule whose table shape is already known to be correct.
    pub(crate) fn from_parts(instance: Arc<Instance>, start_times: Vec<Vec<Time>>) -> Self {
        Self {
            instance,
            start_times,
        }
    }

    /// The instance this schedule solves.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// The full start-time table.
    pub fn start_times(&self) -> &[Vec<Time>] {
        &self.start_times
    }

    /// Start time of an operation.
    #[inline]
    pub fn start_time(&self, task: Task) -> Time {
        self.start_times[task.job][task.pos]
    }

    /// Completion time of an operation.
    #[inline]
    pub fn end_time(&self, task: Task) -> Time {
        self.start_time(task) + self.instance.duration_of(task)
    }

    /// Makespan: latest completion time over all operations.
    pub fn makespan(&self) -> Time {
        self.tasks().map(|t| self.end_time(t)).max().unwrap_or(0)
    }

    /// The operation that realizes the makespan (first in job order on ties).
    pub fn makespan_task(&self) -> Option<Task> {
        let mut best: Option<(Task, Time)> = None;
        for task in self.tasks() {
            let end = self.end_time(task);
            if best.map_or(true, |(_, b)| end > b) {
                best = Some((task, end));
            }
        }
        best.map(|(task, _)| task)
    }

    /// Operations on a machine in execution order: start time, then end
    /// time (so zero-length operations come first within a tie), then job.
    pub fn machine_tasks(&self, machine: usize) -> Vec<Task> {
        let mut tasks: Vec<Task> = (0..self.instance.num_jobs())
            .map(|job| Task::new(job, self.instance.task_with_machine(job, machine)))
            .collect();
        tasks.sort_by_key(|&t| (self.start_time(t), self.end_time(t), t.job));
        tasks
    }

    /// All operations in a dispatch order that replays this schedule.
    ///
    /// Simulates the decoder: among the next operation of every job, takes
    /// the one with the smallest `(start, end, job)` that would start exactly
    /// at its scheduled time given the operations taken so far. Start times
    /// alone cannot order zero-length operations that share a start on one
    /// machine; the replay check can. For every schedule produced by a
    /// decoder, the result decodes back to this schedule. When no operation
    /// replays (a schedule with idle gaps or violations), the smallest one
    /// is taken anyway.
    pub fn dispatch_order(&self) -> Vec<Task> {
        let inst = &self.instance;
        let mut next_pos = vec![0usize; inst.num_jobs()];
        let mut job_free: Vec<Time> = vec![0; inst.num_jobs()];
        let mut machine_free: Vec<Time> = vec![0; inst.num_machines()];
        let mut order = Vec::with_capacity(inst.num_operations());

        while order.len() < inst.num_operations() {
            let key = |t: Task| (self.start_time(t), self.end_time(t), t.job);
            let heads = (0..inst.num_jobs())
                .filter(|&job| next_pos[job] < inst.num_tasks())
                .map(|job| Task::new(job, next_pos[job]));
            let replays = |t: &Task| {
                job_free[t.job].max(machine_free[inst.machine_of(*t)]) == self.start_time(*t)
            };
            let Some(task) = heads
                .clone()
                .filter(replays)
                .min_by_key(|&t| key(t))
                .or_else(|| heads.min_by_key(|&t| key(t)))
            else {
                break;
            };

            let machine = inst.machine_of(task);
            let end = self.end_time(task);
            job_free[task.job] = end;
            machine_free[machine] = machine_free[machine].max(end);
            next_pos[task.job] += 1;
            order.push(task);
        }

        order
    }

    /// Critical path: a longest chain of operations ending at the
    /// makespan operation, ordered from source to sink.
    ///
    /// Machine predecessors follow [`dispatch_order`](Self::dispatch_order),
    /// the same rows as the canonical resource order of this schedule.
    pub fn critical_path(&self) -> Vec<Task> {
        let inst = &self.instance;
        let mut rows = vec![Vec::with_capacity(inst.num_jobs()); inst.num_machines()];
        let mut slot = vec![vec![0; inst.num_tasks()]; inst.num_jobs()];
        for task in self.dispatch_order() {
            let row: &mut Vec<Task> = &mut rows[inst.machine_of(task)];
            slot[task.job][task.pos] = row.len();
            row.push(task);
        }

        self.critical_path_with(|task| {
            let i = slot[task.job][task.pos].checked_sub(1)?;
            Some(rows[inst.machine_of(task)][i])
        })
    }

    /// Backward critical-path walk with a given machine-predecessor lookup.
    ///
    /// Starts at [`makespan_task`](Self::makespan_task). At each step the job
    /// predecessor is taken if it completes exactly at the current start,
    /// otherwise the machine predecessor if it does. The walk stops at an
    /// operation with no such predecessor, or after visiting as many
    /// operations as the instance has.
    pub(crate) fn critical_path_with<F>(&self, machine_pred: F) -> Vec<Task>
    where
        F: Fn(Task) -> Option<Task>,
    {
        let Some(mut current) = self.makespan_task() else {
            return Vec::new();
        };

        let mut path = vec![current];
        while path.len() < self.instance.num_operations() {
            let start = self.start_time(current);
            let job_pred = current
                .previous()
                .filter(|&p| self.end_time(p) == start);
            let pred = job_pred.or_else(|| {
                machine_pred(current)
                    .filter(|p| self.instance.contains(*p))
                    .filter(|&p| self.end_time(p) == start)
            });

            match pred {
                Some(pred) => {
                    path.push(pred);
                    current = pred;
                }
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Checks job precedence and machine exclusivity.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for task in self.tasks() {
            if let Some(pred) = task.previous() {
                if self.start_time(task) < self.end_time(pred) {
                    violations.push(Violation {
                        violation_type: ViolationType::PrecedenceViolation,
                        task,
                        message: format!(
                            "{task} starts at {} before {pred} ends at {}",
                            self.start_time(task),
                            self.end_time(pred)
                        ),
                    });
                }
            }
        }

        for machine in 0..self.instance.num_machines() {
            let order = self.machine_tasks(machine);
            for pair in order.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if self.start_time(b) < self.end_time(a) {
                    violations.push(Violation {
                        violation_type: ViolationType::MachineOverlap,
                        task: b,
                        message: format!("{b} overlaps {a} on machine {machine}"),
                    });
                }
            }
        }

        violations
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        let num_tasks = self.instance.num_tasks();
        (0..self.instance.num_jobs())
            .flat_map(move |job| (0..num_tasks).map(move |pos| Task::new(job, pos)))
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (job, row) in self.start_times.iter().enumerate() {
            write!(f, "Job {job}:")?;
            for start in row {
                write!(f, " {start}")?;
            }
            writeln!(f)?;
        }
        write!(f, "Makespan: {}", self.makespan())
    }
}
