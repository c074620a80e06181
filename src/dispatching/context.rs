//! Dispatch state passed to dispatching rules.

use std::sync::Arc;

use crate::models::{Instance, Task, Time};

/// Runtime bookkeeping of a greedy construction.
///
/// Tracks, per job, the completion of its last dispatched operation and the
/// processing time still to dispatch, and per machine the time it becomes
/// free. Updated by [`commit`](Self::commit) after every pick.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    instance: Arc<Instance>,
    job_ready: Vec<Time>,
    machine_free: Vec<Time>,
    remaining_work: Vec<Time>,
}

impl DispatchContext {
    /// Creates the context of an empty construction.
    pub fn new(instance: Arc<Instance>) -> Self {
        let remaining_work = (0..instance.num_jobs())
            .map(|j| instance.job_duration(j))
            .collect();
        Self {
            job_ready: vec![0; instance.num_jobs()],
            machine_free: vec![0; instance.num_machines()],
            remaining_work,
            instance,
        }
    }

    /// The instance being scheduled.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Earliest time `task` could start: its job and its machine both free.
    #[inline]
    pub fn earliest_start(&self, task: Task) -> Time {
        let machine = self.instance.machine_of(task);
        self.job_ready[task.job].max(self.machine_free[machine])
    }

    /// Processing time of `job`'s operations not dispatched yet.
    #[inline]
    pub fn remaining_work(&self, job: usize) -> Time {
        self.remaining_work[job]
    }

    /// Time a machine becomes free.
    #[inline]
    pub fn machine_free(&self, machine: usize) -> Time {
        self.machine_free[machine]
    }

    /// Records that `task` was dispatched at its earliest start.
    ///
    /// Returns the task's completion time.
    pub fn commit(&mut self, task: Task) -> Time {
        let duration = self.instance.duration_of(task);
        let end = self.earliest_start(task) + duration;
        let machine = self.instance.machine_of(task);
        self.job_ready[task.job] = end;
        self.machine_free[machine] = end;
        self.remaining_work[task.job] = self.remaining_work[task.job].saturating_sub(duration);
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_updates_bookkeeping() {
        // J0: m0(3) → m1(2); J1: m1(2) → m0(3)
        let inst = Arc::new(
            Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap(),
        );
        let mut ctx = DispatchContext::new(inst);
        assert_eq!(ctx.remaining_work(0), 5);
        assert_eq!(ctx.earliest_start(Task::new(1, 0)), 0);

        assert_eq!(ctx.commit(Task::new(0, 0)), 3);
        assert_eq!(ctx.remaining_work(0), 2);
        assert_eq!(ctx.machine_free(0), 3);
        assert_eq!(ctx.earliest_start(Task::new(0, 1)), 3);

        assert_eq!(ctx.commit(Task::new(1, 0)), 2);
        // J1's m0 op waits for J0 on m0
        assert_eq!(ctx.earliest_start(Task::new(1, 1)), 3);
    }
}
