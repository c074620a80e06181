//! Task (operation) identity.
//!
//! A task names one operation by its job and its position in the job's
//! route. It is not a machine id: the machine is looked up through the
//! [`Instance`].

use serde::{Deserialize, Serialize};

use super::Instance;

/// One operation of a job, identified by `(job, pos)`.
///
/// `pos` is the position in the job's route, `0 <= pos < num_tasks`.
/// Ordering is lexicographic on `(job, pos)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Task {
    /// Job index.
    pub job: usize,
    /// Position within the job's route.
    pub pos: usize,
}

impl Task {
    /// Creates a task identifier.
    pub const fn new(job: usize, pos: usize) -> Self {
        Self { job, pos }
    }

    /// The preceding operation of the same job, if any.
    pub fn previous(&self) -> Option<Task> {
        self.pos.checked_sub(1).map(|pos| Task::new(self.job, pos))
    }

    /// The following operation of the same job, if any.
    pub fn next(&self, instance: &Instance) -> Option<Task> {
        let pos = self.pos + 1;
        (pos < instance.num_tasks()).then(|| Task::new(self.job, pos))
    }

    /// Whether this is the first operation of its job.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.pos == 0
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.job, self.pos)
    }
}
