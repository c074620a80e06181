//! Job-shop problem instance.
//!
//! An instance is the immutable problem definition shared by every
//! encoding, schedule and solver: `num_jobs` jobs, each visiting all
//! `num_machines` machines exactly once in a fixed route.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7.1

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Task, Time};
use crate::error::{JobShopError, Result};
use crate::validation::validate_instance;

/// An immutable job-shop problem.
///
/// `machine(job, pos)` is the machine of the `pos`-th operation of `job` and
/// `duration(job, pos)` its processing time. Every route is a bijection
/// between positions and machines, so the number of operations per job
/// (`num_tasks`) equals `num_machines`.
///
/// Deserialization goes through the same validation as [`Instance::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstance", into = "RawInstance")]
pub struct Instance {
    num_jobs: usize,
    num_machines: usize,
    machines: Vec<Vec<usize>>,
    durations: Vec<Vec<Time>>,
    /// positions[job][machine] → pos
    positions: Vec<Vec<usize>>,
}

/// Wire form of an instance: the two raw tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawInstance {
    machines: Vec<Vec<usize>>,
    durations: Vec<Vec<Time>>,
}

impl TryFrom<RawInstance> for Instance {
    type Error = JobShopError;

    fn try_from(raw: RawInstance) -> Result<Self> {
        Instance::new(raw.machines, raw.durations)
    }
}

impl From<Instance> for RawInstance {
    fn from(instance: Instance) -> Self {
        Self {
            machines: instance.machines,
            durations: instance.durations,
        }
    }
}

impl Instance {
    /// Creates an instance from its route and duration tables.
    ///
    /// # Errors
    /// [`JobShopError::InfeasibleInstance`] if the tables are empty, ragged,
    /// reference unknown machines, a route visits a machine twice, or the
    /// total processing time overflows `Time`.
    pub fn new(machines: Vec<Vec<usize>>, durations: Vec<Vec<Time>>) -> Result<Self> {
        if let Err(errors) = validate_instance(&machines, &durations) {
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(JobShopError::InfeasibleInstance(message));
        }

        let num_jobs = machines.len();
        let num_machines = machines[0].len();
        let positions = positions_of(&machines, num_machines);

        Ok(Self {
            num_jobs,
            num_machines,
            machines,
            durations,
            positions,
        })
    }

    /// Generates a random instance.
    ///
    /// Routes are uniformly shuffled machine permutations and durations are
    /// drawn from `1..=max_duration`.
    ///
    /// # Panics
    /// Panics if `num_jobs`, `num_machines` or `max_duration` is zero.
    pub fn random<R: Rng>(
        num_jobs: usize,
        num_machines: usize,
        max_duration: Time,
        rng: &mut R,
    ) -> Self {
        assert!(
            max_duration > 0,
            "called `Instance::random()` with a zero `max_duration`"
        );
        Self::random_with_durations(num_jobs, num_machines, 1..=max_duration, rng)
    }

    /// Generates a random instance with durations drawn from `durations`.
    ///
    /// The range may start at zero.
    ///
    /// # Panics
    /// Panics if `num_jobs` or `num_machines` is zero, `durations` is empty,
    /// or `num_jobs * num_machines` operations of the longest duration would
    /// overflow `Time`.
    pub fn random_with_durations<R: Rng>(
        num_jobs: usize,
        num_machines: usize,
        durations: RangeInclusive<Time>,
        rng: &mut R,
    ) -> Self {
        assert!(
            num_jobs > 0 && num_machines > 0,
            "called `Instance::random_with_durations()` with an empty dimension"
        );
        assert!(
            !durations.is_empty(),
            "called `Instance::random_with_durations()` with an empty duration range"
        );
        assert!(
            Time::try_from(num_jobs * num_machines)
                .ok()
                .and_then(|n| durations.end().checked_mul(n))
                .is_some(),
            "called `Instance::random_with_durations()` with durations that overflow"
        );

        let mut machines = Vec::with_capacity(num_jobs);
        let mut table = Vec::with_capacity(num_jobs);
        for _ in 0..num_jobs {
            let mut route: Vec<usize> = (0..num_machines).collect();
            route.shuffle(rng);
            table.push(
                (0..num_machines)
                    .map(|_| rng.random_range(durations.clone()))
                    .collect(),
            );
            machines.push(route);
        }
        let positions = positions_of(&machines, num_machines);

        Self {
            num_jobs,
            num_machines,
            machines,
            durations: table,
            positions,
        }
    }

    /// Number of jobs.
    #[inline]
    pub fn num_jobs(&self) -> usize {
        self.num_jobs
    }

    /// Number of machines.
    #[inline]
    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    /// Number of operations per job (equals `num_machines`).
    #[inline]
    pub fn num_tasks(&self) -> usize {
        self.num_machines
    }

    /// Total number of operations, `num_jobs * num_tasks`.
    #[inline]
    pub fn num_operations(&self) -> usize {
        self.num_jobs * self.num_machines
    }

    /// Machine of the `pos`-th operation of `job`.
    #[inline]
    pub fn machine(&self, job: usize, pos: usize) -> usize {
        self.machines[job][pos]
    }

    /// Machine of a task.
    #[inline]
    pub fn machine_of(&self, task: Task) -> usize {
        self.machine(task.job, task.pos)
    }

    /// Processing time of the `pos`-th operation of `job`.
    #[inline]
    pub fn duration(&self, job: usize, pos: usize) -> Time {
        self.durations[job][pos]
    }

    /// Processing time of a task.
    #[inline]
    pub fn duration_of(&self, task: Task) -> Time {
        self.duration(task.job, task.pos)
    }

    /// Position in `job`'s route of the operation that runs on `machine`.
    #[inline]
    pub fn task_with_machine(&self, job: usize, machine: usize) -> usize {
        self.positions[job][machine]
    }

    /// Whether `task` names an operation of this instance.
    pub fn contains(&self, task: Task) -> bool {
        task.job < self.num_jobs && task.pos < self.num_machines
    }

    /// Sum of processing times of a job.
    pub fn job_duration(&self, job: usize) -> Time {
        self.durations[job].iter().sum()
    }

    /// Sum of processing times of all operations on a machine.
    pub fn machine_load(&self, machine: usize) -> Time {
        (0..self.num_jobs)
            .map(|job| self.duration(job, self.task_with_machine(job, machine)))
            .sum()
    }

    /// Trivial makespan lower bound: the longest job or the busiest machine.
    pub fn lower_bound(&self) -> Time {
        let longest_job = (0..self.num_jobs)
            .map(|j| self.job_duration(j))
            .max()
            .unwrap_or(0);
        let busiest_machine = (0..self.num_machines)
            .map(|m| self.machine_load(m))
            .max()
            .unwrap_or(0);
        longest_job.max(busiest_machine)
    }
}

/// Inverse of the route table: `positions[job][machine]` is the position in
/// `job`'s route of the operation on `machine`.
fn positions_of(machines: &[Vec<usize>], num_machines: usize) -> Vec<Vec<usize>> {
    machines
        .iter()
        .map(|route| {
            let mut by_machine = vec![0; num_machines];
            for (pos, &machine) in route.iter().enumerate() {
                by_machine[machine] = pos;
            }
            by_machine
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample() -> Instance {
        Instance::new(
            vec![vec![0, 1, 2], vec![2, 0, 1]],
            vec![vec![3, 2, 1], vec![1, 1, 4]],
        )
        .unwrap()
    }

    #[test]
    fn test_instance_accessors() {
        let inst = sample();
        assert_eq!(inst.num_jobs(), 2);
        assert_eq!(inst.num_machines(), 3);
        assert_eq!(inst.num_tasks(), 3);
        assert_eq!(inst.num_operations(), 6);
        assert_eq!(inst.machine(1, 0), 2);
        assert_eq!(inst.duration(1, 2), 4);
        assert_eq!(inst.machine_of(Task::new(0, 1)), 1);
        assert_eq!(inst.duration_of(Task::new(0, 0)), 3);
    }

    #[test]
    fn test_task_with_machine_inverse() {
        let inst = sample();
        for job in 0..inst.num_jobs() {
            for pos in 0..inst.num_tasks() {
                let machine = inst.machine(job, pos);
                assert_eq!(inst.task_with_machine(job, machine), pos);
            }
        }
    }

    #[test]
    fn test_lower_bound() {
        let inst = sample();
        // jobs: 6, 6; machines: m0 = 3+1, m1 = 2+4, m2 = 1+1
        assert_eq!(inst.job_duration(0), 6);
        assert_eq!(inst.machine_load(1), 6);
        assert_eq!(inst.lower_bound(), 6);
    }

    #[test]
    fn test_infeasible_instance_rejected() {
        let err = Instance::new(vec![vec![0, 0]], vec![vec![1, 1]]).unwrap_err();
        assert!(matches!(err, JobShopError::InfeasibleInstance(_)));

        let err = Instance::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, JobShopError::InfeasibleInstance(_)));
    }

    #[test]
    fn test_random_instance_is_valid() {
        let mut rng = SmallRng::seed_from_u64(7);
        let inst = Instance::random(4, 3, 9, &mut rng);
        assert_eq!(inst.num_jobs(), 4);
        assert_eq!(inst.num_machines(), 3);

        let rebuilt = Instance::new(
            (0..4)
                .map(|j| (0..3).map(|p| inst.machine(j, p)).collect())
                .collect(),
            (0..4)
                .map(|j| (0..3).map(|p| inst.duration(j, p)).collect())
                .collect(),
        )
        .unwrap();
        assert_eq!(rebuilt, inst);
        assert!((0..4).all(|j| (0..3).all(|p| (1..=9).contains(&inst.duration(j, p)))));
    }

    #[test]
    fn test_random_with_zero_durations() {
        let mut rng = SmallRng::seed_from_u64(13);
        let inst = Instance::random_with_durations(6, 4, 0..=2, &mut rng);
        let all: Vec<Time> = (0..6)
            .flat_map(|j| (0..4).map(move |p| (j, p)))
            .map(|(j, p)| inst.duration(j, p))
            .collect();
        assert!(all.iter().all(|d| (0..=2).contains(d)));
        assert!(all.contains(&0));
        for job in 0..6 {
            for pos in 0..4 {
                assert_eq!(inst.task_with_machine(job, inst.machine(job, pos)), pos);
            }
        }
    }

    #[test]
    fn test_total_duration_overflow_rejected() {
        let err =
            Instance::new(vec![vec![0], vec![0]], vec![vec![Time::MAX], vec![1]]).unwrap_err();
        assert!(matches!(err, JobShopError::InfeasibleInstance(_)));

        let inst = Instance::new(vec![vec![0], vec![0]], vec![vec![Time::MAX], vec![0]]).unwrap();
        assert_eq!(inst.lower_bound(), Time::MAX);
    }

    #[test]
    fn test_serde_roundtrip_and_validation() {
        let inst = sample();
        let json = serde_json::to_string(&inst).unwrap();
        assert!(json.contains("\"machines\""));
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);

        let bad = r#"{"machines":[[0,0]],"durations":[[1,1]]}"#;
        assert!(serde_json::from_str::<Instance>(bad).is_err());
    }
}
