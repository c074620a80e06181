//! Operation-sequence encoding.
//!
//! A flat sequence of `num_jobs * num_tasks` job ids. The k-th occurrence
//! of job `j` stands for the k-th operation of `j`, and the sequence order
//! is the global dispatch order.
//!
//! # Reference
//! Bierwirth (1995), "A generalized permutation approach to JSSP"

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{JobShopError, Result};
use crate::models::{Instance, Schedule, Task, Time};

/// Job-number encoding of a candidate solution.
///
/// May be partially filled; [`next_to_set`](Self::next_to_set) is the number
/// of entries already set. Only a complete sequence can be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSequence {
    instance: Arc<Instance>,
    jobs: Vec<usize>,
}

impl JobSequence {
    /// Creates an empty sequence.
    pub fn new(instance: Arc<Instance>) -> Self {
        let capacity = instance.num_operations();
        Self {
            instance,
            jobs: Vec::with_capacity(capacity),
        }
    }

    /// Wraps an existing sequence without checking it. [`decode`](Self::decode)
    /// reports any malformation.
    pub fn from_jobs(instance: Arc<Instance>, jobs: Vec<usize>) -> Self {
        Self { instance, jobs }
    }

    /// Creates a random complete sequence.
    pub fn random<R: Rng>(instance: Arc<Instance>, rng: &mut R) -> Self {
        let num_tasks = instance.num_tasks();
        let mut jobs: Vec<usize> = (0..instance.num_jobs())
            .flat_map(|job| std::iter::repeat(job).take(num_tasks))
            .collect();
        jobs.shuffle(rng);
        Self { instance, jobs }
    }

    /// Builds the canonical sequence of a schedule.
    ///
    /// Job ids follow [`Schedule::dispatch_order`]: by start time, then end
    /// time, then job index, always keeping an order the decoder replays.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let instance = Arc::clone(schedule.instance());
        let jobs = schedule.dispatch_order().into_iter().map(|t| t.job).collect();
        Self { instance, jobs }
    }

    /// Appends one job id.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if the sequence is full, the job is
    /// unknown, or the job already has all its operations placed.
    pub fn push(&mut self, job: usize) -> Result<()> {
        if self.is_complete() {
            return Err(JobShopError::InvalidEncoding(
                "job sequence is already full".into(),
            ));
        }
        if job >= self.instance.num_jobs() {
            return Err(JobShopError::InvalidEncoding(format!("unknown job {job}")));
        }
        let placed = self.jobs.iter().filter(|&&j| j == job).count();
        if placed >= self.instance.num_tasks() {
            return Err(JobShopError::InvalidEncoding(format!(
                "job {job} already has {placed} operations placed"
            )));
        }
        self.jobs.push(job);
        Ok(())
    }

    /// The instance this sequence encodes a solution for.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// The job ids set so far.
    pub fn jobs(&self) -> &[usize] {
        &self.jobs
    }

    /// Index of the first unset entry.
    #[inline]
    pub fn next_to_set(&self) -> usize {
        self.jobs.len()
    }

    /// Whether every entry is set.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.jobs.len() == self.instance.num_operations()
    }

    /// Decodes into the semi-active schedule of this dispatch order.
    ///
    /// Single left-to-right pass: each operation starts as soon as both its
    /// job predecessor and its machine are free.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if the sequence has the wrong length,
    /// names an unknown job, repeats a job more than `num_tasks` times, or a
    /// completion time overflows.
    pub fn decode(&self) -> Result<Schedule> {
        let inst = &self.instance;
        let expected = inst.num_operations();
        if self.jobs.len() != expected {
            return Err(JobShopError::InvalidEncoding(format!(
                "job sequence has {} entries, expected {expected}",
                self.jobs.len()
            )));
        }

        let mut next_pos = vec![0usize; inst.num_jobs()];
        let mut job_free: Vec<Time> = vec![0; inst.num_jobs()];
        let mut machine_free: Vec<Time> = vec![0; inst.num_machines()];
        let mut start_times = vec![vec![0; inst.num_tasks()]; inst.num_jobs()];

        for &job in &self.jobs {
            if job >= inst.num_jobs() {
                return Err(JobShopError::InvalidEncoding(format!("unknown job {job}")));
            }
            let pos = next_pos[job];
            if pos >= inst.num_tasks() {
                return Err(JobShopError::InvalidEncoding(format!(
                    "job {job} appears more than {} times",
                    inst.num_tasks()
                )));
            }

            let machine = inst.machine(job, pos);
            let start = job_free[job].max(machine_free[machine]);
            let end = start.checked_add(inst.duration(job, pos)).ok_or_else(|| {
                JobShopError::InvalidEncoding(format!(
                    "{} ends past the time range",
                    Task::new(job, pos)
                ))
            })?;
            start_times[job][pos] = start;
            job_free[job] = end;
            machine_free[machine] = end;
            next_pos[job] = pos + 1;
        }

        Ok(Schedule::from_parts(Arc::clone(inst), start_times))
    }
}

impl std::fmt::Display for JobSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.jobs)
    }
}
