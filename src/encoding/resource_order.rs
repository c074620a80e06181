//! Machine-order encoding.
//!
//! For every machine, the order in which its `num_jobs` operations run.
//! Machine rows are shared behind `Arc`s: cloning an order is cheap and
//! [`ResourceOrder::swap`] copies only the row it touches.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 7.2 (disjunctive graph selections)

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{JobShopError, Result};
use crate::models::{Instance, Schedule, Task, Time};

/// Resource-order encoding of a candidate solution.
///
/// May be partially filled; [`next_free_slot`](Self::next_free_slot) is the
/// number of operations already placed on a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOrder {
    instance: Arc<Instance>,
    machines: Vec<Arc<Vec<Task>>>,
}

impl ResourceOrder {
    /// Creates an empty order.
    pub fn new(instance: Arc<Instance>) -> Self {
        let machines = (0..instance.num_machines())
            .map(|_| Arc::new(Vec::with_capacity(instance.num_jobs())))
            .collect();
        Self { instance, machines }
    }

    /// Wraps explicit machine rows without checking them. [`decode`](Self::decode)
    /// reports any malformation.
    pub fn from_machine_orders(instance: Arc<Instance>, orders: Vec<Vec<Task>>) -> Self {
        Self {
            instance,
            machines: orders.into_iter().map(Arc::new).collect(),
        }
    }

    /// Builds the canonical order of a schedule.
    ///
    /// Each machine's row follows [`Schedule::dispatch_order`], so a decoded
    /// schedule round-trips exactly, zero-length operations included.
    pub fn from_schedule(schedule: &Schedule) -> Self {
        let instance = Arc::clone(schedule.instance());
        let mut rows = vec![Vec::with_capacity(instance.num_jobs()); instance.num_machines()];
        for task in schedule.dispatch_order() {
            rows[instance.machine_of(task)].push(task);
        }
        Self::from_machine_orders(instance, rows)
    }

    /// Appends a task to the row of the machine it runs on.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if the task is unknown or its
    /// machine row is already full.
    pub fn push(&mut self, task: Task) -> Result<()> {
        if !self.instance.contains(task) {
            return Err(JobShopError::InvalidEncoding(format!("unknown task {task}")));
        }
        let machine = self.instance.machine_of(task);
        let num_jobs = self.instance.num_jobs();
        let row = Arc::make_mut(&mut self.machines[machine]);
        if row.len() >= num_jobs {
            return Err(JobShopError::InvalidEncoding(format!(
                "machine {machine} is already full"
            )));
        }
        row.push(task);
        Ok(())
    }

    /// Exchanges two slots of one machine row.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if the machine or a slot is out of range.
    pub fn swap(&mut self, machine: usize, slot1: usize, slot2: usize) -> Result<()> {
        let len = self.machines.get(machine).map(|row| row.len()).ok_or_else(|| {
            JobShopError::InvalidEncoding(format!("unknown machine {machine}"))
        })?;
        if slot1 >= len || slot2 >= len {
            return Err(JobShopError::InvalidEncoding(format!(
                "slots ({slot1}, {slot2}) out of range on machine {machine}"
            )));
        }
        Arc::make_mut(&mut self.machines[machine]).swap(slot1, slot2);
        Ok(())
    }

    /// The instance this order encodes a solution for.
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Operations placed on a machine so far, in order.
    pub fn tasks_on(&self, machine: usize) -> &[Task] {
        &self.machines[machine]
    }

    /// The task in a given slot, if set.
    pub fn task_at(&self, machine: usize, slot: usize) -> Option<Task> {
        self.machines.get(machine)?.get(slot).copied()
    }

    /// Number of slots already filled on a machine.
    #[inline]
    pub fn next_free_slot(&self, machine: usize) -> usize {
        self.machines[machine].len()
    }

    /// Whether every machine row is full.
    pub fn is_complete(&self) -> bool {
        let num_jobs = self.instance.num_jobs();
        self.machines.len() == self.instance.num_machines()
            && self.machines.iter().all(|row| row.len() == num_jobs)
    }

    /// Slot index of every task: `slots[job][pos]`.
    pub(crate) fn slot_table(&self) -> Vec<Vec<usize>> {
        let mut slots = vec![vec![0; self.instance.num_tasks()]; self.instance.num_jobs()];
        for row in &self.machines {
            for (slot, task) in row.iter().enumerate() {
                if self.instance.contains(*task) {
                    slots[task.job][task.pos] = slot;
                }
            }
        }
        slots
    }

    /// Critical path of `schedule`, taking machine predecessors from these
    /// rows rather than from start times.
    ///
    /// `schedule` must be the decode of this order. Every machine arc on the
    /// returned path then joins adjacent slots of one row.
    pub fn critical_path(&self, schedule: &Schedule) -> Vec<Task> {
        let slots = self.slot_table();
        schedule.critical_path_with(|task| {
            let slot = slots[task.job][task.pos].checked_sub(1)?;
            self.task_at(self.instance.machine_of(task), slot)
        })
    }

    /// Decodes into the semi-active schedule of these machine orders.
    ///
    /// Repeated sweeps over the machines: a machine's next operation is
    /// scheduled once it is also its job's next operation. A sweep that
    /// schedules nothing means the orders deadlock.
    ///
    /// # Errors
    /// [`JobShopError::InvalidEncoding`] if a row has the wrong length, holds
    /// a task of another machine or a duplicate, the orders are cyclic, or a
    /// completion time overflows.
    pub fn decode(&self) -> Result<Schedule> {
        self.check_rows()?;

        let inst = &self.instance;
        let mut next_slot = vec![0usize; inst.num_machines()];
        let mut next_pos = vec![0usize; inst.num_jobs()];
        let mut job_free: Vec<Time> = vec![0; inst.num_jobs()];
        let mut machine_free: Vec<Time> = vec![0; inst.num_machines()];
        let mut start_times = vec![vec![0; inst.num_tasks()]; inst.num_jobs()];
        let mut remaining = inst.num_operations();

        while remaining > 0 {
            let mut progressed = false;
            for (machine, row) in self.machines.iter().enumerate() {
                let Some(&task) = row.get(next_slot[machine]) else {
                    continue;
                };
                if task.pos != next_pos[task.job] {
                    continue;
                }

                let start = job_free[task.job].max(machine_free[machine]);
                let end = start.checked_add(inst.duration_of(task)).ok_or_else(|| {
                    JobShopError::InvalidEncoding(format!("{task} ends past the time range"))
                })?;
                start_times[task.job][task.pos] = start;
                job_free[task.job] = end;
                machine_free[machine] = end;
                next_pos[task.job] += 1;
                next_slot[machine] += 1;
                remaining -= 1;
                progressed = true;
            }

            if !progressed {
                return Err(JobShopError::InvalidEncoding(format!(
                    "machine orders are cyclic: {remaining} operations deadlocked"
                )));
            }
        }

        Ok(Schedule::from_parts(Arc::clone(inst), start_times))
    }

    fn check_rows(&self) -> Result<()> {
        let inst = &self.instance;
        if self.machines.len() != inst.num_machines() {
            return Err(JobShopError::InvalidEncoding(format!(
                "resource order has {} machine rows, expected {}",
                self.machines.len(),
                inst.num_machines()
            )));
        }

        let mut seen = HashSet::with_capacity(inst.num_operations());
        for (machine, row) in self.machines.iter().enumerate() {
            if row.len() != inst.num_jobs() {
                return Err(JobShopError::InvalidEncoding(format!(
                    "machine {machine} has {} slots filled, expected {}",
                    row.len(),
                    inst.num_jobs()
                )));
            }
            for &task in row.iter() {
                if !inst.contains(task) || inst.machine_of(task) != machine {
                    return Err(JobShopError::InvalidEncoding(format!(
                        "task {task} does not run on machine {machine}"
                    )));
                }
                if !seen.insert(task) {
                    return Err(JobShopError::InvalidEncoding(format!(
                        "task {task} appears twice"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ResourceOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (machine, row) in self.machines.iter().enumerate() {
            write!(f, "Machine {machine}:")?;
            for task in row.iter() {
                write!(f, " {task}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::JobSequence;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    // J0: m0(3) → m1(2); J1: m1(2) → m0(3)
    fn instance() -> Arc<Instance> {
        Arc::new(Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![3, 2], vec![2, 3]]).unwrap())
    }

    fn order(m0: [Task; 2], m1: [Task; 2]) -> ResourceOrder {
        ResourceOrder::from_machine_orders(instance(), vec![m0.to_vec(), m1.to_vec()])
    }

    #[test]
    fn test_decode() {
        let ro = order(
            [Task::new(0, 0), Task::new(1, 1)],
            [Task::new(1, 0), Task::new(0, 1)],
        );
        let s = ro.decode().unwrap();
        assert_eq!(s.start_times(), &[vec![0, 3], vec![0, 3]]);
        assert_eq!(s.makespan(), 6);
    }

    #[test]
    fn test_decode_cyclic_order() {
        // m0 wants J1 first, but J1 reaches m0 only after m1, where J0 goes first
        let ro = order(
            [Task::new(1, 1), Task::new(0, 0)],
            [Task::new(0, 1), Task::new(1, 0)],
        );
        let err = ro.decode().unwrap_err();
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn test_decode_rejects_malformed_rows() {
        let wrong_machine = order(
            [Task::new(0, 1), Task::new(1, 1)],
            [Task::new(1, 0), Task::new(0, 0)],
        );
        assert!(wrong_machine.decode().is_err());

        let duplicate = order(
            [Task::new(0, 0), Task::new(0, 0)],
            [Task::new(1, 0), Task::new(0, 1)],
        );
        assert!(duplicate.decode().unwrap_err().to_string().contains("twice"));

        let partial = ResourceOrder::new(instance());
        assert!(partial.decode().is_err());
    }

    #[test]
    fn test_push_tracks_slots() {
        let mut ro = ResourceOrder::new(instance());
        ro.push(Task::new(0, 0)).unwrap();
        assert_eq!(ro.next_free_slot(0), 1);
        assert_eq!(ro.next_free_slot(1), 0);
        ro.push(Task::new(1, 1)).unwrap();
        assert!(ro.push(Task::new(0, 0)).is_err());
        assert!(ro.push(Task::new(3, 0)).is_err());
        ro.push(Task::new(1, 0)).unwrap();
        assert!(!ro.is_complete());
        ro.push(Task::new(0, 1)).unwrap();
        assert!(ro.is_complete());
        assert_eq!(ro.task_at(0, 1), Some(Task::new(1, 1)));
        assert_eq!(ro.task_at(0, 2), None);
        assert_eq!(ro.decode().unwrap().makespan(), 6);
    }

    #[test]
    fn test_swap_copies_on_write() {
        let original = order(
            [Task::new(0, 0), Task::new(1, 1)],
            [Task::new(1, 0), Task::new(0, 1)],
        );
        let mut copy = original.clone();
        copy.swap(1, 0, 1).unwrap();
        assert_eq!(copy.tasks_on(1), &[Task::new(0, 1), Task::new(1, 0)]);
        assert_eq!(original.tasks_on(1), &[Task::new(1, 0), Task::new(0, 1)]);
        assert!(Arc::ptr_eq(&original.machines[0], &copy.machines[0]));
        assert!(copy.swap(1, 0, 2).is_err());
        assert!(copy.swap(4, 0, 1).is_err());
    }

    #[test]
    fn test_from_schedule_roundtrip() {
        let mut rng = SmallRng::seed_from_u64(11);
        let inst = Arc::new(Instance::random(4, 5, 12, &mut rng));
        for _ in 0..20 {
            let s = JobSequence::random(Arc::clone(&inst), &mut rng).decode().unwrap();
            let ro = ResourceOrder::from_schedule(&s);
            assert!(ro.is_complete());
            assert_eq!(ro.decode().unwrap(), s);
        }
    }

    #[test]
    fn test_from_schedule_roundtrip_zero_lengths() {
        let mut rng = SmallRng::seed_from_u64(29);
        for _ in 0..10 {
            let inst = Arc::new(Instance::random_with_durations(4, 5, 0..=2, &mut rng));
            for _ in 0..10 {
                let s = JobSequence::random(Arc::clone(&inst), &mut rng).decode().unwrap();
                assert_eq!(ResourceOrder::from_schedule(&s).decode().unwrap(), s);
            }
        }
    }

    #[test]
    fn test_from_schedule_orders_tied_zero_lengths() {
        // J0: m0(0) → m1(1); J1: m1(5) → m0(0). J1 holds m0 until 5, so its
        // zero-length op goes first even though J0 has the lower index.
        let inst = Arc::new(
            Instance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![0, 1], vec![5, 0]]).unwrap(),
        );
        let s = JobSequence::from_jobs(Arc::clone(&inst), vec![1, 1, 0, 0])
            .decode()
            .unwrap();
        assert_eq!(s.start_times(), &[vec![5, 5], vec![0, 5]]);

        let ro = ResourceOrder::from_schedule(&s);
        assert_eq!(ro.tasks_on(0), &[Task::new(1, 1), Task::new(0, 0)]);
        assert_eq!(ro.decode().unwrap(), s);
    }

    #[test]
    fn test_critical_path_follows_rows() {
        // J0: m0(0) → m1(1); J1: m0(0) → m1(5); J1 first on both machines.
        // Both zero-length ops start at 0, so start times cannot tell their order.
        let inst = Arc::new(
            Instance::new(vec![vec![0, 1], vec![0, 1]], vec![vec![0, 1], vec![0, 5]]).unwrap(),
        );
        let ro = ResourceOrder::from_machine_orders(
            inst,
            vec![
                vec![Task::new(1, 0), Task::new(0, 0)],
                vec![Task::new(1, 1), Task::new(0, 1)],
            ],
        );
        let s = ro.decode().unwrap();
        assert_eq!(s.makespan(), 6);
        assert_eq!(
            ro.critical_path(&s),
            vec![Task::new(1, 0), Task::new(1, 1), Task::new(0, 1)]
        );
    }

    #[test]
    fn test_decoders_agree() {
        let mut rng = SmallRng::seed_from_u64(5);
        let inst = Arc::new(Instance::random(3, 4, 8, &mut rng));
        for _ in 0..20 {
            let seq = JobSequence::random(Arc::clone(&inst), &mut rng);
            let from_seq = seq.decode().unwrap();
            let ro = ResourceOrder::from_schedule(&from_seq);
            assert_eq!(ro.decode().unwrap().makespan(), from_seq.makespan());
        }
    }

    #[test]
    fn test_display() {
        let ro = order(
            [Task::new(0, 0), Task::new(1, 1)],
            [Task::new(1, 0), Task::new(0, 1)],
        );
        assert_eq!(
            ro.to_string(),
            "Machine 0: (0, 0) (1, 1)\nMachine 1: (1, 0) (0, 1)\n"
        );
    }
}
