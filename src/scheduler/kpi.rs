//! Schedule quality metrics (KPIs).
//!
//! Computes standard scheduling performance indicators from a decoded
//! schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Lower Bound | max(longest job, busiest machine) |
//! | Gap | (C_max - LB) / LB |
//! | Avg Utilization | Mean machine busyness over [0, C_max) |
//! | Total Idle Time | Sum of machine gaps within [0, C_max) |
//! | Avg Flow Time | Mean job completion time |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::Serialize;

use crate::models::{Schedule, Task, Time};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleKpi {
    /// Makespan: latest completion time.
    pub makespan: Time,
    /// Instance lower bound on the makespan.
    pub lower_bound: Time,
    /// Relative distance to the lower bound (0.0 means provably optimal).
    pub gap: f64,
    /// Average machine utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Utilization per machine, indexed by machine id.
    pub utilization_by_machine: Vec<f64>,
    /// Machine time left unused before the makespan, summed over machines.
    pub total_idle_time: Time,
    /// Mean completion time of the jobs.
    pub avg_flow_time: f64,
}

impl ScheduleKpi {
    /// Computes KPIs of a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let instance = schedule.instance();
        let makespan = schedule.makespan();
        let lower_bound = instance.lower_bound();

        let utilization_by_machine: Vec<f64> = (0..instance.num_machines())
            .map(|m| {
                if makespan == 0 {
                    0.0
                } else {
                    instance.machine_load(m) as f64 / makespan as f64
                }
            })
            .collect();
        let avg_utilization = if utilization_by_machine.is_empty() {
            0.0
        } else {
            utilization_by_machine.iter().sum::<f64>() / utilization_by_machine.len() as f64
        };

        let total_idle_time = (0..instance.num_machines())
            .map(|m| makespan.saturating_sub(instance.machine_load(m)))
            .fold(0 as Time, Time::saturating_add);

        let last = instance.num_tasks().saturating_sub(1);
        let total_flow: f64 = (0..instance.num_jobs())
            .map(|j| schedule.end_time(Task::new(j, last)) as f64)
            .sum();
        let avg_flow_time = if instance.num_jobs() == 0 {
            0.0
        } else {
            total_flow / instance.num_jobs() as f64
        };

        let gap = if lower_bound == 0 {
            0.0
        } else {
            makespan.saturating_sub(lower_bound) as f64 / lower_bound as f64
        };

        Self {
            makespan,
            lower_bound,
            gap,
            avg_utilization,
            utilization_by_machine,
            total_idle_time,
            avg_flow_time,
        }
    }

    /// Whether the makespan reaches the lower bound, which proves optimality.
    pub fn is_at_lower_bound(&self) -> bool {
        self.makespan == self.lower_bound
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_gap: f64, min_utilization: f64) -> bool {
        self.gap <= max_gap && self.avg_utilization >= min_utilization
    }
}
