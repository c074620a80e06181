//! Input validation for job-shop instances.
//!
//! Checks structural integrity of raw instance tables before an
//! [`Instance`](crate::models::Instance) is built. Detects:
//! - Empty instances (no jobs or no machines)
//! - Ragged tables (routes of different lengths, duration rows that do not
//!   match their route)
//! - Machine references outside `0..num_machines`
//! - Routes that visit a machine twice (the route must be a bijection
//!   between positions and machines)
//! - Total processing time beyond the `Time` range, which bounds every
//!   completion time of a semi-active schedule
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7.1

use std::collections::HashSet;

use crate::models::Time;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The instance has no jobs or no machines.
    EmptyInstance,
    /// A route or duration row has the wrong length.
    ShapeMismatch,
    /// A route references a machine that doesn't exist.
    InvalidMachineReference,
    /// A route visits the same machine more than once.
    DuplicateMachine,
    /// The durations sum past `Time::MAX`.
    DurationOverflow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the raw tables of a job-shop instance.
///
/// `machines[j][p]` is the machine of the `p`-th operation of job `j` and
/// `durations[j][p]` its processing time. The number of machines is the
/// length of the first route.
///
/// Checks:
/// 1. At least one job and one machine
/// 2. Every route has `num_machines` entries
/// 3. Every duration row matches its route
/// 4. Every machine id is in range
/// 5. No route visits a machine twice
/// 6. The sum of all durations fits in `Time`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(machines: &[Vec<usize>], durations: &[Vec<Time>]) -> ValidationResult {
    let mut errors = Vec::new();

    let num_machines = machines.first().map(Vec::len).unwrap_or(0);
    if machines.is_empty() || num_machines == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyInstance,
            "Instance has no jobs or no machines",
        ));
        return Err(errors);
    }

    if durations.len() != machines.len() {
        errors.push(ValidationError::new(
            ValidationErrorKind::ShapeMismatch,
            format!(
                "Expected {} duration rows, got {}",
                machines.len(),
                durations.len()
            ),
        ));
    }

    for (job, route) in machines.iter().enumerate() {
        if route.len() != num_machines {
            errors.push(ValidationError::new(
                ValidationErrorKind::ShapeMismatch,
                format!(
                    "Job {job} has {} operations, expected {num_machines}",
                    route.len()
                ),
            ));
        }

        if let Some(row) = durations.get(job) {
            if row.len() != route.len() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ShapeMismatch,
                    format!(
                        "Job {job} has {} durations for {} operations",
                        row.len(),
                        route.len()
                    ),
                ));
            }
        }

        let mut seen = HashSet::new();
        for &machine in route {
            if machine >= num_machines {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidMachineReference,
                    format!("Job {job} references unknown machine {machine}"),
                ));
            } else if !seen.insert(machine) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateMachine,
                    format!("Job {job} visits machine {machine} more than once"),
                ));
            }
        }
    }

    let total = durations
        .iter()
        .flatten()
        .try_fold(0 as Time, |sum, &d| sum.checked_add(d));
    if total.is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::DurationOverflow,
            "Total processing time exceeds the time range",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
