//! Candidate-solution encodings and their decoders.
//!
//! Two interconvertible representations of a job-shop solution:
//!
//! - **[`JobSequence`]**: flat dispatch order of job ids. The k-th
//!   occurrence of job `j` is the k-th operation of `j`. Decoded in one
//!   left-to-right pass.
//! - **[`ResourceOrder`]**: per-machine operation order. Decoded by a
//!   fixed-point sweep that detects cyclic (deadlocked) orders.
//!
//! Both are built empty and filled slot by slot, or derived from a
//! [`Schedule`] in canonical order (earliest start first, lowest job on ties).
//!
//! # Reference
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"
//! - Cheng et al. (1996), "A Tutorial Survey of JSSP using GA"

mod job_sequence;
mod resource_order;

pub use job_sequence::JobSequence;
pub use resource_order::ResourceOrder;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Instance, Schedule};

/// Which encoding a solver works with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    /// Flat job-id dispatch order.
    #[default]
    JobSequence,
    /// Per-machine operation order.
    ResourceOrder,
}

/// A candidate solution in either encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// Flat job-id dispatch order.
    JobSequence(JobSequence),
    /// Per-machine operation order.
    ResourceOrder(ResourceOrder),
}

impl Encoding {
    /// Builds the canonical encoding of a schedule.
    pub fn from_schedule(kind: EncodingKind, schedule: &Schedule) -> Self {
        match kind {
            EncodingKind::JobSequence => Self::JobSequence(JobSequence::from_schedule(schedule)),
            EncodingKind::ResourceOrder => {
                Self::ResourceOrder(ResourceOrder::from_schedule(schedule))
            }
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> EncodingKind {
        match self {
            Self::JobSequence(_) => EncodingKind::JobSequence,
            Self::ResourceOrder(_) => EncodingKind::ResourceOrder,
        }
    }

    /// The instance this encoding refers to.
    pub fn instance(&self) -> &std::sync::Arc<Instance> {
        match self {
            Self::JobSequence(seq) => seq.instance(),
            Self::ResourceOrder(order) => order.instance(),
        }
    }

    /// Whether every slot is filled.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::JobSequence(seq) => seq.is_complete(),
            Self::ResourceOrder(order) => order.is_complete(),
        }
    }

    /// Decodes into a schedule.
    ///
    /// # Errors
    /// [`crate::JobShopError::InvalidEncoding`] if the encoding is partial,
    /// malformed or cyclic.
    pub fn decode(&self) -> Result<Schedule> {
        match self {
            Self::JobSequence(seq) => seq.decode(),
            Self::ResourceOrder(order) => order.decode(),
        }
    }
}

impl From<JobSequence> for Encoding {
    fn from(seq: JobSequence) -> Self {
        Self::JobSequence(seq)
    }
}

impl From<ResourceOrder> for Encoding {
    fn from(order: ResourceOrder) -> Self {
        Self::ResourceOrder(order)
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JobSequence(seq) => std::fmt::Display::fmt(seq, f),
            Self::ResourceOrder(order) => std::fmt::Display::fmt(order, f),
        }
    }
}
