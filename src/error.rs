use thiserror::Error;

/// Errors raised by the job-shop core.
///
/// Both kinds are local: a failed decode never corrupts the state of the
/// solver that attempted it, and an infeasible instance is rejected before
/// any solver sees it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobShopError {
    /// A candidate solution is malformed or its precedence graph is cyclic.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The problem definition violates the one-visit-per-machine invariant.
    #[error("Infeasible instance: {0}")]
    InfeasibleInstance(String),
}

pub type Result<T> = std::result::Result<T, JobShopError>;
