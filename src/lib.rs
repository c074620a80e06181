//! Job-shop scheduling for the U-Engine ecosystem.
//!
//! Builds and improves schedules for the classical job-shop problem: every
//! job is a fixed route of operations, every operation needs one machine
//! exclusively for a fixed duration, and the goal is a minimal makespan.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Instance`, `Task`, `Schedule`, `Violation`
//! - **`validation`**: Input integrity checks (ragged tables, machine bijection)
//! - **`encoding`**: `JobSequence` and `ResourceOrder` encodings and their decoders
//! - **`dispatching`**: Priority rules (SPT, LPT, SRPT, LRPT and EST-gated variants)
//! - **`neighborhood`**: Critical-path blocks and swap moves (Nowicki–Smutnicki)
//! - **`scheduler`**: `Solver` implementations (greedy, exhaustive, descent, tabu) and KPIs
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//! use u_jobshop::models::Instance;
//! use u_jobshop::scheduler::{ExitCause, Solver, TabuSolver};
//!
//! let instance = Arc::new(
//!     Instance::new(
//!         vec![vec![0, 1, 2], vec![1, 0, 2], vec![2, 1, 0]],
//!         vec![vec![3, 2, 2], vec![2, 1, 4], vec![4, 3, 1]],
//!     )
//!     .unwrap(),
//! );
//! let deadline = Instant::now() + Duration::from_secs(1);
//! let solution = TabuSolver::new().solve(&instance, deadline).unwrap();
//! assert!(solution.makespan() >= instance.lower_bound());
//! assert_ne!(solution.exit_cause, ExitCause::ProvedOptimal);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7
//! - Nowicki & Smutnicki (1996), "A Fast Taboo Search Algorithm for the Job Shop Problem"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

pub mod dispatching;
pub mod encoding;
pub mod error;
pub mod models;
pub mod neighborhood;
pub mod scheduler;
pub mod validation;

pub use error::{JobShopError, Result};
