//! Job-shop domain models.
//!
//! Provides the core data types for representing job-shop problems and
//! their solutions.
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Computing | Logistics |
//! |-----------|--------------|-----------|-----------|
//! | Instance | Shop floor order book | Batch of pipelines | Dispatch plan |
//! | Task | Operation of a job | Pipeline stage | Transport leg |
//! | Machine | Machine | Worker node | Dock/Truck |
//! | Schedule | Production plan | Execution timeline | Route plan |

mod instance;
mod schedule;
mod task;

pub use instance::Instance;
pub use schedule::{Schedule, Violation, ViolationType};
pub use task::Task;

/// Time unit used for durations and start times.
///
/// Unitless: the consumer decides whether one tick is a second, a minute
/// or a shift slot.
pub type Time = u64;
