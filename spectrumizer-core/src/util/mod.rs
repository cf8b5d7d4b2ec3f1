//! Concurrency helpers.
//!
//! Responsibilities:
//! - Bound the number of simultaneously running tasks (admission gate)
//! - Run a per-item job over a task list on a dedicated worker pool and
//!   aggregate the outcomes (fan-out scheduler)

pub mod gate;
pub mod scheduler;

pub use gate::{AdmissionGate, SlotPermit};
pub use scheduler::{FanOutReport, FanOutScheduler, TaskOutcome};
