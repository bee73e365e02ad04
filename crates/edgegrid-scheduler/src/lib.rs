//! edgegrid-scheduler — schedule and process class registry.
//!
//! Holds the records the execution engine dispatches from. This crate
//! owns their lifecycle only:
//!
//! - Registers process classes (launch entry points shared by services)
//! - Saves schedules, assigning identifiers and optionally activating them
//! - Enables, disables and deletes schedules
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── StateStore (SCHEDULES, PROCESS_CLASSES tables)
//!   └── write lock (serializes read-modify-write of a record)
//! ```

pub mod error;
pub mod scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::Scheduler;
