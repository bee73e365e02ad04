//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur during scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("process class not found: {0}")]
    ProcessNotFound(String),

    #[error("schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("enabled schedule cannot be deleted: {0}")]
    DeleteEnabled(String),

    #[error("state store error: {0}")]
    State(#[from] edgegrid_state::StateError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
