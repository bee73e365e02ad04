//! Service registry error types.

use thiserror::Error;

use crate::registry::ServiceStatus;

/// Errors that can occur while registering or updating services.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("service already registered: {0}")]
    AlreadyExists(String),

    #[error("address {0} already in use by another service")]
    PortInUse(String),

    #[error("service not registered: {0}")]
    NotRegistered(String),

    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition { from: ServiceStatus, to: ServiceStatus },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
