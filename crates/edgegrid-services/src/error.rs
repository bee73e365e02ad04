//! Lifecycle error taxonomy.
//!
//! Every failure carries a short, stable reason string. The [`ErrorKind`]
//! is what transports map to an outward status.

use std::fmt;

use thiserror::Error;

use edgegrid_plugins::PluginError;

use crate::compensation::CompensationReport;

pub const MISSING_NAME: &str = "Missing name property in payload.";
pub const INVALID_NAME: &str = "Invalid name property in payload.";
pub const MISSING_PLUGIN: &str = "Missing plugin property in payload.";
pub const INVALID_PLUGIN: &str = "Invalid plugin property in payload.";
pub const MISSING_KIND: &str = "Missing type property in payload.";
pub const EXPORT_UNSUPPORTED: &str = "export type is not supported for the time being.";
pub const ONLY_INGEST: &str = "Only ingest type is supported.";
pub const INVALID_ENABLED: &str =
    r#"Only "true", "false", true, false are allowed for value of enabled."#;
pub const PLUGIN_LOAD_FAILED: &str = "Failed to fetch plugin configuration";
pub const ALREADY_EXISTS: &str = "A service with this name already exists.";
pub const CREATE_SERVICE_FAILED: &str = "Failed to create service.";
pub const CREATE_CONFIG_FAILED: &str = "Failed to create plugin configuration.";
pub const MISSING_SERVICE_NAME: &str = "Missing service_name in requested URL";
pub const DOES_NOT_EXIST: &str = "A service with this name does not exist.";
pub const DELETE_SERVICE_FAILED: &str = "Failed to delete service.";
pub const SHUTDOWN_TIMED_OUT: &str = "Timed out waiting for service to shut down.";
pub const SHUTDOWN_CANCELLED: &str = "Shutdown wait cancelled.";

/// Enumerable classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    UnsupportedKind,
    Conflict,
    NotFound,
    ProvisioningFailure,
    DeprovisioningFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::UnsupportedKind => "unsupported_kind",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ProvisioningFailure => "provisioning_failure",
            ErrorKind::DeprovisioningFailure => "deprovisioning_failure",
        };
        f.write_str(s)
    }
}

/// Errors returned by the lifecycle coordinators.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input. Detected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Well-formed but not enabled in this deployment.
    #[error("{0}")]
    UnsupportedKind(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// A dependency failed mid-provisioning. Configuration was rolled back.
    #[error("{reason} ({source})")]
    ProvisioningFailure {
        reason: String,
        #[source]
        source: anyhow::Error,
        /// Outcome of the rollback, when one ran.
        compensation: Option<CompensationReport>,
    },

    /// A dependency failed mid-deprovisioning. Nothing was undone.
    #[error("{reason} ({source})")]
    DeprovisioningFailure {
        reason: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::UnsupportedKind(_) => ErrorKind::UnsupportedKind,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::ProvisioningFailure { .. } => ErrorKind::ProvisioningFailure,
            ServiceError::DeprovisioningFailure { .. } => ErrorKind::DeprovisioningFailure,
        }
    }

    /// The short stable reason, without the underlying cause.
    pub fn reason(&self) -> &str {
        match self {
            ServiceError::Validation(reason)
            | ServiceError::UnsupportedKind(reason)
            | ServiceError::Conflict(reason)
            | ServiceError::NotFound(reason) => reason,
            ServiceError::ProvisioningFailure { reason, .. }
            | ServiceError::DeprovisioningFailure { reason, .. } => reason,
        }
    }

    /// The rollback report attached to a provisioning failure.
    pub fn compensation(&self) -> Option<&CompensationReport> {
        match self {
            ServiceError::ProvisioningFailure { compensation, .. } => compensation.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn validation(reason: &str) -> Self {
        ServiceError::Validation(reason.to_string())
    }

    pub(crate) fn provisioning(reason: &str, source: impl Into<anyhow::Error>) -> Self {
        ServiceError::ProvisioningFailure {
            reason: reason.to_string(),
            source: source.into(),
            compensation: None,
        }
    }

    pub(crate) fn deprovisioning(reason: &str, source: impl Into<anyhow::Error>) -> Self {
        ServiceError::DeprovisioningFailure {
            reason: reason.to_string(),
            source: source.into(),
        }
    }

    /// Attach a rollback report. Other variants are returned unchanged.
    pub(crate) fn with_compensation(self, report: CompensationReport) -> Self {
        match self {
            ServiceError::ProvisioningFailure { reason, source, .. } => {
                ServiceError::ProvisioningFailure {
                    reason,
                    source,
                    compensation: Some(report),
                }
            }
            other => other,
        }
    }
}

impl From<PluginError> for ServiceError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::NotFound { ref plugin, .. } => {
                ServiceError::NotFound(format!("Plugin \"{plugin}\" not found."))
            }
            PluginError::KindMismatch { ref declared, .. } => {
                ServiceError::Validation(format!("Plugin of {declared} type is not supported"))
            }
            PluginError::Load { .. } => ServiceError::provisioning(PLUGIN_LOAD_FAILED, err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
