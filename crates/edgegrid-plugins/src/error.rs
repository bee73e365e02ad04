//! Plugin resolution error types.

use edge_core::ServiceKind;
use thiserror::Error;

/// Errors that can occur while resolving a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin {plugin} not found for {kind} services")]
    NotFound { plugin: String, kind: ServiceKind },

    /// The plugin exists but declares a different kind. A client error.
    #[error("plugin {plugin} declares {declared} type, {requested} was requested")]
    KindMismatch {
        plugin: String,
        declared: String,
        requested: ServiceKind,
    },

    #[error("failed to load plugin {plugin}: {reason}")]
    Load { plugin: String, reason: String },
}

impl PluginError {
    pub(crate) fn load(plugin: &str, reason: impl ToString) -> Self {
        PluginError::Load {
            plugin: plugin.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
