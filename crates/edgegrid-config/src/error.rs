//! Configuration manager error types.

use thiserror::Error;

/// Errors that can occur while managing configuration categories.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("item {item} not found in category {category}")]
    ItemNotFound { category: String, item: String },

    #[error("state store error: {0}")]
    State(#[from] edgegrid_state::StateError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
