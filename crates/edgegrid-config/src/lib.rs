//! edgegrid-config — configuration categories for edgegrid services.
//!
//! A category is a named bundle of configuration items. Categories form a
//! hierarchy through parent/child links; every service category hangs off
//! the umbrella category of its kind (`Ingest`, `Export`).
//!
//! The `ConfigurationManager` keeps a read-through cache of categories in
//! front of the state store. Deleting a category evicts it from the cache.

pub mod error;
pub mod manager;

pub use error::{ConfigError, ConfigResult};
pub use manager::ConfigurationManager;
