//! edgegrid-state — embedded state store for edgegrid.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for schedules, scheduler process classes, configuration
//! categories and the parent/child links between categories.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns.
//! Category links use the composite key `{parent}/{child}`; `/` is a
//! reserved character in category names so the split is unambiguous.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
