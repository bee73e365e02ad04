//! edgegrid-registry — registry of live service instances.
//!
//! Running services register themselves at startup and report status
//! changes as they go. Entries stay visible after shutdown until they
//! are explicitly purged.
//!
//! # Status lifecycle
//!
//! ```text
//! Starting ──▶ Running ──▶ ShuttingDown ──▶ Shutdown ──▶ (purged)
//!    │            │              ▲              ▲
//!    │            └──▶ Failed ───┴──────────────┤
//!    └──────────────────────────────────────────┘
//! ```

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{RegistryEntry, ServiceRegistry, ServiceStatus};
