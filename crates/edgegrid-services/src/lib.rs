//! edgegrid-services — lifecycle orchestration for managed services.
//!
//! Provisioning and deprovisioning each touch three independent
//! subsystems: the scheduler, the configuration store and the live
//! service registry. The coordinators here run those calls as ordered
//! sagas and keep the subsystems consistent when a step fails.
//!
//! # Architecture
//!
//! ```text
//! ProvisioningCoordinator                DeprovisioningCoordinator
//!   ├── Plugins   (resolve)                ├── Schedules     (lookup, disable, delete)
//!   ├── Schedules (guard, class, save)     ├── Configuration (teardown)
//!   └── Configuration (category, links)    └── Registry      (wait for shutdown, purge)
//! ```
//!
//! Collaborators are injected as trait objects; [`adapters`] implements
//! the traits for the concrete edgegrid crates.
//!
//! Provisioning rolls back configuration on any failure after the process
//! class is ensured and reports rollback outcomes as a
//! [`CompensationReport`]. Deprovisioning stops in place on failure.

pub mod adapters;
pub mod collaborators;
pub mod compensation;
pub mod deprovision;
pub mod error;
pub mod provision;
pub mod validate;

#[cfg(test)]
mod testing;

pub use collaborators::{Configuration, Plugins, Registry, Schedules};
pub use compensation::{CompensationAction, CompensationReport, CompensationStep};
pub use deprovision::{DeprovisionOptions, DeprovisioningCoordinator};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use provision::{Provisioned, ProvisioningCoordinator};
pub use validate::{ProvisionRequest, ValidatedRequest};
