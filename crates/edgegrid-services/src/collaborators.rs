//! Contracts the coordinators consume from the rest of the platform.
//!
//! Implementations for the concrete edgegrid subsystems live in
//! [`crate::adapters`].

use async_trait::async_trait;

use edge_core::{ConfigSchema, ServiceKind};
use edgegrid_plugins::{PluginDescriptor, PluginResult};
use edgegrid_registry::{RegistryEntry, ServiceStatus};
use edgegrid_state::{ScheduleId, ScheduleRecord};

/// Schedule and process class registry.
#[async_trait]
pub trait Schedules: Send + Sync {
    /// Register a process class; an existing one is left as is.
    async fn ensure_process_class(&self, name: &str, script: &[String]) -> anyhow::Result<()>;

    /// Save a new schedule, enabling it when `activate` is set.
    async fn save_schedule(&self, record: ScheduleRecord, activate: bool)
    -> anyhow::Result<ScheduleId>;

    async fn get_schedule_by_name(&self, name: &str) -> anyhow::Result<Option<ScheduleRecord>>;

    /// Absent schedules are not an error.
    async fn disable_schedule(&self, id: &str) -> anyhow::Result<()>;

    /// Absent schedules are not an error.
    async fn delete_schedule(&self, id: &str) -> anyhow::Result<()>;
}

/// Configuration categories and their links.
///
/// Deletions never fail because the target is already gone.
#[async_trait]
pub trait Configuration: Send + Sync {
    async fn create_category(
        &self,
        name: &str,
        description: &str,
        schema: &ConfigSchema,
        keep_original_items: bool,
    ) -> anyhow::Result<()>;

    async fn create_child_category(&self, parent: &str, children: &[String]) -> anyhow::Result<()>;

    async fn set_item_value(&self, category: &str, item: &str, value: &str) -> anyhow::Result<()>;

    async fn delete_category(&self, name: &str) -> anyhow::Result<()>;

    async fn delete_child_link(&self, parent: &str, child: &str) -> anyhow::Result<()>;

    async fn delete_child_links(&self, parent: &str) -> anyhow::Result<()>;
}

/// Live service registry.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn find(&self, name: &str) -> anyhow::Result<Vec<RegistryEntry>>;

    /// `None` once the entry has been purged.
    async fn status_of(&self, id: &str) -> anyhow::Result<Option<ServiceStatus>>;

    async fn purge(&self, id: &str) -> anyhow::Result<()>;
}

/// Plugin metadata lookup.
#[async_trait]
pub trait Plugins: Send + Sync {
    async fn resolve(&self, plugin: &str, kind: ServiceKind) -> PluginResult<PluginDescriptor>;
}
