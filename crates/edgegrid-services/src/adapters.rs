//! Collaborator implementations for the edgegrid subsystems.

use async_trait::async_trait;

use edge_core::{ConfigSchema, ServiceKind};
use edgegrid_config::ConfigurationManager;
use edgegrid_plugins::{PluginDescriptor, PluginResolver, PluginResult};
use edgegrid_registry::{RegistryEntry, ServiceRegistry, ServiceStatus};
use edgegrid_scheduler::Scheduler;
use edgegrid_state::{ScheduleId, ScheduleRecord};

use crate::collaborators::{Configuration, Plugins, Registry, Schedules};

#[async_trait]
impl Schedules for Scheduler {
    async fn ensure_process_class(&self, name: &str, script: &[String]) -> anyhow::Result<()> {
        Scheduler::ensure_process_class(self, name, script).await?;
        Ok(())
    }

    async fn save_schedule(
        &self,
        record: ScheduleRecord,
        activate: bool,
    ) -> anyhow::Result<ScheduleId> {
        Ok(Scheduler::save_schedule(self, record, activate).await?)
    }

    async fn get_schedule_by_name(&self, name: &str) -> anyhow::Result<Option<ScheduleRecord>> {
        Ok(Scheduler::get_schedule_by_name(self, name).await?)
    }

    async fn disable_schedule(&self, id: &str) -> anyhow::Result<()> {
        Scheduler::disable_schedule(self, id).await?;
        Ok(())
    }

    async fn delete_schedule(&self, id: &str) -> anyhow::Result<()> {
        Scheduler::delete_schedule(self, id).await?;
        Ok(())
    }
}

#[async_trait]
impl Configuration for ConfigurationManager {
    async fn create_category(
        &self,
        name: &str,
        description: &str,
        schema: &ConfigSchema,
        keep_original_items: bool,
    ) -> anyhow::Result<()> {
        ConfigurationManager::create_category(self, name, description, schema, keep_original_items)
            .await?;
        Ok(())
    }

    async fn create_child_category(&self, parent: &str, children: &[String]) -> anyhow::Result<()> {
        ConfigurationManager::create_child_category(self, parent, children).await?;
        Ok(())
    }

    async fn set_item_value(&self, category: &str, item: &str, value: &str) -> anyhow::Result<()> {
        Ok(ConfigurationManager::set_item_value(self, category, item, value).await?)
    }

    async fn delete_category(&self, name: &str) -> anyhow::Result<()> {
        ConfigurationManager::delete_category(self, name).await?;
        Ok(())
    }

    async fn delete_child_link(&self, parent: &str, child: &str) -> anyhow::Result<()> {
        ConfigurationManager::delete_child_link(self, parent, child).await?;
        Ok(())
    }

    async fn delete_child_links(&self, parent: &str) -> anyhow::Result<()> {
        ConfigurationManager::delete_child_links(self, parent).await?;
        Ok(())
    }
}

#[async_trait]
impl Registry for ServiceRegistry {
    async fn find(&self, name: &str) -> anyhow::Result<Vec<RegistryEntry>> {
        Ok(ServiceRegistry::find(self, name).await)
    }

    async fn status_of(&self, id: &str) -> anyhow::Result<Option<ServiceStatus>> {
        Ok(self.get(id).await.map(|entry| entry.status))
    }

    async fn purge(&self, id: &str) -> anyhow::Result<()> {
        ServiceRegistry::purge(self, id).await;
        Ok(())
    }
}

#[async_trait]
impl Plugins for PluginResolver {
    async fn resolve(&self, plugin: &str, kind: ServiceKind) -> PluginResult<PluginDescriptor> {
        PluginResolver::resolve(self, plugin, kind).await
    }
}
