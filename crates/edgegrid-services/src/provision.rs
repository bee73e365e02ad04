//! ProvisioningCoordinator — create a managed service.
//!
//! Steps, after validation, plugin resolution and the uniqueness guard:
//!
//! 1. Ensure the plugin's process class exists
//! 2. Create the service category, the umbrella category, and link them
//! 3. Apply caller overrides to the service category
//! 4. Save the startup schedule, activating it if requested
//!
//! A failure in steps 2–4 rolls back the service's configuration before
//! the original error is returned.

use std::sync::Arc;

use tracing::{debug, error, info};

use edge_core::ConfigSchema;
use edgegrid_plugins::PluginDescriptor;
use edgegrid_state::{ScheduleId, ScheduleRecord};

use crate::collaborators::{Configuration, Plugins, Schedules};
use crate::compensation::compensate;
use crate::error::{
    ALREADY_EXISTS, CREATE_CONFIG_FAILED, CREATE_SERVICE_FAILED, ServiceError, ServiceResult,
};
use crate::validate::{ProvisionRequest, ValidatedRequest};

/// A successfully provisioned service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub name: String,
    pub schedule_id: ScheduleId,
}

/// Orchestrates creation of managed services.
pub struct ProvisioningCoordinator {
    plugins: Arc<dyn Plugins>,
    schedules: Arc<dyn Schedules>,
    configuration: Arc<dyn Configuration>,
}

impl ProvisioningCoordinator {
    pub fn new(
        plugins: Arc<dyn Plugins>,
        schedules: Arc<dyn Schedules>,
        configuration: Arc<dyn Configuration>,
    ) -> Self {
        Self {
            plugins,
            schedules,
            configuration,
        }
    }

    /// Provision a service.
    ///
    /// Nothing is written until validation, resolution and the uniqueness
    /// guard have passed. The guard and the creation are not atomic; two
    /// concurrent calls for the same name can both pass it.
    pub async fn provision(&self, request: ProvisionRequest) -> ServiceResult<Provisioned> {
        let request = request.validate()?;
        let plugin = self.plugins.resolve(&request.plugin, request.kind).await?;

        let existing = self
            .schedules
            .get_schedule_by_name(&request.name)
            .await
            .map_err(|e| ServiceError::provisioning(CREATE_SERVICE_FAILED, e))?;
        if existing.is_some() {
            info!(name = %request.name, "service already exists");
            return Err(ServiceError::Conflict(ALREADY_EXISTS.to_string()));
        }

        let process_class = plugin.process_class();
        self.schedules
            .ensure_process_class(&process_class, &plugin.launch_script())
            .await
            .map_err(|e| {
                error!(
                    name = %request.name,
                    %process_class,
                    error = %e,
                    "process class registration failed"
                );
                ServiceError::provisioning(CREATE_SERVICE_FAILED, e)
            })?;
        debug!(name = %request.name, %process_class, "process class ensured");

        match self.commit(&request, &plugin).await {
            Ok(schedule_id) => {
                info!(
                    name = %request.name,
                    plugin = %request.plugin,
                    kind = %request.kind,
                    %schedule_id,
                    enabled = request.enabled,
                    "service provisioned"
                );
                Ok(Provisioned {
                    name: request.name,
                    schedule_id,
                })
            }
            Err(err) => {
                error!(name = %request.name, error = %err, "provisioning failed, rolling back");
                let report =
                    compensate(self.configuration.as_ref(), &request.name, request.kind).await;
                Err(err.with_compensation(report))
            }
        }
    }

    /// The steps that are rolled back on failure.
    async fn commit(
        &self,
        request: &ValidatedRequest,
        plugin: &PluginDescriptor,
    ) -> ServiceResult<ScheduleId> {
        let name = &request.name;
        let umbrella = request.kind.umbrella_category();
        let config_failed = |e: anyhow::Error| ServiceError::provisioning(CREATE_CONFIG_FAILED, e);

        self.configuration
            .create_category(name, &plugin.description, &plugin.schema, true)
            .await
            .map_err(config_failed)?;
        self.configuration
            .create_category(
                umbrella,
                request.kind.umbrella_description(),
                &ConfigSchema::new(),
                true,
            )
            .await
            .map_err(config_failed)?;
        self.configuration
            .create_child_category(umbrella, std::slice::from_ref(name))
            .await
            .map_err(config_failed)?;
        debug!(%name, %umbrella, "service category created");

        for (item, value) in &request.overrides {
            self.configuration
                .set_item_value(name, item, value)
                .await
                .map_err(config_failed)?;
            debug!(%name, %item, "override applied");
        }

        let record = ScheduleRecord::startup(name, &plugin.process_class());
        let schedule_id = self
            .schedules
            .save_schedule(record, request.enabled)
            .await
            .map_err(|e| ServiceError::provisioning(CREATE_SERVICE_FAILED, e))?;
        debug!(%name, %schedule_id, "schedule saved");
        Ok(schedule_id)
    }
}
