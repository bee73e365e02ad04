//! DeprovisioningCoordinator — remove a managed service.
//!
//! Disables and deletes the service's schedule, tears down its
//! configuration, then waits for each live instance to report `Shutdown`
//! before purging it from the registry. A failing step stops the
//! procedure where it is; nothing is undone.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use edge_core::ServiceKind;
use edge_core::config::DeprovisionConfig;
use edgegrid_registry::ServiceStatus;

use crate::collaborators::{Configuration, Registry, Schedules};
use crate::compensation::teardown_actions;
use crate::error::{
    DELETE_SERVICE_FAILED, DOES_NOT_EXIST, MISSING_SERVICE_NAME, SHUTDOWN_CANCELLED,
    SHUTDOWN_TIMED_OUT, ServiceError, ServiceResult,
};

const ALL_KINDS: [ServiceKind; 2] = [ServiceKind::Ingest, ServiceKind::Export];

/// How the shutdown wait behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprovisionOptions {
    /// Delay between status checks.
    pub poll_interval: Duration,
    /// Bound on the wait for each instance. `None` waits indefinitely.
    pub deadline: Option<Duration>,
}

impl Default for DeprovisionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            deadline: None,
        }
    }
}

impl From<&DeprovisionConfig> for DeprovisionOptions {
    fn from(config: &DeprovisionConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            deadline: config.deadline(),
        }
    }
}

/// Orchestrates removal of managed services.
pub struct DeprovisioningCoordinator {
    schedules: Arc<dyn Schedules>,
    configuration: Arc<dyn Configuration>,
    registry: Arc<dyn Registry>,
    options: DeprovisionOptions,
}

impl DeprovisioningCoordinator {
    pub fn new(
        schedules: Arc<dyn Schedules>,
        configuration: Arc<dyn Configuration>,
        registry: Arc<dyn Registry>,
        options: DeprovisionOptions,
    ) -> Self {
        Self {
            schedules,
            configuration,
            registry,
            options,
        }
    }

    pub fn options(&self) -> DeprovisionOptions {
        self.options
    }

    /// Deprovision `name`, waiting as long as the options allow.
    pub async fn deprovision(&self, name: &str) -> ServiceResult<()> {
        self.deprovision_with_cancel(name, CancellationToken::new())
            .await
    }

    /// Deprovision `name`; cancelling `cancel` abandons the shutdown wait.
    ///
    /// Steps already taken when the wait is abandoned stay committed.
    pub async fn deprovision_with_cancel(
        &self,
        name: &str,
        cancel: CancellationToken,
    ) -> ServiceResult<()> {
        if name.trim().is_empty() {
            return Err(ServiceError::validation(MISSING_SERVICE_NAME));
        }

        let schedule = self
            .schedules
            .get_schedule_by_name(name)
            .await
            .map_err(|e| self.failed(name, "schedule lookup", e))?
            .ok_or_else(|| ServiceError::NotFound(DOES_NOT_EXIST.to_string()))?;
        let schedule_id = schedule.id.clone().ok_or_else(|| {
            self.failed(name, "schedule lookup", anyhow::anyhow!("schedule has no id"))
        })?;

        if schedule.enabled {
            self.schedules
                .disable_schedule(&schedule_id)
                .await
                .map_err(|e| self.failed(name, "disable schedule", e))?;
            debug!(%name, %schedule_id, "schedule disabled");
        }
        self.schedules
            .delete_schedule(&schedule_id)
            .await
            .map_err(|e| self.failed(name, "delete schedule", e))?;
        debug!(%name, %schedule_id, "schedule deleted");

        let kind = process_kind(&schedule.process_name);
        let umbrellas = kind.map(|k| vec![k]).unwrap_or_else(|| ALL_KINDS.to_vec());
        for action in teardown_actions(name, &umbrellas) {
            action
                .apply(self.configuration.as_ref())
                .await
                .map_err(|e| self.failed(name, "configuration teardown", e))?;
            debug!(%name, step = %action, "configuration removed");
        }

        let instances = self
            .registry
            .find(name)
            .await
            .map_err(|e| self.failed(name, "registry lookup", e))?;
        if instances.is_empty() {
            debug!(%name, "no registered instance");
        }
        for instance in instances {
            if self.await_shutdown(name, &instance.id, &cancel).await? {
                self.registry
                    .purge(&instance.id)
                    .await
                    .map_err(|e| self.failed(name, "registry purge", e))?;
                debug!(%name, id = %instance.id, "instance purged");
            }
        }

        info!(%name, %schedule_id, "service deprovisioned");
        Ok(())
    }

    /// Wait until the instance reports `Shutdown`.
    ///
    /// Returns `false` if the entry disappeared on its own.
    async fn await_shutdown(
        &self,
        name: &str,
        id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<bool> {
        let poll = self.poll_until_shutdown(name, id);
        let bounded = async {
            match self.options.deadline {
                Some(deadline) => match tokio::time::timeout(deadline, poll).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(%name, %id, ?deadline, "instance did not shut down in time");
                        Err(ServiceError::deprovisioning(
                            SHUTDOWN_TIMED_OUT,
                            anyhow::anyhow!("instance {id} still running after {deadline:?}"),
                        ))
                    }
                },
                None => poll.await,
            }
        };

        tokio::select! {
            result = bounded => result,
            _ = cancel.cancelled() => {
                warn!(%name, %id, "shutdown wait cancelled");
                Err(ServiceError::deprovisioning(
                    SHUTDOWN_CANCELLED,
                    anyhow::anyhow!("wait for instance {id} cancelled"),
                ))
            }
        }
    }

    async fn poll_until_shutdown(&self, name: &str, id: &str) -> ServiceResult<bool> {
        loop {
            let status = self
                .registry
                .status_of(id)
                .await
                .map_err(|e| self.failed(name, "registry poll", e))?;
            match status {
                Some(ServiceStatus::Shutdown) => return Ok(true),
                None => {
                    debug!(%name, %id, "instance left the registry");
                    return Ok(false);
                }
                Some(status) => {
                    debug!(%name, %id, %status, "waiting for shutdown");
                    tokio::time::sleep(self.options.poll_interval).await;
                }
            }
        }
    }

    fn failed(&self, name: &str, step: &str, e: anyhow::Error) -> ServiceError {
        error!(%name, %step, error = %e, "deprovisioning failed");
        ServiceError::deprovisioning(DELETE_SERVICE_FAILED, e)
    }
}

/// Service kind a process class runs, e.g. `ingest` or `ingest_c`.
fn process_kind(process_name: &str) -> Option<ServiceKind> {
    process_name
        .strip_suffix("_c")
        .unwrap_or(process_name)
        .parse()
        .ok()
}
