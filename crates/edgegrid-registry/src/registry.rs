//! In-memory service registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use edge_core::ServiceKind;

use crate::error::{RegistryError, RegistryResult};

/// Lifecycle status of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Starting,
    Running,
    Failed,
    ShuttingDown,
    /// Terminal; the entry remains visible until purged.
    Shutdown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Starting => "starting",
            ServiceStatus::Running => "running",
            ServiceStatus::Failed => "failed",
            ServiceStatus::ShuttingDown => "shutting_down",
            ServiceStatus::Shutdown => "shutdown",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ServiceStatus) -> bool {
        use ServiceStatus::*;
        matches!(
            (self, next),
            (Starting, Running | Failed | Shutdown)
                | (Running, Failed | ShuttingDown | Shutdown)
                | (Failed, ShuttingDown | Shutdown)
                | (ShuttingDown, Shutdown)
        )
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live instance's registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    pub kind: ServiceKind,
    pub address: String,
    pub management_port: u16,
    pub service_port: u16,
    pub protocol: String,
    pub status: ServiceStatus,
}

/// Thread-safe registry of live service instances.
///
/// Cloning shares the underlying registry.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    /// Registered entries: id → entry.
    entries: Arc<RwLock<HashMap<String, RegistryEntry>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running instance. Returns its registry id.
    pub async fn register(
        &self,
        name: &str,
        kind: ServiceKind,
        address: &str,
        service_port: u16,
        management_port: u16,
        protocol: &str,
    ) -> RegistryResult<String> {
        let mut entries = self.entries.write().await;
        if entries.values().any(|e| e.name == name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        if entries
            .values()
            .any(|e| e.address == address && e.service_port == service_port)
        {
            return Err(RegistryError::PortInUse(format!("{address}:{service_port}")));
        }

        let id = Uuid::new_v4().to_string();
        entries.insert(
            id.clone(),
            RegistryEntry {
                id: id.clone(),
                name: name.to_string(),
                kind,
                address: address.to_string(),
                management_port,
                service_port,
                protocol: protocol.to_string(),
                status: ServiceStatus::Running,
            },
        );
        info!(%id, %name, %kind, %address, service_port, "service registered");
        Ok(id)
    }

    /// Move an entry to a new status, enforcing the lifecycle.
    pub async fn set_status(&self, id: &str, status: ServiceStatus) -> RegistryResult<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotRegistered(id.to_string()))?;
        if entry.status == status {
            return Ok(());
        }
        if !entry.status.can_transition_to(status) {
            return Err(RegistryError::InvalidTransition {
                from: entry.status,
                to: status,
            });
        }
        debug!(
            %id,
            name = %entry.name,
            from = %entry.status,
            to = %status,
            "service status changed"
        );
        entry.status = status;
        Ok(())
    }

    /// Mark an instance as shut down. The entry stays until purged.
    pub async fn unregister(&self, id: &str) -> RegistryResult<()> {
        self.set_status(id, ServiceStatus::Shutdown).await?;
        info!(%id, "service unregistered");
        Ok(())
    }

    /// Mark an instance as failed.
    pub async fn mark_failed(&self, id: &str) -> RegistryResult<()> {
        self.set_status(id, ServiceStatus::Failed).await
    }

    /// All entries carrying the given service name.
    pub async fn find(&self, name: &str) -> Vec<RegistryEntry> {
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.name == name).cloned().collect()
    }

    /// Get an entry by id.
    pub async fn get(&self, id: &str) -> Option<RegistryEntry> {
        self.entries.read().await.get(id).cloned()
    }

    /// All entries, ordered by name.
    pub async fn all(&self) -> Vec<RegistryEntry> {
        let entries = self.entries.read().await;
        let mut all: Vec<_> = entries.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Remove an entry from the registry. Returns true if it existed.
    pub async fn purge(&self, id: &str) -> bool {
        let removed = self.entries.write().await.remove(id);
        if let Some(ref entry) = removed {
            info!(%id, name = %entry.name, "service purged from registry");
        }
        removed.is_some()
    }
}
