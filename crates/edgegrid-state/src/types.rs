//! Domain types for the edgegrid state store.
//!
//! These types represent the persisted state of schedules, process
//! classes and configuration. All types are serializable to/from JSON
//! for storage in redb tables.

use serde::{Deserialize, Serialize};

use edge_core::ConfigSchema;

/// Opaque identifier assigned to a schedule when it is first saved.
pub type ScheduleId = String;

// ── Schedule ──────────────────────────────────────────────────────

/// A job the scheduler starts a process for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    /// `None` until the scheduler assigns one on first save.
    pub id: Option<ScheduleId>,
    /// Unique across all schedules.
    pub name: String,
    /// Process class the schedule launches.
    pub process_name: String,
    /// Repeat interval in seconds; zero means run once at startup.
    pub repeat_secs: u64,
    /// At most one concurrent run.
    pub exclusive: bool,
    pub enabled: bool,
}

impl ScheduleRecord {
    /// A one-shot, exclusive, startup-triggered schedule, initially disabled.
    pub fn startup(name: &str, process_name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            process_name: process_name.to_string(),
            repeat_secs: 0,
            exclusive: true,
            enabled: false,
        }
    }
}

// ── Process class ─────────────────────────────────────────────────

/// An executable entry point shared by all schedules naming it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessClass {
    pub name: String,
    /// Launch command, e.g. `["services/ingest"]`.
    pub script: Vec<String>,
}

// ── Configuration ─────────────────────────────────────────────────

/// A named bundle of configuration items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigCategory {
    pub name: String,
    pub description: String,
    pub items: ConfigSchema,
}

/// Parent/child relation between two categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryLink {
    pub parent: String,
    pub child: String,
}

impl CategoryLink {
    /// Build the composite key for the category children table.
    pub fn table_key(&self) -> String {
        format!("{}/{}", self.parent, self.child)
    }
}
