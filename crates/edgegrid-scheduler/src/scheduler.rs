//! Scheduler — persists schedules and the process classes they launch.
//!
//! The `Scheduler` is the registry side of job scheduling:
//! - Registers process classes on demand
//! - Saves startup schedules and assigns their identifiers
//! - Toggles schedules on and off
//! - Deletes schedules once they are disabled

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use edgegrid_state::*;

use crate::error::{SchedulerError, SchedulerResult};

/// The scheduler manages schedule records and process classes.
///
/// Records live in the state store; the scheduler adds identifier
/// assignment, referential checks, and serialization of updates.
pub struct Scheduler {
    /// The state store holding schedules and process classes.
    state: StateStore,
    /// Serializes read-modify-write cycles on individual records.
    write_lock: Mutex<()>,
}

impl Scheduler {
    /// Create a new scheduler.
    pub fn new(state: StateStore) -> Self {
        Self {
            state,
            write_lock: Mutex::new(()),
        }
    }

    // ── Process classes ─────────────────────────────────────────────

    /// Register a process class unless one with this name already exists.
    ///
    /// Returns `true` if the class was created.
    pub async fn ensure_process_class(
        &self,
        name: &str,
        script: &[String],
    ) -> SchedulerResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.state.get_process_class(name)?.is_some() {
            debug!(%name, "process class already registered");
            return Ok(false);
        }
        self.state.put_process_class(&ProcessClass {
            name: name.to_string(),
            script: script.to_vec(),
        })?;
        info!(%name, ?script, "process class registered");
        Ok(true)
    }

    /// Get a process class by name.
    pub async fn get_process_class(&self, name: &str) -> SchedulerResult<Option<ProcessClass>> {
        Ok(self.state.get_process_class(name)?)
    }

    // ── Schedules ───────────────────────────────────────────────────

    /// Save a schedule, assigning an identifier if it has none.
    ///
    /// The record is stored as given; when `activate` is set the schedule
    /// is then enabled, so the stored record only becomes enabled through
    /// activation.
    pub async fn save_schedule(
        &self,
        mut record: ScheduleRecord,
        activate: bool,
    ) -> SchedulerResult<ScheduleId> {
        if record.name.trim().is_empty() {
            return Err(SchedulerError::InvalidSchedule(
                "schedule name must not be empty".to_string(),
            ));
        }
        if self.state.get_process_class(&record.process_name)?.is_none() {
            return Err(SchedulerError::ProcessNotFound(record.process_name.clone()));
        }

        let id = record
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        {
            let _guard = self.write_lock.lock().await;
            self.state.put_schedule(&id, &record)?;
        }
        info!(%id, name = %record.name, process = %record.process_name, "schedule saved");

        if activate {
            self.enable_schedule(&id).await?;
        }
        Ok(id)
    }

    /// Get a schedule by id.
    pub async fn get_schedule(&self, id: &str) -> SchedulerResult<Option<ScheduleRecord>> {
        Ok(self.state.get_schedule(id)?)
    }

    /// Look up a schedule by its unique name.
    pub async fn get_schedule_by_name(
        &self,
        name: &str,
    ) -> SchedulerResult<Option<ScheduleRecord>> {
        Ok(self.state.find_schedule_by_name(name)?)
    }

    /// List all schedules.
    pub async fn list_schedules(&self) -> SchedulerResult<Vec<ScheduleRecord>> {
        Ok(self.state.list_schedules()?)
    }

    /// Enable a schedule so the engine will run it.
    pub async fn enable_schedule(&self, id: &str) -> SchedulerResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut record = self
            .state
            .get_schedule(id)?
            .ok_or_else(|| SchedulerError::ScheduleNotFound(id.to_string()))?;
        if !record.enabled {
            record.enabled = true;
            self.state.put_schedule(id, &record)?;
        }
        info!(%id, name = %record.name, "schedule enabled");
        Ok(())
    }

    /// Disable a schedule. Does not interrupt a run already in progress.
    ///
    /// Returns `false` if no such schedule exists.
    pub async fn disable_schedule(&self, id: &str) -> SchedulerResult<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut record) = self.state.get_schedule(id)? else {
            warn!(%id, "schedule not found, nothing to disable");
            return Ok(false);
        };
        if record.enabled {
            record.enabled = false;
            self.state.put_schedule(id, &record)?;
        }
        info!(%id, name = %record.name, "schedule disabled");
        Ok(true)
    }

    /// Delete a disabled schedule.
    ///
    /// Returns `false` if no such schedule exists.
    pub async fn delete_schedule(&self, id: &str) -> SchedulerResult<bool> {
        let _guard = self.write_lock.lock().await;
        match self.state.get_schedule(id)? {
            None => {
                warn!(%id, "schedule not found, nothing to delete");
                Ok(false)
            }
            Some(record) if record.enabled => Err(SchedulerError::DeleteEnabled(id.to_string())),
            Some(record) => {
                let existed = self.state.delete_schedule(id)?;
                info!(%id, name = %record.name, "schedule deleted");
                Ok(existed)
            }
        }
    }
}
