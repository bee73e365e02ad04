//! StateStore — redb-backed state persistence for edgegrid.
//!
//! Provides typed CRUD operations over schedules, process classes,
//! configuration categories and category links. All values are
//! JSON-serialized into redb's `&[u8]` value columns. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
        txn.open_table(PROCESS_CLASSES).map_err(map_err!(Table))?;
        txn.open_table(CATEGORIES).map_err(map_err!(Table))?;
        txn.open_table(CATEGORY_CHILDREN).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Schedules ──────────────────────────────────────────────────

    /// Insert or update a schedule. The record must already carry an id.
    pub fn put_schedule(&self, id: &str, record: &ScheduleRecord) -> StateResult<()> {
        self.put(SCHEDULES, id, record)?;
        debug!(%id, name = %record.name, "schedule stored");
        Ok(())
    }

    /// Get a schedule by id.
    pub fn get_schedule(&self, id: &str) -> StateResult<Option<ScheduleRecord>> {
        self.get(SCHEDULES, id)
    }

    /// Find the schedule carrying the given name.
    pub fn find_schedule_by_name(&self, name: &str) -> StateResult<Option<ScheduleRecord>> {
        Ok(self
            .list::<ScheduleRecord>(SCHEDULES, "")?
            .into_iter()
            .find(|s| s.name == name))
    }

    /// List all schedules.
    pub fn list_schedules(&self) -> StateResult<Vec<ScheduleRecord>> {
        self.list(SCHEDULES, "")
    }

    /// Delete a schedule by id. Returns true if it existed.
    pub fn delete_schedule(&self, id: &str) -> StateResult<bool> {
        let existed = self.remove(SCHEDULES, id)?;
        debug!(%id, existed, "schedule deleted");
        Ok(existed)
    }

    // ── Process classes ────────────────────────────────────────────

    /// Insert or update a process class.
    pub fn put_process_class(&self, class: &ProcessClass) -> StateResult<()> {
        self.put(PROCESS_CLASSES, &class.name, class)?;
        debug!(name = %class.name, "process class stored");
        Ok(())
    }

    /// Get a process class by name.
    pub fn get_process_class(&self, name: &str) -> StateResult<Option<ProcessClass>> {
        self.get(PROCESS_CLASSES, name)
    }

    // ── Categories ─────────────────────────────────────────────────

    /// Insert or update a configuration category.
    pub fn put_category(&self, category: &ConfigCategory) -> StateResult<()> {
        self.put(CATEGORIES, &category.name, category)?;
        debug!(name = %category.name, "category stored");
        Ok(())
    }

    /// Get a category by name.
    pub fn get_category(&self, name: &str) -> StateResult<Option<ConfigCategory>> {
        self.get(CATEGORIES, name)
    }

    /// List all categories.
    pub fn list_categories(&self) -> StateResult<Vec<ConfigCategory>> {
        self.list(CATEGORIES, "")
    }

    /// Delete a category by name. Returns true if it existed.
    pub fn delete_category(&self, name: &str) -> StateResult<bool> {
        let existed = self.remove(CATEGORIES, name)?;
        debug!(%name, existed, "category deleted");
        Ok(existed)
    }

    // ── Category links ─────────────────────────────────────────────

    /// Record a parent/child link. Re-inserting an existing link is a no-op.
    pub fn put_category_link(&self, link: &CategoryLink) -> StateResult<()> {
        self.put(CATEGORY_CHILDREN, &link.table_key(), link)
    }

    /// List the children of a category.
    pub fn list_children(&self, parent: &str) -> StateResult<Vec<String>> {
        let prefix = format!("{parent}/");
        Ok(self
            .list::<CategoryLink>(CATEGORY_CHILDREN, &prefix)?
            .into_iter()
            .map(|link| link.child)
            .collect())
    }

    /// Delete one parent/child link. Returns true if it existed.
    pub fn delete_category_link(&self, parent: &str, child: &str) -> StateResult<bool> {
        let key = CategoryLink {
            parent: parent.to_string(),
            child: child.to_string(),
        }
        .table_key();
        self.remove(CATEGORY_CHILDREN, &key)
    }

    /// Delete every link whose parent is `parent`. Returns number deleted.
    pub fn delete_links_for_parent(&self, parent: &str) -> StateResult<u32> {
        let prefix = format!("{parent}/");
        // Collect keys in a read transaction first.
        let keys: Vec<String> = {
            let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
            let table = txn.open_table(CATEGORY_CHILDREN).map_err(map_err!(Table))?;
            table
                .iter()
                .map_err(map_err!(Read))?
                .filter_map(|entry| {
                    let (key, _) = entry.ok()?;
                    let k = key.value().to_string();
                    k.starts_with(&prefix).then_some(k)
                })
                .collect()
        };
        // Delete in a write transaction.
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count = keys.len() as u32;
        {
            let mut table = txn.open_table(CATEGORY_CHILDREN).map_err(map_err!(Table))?;
            for key in &keys {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%parent, count, "category links deleted");
        Ok(count)
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn put<T: Serialize>(&self, def: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let value = serde_json::to_vec(value).map_err(map_err!(Encoding))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            table
                .insert(key, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, def: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value: T =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Encoding))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// List every value whose key starts with `prefix` (empty = all).
    fn list<T: DeserializeOwned>(&self, def: JsonTable, prefix: &str) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(prefix) {
                let item: T =
                    serde_json::from_slice(value.value()).map_err(map_err!(Encoding))?;
                results.push(item);
            }
        }
        Ok(results)
    }

    fn remove(&self, def: JsonTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }
}
