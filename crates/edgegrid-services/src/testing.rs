//! In-memory collaborators with failure injection.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use edge_core::{ConfigItem, ConfigSchema, ImplementationClass, ServiceKind};
use edgegrid_plugins::{PluginDescriptor, PluginError, PluginResult};
use edgegrid_registry::{RegistryEntry, ServiceStatus};
use edgegrid_state::{ScheduleId, ScheduleRecord};

use crate::collaborators::{Configuration, Plugins, Registry, Schedules};

/// Operations armed to fail, keyed `op` or `op:arg`.
#[derive(Default)]
struct Failures(Mutex<HashSet<String>>);

impl Failures {
    fn arm(&self, key: &str) {
        self.0.lock().unwrap().insert(key.to_string());
    }

    fn check(&self, op: &str, arg: &str) -> anyhow::Result<()> {
        let armed = self.0.lock().unwrap();
        if armed.contains(op) || armed.contains(&format!("{op}:{arg}")) {
            anyhow::bail!("injected failure in {op}({arg})");
        }
        Ok(())
    }
}

// ── Schedules ──────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeSchedules {
    schedules: Mutex<HashMap<ScheduleId, ScheduleRecord>>,
    classes: Mutex<HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<String>>,
    failures: Failures,
}

impl FakeSchedules {
    pub fn fail_on(&self, key: &str) {
        self.failures.arm(key);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn schedule(&self, name: &str) -> Option<ScheduleRecord> {
        let schedules = self.schedules.lock().unwrap();
        schedules.values().find(|r| r.name == name).cloned()
    }

    pub fn class(&self, name: &str) -> Option<Vec<String>> {
        self.classes.lock().unwrap().get(name).cloned()
    }

    fn record(&self, op: &str, arg: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(format!("{op}:{arg}"));
        self.failures.check(op, arg)
    }
}

#[async_trait]
impl Schedules for FakeSchedules {
    async fn ensure_process_class(&self, name: &str, script: &[String]) -> anyhow::Result<()> {
        self.record("ensure_process_class", name)?;
        self.classes
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| script.to_vec());
        Ok(())
    }

    async fn save_schedule(
        &self,
        mut record: ScheduleRecord,
        activate: bool,
    ) -> anyhow::Result<ScheduleId> {
        self.record("save_schedule", &record.name)?;
        let mut schedules = self.schedules.lock().unwrap();
        let id = format!("schedule-{}", schedules.len() + 1);
        record.id = Some(id.clone());
        record.enabled = activate;
        schedules.insert(id.clone(), record);
        Ok(id)
    }

    async fn get_schedule_by_name(&self, name: &str) -> anyhow::Result<Option<ScheduleRecord>> {
        self.record("get_schedule_by_name", name)?;
        Ok(self.schedule(name))
    }

    async fn disable_schedule(&self, id: &str) -> anyhow::Result<()> {
        self.record("disable_schedule", id)?;
        if let Some(record) = self.schedules.lock().unwrap().get_mut(id) {
            record.enabled = false;
        }
        Ok(())
    }

    async fn delete_schedule(&self, id: &str) -> anyhow::Result<()> {
        self.record("delete_schedule", id)?;
        self.schedules.lock().unwrap().remove(id);
        Ok(())
    }
}

// ── Configuration ──────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeConfiguration {
    categories: Mutex<HashMap<String, ConfigSchema>>,
    links: Mutex<BTreeSet<(String, String)>>,
    calls: Mutex<Vec<String>>,
    failures: Failures,
}

impl FakeConfiguration {
    pub fn fail_on(&self, key: &str) {
        self.failures.arm(key);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn seed_category(&self, name: &str) {
        self.categories
            .lock()
            .unwrap()
            .insert(name.to_string(), ConfigSchema::new());
    }

    pub fn seed_link(&self, parent: &str, child: &str) {
        self.links
            .lock()
            .unwrap()
            .insert((parent.to_string(), child.to_string()));
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.lock().unwrap().contains_key(name)
    }

    pub fn has_link(&self, parent: &str, child: &str) -> bool {
        self.links
            .lock()
            .unwrap()
            .contains(&(parent.to_string(), child.to_string()))
    }

    pub fn item_value(&self, category: &str, item: &str) -> Option<String> {
        let categories = self.categories.lock().unwrap();
        categories
            .get(category)
            .and_then(|schema| schema.get(item))
            .map(|i| i.effective_value().to_string())
    }

    fn record(&self, op: &str, arg: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(format!("{op}:{arg}"));
        self.failures.check(op, arg)
    }
}

#[async_trait]
impl Configuration for FakeConfiguration {
    async fn create_category(
        &self,
        name: &str,
        _description: &str,
        schema: &ConfigSchema,
        _keep_original_items: bool,
    ) -> anyhow::Result<()> {
        self.record("create_category", name)?;
        self.categories
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| schema.clone());
        Ok(())
    }

    async fn create_child_category(&self, parent: &str, children: &[String]) -> anyhow::Result<()> {
        self.record("create_child_category", parent)?;
        for child in children {
            if !self.has_category(child) {
                anyhow::bail!("category {child} does not exist");
            }
            self.seed_link(parent, child);
        }
        Ok(())
    }

    async fn set_item_value(&self, category: &str, item: &str, value: &str) -> anyhow::Result<()> {
        self.record("set_item_value", &format!("{category}.{item}"))?;
        let mut categories = self.categories.lock().unwrap();
        let entry = categories
            .get_mut(category)
            .and_then(|schema| schema.get_mut(item))
            .ok_or_else(|| anyhow::anyhow!("no item {item} in {category}"))?;
        entry.value = Some(value.to_string());
        Ok(())
    }

    async fn delete_category(&self, name: &str) -> anyhow::Result<()> {
        self.record("delete_category", name)?;
        self.categories.lock().unwrap().remove(name);
        Ok(())
    }

    async fn delete_child_link(&self, parent: &str, child: &str) -> anyhow::Result<()> {
        self.record("delete_child_link", &format!("{parent}/{child}"))?;
        self.links
            .lock()
            .unwrap()
            .remove(&(parent.to_string(), child.to_string()));
        Ok(())
    }

    async fn delete_child_links(&self, parent: &str) -> anyhow::Result<()> {
        self.record("delete_child_links", parent)?;
        self.links.lock().unwrap().retain(|(p, _)| p != parent);
        Ok(())
    }
}

// ── Registry ───────────────────────────────────────────────────────

struct ScriptedEntry {
    entry: RegistryEntry,
    /// Statuses reported by successive polls; the last one sticks.
    script: VecDeque<ServiceStatus>,
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    entries: Mutex<HashMap<String, ScriptedEntry>>,
    polls: Mutex<u32>,
    purged: Mutex<Vec<String>>,
}

impl FakeRegistry {
    /// Add an entry whose polled status walks through `script`.
    pub fn add(&self, name: &str, script: &[ServiceStatus]) -> String {
        let mut entries = self.entries.lock().unwrap();
        let id = format!("instance-{}", entries.len() + 1);
        let status = script.first().copied().unwrap_or(ServiceStatus::Running);
        let entry = RegistryEntry {
            id: id.clone(),
            name: name.to_string(),
            kind: ServiceKind::Ingest,
            address: "localhost".to_string(),
            management_port: 40000,
            service_port: 8118,
            protocol: "http".to_string(),
            status,
        };
        entries.insert(
            id.clone(),
            ScriptedEntry {
                entry,
                script: script.iter().copied().collect(),
            },
        );
        id
    }

    /// Remove an entry without recording a purge.
    pub fn vanish(&self, id: &str) {
        self.entries.lock().unwrap().remove(id);
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }

    pub fn purged(&self) -> Vec<String> {
        self.purged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn find(&self, name: &str) -> anyhow::Result<Vec<RegistryEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .values()
            .filter(|s| s.entry.name == name)
            .map(|s| s.entry.clone())
            .collect())
    }

    async fn status_of(&self, id: &str) -> anyhow::Result<Option<ServiceStatus>> {
        *self.polls.lock().unwrap() += 1;
        let mut entries = self.entries.lock().unwrap();
        let Some(scripted) = entries.get_mut(id) else {
            return Ok(None);
        };
        if scripted.script.len() > 1 {
            scripted.script.pop_front();
        }
        if let Some(status) = scripted.script.front() {
            scripted.entry.status = *status;
        }
        Ok(Some(scripted.entry.status))
    }

    async fn purge(&self, id: &str) -> anyhow::Result<()> {
        self.entries.lock().unwrap().remove(id);
        self.purged.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

// ── Plugins ────────────────────────────────────────────────────────

pub(crate) enum FakePlugins {
    Found(PluginDescriptor),
    NotFound,
    DeclaresKind(String),
    Broken,
}

impl FakePlugins {
    /// The sinusoid plugin: a `plugin` item and `dataPointsPerSec`.
    pub fn sinusoid() -> Self {
        let item = |description: &str, default: &str| ConfigItem {
            description: description.to_string(),
            item_type: "string".to_string(),
            default: default.to_string(),
            value: None,
            order: None,
            display_name: None,
            readonly: None,
        };
        let mut schema = ConfigSchema::new();
        schema.insert("plugin".to_string(), item("Sinusoid Plugin", "sinusoid"));
        schema.insert("dataPointsPerSec".to_string(), item("Data points per second", "1"));
        FakePlugins::Found(PluginDescriptor {
            name: "sinusoid".to_string(),
            kind: ServiceKind::Ingest,
            description: "Sinusoid Plugin".to_string(),
            schema,
            class: ImplementationClass::Native,
        })
    }
}

#[async_trait]
impl Plugins for FakePlugins {
    async fn resolve(&self, plugin: &str, kind: ServiceKind) -> PluginResult<PluginDescriptor> {
        match self {
            FakePlugins::Found(descriptor) => Ok(descriptor.clone()),
            FakePlugins::NotFound => Err(PluginError::NotFound {
                plugin: plugin.to_string(),
                kind,
            }),
            FakePlugins::DeclaresKind(declared) => Err(PluginError::KindMismatch {
                plugin: plugin.to_string(),
                declared: declared.clone(),
                requested: kind,
            }),
            FakePlugins::Broken => Err(PluginError::Load {
                plugin: plugin.to_string(),
                reason: "metadata unreadable".to_string(),
            }),
        }
    }
}
