//! redb table definitions for the edgegrid state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Shape shared by every table in the store.
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Schedule records keyed by `{schedule_id}`.
pub const SCHEDULES: JsonTable = TableDefinition::new("schedules");

/// Scheduler process classes keyed by `{name}`.
pub const PROCESS_CLASSES: JsonTable = TableDefinition::new("scheduled_processes");

/// Configuration categories keyed by `{name}`.
pub const CATEGORIES: JsonTable = TableDefinition::new("configuration");

/// Category parent/child links keyed by `{parent}/{child}`.
pub const CATEGORY_CHILDREN: JsonTable = TableDefinition::new("category_children");
