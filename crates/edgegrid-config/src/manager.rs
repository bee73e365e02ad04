//! ConfigurationManager — category CRUD with a read-through cache.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use edge_core::ConfigSchema;
use edgegrid_state::*;

use crate::error::{ConfigError, ConfigResult};

/// Manages configuration categories and the links between them.
pub struct ConfigurationManager {
    state: StateStore,
    /// Cached categories: name → category.
    cache: RwLock<HashMap<String, ConfigCategory>>,
}

impl ConfigurationManager {
    /// Create a new manager over the given state store.
    pub fn new(state: StateStore) -> Self {
        Self {
            state,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a category, or merge `schema` into an existing one.
    ///
    /// New items take their default as value. When the category already
    /// exists, items present in both keep their current value; existing
    /// items missing from `schema` survive only if `keep_original_items`.
    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
        schema: &ConfigSchema,
        keep_original_items: bool,
    ) -> ConfigResult<()> {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidCategory(
                "category name must not be empty".to_string(),
            ));
        }
        for (key, item) in schema {
            if item.item_type.trim().is_empty() {
                return Err(ConfigError::InvalidCategory(format!(
                    "item {key} of category {name} has no type"
                )));
            }
        }

        let mut items: ConfigSchema = schema
            .iter()
            .map(|(key, item)| {
                let mut item = item.clone();
                item.value = Some(item.effective_value().to_string());
                (key.clone(), item)
            })
            .collect();

        match self.get_category(name).await? {
            Some(existing) => {
                for (key, old) in existing.items {
                    match items.get_mut(&key) {
                        Some(new) => new.value = old.value,
                        None if keep_original_items => {
                            items.insert(key, old);
                        }
                        None => {}
                    }
                }
                debug!(%name, "merging into existing category");
            }
            None => debug!(%name, "creating category"),
        }

        let category = ConfigCategory {
            name: name.to_string(),
            description: description.to_string(),
            items,
        };
        let mut cache = self.cache.write().await;
        self.state.put_category(&category)?;
        cache.insert(name.to_string(), category);
        drop(cache);
        info!(%name, "category stored");
        Ok(())
    }

    /// Link each of `children` under `parent`. Returns all children of `parent`.
    pub async fn create_child_category(
        &self,
        parent: &str,
        children: &[String],
    ) -> ConfigResult<Vec<String>> {
        if self.get_category(parent).await?.is_none() {
            return Err(ConfigError::CategoryNotFound(parent.to_string()));
        }
        for child in children {
            if self.get_category(child).await?.is_none() {
                return Err(ConfigError::CategoryNotFound(child.clone()));
            }
        }
        for child in children {
            self.state.put_category_link(&CategoryLink {
                parent: parent.to_string(),
                child: child.clone(),
            })?;
            debug!(%parent, %child, "category linked");
        }
        Ok(self.state.list_children(parent)?)
    }

    /// Set the value of one item in a category.
    pub async fn set_item_value(
        &self,
        category: &str,
        item: &str,
        value: &str,
    ) -> ConfigResult<()> {
        let mut current = self
            .get_category(category)
            .await?
            .ok_or_else(|| ConfigError::CategoryNotFound(category.to_string()))?;
        let entry = current
            .items
            .get_mut(item)
            .ok_or_else(|| ConfigError::ItemNotFound {
                category: category.to_string(),
                item: item.to_string(),
            })?;
        entry.value = Some(value.to_string());

        let mut cache = self.cache.write().await;
        self.state.put_category(&current)?;
        cache.insert(category.to_string(), current);
        drop(cache);
        info!(%category, %item, "category item updated");
        Ok(())
    }

    /// Get a category, serving from cache when possible.
    pub async fn get_category(&self, name: &str) -> ConfigResult<Option<ConfigCategory>> {
        if let Some(category) = self.cache.read().await.get(name) {
            return Ok(Some(category.clone()));
        }
        // Misses load while holding the write lock, as delete does.
        let mut cache = self.cache.write().await;
        if let Some(category) = cache.get(name) {
            return Ok(Some(category.clone()));
        }
        let loaded = self.state.get_category(name)?;
        if let Some(ref category) = loaded {
            cache.insert(name.to_string(), category.clone());
        }
        Ok(loaded)
    }

    /// List the children of a category.
    pub async fn get_children(&self, parent: &str) -> ConfigResult<Vec<String>> {
        Ok(self.state.list_children(parent)?)
    }

    /// Delete a category and evict it from the cache. Returns true if it existed.
    pub async fn delete_category(&self, name: &str) -> ConfigResult<bool> {
        let mut cache = self.cache.write().await;
        let existed = self.state.delete_category(name)?;
        cache.remove(name);
        drop(cache);
        debug!(%name, existed, "category removed");
        Ok(existed)
    }

    /// Remove the link between `parent` and `child`. Returns true if it existed.
    pub async fn delete_child_link(&self, parent: &str, child: &str) -> ConfigResult<bool> {
        Ok(self.state.delete_category_link(parent, child)?)
    }

    /// Remove every link under `parent`. Returns the number removed.
    pub async fn delete_child_links(&self, parent: &str) -> ConfigResult<u32> {
        Ok(self.state.delete_links_for_parent(parent)?)
    }

    #[cfg(test)]
    async fn is_cached(&self, name: &str) -> bool {
        self.cache.read().await.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_core::ConfigItem;

    fn item(description: &str, default: &str) -> ConfigItem {
        ConfigItem {
            description: description.to_string(),
            item_type: "string".to_string(),
            default: default.to_string(),
            value: None,
            order: None,
            display_name: None,
            readonly: None,
        }
    }

    fn sinusoid_schema() -> ConfigSchema {
        let mut schema = ConfigSchema::new();
        schema.insert("plugin".to_string(), item("Sinusoid Plugin", "sinusoid"));
        schema.insert("dataPointsPerSec".to_string(), item("Data points per second", "1"));
        schema
    }

    fn test_manager() -> ConfigurationManager {
        ConfigurationManager::new(StateStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn new_category_takes_defaults() {
        let mgr = test_manager();
        mgr.create_category("Sine", "Sinusoid Plugin", &sinusoid_schema(), true)
            .await
            .unwrap();

        let category = mgr.get_category("Sine").await.unwrap().unwrap();
        assert_eq!(category.description, "Sinusoid Plugin");
        assert_eq!(category.items["dataPointsPerSec"].value.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn merge_keeps_existing_values() {
        let mgr = test_manager();
        mgr.create_category("Sine", "v1", &sinusoid_schema(), true).await.unwrap();
        mgr.set_item_value("Sine", "dataPointsPerSec", "10").await.unwrap();

        let mut schema = sinusoid_schema();
        schema.remove("plugin");
        schema.insert("assetName".to_string(), item("Asset", "sinusoid"));
        mgr.create_category("Sine", "v2", &schema, true).await.unwrap();

        let category = mgr.get_category("Sine").await.unwrap().unwrap();
        assert_eq!(category.items["dataPointsPerSec"].value.as_deref(), Some("10"));
        assert_eq!(category.items["assetName"].value.as_deref(), Some("sinusoid"));
        assert!(category.items.contains_key("plugin"));

        mgr.create_category("Sine", "v3", &schema, false).await.unwrap();
        let category = mgr.get_category("Sine").await.unwrap().unwrap();
        assert!(!category.items.contains_key("plugin"));
    }

    #[tokio::test]
    async fn umbrella_with_empty_schema() {
        let mgr = test_manager();
        mgr.create_category("Ingest", "Ingest microservices", &ConfigSchema::new(), true)
            .await
            .unwrap();
        assert!(mgr.get_category("Ingest").await.unwrap().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn set_unknown_item_fails() {
        let mgr = test_manager();
        mgr.create_category("Sine", "d", &sinusoid_schema(), true).await.unwrap();

        let result = mgr.set_item_value("Sine", "bogus", "1").await;
        assert!(matches!(result, Err(ConfigError::ItemNotFound { .. })));

        let result = mgr.set_item_value("Nope", "plugin", "1").await;
        assert!(matches!(result, Err(ConfigError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn child_links_require_existing_categories() {
        let mgr = test_manager();
        mgr.create_category("Ingest", "Ingest microservices", &ConfigSchema::new(), true)
            .await
            .unwrap();

        let result = mgr.create_child_category("Ingest", &["Sine".to_string()]).await;
        assert!(matches!(result, Err(ConfigError::CategoryNotFound(_))));

        mgr.create_category("Sine", "d", &sinusoid_schema(), true).await.unwrap();
        let children = mgr
            .create_child_category("Ingest", &["Sine".to_string()])
            .await
            .unwrap();
        assert_eq!(children, vec!["Sine".to_string()]);
    }

    #[tokio::test]
    async fn delete_evicts_cache_and_is_idempotent() {
        let mgr = test_manager();
        mgr.create_category("Sine", "d", &sinusoid_schema(), true).await.unwrap();
        assert!(mgr.is_cached("Sine").await);

        assert!(mgr.delete_category("Sine").await.unwrap());
        assert!(!mgr.is_cached("Sine").await);
        assert!(mgr.get_category("Sine").await.unwrap().is_none());
        assert!(!mgr.delete_category("Sine").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_read_never_resurrects_deleted_category() {
        let mgr = std::sync::Arc::new(test_manager());
        for _ in 0..200 {
            mgr.create_category("Sine", "d", &sinusoid_schema(), true).await.unwrap();
            mgr.cache.write().await.clear();

            let reader = {
                let mgr = mgr.clone();
                tokio::spawn(async move { mgr.get_category("Sine").await.unwrap() })
            };
            let deleter = {
                let mgr = mgr.clone();
                tokio::spawn(async move { mgr.delete_category("Sine").await.unwrap() })
            };
            reader.await.unwrap();
            assert!(deleter.await.unwrap());

            assert!(!mgr.is_cached("Sine").await);
            assert!(mgr.get_category("Sine").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn link_removal() {
        let mgr = test_manager();
        for name in ["Ingest", "Sine", "SineAdvanced"] {
            mgr.create_category(name, "d", &ConfigSchema::new(), true).await.unwrap();
        }
        mgr.create_child_category("Ingest", &["Sine".to_string()]).await.unwrap();
        mgr.create_child_category("Sine", &["SineAdvanced".to_string()]).await.unwrap();

        assert!(mgr.delete_child_link("Ingest", "Sine").await.unwrap());
        assert!(!mgr.delete_child_link("Ingest", "Sine").await.unwrap());
        assert_eq!(mgr.delete_child_links("Sine").await.unwrap(), 1);
        assert!(mgr.get_children("Sine").await.unwrap().is_empty());
    }
}
