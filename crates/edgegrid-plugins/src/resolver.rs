//! PluginResolver — pick a source for a plugin and validate its metadata.

use std::sync::Arc;

use tracing::{debug, warn};

use edge_core::config::PluginsConfig;
use edge_core::{ConfigSchema, ImplementationClass, ServiceKind};

use crate::error::{PluginError, PluginResult};
use crate::source::{CommandIntrospector, NativeSource, PluginSource, ShimSource};

/// Everything provisioning needs to know about a resolved plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    pub name: String,
    pub kind: ServiceKind,
    /// Description of the `plugin` item, used for the service category.
    pub description: String,
    pub schema: ConfigSchema,
    pub class: ImplementationClass,
}

impl PluginDescriptor {
    /// Scheduler process class this plugin runs under.
    pub fn process_class(&self) -> String {
        self.class.process_class(self.kind)
    }

    pub fn launch_script(&self) -> Vec<String> {
        self.class.launch_script(self.kind)
    }
}

/// Resolves plugins across an ordered list of sources.
pub struct PluginResolver {
    sources: Vec<Arc<dyn PluginSource>>,
}

impl PluginResolver {
    /// Sources are consulted in the given order; the first to locate wins.
    pub fn new(sources: Vec<Arc<dyn PluginSource>>) -> Self {
        Self { sources }
    }

    /// Native tree first, then shim libraries.
    pub fn from_config(config: &PluginsConfig) -> Self {
        let introspector = Arc::new(CommandIntrospector::new(&config.introspect_cmd));
        Self::new(vec![
            Arc::new(NativeSource::new(&config.native_dir)),
            Arc::new(ShimSource::new(&config.shim_dir, introspector)),
        ])
    }

    /// Resolve `plugin` for a service of `kind`.
    pub async fn resolve(&self, plugin: &str, kind: ServiceKind) -> PluginResult<PluginDescriptor> {
        for source in &self.sources {
            let Some(location) = source.locate(plugin, kind).await else {
                continue;
            };
            debug!(%plugin, %kind, class = ?source.class(), path = ?location, "plugin located");
            let info = source.describe(plugin, &location).await?;
            return validate(plugin, kind, source.class(), info);
        }
        warn!(%plugin, %kind, "plugin not found in any source");
        Err(PluginError::NotFound {
            plugin: plugin.to_string(),
            kind,
        })
    }
}

fn validate(
    plugin: &str,
    kind: ServiceKind,
    class: ImplementationClass,
    info: crate::source::PluginInfo,
) -> PluginResult<PluginDescriptor> {
    let declared_ok = info
        .kind
        .parse::<ServiceKind>()
        .is_ok_and(|declared| declared == kind);
    if !declared_ok {
        return Err(PluginError::KindMismatch {
            plugin: plugin.to_string(),
            declared: info.kind,
            requested: kind,
        });
    }
    if info.config.is_empty() {
        return Err(PluginError::load(plugin, "plugin declares no configuration"));
    }
    let description = info
        .config
        .get("plugin")
        .map(|item| item.description.clone())
        .ok_or_else(|| PluginError::load(plugin, "configuration has no plugin item"))?;

    Ok(PluginDescriptor {
        name: plugin.to_string(),
        kind,
        description,
        schema: info.config,
        class,
    })
}
