//! Plugin sources — where plugins live and how their metadata is read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use edge_core::{ConfigSchema, ImplementationClass, ServiceKind};

use crate::error::{PluginError, PluginResult};

/// Metadata a plugin declares about itself.
///
/// Native plugins carry it as `plugin.toml`; shim introspection prints
/// the same document as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Declared service kind, kept verbatim for mismatch reporting.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub config: ConfigSchema,
}

/// A place plugins of one implementation class can be found.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Implementation class of every plugin this source provides.
    fn class(&self) -> ImplementationClass;

    /// Find the plugin's artifact, or `None` if this source doesn't have it.
    async fn locate(&self, plugin: &str, kind: ServiceKind) -> Option<PathBuf>;

    /// Read the metadata of a plugin previously returned by `locate`.
    async fn describe(&self, plugin: &str, location: &Path) -> PluginResult<PluginInfo>;
}

// ── Native ─────────────────────────────────────────────────────────

/// Plugins shipped with declared TOML metadata.
pub struct NativeSource {
    root: PathBuf,
}

impl NativeSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl PluginSource for NativeSource {
    fn class(&self) -> ImplementationClass {
        ImplementationClass::Native
    }

    async fn locate(&self, plugin: &str, kind: ServiceKind) -> Option<PathBuf> {
        let path = self
            .root
            .join(kind.as_str())
            .join(plugin)
            .join("plugin.toml");
        tokio::fs::try_exists(&path)
            .await
            .unwrap_or(false)
            .then_some(path)
    }

    async fn describe(&self, plugin: &str, location: &Path) -> PluginResult<PluginInfo> {
        let content = tokio::fs::read_to_string(location)
            .await
            .map_err(|e| PluginError::load(plugin, e))?;
        let info: PluginInfo = toml::from_str(&content).map_err(|e| PluginError::load(plugin, e))?;
        debug!(%plugin, path = ?location, "native plugin metadata loaded");
        Ok(info)
    }
}

// ── Shim ───────────────────────────────────────────────────────────

/// Bridge that asks a foreign plugin library for its metadata.
#[async_trait]
pub trait ShimIntrospector: Send + Sync {
    /// Return the library's metadata document as JSON text.
    async fn plugin_info(&self, library: &Path) -> anyhow::Result<String>;
}

/// Runs an external helper: `<program> <library> plugin_info`.
pub struct CommandIntrospector {
    program: PathBuf,
}

impl CommandIntrospector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ShimIntrospector for CommandIntrospector {
    async fn plugin_info(&self, library: &Path) -> anyhow::Result<String> {
        let output = Command::new(&self.program)
            .arg(library)
            .arg("plugin_info")
            .output()
            .await?;
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Plugins implemented as foreign shared libraries.
pub struct ShimSource {
    root: PathBuf,
    introspector: Arc<dyn ShimIntrospector>,
}

impl ShimSource {
    pub fn new(root: impl Into<PathBuf>, introspector: Arc<dyn ShimIntrospector>) -> Self {
        Self {
            root: root.into(),
            introspector,
        }
    }
}

#[async_trait]
impl PluginSource for ShimSource {
    fn class(&self) -> ImplementationClass {
        ImplementationClass::Shim
    }

    async fn locate(&self, plugin: &str, kind: ServiceKind) -> Option<PathBuf> {
        let path = self
            .root
            .join(kind.as_str())
            .join(plugin)
            .join(format!("lib{plugin}.so"));
        tokio::fs::try_exists(&path)
            .await
            .unwrap_or(false)
            .then_some(path)
    }

    async fn describe(&self, plugin: &str, location: &Path) -> PluginResult<PluginInfo> {
        let json = self
            .introspector
            .plugin_info(location)
            .await
            .map_err(|e| PluginError::load(plugin, e))?;
        let info: PluginInfo =
            serde_json::from_str(&json).map_err(|e| PluginError::load(plugin, e))?;
        debug!(%plugin, library = ?location, "shim plugin metadata loaded");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DHT11_TOML: &str = r#"
name = "dht11"
version = "1.1"
type = "ingest"
interface = "1.0"

[config.plugin]
description = "DHT11 plugin"
type = "string"
default = "dht11"

[config.pin]
description = "GPIO pin"
type = "integer"
default = "4"
order = "1"
displayName = "Pin"
"#;

    struct FixedIntrospector(&'static str);

    #[async_trait]
    impl ShimIntrospector for FixedIntrospector {
        async fn plugin_info(&self, _library: &Path) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn write_native(root: &Path, kind: &str, plugin: &str, content: &str) {
        let dir = root.join(kind).join(plugin);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plugin.toml"), content).unwrap();
    }

    #[tokio::test]
    async fn native_locate_is_kind_scoped() {
        let dir = tempfile::tempdir().unwrap();
        write_native(dir.path(), "ingest", "dht11", DHT11_TOML);
        let source = NativeSource::new(dir.path());

        assert!(source.locate("dht11", ServiceKind::Ingest).await.is_some());
        assert!(source.locate("dht11", ServiceKind::Export).await.is_none());
        assert!(source.locate("missing", ServiceKind::Ingest).await.is_none());
    }

    #[tokio::test]
    async fn native_describe_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        write_native(dir.path(), "ingest", "dht11", DHT11_TOML);
        let source = NativeSource::new(dir.path());

        let location = source.locate("dht11", ServiceKind::Ingest).await.unwrap();
        let info = source.describe("dht11", &location).await.unwrap();
        assert_eq!(info.kind, "ingest");
        assert_eq!(info.config.len(), 2);
        assert_eq!(info.config["pin"].display_name.as_deref(), Some("Pin"));
    }

    #[tokio::test]
    async fn native_describe_malformed_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        write_native(dir.path(), "ingest", "broken", "name = [");
        let source = NativeSource::new(dir.path());

        let location = source.locate("broken", ServiceKind::Ingest).await.unwrap();
        let result = source.describe("broken", &location).await;
        assert!(matches!(result, Err(PluginError::Load { .. })));
    }

    #[tokio::test]
    async fn shim_describe_uses_introspector() {
        let dir = tempfile::tempdir().unwrap();
        let lib_dir = dir.path().join("ingest").join("modbus");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(lib_dir.join("libmodbus.so"), b"").unwrap();

        let json = r#"{"name":"modbus","type":"south","config":{"plugin":{"description":"Modbus","type":"string","default":"modbus"}}}"#;
        let source = ShimSource::new(dir.path(), Arc::new(FixedIntrospector(json)));

        let location = source.locate("modbus", ServiceKind::Ingest).await.unwrap();
        let info = source.describe("modbus", &location).await.unwrap();
        assert_eq!(info.name, "modbus");
        assert_eq!(info.config["plugin"].description, "Modbus");
    }

    #[tokio::test]
    async fn shim_garbage_output_is_load_error() {
        let source = ShimSource::new("/nonexistent", Arc::new(FixedIntrospector("not json")));
        let result = source.describe("x", Path::new("/nonexistent/libx.so")).await;
        assert!(matches!(result, Err(PluginError::Load { .. })));
    }

    #[tokio::test]
    async fn command_introspector_reports_spawn_failure() {
        let introspector = CommandIntrospector::new("/nonexistent/get_plugin_info");
        assert!(introspector.plugin_info(Path::new("/tmp/libx.so")).await.is_err());
    }
}
