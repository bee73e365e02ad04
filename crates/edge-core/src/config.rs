//! edged.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub deprovision: DeprovisionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8081 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/edgegrid"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Root of the native plugin tree (`<kind>/<plugin>/plugin.toml`).
    pub native_dir: PathBuf,
    /// Root of the shim plugin tree (`<kind>/<plugin>/lib<plugin>.so`).
    pub shim_dir: PathBuf,
    /// Program that prints a shim library's metadata as JSON.
    pub introspect_cmd: PathBuf,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            native_dir: PathBuf::from("/usr/local/edgegrid/plugins"),
            shim_dir: PathBuf::from("/usr/local/edgegrid/plugins-c"),
            introspect_cmd: PathBuf::from("/usr/local/edgegrid/bin/get_plugin_info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeprovisionConfig {
    /// Delay between registry status checks while waiting for shutdown.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on the shutdown wait. Unset means wait indefinitely.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for DeprovisionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            deadline_secs: None,
        }
    }
}

impl DeprovisionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl EdgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: EdgeConfig = toml::from_str(content)?;
        if config.deprovision.poll_interval_ms == 0 {
            anyhow::bail!("deprovision.poll_interval_ms must be greater than zero");
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
