//! Shared types used across edgegrid crates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Characters that may not appear in service names or plugin identifiers.
pub const RESERVED_CHARS: &[char] = &[
    '#', '$', '%', '^', '&', '*', '(', ')', '=', '+', '[', ']', '{', '}', ';', ':', '\'', '"',
    ',', '<', '>', '/', '?', '\\', '|', '~', '`', '@',
];

/// Suffix of the derived "advanced" sibling of a service category.
pub const ADVANCED_SUFFIX: &str = "Advanced";

/// Returns `true` when `token` is usable as a service or plugin name.
///
/// Empty strings, strings with leading/trailing whitespace and strings
/// containing any of [`RESERVED_CHARS`] are rejected.
pub fn check_reserved(token: &str) -> bool {
    if token.is_empty() || token.trim() != token {
        return false;
    }
    !token.chars().any(|c| RESERVED_CHARS.contains(&c))
}

/// Name of the "advanced" sibling category for a service category.
pub fn advanced_category(name: &str) -> String {
    format!("{name}{ADVANCED_SUFFIX}")
}

// ── Service kind ───────────────────────────────────────────────────

/// Direction of data flow for a managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Collects data from a source plugin into the platform.
    #[serde(alias = "south")]
    Ingest,
    /// Sends platform data out to a destination.
    #[serde(alias = "north")]
    Export,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Ingest => "ingest",
            ServiceKind::Export => "export",
        }
    }

    /// Parent configuration category grouping all services of this kind.
    pub fn umbrella_category(&self) -> &'static str {
        match self {
            ServiceKind::Ingest => "Ingest",
            ServiceKind::Export => "Export",
        }
    }

    pub fn umbrella_description(&self) -> &'static str {
        match self {
            ServiceKind::Ingest => "Ingest microservices",
            ServiceKind::Export => "Export microservices",
        }
    }

    /// Whether services of this kind can be provisioned by this deployment.
    pub fn is_provisionable(&self) -> bool {
        matches!(self, ServiceKind::Ingest)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a service kind token is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ServiceKind {
    type Err = UnknownKind;

    /// Case-insensitive; accepts the legacy `south`/`north` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ingest" | "south" => Ok(ServiceKind::Ingest),
            "export" | "north" => Ok(ServiceKind::Export),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

// ── Implementation class ───────────────────────────────────────────

/// How a plugin is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationClass {
    /// Loaded from declared metadata in the native plugin tree.
    Native,
    /// A foreign shared library introspected through a bridge.
    Shim,
}

impl ImplementationClass {
    /// Scheduler process class that services of `kind` run under.
    pub fn process_class(&self, kind: ServiceKind) -> String {
        match self {
            ImplementationClass::Native => kind.as_str().to_string(),
            ImplementationClass::Shim => format!("{}_c", kind.as_str()),
        }
    }

    /// Launch script registered for the process class.
    pub fn launch_script(&self, kind: ServiceKind) -> Vec<String> {
        vec![format!("services/{}", self.process_class(kind))]
    }
}

// ── Configuration schema ───────────────────────────────────────────

/// A single item of a plugin's declared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub description: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub default: String,
    /// Current value. Absent in a plugin's declared schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<String>,
}

impl ConfigItem {
    /// The effective value: the explicit value if set, otherwise the default.
    pub fn effective_value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }
}

/// Configuration schema keyed by item name.
pub type ConfigSchema = BTreeMap<String, ConfigItem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_are_rejected() {
        assert!(check_reserved("Sine"));
        assert!(check_reserved("DHT 11"));
        assert!(check_reserved("furnace-4_b"));
        assert!(!check_reserved(""));
        assert!(!check_reserved("a;b"));
        assert!(!check_reserved("dht@11"));
        assert!(!check_reserved(" padded"));
        assert!(!check_reserved("x/y"));
    }

    #[test]
    fn kind_parses_case_insensitively_with_legacy_aliases() {
        assert_eq!("ingest".parse::<ServiceKind>(), Ok(ServiceKind::Ingest));
        assert_eq!("South".parse::<ServiceKind>(), Ok(ServiceKind::Ingest));
        assert_eq!("EXPORT".parse::<ServiceKind>(), Ok(ServiceKind::Export));
        assert_eq!("north".parse::<ServiceKind>(), Ok(ServiceKind::Export));
        assert!("blah".parse::<ServiceKind>().is_err());
        assert!("south-like".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn process_class_depends_on_implementation() {
        let kind = ServiceKind::Ingest;
        assert_eq!(ImplementationClass::Native.process_class(kind), "ingest");
        assert_eq!(ImplementationClass::Shim.process_class(kind), "ingest_c");
        assert_eq!(
            ImplementationClass::Shim.launch_script(kind),
            vec!["services/ingest_c".to_string()]
        );
    }

    #[test]
    fn config_item_uses_wire_names() {
        let json = r#"{"description":"Data points per second","type":"integer","default":"1","order":"2"}"#;
        let item: ConfigItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_type, "integer");
        assert_eq!(item.order.as_deref(), Some("2"));
        assert_eq!(item.effective_value(), "1");
    }

    #[test]
    fn advanced_sibling_name() {
        assert_eq!(advanced_category("Sine"), "SineAdvanced");
    }
}
