//! Provisioning request validation.

use std::collections::BTreeMap;

use edge_core::{ServiceKind, check_reserved};

use crate::error::{
    EXPORT_UNSUPPORTED, INVALID_ENABLED, INVALID_NAME, INVALID_PLUGIN, MISSING_KIND, MISSING_NAME,
    MISSING_PLUGIN, ONLY_INGEST, ServiceError, ServiceResult,
};

/// A provisioning request as received from a caller.
///
/// Every field is optional so that a missing field is reported with its
/// own reason rather than as a decoding failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionRequest {
    pub name: Option<String>,
    pub plugin: Option<String>,
    /// Service kind token, e.g. `ingest`.
    pub kind: Option<String>,
    /// `"true"` or `"false"`.
    pub enabled: Option<String>,
    /// Item values to apply over the plugin's defaults.
    pub config: Option<BTreeMap<String, String>>,
}

/// A request that passed every precondition.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub name: String,
    pub plugin: String,
    pub kind: ServiceKind,
    pub enabled: bool,
    pub overrides: BTreeMap<String, String>,
}

impl ProvisionRequest {
    /// Check the preconditions in order; the first failure wins.
    pub fn validate(self) -> ServiceResult<ValidatedRequest> {
        let name = required_token(self.name, MISSING_NAME, INVALID_NAME)?;
        let plugin = required_token(self.plugin, MISSING_PLUGIN, INVALID_PLUGIN)?;

        let kind = match self.kind.as_deref() {
            None => return Err(ServiceError::validation(MISSING_KIND)),
            Some(token) => token
                .parse::<ServiceKind>()
                .map_err(|_| ServiceError::validation(ONLY_INGEST))?,
        };
        if !kind.is_provisionable() {
            return Err(ServiceError::UnsupportedKind(EXPORT_UNSUPPORTED.to_string()));
        }

        let enabled = match self.enabled.as_deref() {
            None => false,
            Some("true") => true,
            Some("false") => false,
            Some(_) => return Err(ServiceError::validation(INVALID_ENABLED)),
        };

        Ok(ValidatedRequest {
            name,
            plugin,
            kind,
            enabled,
            overrides: self.config.unwrap_or_default(),
        })
    }
}

fn required_token(value: Option<String>, missing: &str, invalid: &str) -> ServiceResult<String> {
    match value {
        None => Err(ServiceError::validation(missing)),
        Some(v) if v.is_empty() => Err(ServiceError::validation(missing)),
        Some(v) if !check_reserved(&v) => Err(ServiceError::validation(invalid)),
        Some(v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn request() -> ProvisionRequest {
        ProvisionRequest {
            name: Some("Sine".to_string()),
            plugin: Some("sinusoid".to_string()),
            kind: Some("ingest".to_string()),
            enabled: None,
            config: None,
        }
    }

    fn reason(req: ProvisionRequest) -> (ErrorKind, String) {
        let err = req.validate().unwrap_err();
        (err.kind(), err.reason().to_string())
    }

    #[test]
    fn valid_request_defaults_to_disabled() {
        let validated = request().validate().unwrap();
        assert_eq!(validated.kind, ServiceKind::Ingest);
        assert!(!validated.enabled);
        assert!(validated.overrides.is_empty());
    }

    #[test]
    fn name_checked_first() {
        let req = ProvisionRequest {
            name: None,
            plugin: None,
            kind: None,
            ..request()
        };
        assert_eq!(reason(req), (ErrorKind::Validation, MISSING_NAME.to_string()));

        let req = ProvisionRequest {
            name: Some(String::new()),
            ..request()
        };
        assert_eq!(reason(req).1, MISSING_NAME);

        let req = ProvisionRequest {
            name: Some("Sine;drop".to_string()),
            plugin: None,
            ..request()
        };
        assert_eq!(reason(req).1, INVALID_NAME);
    }

    #[test]
    fn plugin_checked_before_kind() {
        let req = ProvisionRequest {
            plugin: None,
            kind: Some("export".to_string()),
            ..request()
        };
        assert_eq!(reason(req).1, MISSING_PLUGIN);

        let req = ProvisionRequest {
            plugin: Some("sin@usoid".to_string()),
            ..request()
        };
        assert_eq!(reason(req).1, INVALID_PLUGIN);
    }

    #[test]
    fn kind_gating() {
        let req = ProvisionRequest {
            kind: None,
            ..request()
        };
        assert_eq!(reason(req), (ErrorKind::Validation, MISSING_KIND.to_string()));

        for token in ["export", "north", "EXPORT"] {
            let req = ProvisionRequest {
                kind: Some(token.to_string()),
                ..request()
            };
            assert_eq!(
                reason(req),
                (ErrorKind::UnsupportedKind, EXPORT_UNSUPPORTED.to_string())
            );
        }

        let req = ProvisionRequest {
            kind: Some("filter".to_string()),
            ..request()
        };
        assert_eq!(reason(req), (ErrorKind::Validation, ONLY_INGEST.to_string()));

        let req = ProvisionRequest {
            kind: Some("South".to_string()),
            ..request()
        };
        assert_eq!(req.validate().unwrap().kind, ServiceKind::Ingest);
    }

    #[test]
    fn enabled_tokens() {
        for (token, expected) in [("true", true), ("false", false)] {
            let req = ProvisionRequest {
                enabled: Some(token.to_string()),
                ..request()
            };
            assert_eq!(req.validate().unwrap().enabled, expected);
        }

        for token in ["yes", "True", "1", ""] {
            let req = ProvisionRequest {
                enabled: Some(token.to_string()),
                ..request()
            };
            assert_eq!(reason(req).1, INVALID_ENABLED);
        }
    }
}
