//! REST API handlers.
//!
//! Service handlers call into the lifecycle coordinators; registry
//! handlers are used by running instances to report on themselves.

use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value};
use tracing::{info, warn};

use edge_core::ServiceKind;
use edgegrid_registry::{RegistryEntry, RegistryError, ServiceStatus};
use edgegrid_services::error::MISSING_SERVICE_NAME;
use edgegrid_services::{ErrorKind, ProvisionRequest, ServiceError};

use crate::ApiState;

const INVALID_PAYLOAD: &str = "Data payload must be a valid JSON";
const INVALID_CONFIG: &str = "Config must be a JSON object";

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

/// Outward status for each lifecycle error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::UnsupportedKind => StatusCode::NOT_ACCEPTABLE,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ProvisioningFailure | ErrorKind::DeprovisioningFailure => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn service_error(err: &ServiceError) -> axum::response::Response {
    error_response(err.reason(), status_for(err.kind())).into_response()
}

// ── Services ───────────────────────────────────────────────────

/// A registry entry as listed under `/edge/service`.
#[derive(Debug, serde::Serialize)]
struct ServiceView {
    name: String,
    #[serde(rename = "type")]
    kind: ServiceKind,
    address: String,
    management_port: u16,
    service_port: u16,
    protocol: String,
    status: ServiceStatus,
}

impl From<RegistryEntry> for ServiceView {
    fn from(entry: RegistryEntry) -> Self {
        Self {
            name: entry.name,
            kind: entry.kind,
            address: entry.address,
            management_port: entry.management_port,
            service_port: entry.service_port,
            protocol: entry.protocol,
            status: entry.status,
        }
    }
}

/// GET /edge/service
pub async fn list_services(State(state): State<ApiState>) -> impl IntoResponse {
    let services: Vec<ServiceView> = state
        .registry
        .all()
        .await
        .into_iter()
        .map(ServiceView::from)
        .collect();
    ApiResponse::ok(serde_json::json!({ "services": services }))
}

/// POST /edge/service
pub async fn create_service(State(state): State<ApiState>, body: Bytes) -> impl IntoResponse {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(payload)) => payload,
        _ => return error_response(INVALID_PAYLOAD, StatusCode::BAD_REQUEST).into_response(),
    };

    let mut request = ProvisionRequest {
        name: token(&payload, "name"),
        plugin: token(&payload, "plugin"),
        kind: token(&payload, "type"),
        enabled: token(&payload, "enabled"),
        config: None,
    };
    match overrides(payload.get("config")) {
        Ok(config) => request.config = config,
        Err(reason) => {
            // Malformed config loses to any earlier precondition.
            if let Err(err) = request.validate() {
                return service_error(&err);
            }
            return error_response(reason, StatusCode::BAD_REQUEST).into_response();
        }
    }

    match state.provisioning.provision(request).await {
        Ok(provisioned) => (
            StatusCode::CREATED,
            ApiResponse::ok(serde_json::json!({
                "name": provisioned.name,
                "id": provisioned.schedule_id,
            })),
        )
            .into_response(),
        Err(err) => service_error(&err),
    }
}

/// DELETE /edge/service/{name}
pub async fn delete_service(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.deprovisioning.deprovision(&name).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({
            "result": format!("Service {name} deleted successfully."),
        }))
        .into_response(),
        Err(err) => service_error(&err),
    }
}

/// DELETE /edge/service
pub async fn delete_unnamed_service() -> impl IntoResponse {
    error_response(MISSING_SERVICE_NAME, StatusCode::BAD_REQUEST)
}

/// A scalar payload field as a token. Booleans and numbers are spelled
/// out; `null` counts as absent.
fn token(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `{"<item>": {"value": "<string>"}, ...}` into item → value.
fn overrides(config: Option<&Value>) -> Result<Option<BTreeMap<String, String>>, &'static str> {
    let Some(config) = config else {
        return Ok(None);
    };
    let Value::Object(items) = config else {
        return Err(INVALID_CONFIG);
    };
    items
        .iter()
        .map(|(item, entry)| match entry.get("value") {
            Some(Value::String(value)) => Ok((item.clone(), value.clone())),
            _ => Err(INVALID_CONFIG),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

// ── Registry ───────────────────────────────────────────────────

/// Registration body sent by a starting instance.
#[derive(Debug, serde::Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceKind,
    pub address: String,
    pub service_port: u16,
    pub management_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "http".to_string()
}

/// Status report body.
#[derive(Debug, serde::Deserialize)]
pub struct StatusRequest {
    pub status: ServiceStatus,
}

fn registry_error(err: &RegistryError) -> axum::response::Response {
    let status = match err {
        RegistryError::NotRegistered(_) => StatusCode::NOT_FOUND,
        RegistryError::AlreadyExists(_)
        | RegistryError::PortInUse(_)
        | RegistryError::InvalidTransition { .. } => StatusCode::CONFLICT,
    };
    error_response(&err.to_string(), status).into_response()
}

/// POST /edge/registry
pub async fn register_instance(
    State(state): State<ApiState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    match state
        .registry
        .register(
            &req.name,
            req.kind,
            &req.address,
            req.service_port,
            req.management_port,
            &req.protocol,
        )
        .await
    {
        Ok(id) => ApiResponse::ok(serde_json::json!({ "id": id })).into_response(),
        Err(e) => {
            warn!(name = %req.name, error = %e, "registration rejected");
            registry_error(&e)
        }
    }
}

/// PUT /edge/registry/{id}/status
pub async fn update_instance_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> impl IntoResponse {
    match state.registry.set_status(&id, req.status).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({ "id": id, "status": req.status }))
            .into_response(),
        Err(e) => registry_error(&e),
    }
}

/// DELETE /edge/registry/{id}
pub async fn unregister_instance(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.unregister(&id).await {
        Ok(()) => {
            info!(%id, "instance unregistered via API");
            ApiResponse::ok(serde_json::json!({ "id": id })).into_response()
        }
        Err(e) => registry_error(&e),
    }
}
