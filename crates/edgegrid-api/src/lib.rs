//! edgegrid-api — REST API for edgegrid.
//!
//! Provides axum route handlers over the lifecycle coordinators and the
//! live service registry.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/edge/service` | List registered service instances |
//! | POST | `/edge/service` | Provision a service |
//! | DELETE | `/edge/service/{name}` | Deprovision a service |
//! | POST | `/edge/registry` | Register a running instance |
//! | PUT | `/edge/registry/{id}/status` | Report an instance status change |
//! | DELETE | `/edge/registry/{id}` | Unregister an instance |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};

use edgegrid_config::ConfigurationManager;
use edgegrid_plugins::PluginResolver;
use edgegrid_registry::ServiceRegistry;
use edgegrid_scheduler::Scheduler;
use edgegrid_services::{DeprovisionOptions, DeprovisioningCoordinator, ProvisioningCoordinator};
use edgegrid_state::StateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub provisioning: Arc<ProvisioningCoordinator>,
    pub deprovisioning: Arc<DeprovisioningCoordinator>,
    pub registry: ServiceRegistry,
}

impl ApiState {
    /// Wire the coordinators over a state store, a registry and a resolver.
    pub fn new(
        store: StateStore,
        registry: ServiceRegistry,
        resolver: PluginResolver,
        options: DeprovisionOptions,
    ) -> Self {
        let scheduler = Arc::new(Scheduler::new(store.clone()));
        let config = Arc::new(ConfigurationManager::new(store));

        let provisioning =
            ProvisioningCoordinator::new(Arc::new(resolver), scheduler.clone(), config.clone());
        let deprovisioning = DeprovisioningCoordinator::new(
            scheduler,
            config,
            Arc::new(registry.clone()),
            options,
        );

        Self {
            provisioning: Arc::new(provisioning),
            deprovisioning: Arc::new(deprovisioning),
            registry,
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let edge_routes = Router::new()
        .route(
            "/service",
            get(handlers::list_services)
                .post(handlers::create_service)
                .delete(handlers::delete_unnamed_service),
        )
        .route("/service/{name}", delete(handlers::delete_service))
        .route("/registry", post(handlers::register_instance))
        .route("/registry/{id}", delete(handlers::unregister_instance))
        .route("/registry/{id}/status", put(handlers::update_instance_status))
        .with_state(state);

    Router::new().nest("/edge", edge_routes)
}
