//! Inbound management API.
//!
//! The core calls these routes on the service: liveness checks, configuration
//! change notifications for subscribed categories, and shutdown requests.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::lifecycle::{ServiceController, Shutdown};
use self::handlers::*;

/// State shared by the management handlers.
#[derive(Clone)]
pub struct ManagementState {
    pub controller: Arc<ServiceController>,
    pub shutdown: Shutdown,
    pub started: Instant,
}

impl ManagementState {
    pub fn new(controller: Arc<ServiceController>, shutdown: Shutdown, started: Instant) -> Self {
        Self {
            controller,
            shutdown,
            started,
        }
    }
}

pub fn setup_management_router(state: ManagementState) -> Router {
    Router::new()
        .route("/foglamp/service/ping", get(ping))
        .route("/foglamp/service/shutdown", post(shutdown))
        .route("/foglamp/change", post(config_change))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
