//! Liveness endpoint
//!
//! Answers without contacting the private API, so a down upstream does not
//! make this service look dead.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

pub const SERVICE_NAME: &str = "microsetta-admin";

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Upstream the pulldown forwards to
    pub private_api: String,
}

/// GET /health (no bearer token needed)
pub async fn service_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        module: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        private_api: state.api.base_url.clone(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(service_status))
}
