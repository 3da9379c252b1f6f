//! microsetta-admin library interface
//!
//! Metadata pulldown for the sample tracking admin console: fetches survey
//! answers from the private API, flattens them into one table, and serves
//! privacy-filtered TSV exports.

pub mod api;
pub mod error;
pub mod export;
pub mod pulldown;
pub mod transforms;

pub use crate::error::{ApiError, ApiResult, PulldownError};

use axum::Router;
use microsetta_common::config::ApiSettings;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Private API connection settings; each request brings its own token
    pub api: ApiSettings,
}

impl AppState {
    pub fn new(api: ApiSettings) -> Self {
        Self { api }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::pulldown_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
