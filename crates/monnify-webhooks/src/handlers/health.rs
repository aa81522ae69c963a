//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whether outbound API calls are configured.
    pub client_configured: bool,
    /// Live notification subscribers.
    pub subscribers: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "monnify-webhooks".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        client_configured: state.has_client(),
        subscribers: state.events.subscriber_count(),
    })
}
