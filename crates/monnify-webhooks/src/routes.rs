//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, MethodRouter};
use axum::Router;
use monnify_core::EventKind;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, webhooks};
use crate::state::AppState;

/// Maximum concurrent webhook deliveries being processed.
const WEBHOOK_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Handler for deliveries of `kind`.
fn webhook_route(kind: EventKind) -> MethodRouter<Arc<AppState>> {
    match kind {
        EventKind::LegacyCallback => post(webhooks::legacy_callback),
        EventKind::TransactionCompleted => post(webhooks::transaction_completion),
        EventKind::RefundCompleted => post(webhooks::refund_completion),
        EventKind::DisbursementCompleted => post(webhooks::disbursement),
        EventKind::SettlementCompleted => post(webhooks::settlement),
    }
}

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Webhooks (signature verified, prefix defaults to `/webhook`)
/// - `POST {prefix}` - Legacy callback
/// - `POST {prefix}/transaction-completion` - Transaction completed
/// - `POST {prefix}/refund-completion` - Refund completed
/// - `POST {prefix}/disbursement` - Disbursement completed
/// - `POST {prefix}/settlement` - Settlement completed
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;
    let paths: Vec<(EventKind, String)> = EventKind::ALL
        .into_iter()
        .map(|kind| (kind, state.config.webhook_path(kind.route())))
        .collect();

    let state = Arc::new(state);

    let webhook_routes = paths
        .iter()
        .fold(Router::new(), |router, (kind, path)| {
            router.route(path, webhook_route(*kind))
        })
        .layer(ConcurrencyLimitLayer::new(WEBHOOK_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .merge(webhook_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
