//! Webhook handlers for the Monnify notification routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use monnify_core::EventKind;
use serde::Serialize;
use uuid::Uuid;

use crate::config::InvalidSignaturePolicy;
use crate::error::ApiError;
use crate::state::AppState;

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was accepted for processing.
    pub received: bool,
    /// Whether its signature verified.
    pub valid: bool,
    /// Identifier assigned to the delivery.
    pub delivery_id: Uuid,
}

/// Route a delivery through the webhook router and map the outcome to HTTP.
fn receive(
    state: &AppState,
    kind: EventKind,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let notification = state.router.handle(kind, body, headers)?;

    if !notification.is_valid() {
        tracing::warn!(
            %kind,
            delivery_id = %notification.delivery_id(),
            policy = ?state.config.invalid_signature_policy,
            "Webhook signature did not verify"
        );

        if state.config.invalid_signature_policy == InvalidSignaturePolicy::Reject {
            return Err(ApiError::InvalidSignature {
                delivery_id: notification.delivery_id(),
            });
        }
    }

    Ok(Json(WebhookResponse {
        received: true,
        valid: notification.is_valid(),
        delivery_id: notification.delivery_id(),
    }))
}

/// Handle the legacy combined callback.
pub async fn legacy_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    receive(&state, EventKind::LegacyCallback, &headers, body)
}

/// Handle transaction completion notifications.
pub async fn transaction_completion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    receive(&state, EventKind::TransactionCompleted, &headers, body)
}

/// Handle refund completion notifications.
pub async fn refund_completion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    receive(&state, EventKind::RefundCompleted, &headers, body)
}

/// Handle disbursement notifications.
pub async fn disbursement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    receive(&state, EventKind::DisbursementCompleted, &headers, body)
}

/// Handle settlement notifications.
pub async fn settlement(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    receive(&state, EventKind::SettlementCompleted, &headers, body)
}
