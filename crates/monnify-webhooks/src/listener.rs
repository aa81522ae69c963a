//! Transaction confirmation listener.
//!
//! Monnify advises confirming a completed transaction by querying its status
//! before giving value. This listener does that for every valid
//! transaction-completed and legacy notification and logs the result.

use std::sync::Arc;

use monnify_client::MonnifyClient;
use monnify_core::EventKind;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::events::WebhookNotification;

/// Whether a notification should be confirmed with a status query.
fn needs_confirmation(notification: &WebhookNotification) -> bool {
    matches!(
        notification.kind(),
        EventKind::TransactionCompleted | EventKind::LegacyCallback
    )
}

/// Confirm transactions until the bus closes.
///
/// Returns the number of notifications whose status was fetched.
pub async fn confirm_transactions(
    mut receiver: broadcast::Receiver<WebhookNotification>,
    client: Arc<MonnifyClient>,
) -> usize {
    let mut confirmed = 0;

    loop {
        let notification = match receiver.recv().await {
            Ok(notification) => notification,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Confirmation listener fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if !needs_confirmation(&notification) {
            continue;
        }

        let delivery_id = notification.delivery_id();
        if !notification.is_valid() {
            tracing::warn!(%delivery_id, "Skipping confirmation of unverified notification");
            continue;
        }

        let Some(reference) = notification.envelope.transaction_reference() else {
            tracing::warn!(%delivery_id, "Notification has no transaction reference");
            continue;
        };

        match client.get_transaction_status(reference).await {
            Ok(status) => {
                confirmed += 1;
                tracing::info!(
                    %delivery_id,
                    transaction_reference = %reference,
                    payment_status = %status.payment_status,
                    "Confirmed transaction status"
                );
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    %delivery_id,
                    transaction_reference = %reference,
                    "Processor does not know the notified transaction"
                );
            }
            Err(e) => {
                tracing::error!(
                    %delivery_id,
                    transaction_reference = %reference,
                    error = %e,
                    "Failed to confirm transaction status"
                );
            }
        }
    }

    tracing::debug!(confirmed, "Confirmation listener stopped");
    confirmed
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use chrono::Utc;
    use monnify_client::ClientConfig;
    use monnify_core::VerificationOutcome;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::events::{EventBus, WebhookEnvelope};

    fn notification(kind: EventKind, reference: &str, outcome: VerificationOutcome) -> WebhookNotification {
        let fields = json!({ "transactionReference": reference });
        WebhookNotification {
            envelope: Arc::new(WebhookEnvelope {
                delivery_id: Uuid::new_v4(),
                kind,
                raw_body: Bytes::new(),
                signature: None,
                event_type: None,
                fields: fields.as_object().cloned().unwrap_or_default(),
                received_at: Utc::now(),
            }),
            outcome,
        }
    }

    async fn mock_processor() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestSuccessful": true,
                "responseBody": { "accessToken": "token-1", "expiresIn": 3600 }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/transactions/MNFY%7C1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestSuccessful": true,
                "responseBody": {
                    "transactionReference": "MNFY|1",
                    "paymentStatus": "PAID"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v2/transactions/MNFY%7C404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "requestSuccessful": false,
                "responseMessage": "Could not find transaction",
                "responseCode": "99"
            })))
            .expect(1)
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn confirms_only_valid_transaction_notifications() {
        let server = mock_processor().await;
        let client = Arc::new(
            MonnifyClient::new(&ClientConfig::new(server.uri(), "MK_TEST", "secret")).unwrap(),
        );

        let bus = EventBus::default();
        let listener = tokio::spawn(confirm_transactions(bus.subscribe(), client));

        bus.publish(notification(
            EventKind::TransactionCompleted,
            "MNFY|1",
            VerificationOutcome::Valid,
        ));
        bus.publish(notification(
            EventKind::LegacyCallback,
            "MNFY|404",
            VerificationOutcome::Valid,
        ));
        bus.publish(notification(
            EventKind::TransactionCompleted,
            "MNFY|forged",
            VerificationOutcome::Invalid,
        ));
        bus.publish(notification(
            EventKind::SettlementCompleted,
            "MNFY|settle",
            VerificationOutcome::Valid,
        ));
        drop(bus);

        assert_eq!(listener.await.unwrap(), 1);
    }
}
