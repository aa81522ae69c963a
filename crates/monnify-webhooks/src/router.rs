//! Webhook event router.
//!
//! [`WebhookRouter::handle`] turns one inbound delivery into a
//! [`WebhookNotification`]. Malformed deliveries are rejected before any
//! hash is computed; well-formed ones are verified against the raw body and
//! published whatever the outcome.

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use bytes::Bytes;
use chrono::Utc;
use monnify_core::{
    event_type, extract_fields, verify_transaction_hash, EventKind, HmacSha512Signer,
    MonnifyError, SignatureVerifier, Signer, VerificationOutcome, SIGNATURE_HEADER,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::events::{EventBus, WebhookEnvelope, WebhookNotification};

/// Validates, verifies and publishes webhook deliveries.
pub struct WebhookRouter {
    secret: Vec<u8>,
    verifier: SignatureVerifier<Arc<dyn Signer>>,
    bus: EventBus,
}

impl WebhookRouter {
    /// Create a router using HMAC-SHA512 and the given webhook secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, bus: EventBus) -> Self {
        Self {
            secret: secret.into(),
            verifier: SignatureVerifier::new(Arc::new(HmacSha512Signer)),
            bus,
        }
    }

    /// Replace the signer.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.verifier = SignatureVerifier::new(signer);
        self
    }

    /// The bus notifications are published on.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Process one delivery of `kind`.
    ///
    /// A missing or non-text signature header yields an `Invalid` outcome
    /// without hashing. The returned notification has already been published.
    ///
    /// # Errors
    ///
    /// Returns [`MonnifyError::InvalidPayload`] if the body is not JSON and
    /// [`MonnifyError::MissingField`] if a mandatory field is absent. Nothing
    /// is published in either case.
    pub fn handle(
        &self,
        kind: EventKind,
        raw_body: Bytes,
        headers: &HeaderMap,
    ) -> Result<WebhookNotification, MonnifyError> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let body: Value = serde_json::from_slice(&raw_body)
            .map_err(|e| MonnifyError::InvalidPayload(e.to_string()))?;

        let fields = extract_fields(kind, &body).map_err(|e| {
            tracing::warn!(%kind, error = %e, "Rejected malformed webhook");
            e
        })?;

        let outcome = match &signature {
            Some(received) => VerificationOutcome::from(self.verifier.verify(
                &raw_body,
                &self.secret,
                received,
            )),
            None => VerificationOutcome::Invalid,
        };

        if kind == EventKind::LegacyCallback && outcome.is_valid() {
            self.check_transaction_hash(&fields);
        }

        let envelope = WebhookEnvelope {
            delivery_id: Uuid::new_v4(),
            kind,
            raw_body,
            signature,
            event_type: event_type(&body).map(String::from),
            fields,
            received_at: Utc::now(),
        };

        tracing::info!(
            %kind,
            delivery_id = %envelope.delivery_id,
            event_type = ?envelope.event_type,
            transaction_reference = ?envelope.transaction_reference(),
            signature_present = envelope.signature.is_some(),
            %outcome,
            "Received Monnify webhook"
        );

        let notification = WebhookNotification {
            envelope: Arc::new(envelope),
            outcome,
        };
        self.bus.publish(notification.clone());

        Ok(notification)
    }

    /// Log when a legacy callback's `transactionHash` disagrees with its fields.
    fn check_transaction_hash(&self, fields: &Map<String, Value>) {
        match self.transaction_hash_matches(fields) {
            Some(true) => {}
            Some(false) => tracing::warn!(
                transaction_reference = ?fields.get("transactionReference"),
                "Legacy callback transactionHash does not match its fields"
            ),
            None => tracing::debug!(
                "Skipped transactionHash check: hash inputs are not all text or numbers"
            ),
        }
    }

    /// Compare the legacy `transactionHash` with one computed from the
    /// fields, or `None` when an input cannot be rendered.
    fn transaction_hash_matches(&self, fields: &Map<String, Value>) -> Option<bool> {
        let field = |name: &str| match fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };

        let secret = std::str::from_utf8(&self.secret).ok()?;
        Some(verify_transaction_hash(
            secret,
            &field("paymentReference")?,
            &field("amountPaid")?,
            &field("paidOn")?,
            &field("transactionReference")?,
            &field("transactionHash")?,
        ))
    }
}

impl fmt::Debug for WebhookRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookRouter")
            .field("secret", &"<redacted>")
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::HeaderValue;
    use monnify_core::{sign, transaction_hash};
    use serde_json::json;

    const SECRET: &str = "91MUDL9N6U3BQRXBQ2PJ9M0PW4J22M1Y";

    /// Counts calls and delegates to HMAC-SHA512.
    #[derive(Default)]
    struct CountingSigner {
        calls: AtomicUsize,
    }

    impl Signer for CountingSigner {
        fn sign(&self, secret: &[u8], payload: &[u8]) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HmacSha512Signer.sign(secret, payload)
        }
    }

    fn settlement_body() -> Value {
        json!({
            "eventType": "SETTLEMENT",
            "eventData": {
                "transactionReference": "MNFY|SETTLE|1",
                "destinationAccountNumber": "0123456789",
                "amount": 4500.0,
                "reference": "SET-1",
                "completedOn": "2023-01-05T10:00:00",
                "status": "COMPLETED",
                "narration": "Settlement",
                "currency": "NGN",
                "destinationBankName": "Access bank"
            }
        })
    }

    fn signed_headers(body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign(SECRET.as_bytes(), body)).unwrap(),
        );
        headers
    }

    fn spied_router() -> (WebhookRouter, Arc<CountingSigner>) {
        let signer = Arc::new(CountingSigner::default());
        let router = WebhookRouter::new(SECRET, EventBus::default()).with_signer(signer.clone());
        (router, signer)
    }

    #[test]
    fn missing_field_is_rejected_before_hashing() {
        let (router, signer) = spied_router();
        let mut body = settlement_body();
        body["eventData"]
            .as_object_mut()
            .unwrap()
            .remove("destinationBankName");
        let raw = Bytes::from(serde_json::to_vec(&body).unwrap());
        let headers = signed_headers(&raw);

        let err = router
            .handle(EventKind::SettlementCompleted, raw, &headers)
            .unwrap_err();

        assert!(matches!(
            err,
            MonnifyError::MissingField {
                field: "destinationBankName",
                ..
            }
        ));
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_json_is_rejected_before_hashing() {
        let (router, signer) = spied_router();
        let raw = Bytes::from_static(b"{not json");
        let headers = signed_headers(&raw);

        let err = router
            .handle(EventKind::TransactionCompleted, raw, &headers)
            .unwrap_err();

        assert!(matches!(err, MonnifyError::InvalidPayload(_)));
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_header_is_invalid_without_hashing() {
        let (router, signer) = spied_router();
        let raw = Bytes::from(serde_json::to_vec(&settlement_body()).unwrap());

        let notification = router
            .handle(EventKind::SettlementCompleted, raw, &HeaderMap::new())
            .unwrap();

        assert!(!notification.is_valid());
        assert_eq!(notification.envelope.signature, None);
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn valid_delivery_is_published() {
        let (router, signer) = spied_router();
        let mut rx = router.bus().subscribe();
        let raw = Bytes::from(serde_json::to_vec(&settlement_body()).unwrap());
        let headers = signed_headers(&raw);

        let notification = router
            .handle(EventKind::SettlementCompleted, raw.clone(), &headers)
            .unwrap();

        assert!(notification.is_valid());
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(notification.envelope.raw_body, raw);
        assert_eq!(notification.envelope.event_type.as_deref(), Some("SETTLEMENT"));
        assert_eq!(
            notification.envelope.transaction_reference(),
            Some("MNFY|SETTLE|1")
        );

        let published = rx.try_recv().unwrap();
        assert_eq!(published.delivery_id(), notification.delivery_id());
    }

    #[test]
    fn bad_signature_is_published_as_invalid() {
        let (router, _) = spied_router();
        let mut rx = router.bus().subscribe();
        let raw = Bytes::from(serde_json::to_vec(&settlement_body()).unwrap());
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("deadbeef"));

        let notification = router
            .handle(EventKind::SettlementCompleted, raw, &headers)
            .unwrap();

        assert_eq!(notification.outcome, VerificationOutcome::Invalid);
        assert!(!rx.try_recv().unwrap().is_valid());
    }

    #[test]
    fn signature_covers_exact_bytes() {
        let (router, _) = spied_router();
        let raw = Bytes::from(serde_json::to_vec_pretty(&settlement_body()).unwrap());
        let compact = serde_json::to_vec(&settlement_body()).unwrap();
        let headers = signed_headers(&compact);

        let notification = router
            .handle(EventKind::SettlementCompleted, raw, &headers)
            .unwrap();

        assert!(!notification.is_valid());
    }

    fn legacy_fields(amount_paid: Value, transaction_hash: &str) -> Map<String, Value> {
        let body = json!({
            "paymentReference": "pay-1",
            "amountPaid": amount_paid,
            "paidOn": "03/09/2020 10:53:39 PM",
            "transactionReference": "MNFY|1",
            "transactionHash": transaction_hash
        });
        body.as_object().cloned().unwrap()
    }

    #[test]
    fn transaction_hash_accepts_text_and_numeric_amounts() {
        let router = WebhookRouter::new(SECRET, EventBus::default());

        let hash = transaction_hash(SECRET, "pay-1", "100.00", "03/09/2020 10:53:39 PM", "MNFY|1");
        assert_eq!(
            router.transaction_hash_matches(&legacy_fields(json!("100.00"), &hash)),
            Some(true)
        );

        let hash = transaction_hash(SECRET, "pay-1", "2500", "03/09/2020 10:53:39 PM", "MNFY|1");
        assert_eq!(
            router.transaction_hash_matches(&legacy_fields(json!(2500), &hash)),
            Some(true)
        );
        assert_eq!(
            router.transaction_hash_matches(&legacy_fields(json!(2500), "0badc0de")),
            Some(false)
        );
    }

    #[test]
    fn transaction_hash_check_skips_unrenderable_amount() {
        let router = WebhookRouter::new(SECRET, EventBus::default());
        let fields = legacy_fields(json!({ "value": 100 }), "0badc0de");
        assert_eq!(router.transaction_hash_matches(&fields), None);
    }

    #[test]
    fn legacy_fields_are_read_from_top_level() {
        let (router, _) = spied_router();
        let body = json!({
            "transactionReference": "MNFY|20200903225338|000442",
            "paymentReference": "MNFY|20200903225338|000442",
            "amountPaid": "150000.00",
            "totalPayable": "150000.00",
            "paidOn": "03/09/2020 10:53:39 PM",
            "paymentStatus": "PAID",
            "paymentDescription": "Payment",
            "transactionHash": "ignored-by-verification",
            "currency": "NGN",
            "paymentMethod": "ACCOUNT_TRANSFER"
        });
        let raw = Bytes::from(serde_json::to_vec(&body).unwrap());
        let headers = signed_headers(&raw);

        let notification = router
            .handle(EventKind::LegacyCallback, raw, &headers)
            .unwrap();

        assert!(notification.is_valid());
        assert_eq!(notification.envelope.event_type, None);
        assert_eq!(notification.envelope.field_str("paymentStatus"), Some("PAID"));
    }
}
