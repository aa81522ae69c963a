//! Common test utilities for monnify-webhooks integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use serde_json::{json, Value};

use monnify_core::{sign, EventKind, SIGNATURE_HEADER};
use monnify_webhooks::{create_router, AppState, EventBus, InvalidSignaturePolicy, ServiceConfig};

/// Webhook secret used by every harness.
pub const SECRET: &str = "91MUDL9N6U3BQRXBQ2PJ9M0PW4J22M1Y";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Bus the service publishes notifications on.
    pub events: EventBus,
    /// Configuration the service was built with.
    pub config: ServiceConfig,
}

impl TestHarness {
    /// Create a harness that acknowledges bad signatures.
    pub fn new() -> Self {
        Self::with_policy(InvalidSignaturePolicy::Acknowledge)
    }

    /// Create a harness with the given invalid-signature policy.
    pub fn with_policy(policy: InvalidSignaturePolicy) -> Self {
        Self::with_config(ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            secret_key: SECRET.into(),
            invalid_signature_policy: policy,
            ..ServiceConfig::default()
        })
    }

    /// Create a harness from a full configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let state = AppState::new(config.clone());
        let events = state.events.clone();
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            events,
            config,
        }
    }

    /// Full route path for `kind`.
    pub fn path(&self, kind: EventKind) -> String {
        self.config.webhook_path(kind.route())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Signature header name.
pub fn signature_header() -> HeaderName {
    HeaderName::from_static(SIGNATURE_HEADER)
}

/// Signature header value for `body` under the test secret.
pub fn signature_for(body: &[u8]) -> HeaderValue {
    HeaderValue::from_str(&sign(SECRET.as_bytes(), body)).expect("hex is a valid header value")
}

/// Serialize a payload to the bytes sent on the wire.
pub fn raw(body: &Value) -> Bytes {
    Bytes::from(serde_json::to_vec(body).expect("payload serializes"))
}

/// A well-formed payload for `kind`.
pub fn payload(kind: EventKind) -> Value {
    match kind {
        EventKind::LegacyCallback => json!({
            "transactionReference": "MNFY|20200903225338|000442",
            "paymentReference": "MNFY|20200903225338|000442",
            "amountPaid": "150000.00",
            "totalPayable": "150000.00",
            "settlementAmount": "149990.00",
            "paidOn": "03/09/2020 10:53:39 PM",
            "paymentStatus": "PAID",
            "paymentDescription": "Reserved account payment",
            "transactionHash": "b3f4c1a9",
            "currency": "NGN",
            "paymentMethod": "ACCOUNT_TRANSFER"
        }),
        EventKind::SettlementCompleted => json!({
            "eventType": "SETTLEMENT",
            "eventData": {
                "transactionReference": "MNFY|SETTLE|20230105|1",
                "destinationAccountNumber": "0123456789",
                "amount": 4500.0,
                "reference": "SET-20230105-1",
                "completedOn": "2023-01-05T10:00:00",
                "status": "COMPLETED",
                "narration": "Daily settlement",
                "currency": "NGN",
                "destinationBankName": "Access bank"
            }
        }),
        EventKind::TransactionCompleted
        | EventKind::RefundCompleted
        | EventKind::DisbursementCompleted => {
            let event_type = match kind {
                EventKind::TransactionCompleted => "SUCCESSFUL_TRANSACTION",
                EventKind::RefundCompleted => "SUCCESSFUL_REFUND",
                _ => "SUCCESSFUL_DISBURSEMENT",
            };
            json!({
                "eventType": event_type,
                "eventData": {
                    "transactionReference": "MNFY|64|20230105103214|000187",
                    "paymentReference": "REF-1672914734",
                    "amountPaid": 2500.0,
                    "totalPayable": 2500.0,
                    "paidOn": "2023-01-05 10:32:22.0",
                    "paymentStatus": "PAID",
                    "paymentDescription": "Order 1042",
                    "currency": "NGN",
                    "paymentMethod": "CARD",
                    "customer": { "name": "Ada Obi", "email": "ada@example.com" }
                }
            })
        }
    }
}
