//! Verified webhook notifications and the bus that carries them.
//!
//! Every accepted delivery is published, valid or not. Subscribers decide
//! what an `Invalid` outcome means for them.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use monnify_core::{EventKind, VerificationOutcome};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default number of notifications buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// An inbound delivery after parsing and field validation.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    /// Identifier assigned on receipt.
    pub delivery_id: Uuid,
    /// Route the delivery arrived on.
    pub kind: EventKind,
    /// Exact bytes the signature was computed over.
    pub raw_body: Bytes,
    /// The `monnify-signature` header, if sent.
    pub signature: Option<String>,
    /// Processor `eventType` tag (typed routes only).
    pub event_type: Option<String>,
    /// Event fields: the body for legacy callbacks, `eventData` otherwise.
    pub fields: Map<String, Value>,
    /// Time of receipt.
    pub received_at: DateTime<Utc>,
}

impl WebhookEnvelope {
    /// A field as a string, if present and a string.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// The processor's transaction reference.
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        self.field_str("transactionReference")
    }
}

/// A delivery together with the result of signature verification.
#[derive(Debug, Clone)]
pub struct WebhookNotification {
    /// The delivery.
    pub envelope: Arc<WebhookEnvelope>,
    /// Whether the signature matched.
    pub outcome: VerificationOutcome,
}

impl WebhookNotification {
    /// Whether the signature matched.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }

    /// Route the delivery arrived on.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.envelope.kind
    }

    /// Identifier assigned on receipt.
    #[must_use]
    pub fn delivery_id(&self) -> Uuid {
        self.envelope.delivery_id
    }
}

/// Fan-out channel for webhook notifications.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WebhookNotification>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` notifications per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Receive every notification published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WebhookNotification> {
        self.tx.subscribe()
    }

    /// Publish a notification, returning how many subscribers will see it.
    pub fn publish(&self, notification: WebhookNotification) -> usize {
        let delivery_id = notification.delivery_id();
        match self.tx.send(notification) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(%delivery_id, "No subscribers for webhook notification");
                0
            }
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}
