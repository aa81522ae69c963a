//! Webhook event kinds and their mandatory fields.
//!
//! Each webhook route delivers exactly one [`EventKind`]. The kind fixes
//! which fields the processor guarantees to send and where they live:
//! legacy callbacks carry them at the top level of the body, the typed
//! event routes nest them under `eventData`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MonnifyError, Result};

/// Fields shared by transaction, refund and disbursement completions.
const COMPLETION_FIELDS: &[&str] = &[
    "transactionReference",
    "paymentReference",
    "amountPaid",
    "totalPayable",
    "paidOn",
    "paymentStatus",
    "paymentDescription",
    "currency",
    "paymentMethod",
];

const LEGACY_FIELDS: &[&str] = &[
    "transactionReference",
    "paymentReference",
    "amountPaid",
    "totalPayable",
    "paidOn",
    "paymentStatus",
    "paymentDescription",
    "transactionHash",
    "currency",
    "paymentMethod",
];

const SETTLEMENT_FIELDS: &[&str] = &[
    "transactionReference",
    "destinationAccountNumber",
    "amount",
    "reference",
    "completedOn",
    "status",
    "narration",
    "currency",
    "destinationBankName",
];

/// Key of the nested event object in typed webhook bodies.
pub const EVENT_DATA_KEY: &str = "eventData";

/// Key of the processor's event type tag in typed webhook bodies.
pub const EVENT_TYPE_KEY: &str = "eventType";

/// Classification of an inbound webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The legacy combined callback.
    LegacyCallback,
    /// A collection completed.
    TransactionCompleted,
    /// A refund completed.
    RefundCompleted,
    /// A disbursement completed.
    DisbursementCompleted,
    /// A settlement completed.
    SettlementCompleted,
}

impl EventKind {
    /// Every kind, in route order.
    pub const ALL: [Self; 5] = [
        Self::LegacyCallback,
        Self::TransactionCompleted,
        Self::RefundCompleted,
        Self::DisbursementCompleted,
        Self::SettlementCompleted,
    ];

    /// Mandatory fields for this kind.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::LegacyCallback => LEGACY_FIELDS,
            Self::TransactionCompleted | Self::RefundCompleted | Self::DisbursementCompleted => {
                COMPLETION_FIELDS
            }
            Self::SettlementCompleted => SETTLEMENT_FIELDS,
        }
    }

    /// Route suffix under the webhook prefix (empty for the legacy callback).
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::LegacyCallback => "",
            Self::TransactionCompleted => "transaction-completion",
            Self::RefundCompleted => "refund-completion",
            Self::DisbursementCompleted => "disbursement",
            Self::SettlementCompleted => "settlement",
        }
    }

    /// Whether the fields are nested under [`EVENT_DATA_KEY`].
    #[must_use]
    pub const fn uses_event_data(self) -> bool {
        !matches!(self, Self::LegacyCallback)
    }

    /// Stable name used in logs and serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyCallback => "legacy_callback",
            Self::TransactionCompleted => "transaction_completed",
            Self::RefundCompleted => "refund_completed",
            Self::DisbursementCompleted => "disbursement_completed",
            Self::SettlementCompleted => "settlement_completed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = MonnifyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MonnifyError::UnknownEventKind(s.to_string()))
    }
}

/// Result of comparing a received signature with the computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// The signature matched the raw body.
    Valid,
    /// The signature was missing or did not match.
    Invalid,
}

impl VerificationOutcome {
    /// Whether the outcome is [`VerificationOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for VerificationOutcome {
    fn from(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        })
    }
}

/// Locate the event fields for `kind` and check every mandatory field.
///
/// A field counts as present when it is not null, not a blank string and
/// not an empty array or object. The first missing field is reported.
///
/// # Errors
///
/// Returns [`MonnifyError::InvalidPayload`] if the body (or its `eventData`)
/// is not a JSON object, and [`MonnifyError::MissingField`] if a mandatory
/// field is absent.
pub fn extract_fields(kind: EventKind, body: &Value) -> Result<Map<String, Value>> {
    let container = if kind.uses_event_data() {
        body.get(EVENT_DATA_KEY)
            .ok_or(MonnifyError::MissingField {
                kind,
                field: EVENT_DATA_KEY,
            })?
    } else {
        body
    };

    let fields = container.as_object().ok_or_else(|| {
        MonnifyError::InvalidPayload(format!("{kind} webhook fields must be a JSON object"))
    })?;

    if let Some(field) = kind
        .required_fields()
        .iter()
        .copied()
        .find(|field| !is_present(fields.get(*field)))
    {
        return Err(MonnifyError::MissingField { kind, field });
    }

    Ok(fields.clone())
}

/// Read the processor's `eventType` tag, if the body carries one.
#[must_use]
pub fn event_type(body: &Value) -> Option<&str> {
    body.get(EVENT_TYPE_KEY).and_then(Value::as_str)
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => true,
    }
}
