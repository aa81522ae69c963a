//! Error types for Monnify core operations.

use crate::event::EventKind;

/// Result type for Monnify core operations.
pub type Result<T> = std::result::Result<T, MonnifyError>;

/// Errors that can occur while validating webhooks or parsing processor values.
#[derive(Debug, thiserror::Error)]
pub enum MonnifyError {
    /// A mandatory field for the event kind is absent or empty.
    #[error("missing required field `{field}` for {kind} webhook")]
    MissingField {
        /// The event kind whose contract was violated.
        kind: EventKind,
        /// The missing field name.
        field: &'static str,
    },

    /// The webhook body could not be interpreted.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// The received signature does not match the payload.
    ///
    /// Only produced by [`crate::SignatureVerifier::verify_strict`]; the
    /// boolean verifier reports a mismatch as data.
    #[error("webhook signature mismatch")]
    SignatureMismatch,

    /// Unknown payment method identifier or name.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Unknown on-failure-validate policy.
    #[error("unknown on-failure-validate policy: {0}")]
    UnknownOnFailureValidate(String),

    /// Unknown event kind name.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MonnifyError {
    /// Whether the error was caused by malformed client input.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MissingField { .. } | Self::InvalidPayload(_))
    }
}
