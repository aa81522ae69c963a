//! Core types and algorithms for Monnify integrations.
//!
//! This crate provides the pieces shared by the outbound client and the
//! inbound webhook receiver:
//!
//! - **Signatures**: `sign`, `verify`, `SignatureVerifier`, `Signer`
//! - **Events**: `EventKind`, `VerificationOutcome`, mandatory field checks
//! - **Processor values**: `AuthMode`, `PaymentMethod`, `OnFailureValidate`
//!
//! # Webhook signatures
//!
//! Webhooks are signed with HMAC-SHA512 over the raw request body using the
//! merchant's secret key. Verification never fails with an error: a mismatch
//! is reported as [`VerificationOutcome::Invalid`] so the caller can decide
//! what to do with forged or replayed deliveries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod payment;
pub mod signature;

pub use error::{MonnifyError, Result};
pub use event::{extract_fields, event_type, EventKind, VerificationOutcome, EVENT_DATA_KEY};
pub use payment::{AuthMode, OnFailureValidate, PaymentMethod};
pub use signature::{
    constant_time_eq, sign, transaction_hash, verify, verify_transaction_hash, HmacSha512Signer,
    SignatureVerifier, Signer, SIGNATURE_HEADER,
};
