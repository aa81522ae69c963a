//! Monnify webhook receiver.
//!
//! This crate provides the HTTP service that receives Monnify notifications:
//!
//! - Field validation per notification kind
//! - HMAC-SHA512 signature verification over the raw body
//! - Publication of every accepted delivery on an [`EventBus`]
//! - Optional transaction confirmation through the Monnify API
//!
//! # Signature failures
//!
//! A delivery whose signature does not verify is still published, marked
//! invalid. The HTTP answer depends on [`InvalidSignaturePolicy`]: 200 with
//! `"valid": false` by default, or 401 when set to reject.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Webhook handlers are async for the Handler trait

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod listener;
pub mod router;
pub mod routes;
pub mod state;

pub use config::{InvalidSignaturePolicy, ServiceConfig};
pub use error::ApiError;
pub use events::{EventBus, WebhookEnvelope, WebhookNotification, DEFAULT_BUS_CAPACITY};
pub use listener::confirm_transactions;
pub use router::WebhookRouter;
pub use routes::create_router;
pub use state::AppState;
