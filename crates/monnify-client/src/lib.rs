//! Monnify API client.
//!
//! This crate performs authenticated calls against the Monnify REST API.
//! Route families use either basic auth or an OAuth2 bearer token; bearer
//! tokens are obtained from the login endpoint and cached until shortly
//! before they expire.
//!
//! # Example
//!
//! ```no_run
//! use monnify_client::{ClientConfig, MonnifyClient};
//!
//! # async fn example() -> Result<(), monnify_client::ClientError> {
//! let client = MonnifyClient::new(&ClientConfig::new(
//!     "https://sandbox.monnify.com",
//!     "MK_TEST_SAF7HR5F3F",
//!     "your-secret-key",
//! ))?;
//!
//! let status = client
//!     .get_transaction_status("MNFY|20200903225338|000442")
//!     .await?;
//! println!("payment status: {}", status.payment_status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod config;
mod error;
mod gateway;
mod token;
mod types;

pub use client::MonnifyClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use gateway::{Authorization, Gateway, GatewayRequest, GatewayResponse, LOGIN_PATH};
pub use token::{Clock, SystemClock, TokenCache, TokenIssuer, TokenState, SAFETY_MARGIN_SECONDS};
pub use types::*;
