//! Client configuration.

use std::fmt;

use crate::error::ClientError;

/// Default sandbox base URL.
pub const DEFAULT_BASE_URL: &str = "https://sandbox.monnify.com";

/// Connection settings and credentials for the Monnify API.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// API key (basic-auth username).
    pub api_key: String,
    /// Secret key (basic-auth password and webhook HMAC key).
    pub secret_key: String,
    /// Wallet used for disbursement queries.
    pub wallet_id: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl ClientConfig {
    /// Create a configuration with the default timeout and no wallet.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            wallet_id: None,
            timeout_seconds: 30,
        }
    }

    /// Set the wallet used for disbursement queries.
    #[must_use]
    pub fn with_wallet_id(mut self, wallet_id: impl Into<String>) -> Self {
        self.wallet_id = Some(wallet_id.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Check that the credentials are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the API key or secret key is empty.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.api_key.is_empty() {
            return Err(ClientError::Configuration("API key is empty".into()));
        }
        if self.secret_key.is_empty() {
            return Err(ClientError::Configuration("secret key is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("wallet_id", &self.wallet_id)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
