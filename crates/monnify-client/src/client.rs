//! Monnify API client implementation.

use std::sync::Arc;
use std::time::Duration;

use monnify_core::AuthMode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::gateway::{Authorization, Gateway, GatewayRequest};
use crate::token::{Clock, SystemClock, TokenCache, TokenState};
use crate::types::{Bank, TransactionStatus, WalletBalance};

/// Monnify API client.
///
/// Composes a [`Gateway`] with a [`TokenCache`]. Clones share the same
/// token cache, so one login serves every clone.
#[derive(Debug, Clone)]
pub struct MonnifyClient {
    gateway: Arc<Gateway>,
    tokens: Arc<TokenCache>,
    wallet_id: Option<String>,
}

impl MonnifyClient {
    /// Create a client using the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with an injected clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn with_clock(config: &ClientConfig, clock: Arc<dyn Clock>) -> Result<Self, ClientError> {
        config.validate()?;
        let gateway = Arc::new(Gateway::new(config)?);
        let tokens = Arc::new(TokenCache::new(gateway.clone(), clock));
        Ok(Self::with_parts(gateway, tokens, config.wallet_id.clone()))
    }

    /// Assemble a client from existing parts.
    #[must_use]
    pub fn with_parts(
        gateway: Arc<Gateway>,
        tokens: Arc<TokenCache>,
        wallet_id: Option<String>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            wallet_id,
        }
    }

    /// The shared token cache.
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Current state of the bearer token.
    pub async fn token_state(&self) -> TokenState {
        self.tokens.state().await
    }

    /// Send a request and decode its `responseBody`.
    ///
    /// Bearer requests obtain a token from the cache first, logging in if
    /// the cached one is missing or stale. No request is retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TokenRefresh`] if a needed login fails and
    /// [`ClientError::Upstream`] if the processor rejects the request.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: GatewayRequest,
        mode: AuthMode,
    ) -> Result<T, ClientError> {
        let auth = match mode {
            AuthMode::Basic => Authorization::Basic,
            AuthMode::Bearer => Authorization::Bearer(self.tokens.bearer_token().await?),
        };

        self.gateway.send(request, auth).await?.into_body()
    }

    /// [`Self::request`] bounded by a caller deadline.
    ///
    /// On timeout the in-flight work is dropped; a login that had not
    /// completed leaves the token cache unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the deadline elapses, otherwise
    /// the same errors as [`Self::request`].
    pub async fn request_with_timeout<T: DeserializeOwned>(
        &self,
        request: GatewayRequest,
        mode: AuthMode,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        tokio::time::timeout(timeout, self.request(request, mode))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
    }

    /// Banks supported for collections and disbursements.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the processor rejects it.
    pub async fn get_banks(&self) -> Result<Vec<Bank>, ClientError> {
        self.request(GatewayRequest::get(&["api", "v1", "banks"]), AuthMode::Bearer)
            .await
    }

    /// Banks that have a USSD short code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the processor rejects it.
    pub async fn get_banks_with_ussd_short_code(&self) -> Result<Vec<Bank>, ClientError> {
        self.request(
            GatewayRequest::get(&["api", "v1", "sdk", "transactions", "banks"]),
            AuthMode::Bearer,
        )
        .await
    }

    /// Sub accounts created by the merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the processor rejects it.
    pub async fn get_sub_accounts(&self) -> Result<Vec<Value>, ClientError> {
        self.request(
            GatewayRequest::get(&["api", "v1", "sub-accounts"]),
            AuthMode::Basic,
        )
        .await
    }

    /// Details of a reserved account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the processor rejects it;
    /// use [`ClientError::is_not_found`] to detect an unknown reference.
    pub async fn get_reserved_account_details(
        &self,
        account_reference: &str,
    ) -> Result<Value, ClientError> {
        self.request(
            GatewayRequest::get(&[
                "api",
                "v1",
                "bank-transfer",
                "reserved-accounts",
                account_reference,
            ]),
            AuthMode::Bearer,
        )
        .await
    }

    /// Status of a transaction.
    ///
    /// The processor recommends calling this after a valid webhook, before
    /// acting on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the processor rejects it.
    pub async fn get_transaction_status(
        &self,
        transaction_reference: &str,
    ) -> Result<TransactionStatus, ClientError> {
        self.request(
            GatewayRequest::get(&["api", "v2", "transactions", transaction_reference]),
            AuthMode::Bearer,
        )
        .await
    }

    /// Balance of the configured disbursement wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if no wallet is configured, or
    /// an error if the request fails.
    pub async fn get_wallet_balance(&self) -> Result<WalletBalance, ClientError> {
        let wallet_id = self
            .wallet_id
            .as_deref()
            .ok_or_else(|| ClientError::Configuration("wallet ID not configured".into()))?;

        self.request(
            GatewayRequest::get(&["api", "v1", "disbursements", "wallet-balance"])
                .query("walletId", wallet_id),
            AuthMode::Basic,
        )
        .await
    }
}
