//! OAuth2 bearer token cache.
//!
//! The processor issues short-lived bearer tokens from its login endpoint.
//! [`TokenCache`] holds the current token and its expiry, and logs in again
//! lazily when a caller asks for a token after the expiry has passed. There
//! is no background refresh task.
//!
//! Expiry is brought forward by a safety margin (60 seconds by default) so a
//! token is never handed out moments before the processor stops accepting it.
//!
//! Refreshes are serialized: concurrent callers that find the token expired
//! wait on the same lock, exactly one of them performs the login, and the
//! rest read the freshly stored token.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::error::ClientError;
use crate::types::AccessGrant;

/// Seconds subtracted from the advertised token lifetime.
pub const SAFETY_MARGIN_SECONDS: i64 = 60;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Obtains a fresh bearer token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Perform the login call.
    async fn login(&self) -> Result<AccessGrant, ClientError>;
}

/// Observable state of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No token has been obtained yet.
    Unset,
    /// A token is stored and has not reached its expiry.
    Valid,
    /// A token is stored but its expiry has passed.
    Expired,
}

struct BearerToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl BearerToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Lazily refreshed bearer token shared by authenticated calls.
pub struct TokenCache {
    issuer: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    slot: Mutex<Option<BearerToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(issuer: Arc<dyn TokenIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            issuer,
            clock,
            safety_margin: Duration::seconds(SAFETY_MARGIN_SECONDS),
            slot: Mutex::new(None),
        }
    }

    /// Override the safety margin.
    #[must_use]
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Return a valid bearer token, logging in first if needed.
    ///
    /// If the future is dropped while the login is in flight, nothing is
    /// stored and the next caller logs in again.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::TokenRefresh`] wrapping the login failure, or a
    /// serialization error when the advertised lifetime is out of range. The
    /// previously stored token (if any) is left as it was.
    pub async fn bearer_token(&self) -> Result<String, ClientError> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot
            .as_ref()
            .filter(|token| token.is_valid_at(self.clock.now()))
        {
            return Ok(token.value.clone());
        }

        tracing::debug!(
            had_token = slot.is_some(),
            "Bearer token missing or expired, logging in"
        );

        let grant = self.issuer.login().await.map_err(|e| {
            tracing::warn!(error = %e, "Monnify login failed");
            ClientError::TokenRefresh(Box::new(e))
        })?;

        let expires_at = self.expiry_after(grant.expires_in).ok_or_else(|| {
            tracing::warn!(
                expires_in = grant.expires_in,
                "Monnify login returned an unusable token lifetime"
            );
            let invalid = <serde_json::Error as serde::de::Error>::custom(format!(
                "token lifetime out of range: {}",
                grant.expires_in
            ));
            ClientError::TokenRefresh(Box::new(ClientError::Serialization(invalid)))
        })?;

        tracing::info!(
            expires_in = grant.expires_in,
            expires_at = %expires_at,
            "Obtained Monnify bearer token"
        );

        let value = grant.access_token;
        *slot = Some(BearerToken {
            value: value.clone(),
            expires_at,
        });

        Ok(value)
    }

    /// `now + lifetime - margin`, or `None` if it does not fit a timestamp.
    fn expiry_after(&self, expires_in: i64) -> Option<DateTime<Utc>> {
        self.clock
            .now()
            .checked_add_signed(Duration::try_seconds(expires_in)?)?
            .checked_sub_signed(self.safety_margin)
    }

    /// Current state of the cache.
    pub async fn state(&self) -> TokenState {
        match self.slot.lock().await.as_ref() {
            None => TokenState::Unset,
            Some(token) if token.is_valid_at(self.clock.now()) => TokenState::Valid,
            Some(_) => TokenState::Expired,
        }
    }

    /// Drop the stored token so the next call logs in again.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}
