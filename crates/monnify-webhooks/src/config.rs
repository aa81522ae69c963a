//! Service configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use monnify_client::{ClientConfig, DEFAULT_BASE_URL};
use monnify_core::MonnifyError;
use serde::Deserialize;

/// HTTP answer given to a delivery whose signature does not verify.
///
/// The notification is published with an `Invalid` outcome either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidSignaturePolicy {
    /// Answer 200 so the processor stops retrying.
    #[default]
    Acknowledge,
    /// Answer 401.
    Reject,
}

impl FromStr for InvalidSignaturePolicy {
    type Err = MonnifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acknowledge" | "ack" => Ok(Self::Acknowledge),
            "reject" => Ok(Self::Reject),
            other => Err(MonnifyError::Configuration(format!(
                "unknown invalid-signature policy: {other}"
            ))),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Prefix under which the webhook routes are mounted (default: "/webhook").
    pub webhook_path_prefix: String,

    /// Monnify API base URL.
    pub base_url: String,

    /// Monnify API key. Outbound calls are disabled without it.
    pub api_key: Option<String>,

    /// Monnify secret key, used as the webhook HMAC key.
    pub secret_key: String,

    /// Disbursement wallet ID (optional).
    pub wallet_id: Option<String>,

    /// Merchant contract code (optional).
    pub contract_code: Option<String>,

    /// Currency used when a request does not name one.
    pub default_currency_code: String,

    /// Response to deliveries with a bad signature.
    pub invalid_signature_policy: InvalidSignaturePolicy,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Monnify secrets file structure.
#[derive(Debug, Deserialize)]
struct MonnifySecrets {
    #[serde(default)]
    api_key: Option<String>,
    secret_key: String,
    #[serde(default)]
    wallet_id: Option<String>,
    #[serde(default)]
    contract_code: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    ///
    /// Unparseable numeric values and policies fall back to their defaults
    /// with a warning; call [`Self::validate`] before serving.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secrets = load_monnify_secrets();

        let invalid_signature_policy = std::env::var("WEBHOOK_INVALID_SIGNATURE_POLICY")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring invalid signature policy setting");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            webhook_path_prefix: std::env::var("WEBHOOK_PATH_PREFIX")
                .map(|prefix| normalize_prefix(&prefix))
                .unwrap_or(defaults.webhook_path_prefix),
            base_url: std::env::var("MONNIFY_BASE_URL").unwrap_or(defaults.base_url),
            api_key: secrets.api_key,
            secret_key: secrets.secret_key.unwrap_or_default(),
            wallet_id: secrets.wallet_id,
            contract_code: secrets.contract_code,
            default_currency_code: std::env::var("MONNIFY_DEFAULT_CURRENCY_CODE")
                .unwrap_or(defaults.default_currency_code),
            invalid_signature_policy,
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Check that the service can verify webhooks.
    ///
    /// # Errors
    ///
    /// Returns [`MonnifyError::Configuration`] if the secret key is empty or
    /// the route prefix is not an absolute path.
    pub fn validate(&self) -> Result<(), MonnifyError> {
        if self.secret_key.is_empty() {
            return Err(MonnifyError::Configuration(
                "MONNIFY_SECRET_KEY is required to verify webhooks".into(),
            ));
        }
        if !self.webhook_path_prefix.starts_with('/') {
            return Err(MonnifyError::Configuration(format!(
                "webhook path prefix must start with '/': {}",
                self.webhook_path_prefix
            )));
        }
        Ok(())
    }

    /// Client settings, when API credentials are configured.
    #[must_use]
    pub fn client_config(&self) -> Option<ClientConfig> {
        let api_key = self.api_key.as_deref().filter(|key| !key.is_empty())?;
        let config = ClientConfig::new(&self.base_url, api_key, &self.secret_key)
            .with_timeout_seconds(self.request_timeout_seconds);

        Some(match &self.wallet_id {
            Some(wallet_id) => config.with_wallet_id(wallet_id),
            None => config,
        })
    }

    /// Full path of the route receiving `suffix` deliveries.
    #[must_use]
    pub fn webhook_path(&self, suffix: &str) -> String {
        let prefix = self.webhook_path_prefix.trim_end_matches('/');
        if suffix.is_empty() {
            if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            }
        } else {
            format!("{prefix}/{suffix}")
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            webhook_path_prefix: "/webhook".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            secret_key: String::new(),
            wallet_id: None,
            contract_code: None,
            default_currency_code: "NGN".into(),
            invalid_signature_policy: InvalidSignaturePolicy::Acknowledge,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("webhook_path_prefix", &self.webhook_path_prefix)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("wallet_id", &self.wallet_id)
            .field("contract_code", &self.contract_code)
            .field("default_currency_code", &self.default_currency_code)
            .field("invalid_signature_policy", &self.invalid_signature_policy)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// Credentials resolved from the secrets file or the environment.
#[derive(Debug, Default)]
struct ResolvedSecrets {
    api_key: Option<String>,
    secret_key: Option<String>,
    wallet_id: Option<String>,
    contract_code: Option<String>,
}

/// Load Monnify secrets from file or environment.
fn load_monnify_secrets() -> ResolvedSecrets {
    let secret_paths = [
        ".secrets/monnify.json",
        "monnify/.secrets/monnify.json",
        "../.secrets/monnify.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<MonnifySecrets>(path) {
            tracing::info!(path = %path, "Loaded Monnify secrets from file");
            return ResolvedSecrets {
                api_key: secrets.api_key,
                secret_key: Some(secrets.secret_key),
                wallet_id: secrets.wallet_id,
                contract_code: secrets.contract_code,
            };
        }
    }

    tracing::debug!("Monnify secrets file not found, using environment variables");
    ResolvedSecrets {
        api_key: std::env::var("MONNIFY_API_KEY").ok(),
        secret_key: std::env::var("MONNIFY_SECRET_KEY").ok(),
        wallet_id: std::env::var("MONNIFY_WALLET_ID").ok(),
        contract_code: std::env::var("MONNIFY_CONTRACT_CODE").ok(),
    }
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, std::io::Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
