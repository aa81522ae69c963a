//! Raw HTTP access to the Monnify API.
//!
//! [`Gateway`] builds endpoint URLs, attaches the requested credentials,
//! sends the request and hands back the status and decoded JSON. It knows
//! nothing about token lifetimes; [`crate::TokenCache`] sits on top of it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token::TokenIssuer;
use crate::types::{upstream_failure, AccessGrant, ApiResponse};

/// Login endpoint, relative to the base URL.
pub const LOGIN_PATH: &[&str] = &["api", "v1", "auth", "login"];

/// Credentials to attach to one request.
#[derive(Clone)]
pub enum Authorization {
    /// Basic auth with the configured API key and secret key.
    Basic,
    /// A bearer token.
    Bearer(String),
}

impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => f.write_str("Basic"),
            Self::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// A request to a processor endpoint.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl GatewayRequest {
    /// Create a request for the given path segments.
    ///
    /// Segments are percent-encoded individually, so references containing
    /// `|` or `/` stay within one segment.
    #[must_use]
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(ToString::to_string).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    /// A `POST` request.
    #[must_use]
    pub fn post(segments: &[&str]) -> Self {
        Self::new(Method::POST, segments)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Status and decoded body of a processor response.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body (`Null` when empty or not JSON).
    pub json: Value,
}

impl GatewayResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode `responseBody`, or turn a non-success status into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Upstream`] for non-2xx statuses and
    /// [`ClientError::Serialization`] when the envelope does not match `T`.
    pub fn into_body<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        if !self.is_success() {
            return Err(upstream_failure(self.status, &self.json));
        }

        let envelope: ApiResponse<T> = serde_json::from_value(self.json)?;
        Ok(envelope.response_body)
    }
}

/// HTTP collaborator for the Monnify API.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: Url,
    api_key: String,
    secret_key: String,
}

impl Gateway {
    /// Create a gateway from client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Resolve the full URL of a request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the base URL cannot take path segments.
    pub fn endpoint(&self, request: &GatewayRequest) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }

    /// Send a request with the given credentials.
    ///
    /// Non-success statuses are returned as data; use
    /// [`GatewayResponse::into_body`] to turn them into errors.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if no response was received.
    pub async fn send(
        &self,
        request: GatewayRequest,
        auth: Authorization,
    ) -> Result<GatewayResponse, ClientError> {
        let url = self.endpoint(&request)?;

        tracing::debug!(
            method = %request.method,
            path = %url.path(),
            auth = ?auth,
            "Sending Monnify request"
        );

        let mut builder = self.client.request(request.method, url);
        builder = match auth {
            Authorization::Basic => builder.basic_auth(&self.api_key, Some(&self.secret_key)),
            Authorization::Bearer(token) => builder.bearer_auth(token),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        if !(200..300).contains(&status) {
            tracing::debug!(status, "Monnify request returned non-success status");
        }

        Ok(GatewayResponse { status, json })
    }
}

#[async_trait]
impl TokenIssuer for Gateway {
    async fn login(&self) -> Result<AccessGrant, ClientError> {
        self.send(GatewayRequest::post(LOGIN_PATH), Authorization::Basic)
            .await?
            .into_body()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
