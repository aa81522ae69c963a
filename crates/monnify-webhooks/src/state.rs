//! Application state.

use std::sync::Arc;

use monnify_client::MonnifyClient;

use crate::config::ServiceConfig;
use crate::events::EventBus;
use crate::router::WebhookRouter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Validates, verifies and publishes deliveries.
    pub router: Arc<WebhookRouter>,

    /// Bus the router publishes on.
    pub events: EventBus,

    /// Monnify API client for outbound calls (optional).
    pub client: Option<Arc<MonnifyClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let events = EventBus::default();
        let router = Arc::new(WebhookRouter::new(
            config.secret_key.as_bytes(),
            events.clone(),
        ));

        // Create Monnify client if API credentials are configured
        let client = config.client_config().and_then(|client_config| {
            match MonnifyClient::new(&client_config) {
                Ok(client) => {
                    tracing::info!(base_url = %client_config.base_url, "Monnify API client enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Monnify client");
                    None
                }
            }
        });

        if client.is_none() {
            tracing::warn!("Monnify API key not configured - transactions will not be confirmed");
        }

        Self {
            config,
            router,
            events,
            client,
        }
    }

    /// Replace the outbound client.
    #[must_use]
    pub fn with_client(mut self, client: Arc<MonnifyClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Check if the Monnify client is configured.
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }
}
