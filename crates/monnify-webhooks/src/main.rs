//! Monnify Webhooks - HTTP receiver for Monnify notifications
//!
//! This is the main entry point for the monnify-webhooks service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monnify_webhooks::{confirm_transactions, create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,monnify=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Monnify Webhooks");

    // Load configuration from environment
    let config = ServiceConfig::from_env();
    config.validate()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        webhook_path_prefix = %config.webhook_path_prefix,
        base_url = %config.base_url,
        api_configured = %config.api_key.is_some(),
        invalid_signature_policy = ?config.invalid_signature_policy,
        "Service configuration loaded"
    );

    // Build app state
    let state = AppState::new(config.clone());

    // Confirm transactions in the background when the API is reachable
    if let Some(client) = state.client.clone() {
        tokio::spawn(confirm_transactions(state.events.subscribe(), client));
        tracing::info!("Transaction confirmation listener started");
    }

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all webhook endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
