//! Tally Service - HTTP API for the tally ledger
//!
//! This is the main entry point for the tally service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tally=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tally Service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        store_backend = ?config.store_backend,
        store_configured = %config.store_url.is_some(),
        fee_collector = %config.fee_collector_name,
        deletion_policy = %config.deletion_policy,
        "Service configuration loaded"
    );

    let state = AppState::from_config(config.clone())?;

    // Resolve the fee collector up front; operations retry if this fails.
    match state.ledger.fee_collector_id().await {
        Ok(id) => tracing::info!(account_id = %id, "Fee collector ready"),
        Err(e) => tracing::warn!(error = %e, "Fee collector not resolved at startup"),
    }

    let app = create_router(state);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
