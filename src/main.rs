mod aggregation;
mod config;
mod errors;
mod handlers;
mod models;
mod router;
mod upstream;

use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::router::ServiceRouter;
use crate::upstream::UpstreamClient;

/// Main entry point for the gateway.
///
/// Initializes logging and configuration, validates the upstream service
/// addresses, builds the shared HTTP client and the route table, and starts
/// the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listings_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Validate upstream base addresses before accepting traffic
    let service_router = ServiceRouter::from_config(&config)?;

    // One shared HTTP client for every upstream call
    let upstream = UpstreamClient::new().map_err(|e| anyhow::anyhow!("{}", e))?;

    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
        router: service_router,
        upstream,
    });

    let app = handlers::router(app_state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: 2MB max payload
                .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Public API gateway listening on {}", addr);
    tracing::info!(
        "-> Proxying to listing service at {}",
        config.listing_service_url
    );
    tracing::info!("-> Proxying to user service at {}", config.user_service_url);

    axum::serve(listener, app).await?;

    Ok(())
}
