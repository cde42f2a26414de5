//! LMS Portal Backend
//!
//! Serves the role-scoped portal API over HTTP.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lms_portal::{
    config::{Config, LogFormat},
    create_router, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting LMS Portal Backend");
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        default_page_size = config.default_page_size,
        max_page_size = config.max_page_size,
        log_format = ?config.log_format,
        seed_demo_data = config.seed_demo_data,
        "portal settings"
    );

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (LMS_API_PSK). Authentication is disabled!");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
