mod app;
mod config;
mod logging;
mod routes;

use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        scheme = settings.scheme.as_str(),
        request_id_header = %settings.headers.request_id,
        causation_id_header = %settings.headers.causation_id,
        correlation_id_header = %settings.headers.correlation_id,
        "Starting trace propagation server"
    );

    // Create application state
    let state = app::AppState::new(settings.clone());

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
