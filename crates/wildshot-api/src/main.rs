//! Wildshot API server entry point.

use std::net::SocketAddr;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use wildshot_api::config::AppConfig;
use wildshot_api::error::AppError;
use wildshot_api::state::AppState;
use wildshot_api::{routes, telemetry};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otel_endpoint.as_deref())?;

    tracing::info!("Starting Wildshot API server");

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    wildshot_event_store::MIGRATOR.run(&pool).await?;

    let app_state = AppState::from_config(pool, &config)?;
    tracing::info!(
        biomes = app_state.catalog.len(),
        time_limit_secs = config.time_limit_secs,
        "Expedition settings loaded"
    );

    // TODO: Replace CorsLayer::permissive() with the game client's origin once it is hosted.
    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
