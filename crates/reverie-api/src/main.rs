//! Reverie API server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use reverie_api::error::AppError;
use reverie_api::routes;
use reverie_api::state::AppState;
use reverie_canon::CanonStore;
use reverie_coherence::{CoherenceConfig, CoherenceValidator, RuleBasedScorer};
use reverie_core::clock::SystemClock;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Reverie coherence API server");

    // Read configuration from environment.
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
    let config = match std::env::var("COHERENCE_CONFIG") {
        Ok(path) => CoherenceConfig::load(&PathBuf::from(path))
            .map_err(|e| AppError::Config(e.to_string()))?,
        Err(_) => CoherenceConfig::default(),
    };

    // Build the engine. The rule-based scorer stands in until an external
    // scoring service is wired behind the same strategy interface.
    let canon = Arc::new(CanonStore::new());
    let validator = Arc::new(CoherenceValidator::new(
        config,
        canon,
        Arc::new(RuleBasedScorer::new()),
        Arc::new(SystemClock),
    ));
    let app_state = AppState::new(validator, Arc::new(SystemClock));

    // Build router.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::canon::router())
        .nest("/api/v1/coherence", routes::coherence::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
