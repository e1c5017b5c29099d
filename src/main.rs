//! Artify API
//!
//! Backend REST service for the Artify artwork-sharing application.
//! Handles:
//! - Artwork CRUD, title search, featured listing, and like counters
//! - Per-user favorites with store-enforced uniqueness
//! - Per-artist aggregate counts
//! - Observability (logging, metrics, tracing)

mod config;
mod db;
mod errors;
mod handlers;
mod metrics;

use axum::{
    routing::{get, patch, post},
    Router,
};
use config::{AppConfig, ObservabilityConfig};
use db::Store;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!("Starting Artify API v{}", VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.observability.metrics_port))
            .install()?;
        info!("Metrics exporter listening on port {}", config.observability.metrics_port);
    }

    // Establish the shared store connection and indexes before the
    // listener exists; no handler may run against an unconnected store.
    let store = Store::connect(&config.database).await?;
    store.ensure_indexes().await?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        store,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber from configuration
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        // Liveness / readiness (no store dependency on "/" and "/health")
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Artwork endpoints
        .route(
            "/artworks",
            get(handlers::artworks::list_artworks).post(handlers::artworks::create_artwork),
        )
        .route("/featured-artworks", get(handlers::artworks::featured_artworks))
        .route(
            "/artworks/{id}",
            get(handlers::artworks::get_artwork)
                .put(handlers::artworks::update_artwork)
                .delete(handlers::artworks::delete_artwork),
        )
        .route("/artworks/{id}/like", patch(handlers::artworks::like_artwork))
        // Favorite endpoints; GET reads the path segment as a user email,
        // DELETE as a favorite identifier
        .route("/favorites", post(handlers::favorites::create_favorite))
        .route(
            "/favorites/{id}",
            get(handlers::favorites::list_favorites)
                .delete(handlers::favorites::delete_favorite),
        )
        // Artist endpoints
        .route(
            "/artist/{email}/artworks/count",
            get(handlers::artists::artwork_count),
        )
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(axum::middleware::from_fn(metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
