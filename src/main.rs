mod app_state;
mod config;
mod error;
mod models;
mod routes;
mod services;

use axum::extract::DefaultBodyLimit;
use axum::response::Html;
use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing xy2apk server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("uploads_total", "Total accepted upload requests");
    metrics::describe_counter!("conversions_total", "Total jobs created by /convert");
    metrics::describe_counter!("downloads_total", "Total artifacts served by /download");
    metrics::describe_counter!(
        "icon_normalize_failures_total",
        "Icon uploads that failed normalization and degraded to no icon"
    );

    // Two files of max_file_size plus multipart framing overhead.
    let body_limit = (config.max_file_size_bytes as usize) * 2 + 1024 * 1024;

    // Create shared application state and the on-disk layout
    let state = AppState::new(config.clone());
    tracing::info!(root = %state.layout.root().display(), "Ensuring storage layout");
    state
        .layout
        .ensure_layout()
        .await
        .expect("Failed to create storage layout");

    // Build API routes
    let app = Router::new()
        // Static UI (embedded at compile time)
        .route("/", get(|| async { Html(include_str!("../static/index.html")) }))
        // API endpoints
        .route("/health", get(routes::health::health_check))
        .route("/upload", post(routes::upload::upload_files))
        .route("/convert", post(routes::convert::convert))
        .route("/download", get(routes::download::download))
        .route("/recent-apks", get(routes::recent::recent_apks))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(move || {
                let handle = prometheus_handle.clone();
                async move { handle.render() }
            }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit));

    tracing::info!("Starting xy2apk on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
