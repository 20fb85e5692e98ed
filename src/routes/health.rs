use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub limits: Limits,
    pub storage: StorageHealth,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub max_file_size: String,
    pub supported_formats: Vec<&'static str>,
    pub retention: &'static str,
}

#[derive(Serialize)]
pub struct StorageHealth {
    pub location: String,
    pub writable: bool,
}

/// GET /health — service status, configured limits, and storage availability.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let writable = storage_writable(&state).await;
    let status_code = if writable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if writable { "healthy" } else { "unhealthy" }.to_string(),
        service: "XY2APK Converter".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        limits: Limits {
            max_file_size: format!("{}MB", state.config.max_file_size_bytes / (1024 * 1024)),
            supported_formats: vec!["HTML", "ZIP", "PNG", "JPEG", "GIF", "WebP"],
            retention: "temporary storage, expires with the host tmp area",
        },
        storage: StorageHealth {
            location: state.layout.root().display().to_string(),
            writable,
        },
    };

    (status_code, Json(response))
}

/// Probe the storage root by creating and removing a marker file.
async fn storage_writable(state: &AppState) -> bool {
    let probe = state.layout.root().join(".health-probe");
    match tokio::fs::write(&probe, b"ok").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&probe).await;
            true
        }
        Err(_) => false,
    }
}
