pub mod checkout;
pub mod donations;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;
use crate::health::{self, GatewayChecker, StoreChecker};

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

/// `GET /`
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.store.is_ready() {
        "connected"
    } else {
        "disconnected"
    };

    Json(StatusSummary {
        status: "Backend is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = health::check_health(
        StoreChecker::new(state.store.clone()),
        GatewayChecker::new(state.gateway.clone()),
        state.start_time,
    )
    .await;

    let status_code = if report.status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(report))
}
