//! HTTP liveness endpoints (only routed in `http` transport mode).

use axum::Json;

/// Body of a plain `GET /`
pub const LIVENESS_TEXT: &str = "WebSocket server running";

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}
