//! Health check handler

use axum::{response::IntoResponse, Json};

/// API health check
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
