use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Bulletin API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Internal announcement and feedback collection system",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth/login",
            "announcements": "/api/announcements",
            "responses": "/api/responses",
            "notifications": "/api/notifications",
            "search": "/api/search"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
