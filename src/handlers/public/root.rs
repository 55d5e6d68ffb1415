use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Trail Service API",
        "version": version,
        "description": "API for managing hiking trails and user associations",
        "endpoints": {
            "token": "POST /token (public - form username/password)",
            "trails": "GET /api/trails, GET /api/trails/:trail_id (public)",
            "trail_details": "GET /api/trails/:trail_id/details, GET /api/trails/:trail_id/log (public)",
            "trail_write": "POST /api/trails, PUT|DELETE /api/trails/:trail_id (bearer)",
            "user_trails": "GET /api/users/:user_id/trails (public)",
            "me": "GET /users/me (bearer)",
            "health": "GET /health (public)"
        }
    }))
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repo.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
