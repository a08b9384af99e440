use axum::{extract::State, http::StatusCode, response::Response};
use serde_json::json;

use crate::{error::json_line, AppState};

pub async fn health_check(State(state): State<AppState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => json_line(StatusCode::OK, &json!({ "status": "ok", "db": "connected" })),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            json_line(
                StatusCode::SERVICE_UNAVAILABLE,
                &json!({ "status": "error", "db": "unavailable" }),
            )
        }
    }
}
