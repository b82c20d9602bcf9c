use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::ServiceError;
use crate::AppState;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is running")
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    let database = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(json!({
        "status": "ok",
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
