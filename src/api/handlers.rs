use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub dependencies: HealthDependencies,
}

#[derive(Serialize, ToSchema)]
pub struct HealthDependencies {
    /// "healthy", "unavailable" or "disabled"
    pub redis: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Health check passed", body = HealthResponse),
        (status = 503, description = "Service degraded", body = HealthResponse)
    )
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    // Redis is optional: a gateway without it is still healthy
    let redis_status = if !state.redis.is_enabled() {
        "disabled"
    } else if state.redis.ping().await {
        "healthy"
    } else {
        "unavailable"
    };

    let overall_status = if redis_status == "unavailable" {
        "degraded"
    } else {
        "ok"
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: VERSION.to_string(),
        dependencies: HealthDependencies {
            redis: redis_status.to_string(),
        },
    };

    if overall_status == "ok" {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "system",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain")
    )
)]
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}
