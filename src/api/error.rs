use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Error response body
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    BadRequest(String),

    #[error("Category not found")]
    NotFound(String),

    #[error("Catalog data unavailable")]
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let details = match &self {
            ApiError::BadRequest(d) | ApiError::NotFound(d) | ApiError::Unavailable(d) => d.clone(),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                details: Some(details),
            }),
        )
            .into_response()
    }
}
