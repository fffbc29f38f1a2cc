use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobwatch_core::error::AppError;

use crate::dto::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Access forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::App(e) => match e {
                AppError::UnknownPlatform(_) | AppError::SerializationError(_) => {
                    (StatusCode::BAD_REQUEST, e.kind())
                }
                AppError::NotFound(_) => (StatusCode::NOT_FOUND, e.kind()),
                AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, e.kind()),
                AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, e.kind()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.kind()),
            },
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
