use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Too many requests, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("{0}")]
    Validation(String),

    #[error("Failed to extract build metadata: {0}")]
    Extraction(String),

    #[error("Failed to deliver message: {0}")]
    Dispatch(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short label placed in the `error` field of the response body
    fn label(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::RateLimited { .. } => "Too many requests",
            AppError::Validation(_) => "Bad request",
            AppError::Extraction(_) | AppError::Dispatch(_) | AppError::Internal(_) => {
                "Internal server error"
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let retry_after = match self {
            AppError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };

        let response = ErrorResponse {
            error: self.label(),
            message: self.to_string(),
            retry_after,
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(seconds) = retry_after {
            builder.insert_header(("Retry-After", seconds.to_string()));
        }
        builder.json(response)
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
