use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Something went wrong!";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing fields in a request.
    #[error("{0}")]
    Validation(String),

    /// The store refused a write.
    #[error("{0}")]
    BadRequest(String),

    #[error("Product not found")]
    NotFound,

    #[error("{0}")]
    Unauthorized(String),

    /// Anything else. `detail` is the raw cause, already redacted if the
    /// service is configured not to expose it.
    #[error("Something went wrong!")]
    Internal { detail: Option<String> },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(cause: impl std::fmt::Display, expose: bool) -> Self {
        ApiError::Internal {
            detail: expose.then(|| cause.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Internal { detail } => ErrorBody {
                message: GENERIC_FAILURE.into(),
                error: detail,
            },
            other => ErrorBody {
                message: other.to_string(),
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Last-resort responder for panics caught by `CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    ApiError::internal(detail, expose).into_response()
}
