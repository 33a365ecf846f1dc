use crate::error::{EncodeError, ProjectionError, ResolveError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

/// Request failure, rendered as `{"error": message}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_algorithm(name: &str) -> Self {
        ApiError::BadRequest(format!("Invalid algorithm: {}", name))
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::MissingFeature(_) | EncodeError::TypeConversion { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NonFiniteQuery { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} {}", status, self);
        } else {
            warn!("{} {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
