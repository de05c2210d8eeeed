//! Error responses.
//!
//! Propagation itself never fails; these cover handlers reading the
//! per-request identifiers and handler errors in general.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracingError {
    /// No value of the requested scheme was attached to the request.
    #[error("No {0} tracing context on request; is the tracing layer installed?")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Tracing(#[from] TracingError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for TracingError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Tracing context unavailable");

        let body = ErrorResponse {
            code: "TRACING_CONTEXT_MISSING".to_string(),
            message: self.to_string(),
            request_id: None,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Tracing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Tracing(_) => "TRACING_CONTEXT_MISSING",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Tracing(e) => e.to_string(),
        }
    }

    /// Converts into a response whose body carries the given request ID.
    pub fn with_request_id(self, request_id: impl Into<String>) -> Response {
        self.render(Some(request_id.into()))
    }

    fn render(self, request_id: Option<String>) -> Response {
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, request_id = ?request_id, "Internal server error");
            }
            _ => {
                tracing::warn!(error = %self, request_id = ?request_id, "API error");
            }
        }

        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            request_id,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
