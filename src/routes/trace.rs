use axum::{response::Response, Json};

use trace_propagation::{ApiError, Scheme, Tracing};

pub async fn welcome() -> &'static str {
    "welcome"
}

/// Returns the identifier attached to this request.
pub async fn current<T>(Tracing(value): Tracing<T>) -> Json<T>
where
    T: Scheme + serde::Serialize,
{
    tracing::debug!(scheme = T::NAME, value = ?value, "Serving current tracing context");
    Json(value)
}

/// Always fails; the tracing headers are still present on the error response.
pub async fn fail<T: Scheme>(Tracing(value): Tracing<T>) -> Response {
    ApiError::Internal(anyhow::anyhow!("requested failure")).with_request_id(value.id())
}
