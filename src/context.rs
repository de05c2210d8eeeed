//! Per-request storage of the active identifier.
//!
//! Values live in the request's [`Extensions`], keyed by their type, so a
//! [`Metadata`](crate::Metadata) and a [`RequestId`](crate::RequestId) never
//! overwrite each other. Extensions travel with the request through every
//! inner layer, so anything attached further out stays visible to handlers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Extensions, Request},
};

use crate::error::TracingError;
use crate::scheme::Scheme;

/// Attaches `value` to the request context, replacing any earlier value of the same scheme.
pub fn with_tracing<T: Scheme>(extensions: &mut Extensions, value: T) {
    extensions.insert(value);
}

/// Reads the value of scheme `T` attached to the request context, if any.
pub fn get_tracing<T: Scheme>(extensions: &Extensions) -> Option<T> {
    extensions.get::<T>().cloned()
}

/// Attaches `value` directly to a request.
pub fn attach<T: Scheme, B>(request: &mut Request<B>, value: T) {
    with_tracing(request.extensions_mut(), value);
}

/// Extractor for the identifier attached by the tracing layer.
///
/// Example:
/// ```ignore
/// async fn handler(Tracing(metadata): Tracing<Metadata>) -> String {
///     metadata.correlation_id
/// }
/// ```
///
/// Rejects with 500 when the layer is not installed; use
/// `Option<Tracing<T>>` to make it optional.
#[derive(Debug, Clone)]
pub struct Tracing<T: Scheme>(pub T);

impl<T: Scheme> std::ops::Deref for Tracing<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for Tracing<T>
where
    S: Send + Sync,
    T: Scheme,
{
    type Rejection = TracingError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_tracing::<T>(&parts.extensions)
            .map(Tracing)
            .ok_or(TracingError::Missing(T::NAME))
    }
}
