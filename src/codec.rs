//! Reading and writing identifiers from HTTP headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

use crate::scheme::{Metadata, MetadataHeaders, RequestId, RequestIdHeaders, Scheme};

/// Default request ID header name.
pub static HEADER_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Default causation ID header name.
pub static HEADER_CAUSATION_ID: HeaderName = HeaderName::from_static("x-causation-id");

/// Default correlation ID header name.
pub static HEADER_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Reads an identifier from headers, falling back to one seeded with the given ID.
///
/// The flag is `true` only when the headers carried a valid value.
pub type ReadHeader<T> = Arc<dyn Fn(&HeaderMap, String) -> (T, bool) + Send + Sync>;

/// Writes an identifier into headers.
pub type WriteHeader<T> = Arc<dyn Fn(&mut HeaderMap, &T) + Send + Sync>;

/// First value of `name`, or `""` when it is absent or not visible ASCII.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Replaces every value of `name` with `value`.
///
/// Values that are not legal header values are dropped with a warning.
pub(crate) fn set_header(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name.clone(), value);
        }
        Err(e) => {
            tracing::warn!(header = %name, error = %e, "Skipping tracing header with invalid value");
        }
    }
}

/// Reader for any scheme bound to the given header names.
pub fn read_header<T: Scheme>(names: T::HeaderNames) -> ReadHeader<T> {
    Arc::new(move |headers: &HeaderMap, id: String| T::read_header(headers, &names, id))
}

/// Writer for any scheme bound to the given header names.
pub fn write_header<T: Scheme>(names: T::HeaderNames) -> WriteHeader<T> {
    Arc::new(move |headers: &mut HeaderMap, value: &T| value.write_header(headers, &names))
}

pub fn metadata_read_header(
    request_id: HeaderName,
    causation_id: HeaderName,
    correlation_id: HeaderName,
) -> ReadHeader<Metadata> {
    read_header::<Metadata>(MetadataHeaders::new(request_id, causation_id, correlation_id))
}

pub fn metadata_write_header(
    request_id: HeaderName,
    causation_id: HeaderName,
    correlation_id: HeaderName,
) -> WriteHeader<Metadata> {
    write_header::<Metadata>(MetadataHeaders::new(request_id, causation_id, correlation_id))
}

pub fn request_id_read_header(request_id: HeaderName) -> ReadHeader<RequestId> {
    read_header::<RequestId>(RequestIdHeaders::new(request_id))
}

pub fn request_id_write_header(request_id: HeaderName) -> WriteHeader<RequestId> {
    write_header::<RequestId>(RequestIdHeaders::new(request_id))
}

/// Metadata reader using the default header names.
pub fn default_metadata_read_header() -> ReadHeader<Metadata> {
    read_header::<Metadata>(MetadataHeaders::default())
}

/// Metadata writer using the default header names.
pub fn default_metadata_write_header() -> WriteHeader<Metadata> {
    write_header::<Metadata>(MetadataHeaders::default())
}

/// RequestId reader using the default header name.
pub fn default_request_id_read_header() -> ReadHeader<RequestId> {
    read_header::<RequestId>(RequestIdHeaders::default())
}

/// RequestId writer using the default header name.
pub fn default_request_id_write_header() -> WriteHeader<RequestId> {
    write_header::<RequestId>(RequestIdHeaders::default())
}
