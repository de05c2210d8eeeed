use axum::http::{HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Scheme;
use crate::codec::{header_str, set_header, HEADER_REQUEST_ID};

/// Identifier propagated unchanged from hop to hop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

pub fn new_request_id(id: String) -> RequestId {
    RequestId(id)
}

/// The minted `id` is discarded: a request ID never changes once issued.
pub fn next_request_id(r: RequestId, _id: String) -> RequestId {
    r
}

pub fn valid_request_id(r: &RequestId) -> bool {
    r.is_valid()
}

/// Header name for [`RequestId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdHeaders {
    pub request_id: HeaderName,
}

impl RequestIdHeaders {
    pub fn new(request_id: HeaderName) -> Self {
        Self { request_id }
    }
}

impl Default for RequestIdHeaders {
    fn default() -> Self {
        Self::new(HEADER_REQUEST_ID.clone())
    }
}

impl Scheme for RequestId {
    type HeaderNames = RequestIdHeaders;

    const NAME: &'static str = "request_id";

    fn new(id: String) -> Self {
        new_request_id(id)
    }

    fn next(self, id: String) -> Self {
        next_request_id(self, id)
    }

    fn is_valid(&self) -> bool {
        valid_request_id(self)
    }

    fn id(&self) -> &str {
        &self.0
    }

    fn read_header(headers: &HeaderMap, names: &RequestIdHeaders, id: String) -> (Self, bool) {
        let r = RequestId::new(header_str(headers, &names.request_id));

        if r.is_valid() {
            return (r, true);
        }

        (new_request_id(id), false)
    }

    fn write_header(&self, headers: &mut HeaderMap, names: &RequestIdHeaders) {
        set_header(headers, &names.request_id, &self.0);
    }
}
