use axum::http::{HeaderMap, HeaderName};
use serde::{Deserialize, Serialize};

use super::Scheme;
use crate::codec::{
    header_str, set_header, HEADER_CAUSATION_ID, HEADER_CORRELATION_ID, HEADER_REQUEST_ID,
};

/// Identifiers describing one event in a causal execution chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique event ID.
    pub id: String,

    /// ID of the root event that started the execution chain.
    pub correlation_id: String,

    /// ID of the event that caused the current one.
    pub causation_id: String,
}

impl Metadata {
    /// Metadata for the first event of a chain: every field is `id`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();

        Self {
            correlation_id: id.clone(),
            causation_id: id.clone(),
            id,
        }
    }

    /// Metadata for the event caused by `self`.
    pub fn next(self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            causation_id: self.id,
            correlation_id: self.correlation_id,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.causation_id.is_empty() && !self.correlation_id.is_empty()
    }
}

pub fn new_metadata(id: String) -> Metadata {
    Metadata::new(id)
}

pub fn next_metadata(m: Metadata, id: String) -> Metadata {
    m.next(id)
}

pub fn valid_metadata(m: &Metadata) -> bool {
    m.is_valid()
}

/// Header names for the three [`Metadata`] fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeaders {
    pub request_id: HeaderName,
    pub causation_id: HeaderName,
    pub correlation_id: HeaderName,
}

impl MetadataHeaders {
    pub fn new(request_id: HeaderName, causation_id: HeaderName, correlation_id: HeaderName) -> Self {
        Self {
            request_id,
            causation_id,
            correlation_id,
        }
    }
}

impl Default for MetadataHeaders {
    fn default() -> Self {
        Self::new(
            HEADER_REQUEST_ID.clone(),
            HEADER_CAUSATION_ID.clone(),
            HEADER_CORRELATION_ID.clone(),
        )
    }
}

impl Scheme for Metadata {
    type HeaderNames = MetadataHeaders;

    const NAME: &'static str = "metadata";

    fn new(id: String) -> Self {
        Metadata::new(id)
    }

    fn next(self, id: String) -> Self {
        Metadata::next(self, id)
    }

    fn is_valid(&self) -> bool {
        Metadata::is_valid(self)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn read_header(headers: &HeaderMap, names: &MetadataHeaders, id: String) -> (Self, bool) {
        let m = Metadata {
            id: header_str(headers, &names.request_id).to_owned(),
            causation_id: header_str(headers, &names.causation_id).to_owned(),
            correlation_id: header_str(headers, &names.correlation_id).to_owned(),
        };

        if m.is_valid() {
            return (m, true);
        }

        (Metadata::new(id), false)
    }

    fn write_header(&self, headers: &mut HeaderMap, names: &MetadataHeaders) {
        set_header(headers, &names.request_id, &self.id);
        set_header(headers, &names.causation_id, &self.causation_id);
        set_header(headers, &names.correlation_id, &self.correlation_id);
    }
}
