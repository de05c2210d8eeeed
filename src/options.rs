//! Middleware configuration: which scheme is active and how it maps onto headers.

use axum::http::{HeaderMap, HeaderName};
use std::fmt;
use std::sync::Arc;

use crate::codec::{self, ReadHeader, WriteHeader};
use crate::scheme::{Metadata, MetadataHeaders, RequestId, RequestIdHeaders, Scheme};

/// Derives the value to propagate from the current one and a newly minted ID.
pub type Next<T> = fn(T, String) -> T;

/// Reader, writer and deriver bound to one identifier scheme.
///
/// Built once and shared by every request; cloning only bumps reference counts.
pub struct Options<T: Scheme> {
    read: ReadHeader<T>,
    write: WriteHeader<T>,
    next: Next<T>,
}

impl<T: Scheme> Options<T> {
    /// Options using the built-in codec for the given header names.
    pub fn from_headers(names: T::HeaderNames) -> Self {
        Self {
            read: codec::read_header::<T>(names.clone()),
            write: codec::write_header::<T>(names),
            next: T::next,
        }
    }

    fn with_codec<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&HeaderMap, String) -> (T, bool) + Send + Sync + 'static,
        W: Fn(&mut HeaderMap, &T) + Send + Sync + 'static,
    {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
            next: T::next,
        }
    }

    pub fn read(&self) -> &ReadHeader<T> {
        &self.read
    }

    pub fn write(&self) -> &WriteHeader<T> {
        &self.write
    }

    pub fn next(&self) -> Next<T> {
        self.next
    }

    pub fn parts(&self) -> (ReadHeader<T>, WriteHeader<T>, Next<T>) {
        (self.read.clone(), self.write.clone(), self.next)
    }
}

impl Options<Metadata> {
    /// Metadata options with a custom header reader and writer.
    pub fn metadata<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&HeaderMap, String) -> (Metadata, bool) + Send + Sync + 'static,
        W: Fn(&mut HeaderMap, &Metadata) + Send + Sync + 'static,
    {
        Self::with_codec(read, write)
    }

    /// Metadata options with the given header names.
    pub fn metadata_with_headers(
        request_id: HeaderName,
        causation_id: HeaderName,
        correlation_id: HeaderName,
    ) -> Self {
        Self::from_headers(MetadataHeaders::new(request_id, causation_id, correlation_id))
    }
}

impl Options<RequestId> {
    /// RequestId options with a custom header reader and writer.
    pub fn request_id<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&HeaderMap, String) -> (RequestId, bool) + Send + Sync + 'static,
        W: Fn(&mut HeaderMap, &RequestId) + Send + Sync + 'static,
    {
        Self::with_codec(read, write)
    }

    /// RequestId options with the given header name.
    pub fn request_id_with_header(request_id: HeaderName) -> Self {
        Self::from_headers(RequestIdHeaders::new(request_id))
    }
}

impl<T: Scheme> Default for Options<T> {
    fn default() -> Self {
        Self::from_headers(T::HeaderNames::default())
    }
}

impl<T: Scheme> Clone for Options<T> {
    fn clone(&self) -> Self {
        Self {
            read: self.read.clone(),
            write: self.write.clone(),
            next: self.next,
        }
    }
}

impl<T: Scheme> fmt::Debug for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options").field("scheme", &T::NAME).finish_non_exhaustive()
    }
}

/// Metadata options with the default header names.
pub fn default_metadata_options() -> Options<Metadata> {
    Options::default()
}

/// RequestId options with the default header name.
pub fn default_request_id_options() -> Options<RequestId> {
    Options::default()
}
