//! Identifier schemes carried across service boundaries.
//!
//! Exactly two schemes exist: [`Metadata`] models a causal event chain and
//! [`RequestId`] models a sticky per-session identifier. The [`Scheme`] trait
//! is sealed so the set stays closed.

mod metadata;
mod request_id;

use axum::http::HeaderMap;
use std::fmt;

pub use metadata::{new_metadata, next_metadata, valid_metadata, Metadata, MetadataHeaders};
pub use request_id::{
    new_request_id, next_request_id, valid_request_id, RequestId, RequestIdHeaders,
};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Metadata {}
    impl Sealed for super::RequestId {}
}

/// Operations every identifier scheme provides to the middleware.
pub trait Scheme: sealed::Sealed + Clone + fmt::Debug + Send + Sync + 'static {
    /// Header names this scheme reads from and writes to.
    type HeaderNames: Clone + Default + fmt::Debug + Send + Sync + 'static;

    /// Short name used in log fields and error messages.
    const NAME: &'static str;

    /// Fresh value seeded with a newly minted identifier.
    fn new(id: String) -> Self;

    /// Value to propagate forward given the current one and a newly minted identifier.
    fn next(self, id: String) -> Self;

    /// Whether every field the scheme needs is non-empty.
    fn is_valid(&self) -> bool;

    /// Identifier of the current hop.
    fn id(&self) -> &str;

    /// Parses the value from `headers`.
    ///
    /// Returns `(Self::new(id), false)` when what the headers carry is not valid.
    fn read_header(headers: &HeaderMap, names: &Self::HeaderNames, id: String) -> (Self, bool);

    /// Writes the value into `headers`, replacing existing entries.
    fn write_header(&self, headers: &mut HeaderMap, names: &Self::HeaderNames);
}
