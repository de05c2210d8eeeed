//! # trace-propagation
//!
//! HTTP middleware that propagates distributed-tracing identifiers through
//! request headers and exposes them to handlers through the request context.
//!
//! Two identifier schemes are supported:
//! - [`RequestId`]: a single identifier passed along unchanged.
//! - [`Metadata`]: an ID, causation ID and correlation ID triple that is
//!   advanced on every hop.
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use trace_propagation::{default_metadata_options, tracing_layer, MakeUuid, Metadata, Tracing};
//!
//! let app: Router = Router::new()
//!     .route("/", get(|Tracing(m): Tracing<Metadata>| async move { m.correlation_id }))
//!     .layer(tracing_layer(default_metadata_options(), MakeUuid));
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod id;
pub mod middleware;
pub mod options;
pub mod scheme;

// Re-export main types for convenience
pub use codec::{
    ReadHeader, WriteHeader, HEADER_CAUSATION_ID, HEADER_CORRELATION_ID, HEADER_REQUEST_ID,
};
pub use context::{attach, get_tracing, with_tracing, Tracing};
pub use error::{ApiError, ApiResult, ErrorResponse, TracingError};
pub use id::{from_display, MakeId, MakeUuid, SequentialId};
pub use middleware::{middleware, resolve, tracing_layer, TracingLayer, TracingService};
pub use options::{default_metadata_options, default_request_id_options, Next, Options};
pub use scheme::{Metadata, MetadataHeaders, RequestId, RequestIdHeaders, Scheme};
