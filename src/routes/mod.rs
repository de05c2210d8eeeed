pub mod health;
pub mod trace;

use axum::{routing::get, Router};
use std::sync::Arc;

use trace_propagation::{Metadata, RequestId};

use crate::app::AppState;
use crate::config::SchemeKind;

/// Build the API router for the configured identifier scheme
pub fn api_router(scheme: SchemeKind) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/", get(trace::welcome))
        .route("/health", get(health::health_check));

    match scheme {
        SchemeKind::Metadata => router
            .route("/trace", get(trace::current::<Metadata>))
            .route("/fail", get(trace::fail::<Metadata>)),
        SchemeKind::RequestId => router
            .route("/trace", get(trace::current::<RequestId>))
            .route("/fail", get(trace::fail::<RequestId>)),
    }
}
