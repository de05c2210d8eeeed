use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer, ExposeHeaders},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use trace_propagation::{tracing_layer, MakeUuid, Metadata, Options, RequestId};

use crate::config::{SchemeKind, Settings};
use crate::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self { settings })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let headers = &state.settings.headers;
    let router = routes::api_router(state.settings.scheme);

    // Tracing propagation sits innermost so handlers see the context
    let router = match state.settings.scheme {
        SchemeKind::Metadata => router.layer(tracing_layer(
            Options::<Metadata>::metadata_with_headers(
                headers.request_id.clone(),
                headers.causation_id.clone(),
                headers.correlation_id.clone(),
            ),
            MakeUuid,
        )),
        SchemeKind::RequestId => router.layer(tracing_layer(
            Options::<RequestId>::request_id_with_header(headers.request_id.clone()),
            MakeUuid,
        )),
    };

    router.layer(trace_layer).layer(cors).with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let tracing_headers = [
        settings.headers.request_id.clone(),
        settings.headers.causation_id.clone(),
        settings.headers.correlation_id.clone(),
    ];

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list(
            [axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]
                .into_iter()
                .chain(tracing_headers.clone()),
        ))
        // Browsers only expose non-safelisted response headers when asked
        .expose_headers(ExposeHeaders::list(tracing_headers))
        .max_age(std::time::Duration::from_secs(3600))
}
