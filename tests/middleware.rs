mod common;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashSet;
use tower::{service_fn, ServiceBuilder, ServiceExt};

use trace_propagation::{
    default_metadata_options, default_request_id_options, middleware, tracing_layer, ApiError,
    ApiResult, ErrorResponse, MakeId, Metadata, Options, RequestId, Scheme, SequentialId, Tracing,
};

use common::{init_test_logging, CapturedLogs};

async fn show<T: Scheme + Serialize>(Tracing(value): Tracing<T>) -> Json<T> {
    Json(value)
}

async fn fail(Tracing(_): Tracing<Metadata>) -> ApiResult<()> {
    Err(ApiError::BadRequest("nope".to_string()))
}

fn app<T: Scheme + Serialize>(options: Options<T>, ids: SequentialId) -> Router {
    Router::new()
        .route("/", get(show::<T>))
        .route("/fail", get(fail))
        .layer(tracing_layer(options, ids))
}

fn request(headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri("/");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn fresh_requests_get_sequential_metadata() {
    init_test_logging();

    let app = app(default_metadata_options(), SequentialId::new());

    let response = app.clone().oneshot(request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(response.headers(), "x-request-id"), Some("0"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("0"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("0"));

    let m: Metadata = json(response).await;
    assert_eq!(
        m,
        Metadata {
            id: "0".into(),
            causation_id: "0".into(),
            correlation_id: "0".into(),
        }
    );

    let response = app.oneshot(request(&[])).await.unwrap();
    assert_eq!(header(response.headers(), "x-request-id"), Some("1"));
}

#[tokio::test]
async fn upstream_metadata_is_advanced() {
    let app = app(default_metadata_options(), SequentialId::starting_at(3));

    let response = app
        .oneshot(request(&[
            ("x-request-id", "2"),
            ("x-causation-id", "1"),
            ("x-correlation-id", "1"),
        ]))
        .await
        .unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("3"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("2"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("1"));

    let m: Metadata = json(response).await;
    assert_eq!(m.id, "3");
    assert_eq!(m.causation_id, "2");
    assert_eq!(m.correlation_id, "1");
}

#[tokio::test]
async fn custom_header_names_replace_defaults() {
    let options = Options::<Metadata>::metadata_with_headers(
        HeaderName::from_static("x-my-request-id"),
        HeaderName::from_static("x-my-causation-id"),
        HeaderName::from_static("x-my-correlation-id"),
    );
    let app = app(options, SequentialId::starting_at(3));

    let response = app
        .oneshot(request(&[
            ("X-My-Request-Id", "2"),
            ("X-My-Causation-Id", "1"),
            ("X-My-Correlation-Id", "1"),
        ]))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(header(headers, "x-my-request-id"), Some("3"));
    assert_eq!(header(headers, "x-my-causation-id"), Some("2"));
    assert_eq!(header(headers, "x-my-correlation-id"), Some("1"));
    assert!(headers.get("x-request-id").is_none());
    assert!(headers.get("x-causation-id").is_none());
    assert!(headers.get("x-correlation-id").is_none());
}

#[tokio::test]
async fn default_headers_are_ignored_when_custom_names_configured() {
    let options = Options::<Metadata>::metadata_with_headers(
        HeaderName::from_static("x-my-request-id"),
        HeaderName::from_static("x-my-causation-id"),
        HeaderName::from_static("x-my-correlation-id"),
    );
    let app = app(options, SequentialId::new());

    let response = app
        .oneshot(request(&[
            ("x-request-id", "2"),
            ("x-causation-id", "1"),
            ("x-correlation-id", "1"),
        ]))
        .await
        .unwrap();

    assert_eq!(header(response.headers(), "x-my-request-id"), Some("0"));
    assert_eq!(header(response.headers(), "x-my-correlation-id"), Some("0"));
}

#[tokio::test]
async fn error_responses_carry_tracing_headers() {
    let app = app(default_metadata_options(), SequentialId::starting_at(3));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/fail")
                .header("x-request-id", "2")
                .header("x-causation-id", "1")
                .header("x-correlation-id", "1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(response.headers(), "x-request-id"), Some("3"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("2"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("1"));

    let body: ErrorResponse = json(response).await;
    assert_eq!(body.code, "BAD_REQUEST");
}

#[tokio::test]
async fn partial_metadata_is_replaced() {
    let app = app(default_metadata_options(), SequentialId::starting_at(7));

    let response = app
        .oneshot(request(&[("x-request-id", "2"), ("x-correlation-id", "1")]))
        .await
        .unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("7"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("7"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("7"));
}

#[tokio::test]
async fn request_id_is_sticky() {
    let app = app(default_request_id_options(), SequentialId::new());

    let response = app
        .oneshot(request(&[("x-request-id", "upstream-42")]))
        .await
        .unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("upstream-42"));
    let r: RequestId = json(response).await;
    assert_eq!(r, RequestId::new("upstream-42"));
}

#[tokio::test]
async fn request_id_is_minted_when_absent() {
    let app = app(default_request_id_options(), SequentialId::starting_at(5));

    let response = app.oneshot(request(&[])).await.unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("5"));
    assert!(response.headers().get("x-causation-id").is_none());
}

#[tokio::test]
async fn minter_runs_even_when_upstream_value_is_kept() {
    let ids = SequentialId::new();
    let app = app(default_request_id_options(), ids.clone());

    app.oneshot(request(&[("x-request-id", "kept")]))
        .await
        .unwrap();

    assert_eq!(ids.make_id(), "1");
}

#[tokio::test]
async fn extractor_rejects_without_layer() {
    let app: Router = Router::new().route("/", get(show::<Metadata>));

    let response = app.oneshot(request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorResponse = json(response).await;
    assert_eq!(body.code, "TRACING_CONTEXT_MISSING");
}

#[tokio::test]
async fn optional_extractor_sees_nothing_without_layer() {
    let app: Router = Router::new().route(
        "/",
        get(|metadata: Option<Tracing<Metadata>>| async move {
            if metadata.is_some() {
                "present"
            } else {
                "absent"
            }
        }),
    );

    let response = app.oneshot(request(&[])).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"absent");
}

#[tokio::test]
async fn inner_service_errors_pass_through() {
    let service = ServiceBuilder::new()
        .layer(tracing_layer(default_metadata_options(), SequentialId::new()))
        .service(service_fn(|_request: Request<()>| async {
            Err::<Response<()>, &'static str>("boom")
        }));

    let err = service.oneshot(Request::new(())).await.unwrap_err();
    assert_eq!(err, "boom");
}

#[tokio::test]
async fn works_with_plain_tower_services() {
    let service = ServiceBuilder::new()
        .layer(tracing_layer(default_metadata_options(), || "fixed".to_string()))
        .service(service_fn(|request: Request<()>| async move {
            let m = request.extensions().get::<Metadata>().cloned();
            Ok::<_, std::convert::Infallible>(Response::new(m))
        }));

    let response = service.oneshot(Request::new(())).await.unwrap();
    assert_eq!(header(response.headers(), "x-request-id"), Some("fixed"));
    assert_eq!(response.into_body(), Some(Metadata::new("fixed")));
}

#[tokio::test]
async fn concurrent_requests_get_distinct_ids() {
    let app = app(default_metadata_options(), SequentialId::new());

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let response = app.oneshot(request(&[])).await.unwrap();
                header(response.headers(), "x-request-id")
                    .unwrap()
                    .to_string()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        assert!(seen.insert(handle.await.unwrap()));
    }
    assert_eq!(seen.len(), 32);
}

#[tokio::test]
async fn handler_set_tracing_header_wins() {
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                let mut response = Response::new(Body::empty());
                response
                    .headers_mut()
                    .insert("x-request-id", HeaderValue::from_static("set-by-handler"));
                response
            }),
        )
        .layer(tracing_layer(default_request_id_options(), SequentialId::new()));

    let response = app.oneshot(request(&[])).await.unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("set-by-handler"));
    assert_eq!(response.headers().get_all("x-request-id").iter().count(), 1);
}

#[tokio::test]
async fn handler_override_leaves_other_tracing_headers() {
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                let mut response = Response::new(Body::empty());
                response
                    .headers_mut()
                    .insert("x-correlation-id", HeaderValue::from_static("from-handler"));
                response
            }),
        )
        .layer(tracing_layer(default_metadata_options(), SequentialId::new()));

    let response = app.oneshot(request(&[])).await.unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("0"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("0"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("from-handler"));
}

#[tokio::test]
async fn middleware_builds_the_same_layer() {
    let service = ServiceBuilder::new()
        .layer(middleware(default_metadata_options(), SequentialId::starting_at(3)))
        .service(service_fn(|request: Request<()>| async move {
            let m = request.extensions().get::<Metadata>().cloned();
            Ok::<_, std::convert::Infallible>(Response::new(m))
        }));

    let request = Request::builder()
        .header("x-request-id", "2")
        .header("x-causation-id", "1")
        .header("x-correlation-id", "1")
        .body(())
        .unwrap();
    let response = service.oneshot(request).await.unwrap();

    assert_eq!(header(response.headers(), "x-request-id"), Some("3"));
    assert_eq!(header(response.headers(), "x-causation-id"), Some("2"));
    assert_eq!(header(response.headers(), "x-correlation-id"), Some("1"));
    assert_eq!(
        response.into_body(),
        Some(Metadata {
            id: "3".into(),
            causation_id: "2".into(),
            correlation_id: "1".into(),
        })
    );
}

#[tokio::test]
async fn resolution_is_logged_at_debug() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let app = app(default_request_id_options(), SequentialId::new());
    app.oneshot(request(&[("x-request-id", "upstream")]))
        .await
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("Resolved tracing identifiers"), "{output}");
    assert!(output.contains("found=true"), "{output}");
}

#[tokio::test]
async fn unencodable_minted_id_is_skipped_with_warning() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(tracing_layer(default_request_id_options(), || {
            "line\nbreak".to_string()
        }));

    let response = app.oneshot(request(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_none());

    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("Skipping tracing header"), "{output}");
}
