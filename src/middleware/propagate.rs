//! Tracing header propagation middleware.

use axum::http::{HeaderMap, Request, Response};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::context::with_tracing;
use crate::id::MakeId;
use crate::options::Options;
use crate::scheme::Scheme;

/// Resolves the identifier for one request.
///
/// Reads `headers` with `id` as the fallback seed. A valid upstream value is
/// advanced with the scheme's deriver; otherwise the value seeded with `id`
/// is used as-is. The flag reports whether the upstream value was valid.
pub fn resolve<T: Scheme>(options: &Options<T>, headers: &HeaderMap, id: String) -> (T, bool) {
    let (value, found) = (options.read())(headers, id.clone());

    if found {
        ((options.next())(value, id), true)
    } else {
        (value, false)
    }
}

/// Copies entries of `from` whose name `into` does not carry yet.
///
/// Headers the handler set itself are left untouched.
fn merge_missing(into: &mut HeaderMap, from: &HeaderMap) {
    for (name, value) in from {
        into.entry(name).or_insert_with(|| value.clone());
    }
}

/// Layer that reads tracing headers, derives the next identifier and writes
/// it to the request context and the response headers.
///
/// The minter is called once per request, whether or not an upstream value is found.
#[derive(Debug, Clone)]
pub struct TracingLayer<T: Scheme, M> {
    options: Options<T>,
    make_id: M,
}

impl<T: Scheme, M: MakeId> TracingLayer<T, M> {
    pub fn new(options: Options<T>, make_id: M) -> Self {
        Self { options, make_id }
    }
}

/// Tracing middleware: wraps a service so every request is tagged with the
/// scheme `T` as configured by `options`, minting identifiers with `make_id`.
pub fn middleware<T: Scheme, M: MakeId>(options: Options<T>, make_id: M) -> TracingLayer<T, M> {
    TracingLayer::new(options, make_id)
}

/// Same as [`middleware`]; reads better next to other `*_layer` builders.
pub fn tracing_layer<T: Scheme, M: MakeId>(options: Options<T>, make_id: M) -> TracingLayer<T, M> {
    middleware(options, make_id)
}

impl<S, T: Scheme, M: MakeId> Layer<S> for TracingLayer<T, M> {
    type Service = TracingService<S, T, M>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService {
            inner,
            options: self.options.clone(),
            make_id: self.make_id.clone(),
        }
    }
}

/// Service produced by [`TracingLayer`].
#[derive(Debug, Clone)]
pub struct TracingService<S, T: Scheme, M> {
    inner: S,
    options: Options<T>,
    make_id: M,
}

impl<S, T, M, ReqBody, ResBody> Service<Request<ReqBody>> for TracingService<S, T, M>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
    T: Scheme,
    M: MakeId,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let id = self.make_id.make_id();
        let (value, found) = resolve(&self.options, request.headers(), id);

        tracing::debug!(
            scheme = T::NAME,
            found,
            value = ?value,
            "Resolved tracing identifiers"
        );

        // Encoded before the handler runs; merged into whatever response comes back
        let mut outgoing = HeaderMap::new();
        (self.options.write())(&mut outgoing, &value);

        with_tracing(request.extensions_mut(), value);

        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            merge_missing(response.headers_mut(), &outgoing);
            Ok(response)
        })
    }
}
