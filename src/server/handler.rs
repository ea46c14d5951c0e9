// src/server/handler.rs
use super::router::{route, AppState};
use crate::metrics::{MetricsCollector, Timer};
use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::{Body, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct RequestHandler {
    state: Arc<AppState>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RequestHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let metrics = self.metrics.clone();
        let request_id = Uuid::new_v4();
        let method = req.method().clone();
        let span = tracing::info_span!(
            "request",
            id = %request_id,
            method = %method,
            path = %req.uri().path()
        );

        Box::pin(
            async move {
                let timer = Timer::new();
                let (mut response, route_label) = route(&state, req).await;

                let headers = response.headers_mut();
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
                headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*"));
                headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
                if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                }

                let status = response.status();
                tracing::debug!(route = route_label, status = status.as_u16(), "request served");
                if let Some(metrics) = &metrics {
                    metrics.record_request(
                        method.as_str(),
                        route_label,
                        status.as_u16(),
                        timer.elapsed(),
                    );
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}
