// src/server/router.rs
use crate::api::{self, html_response, json_response};
use crate::db::{GraphConnectivity, KnowledgeGraph, RelationalStore, SowRepository};
use crate::error::ApiError;
use crate::metrics::MetricsRegistry;
use crate::status::Aggregator;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Everything a request may touch. Built once in `main`.
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    /// Rendered status page; identical for every request.
    pub status_page: Arc<str>,
    pub sows: Arc<dyn SowRepository>,
    pub knowledge: Arc<dyn KnowledgeGraph>,
    pub graph_health: Arc<dyn GraphConnectivity>,
    pub relational_health: Arc<dyn RelationalStore>,
    pub probe_timeout: Duration,
    pub metrics: Option<MetricsEndpoint>,
}

pub struct MetricsEndpoint {
    pub registry: Arc<MetricsRegistry>,
    pub path: String,
}

/// Dispatch a request. The second value is a low-cardinality route label
/// for metrics and logs.
pub async fn route(state: &AppState, req: Request<Body>) -> (Response<Body>, &'static str) {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        return (response, "preflight");
    }

    if let Some(metrics) = &state.metrics {
        if path == metrics.path {
            return (metrics_response(&metrics.registry), "metrics");
        }
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let body = req.into_body();

    let (result, label) = match segments.as_slice() {
        ["status"] => match method {
            Method::GET => (Ok(html_response(&state.status_page)), "status_page"),
            _ => (Err(ApiError::MethodNotAllowed), "status_page"),
        },
        ["status", "health"] => match method {
            Method::GET => {
                let aggregate = state.aggregator.run().await;
                (Ok(json_response(StatusCode::OK, &aggregate)), "status_health")
            }
            _ => (Err(ApiError::MethodNotAllowed), "status_health"),
        },
        ["health"] => match method {
            Method::GET => {
                let health = api::health::check(
                    state.graph_health.as_ref(),
                    state.relational_health.as_ref(),
                    state.probe_timeout,
                )
                .await;
                (Ok(json_response(StatusCode::OK, &health)), "health")
            }
            _ => (Err(ApiError::MethodNotAllowed), "health"),
        },
        ["api", "sow"] => match method {
            Method::GET => (api::sow::list(state.sows.as_ref()).await, "sow_list"),
            Method::POST => (api::sow::create(state.sows.as_ref(), body).await, "sow_create"),
            _ => (Err(ApiError::MethodNotAllowed), "sow"),
        },
        ["api", "sow", id] => match method {
            Method::GET => (api::sow::get(state.sows.as_ref(), id).await, "sow_get"),
            Method::DELETE => (api::sow::delete(state.sows.as_ref(), id).await, "sow_delete"),
            _ => (Err(ApiError::MethodNotAllowed), "sow_item"),
        },
        ["api", "graph", "stats"] => match method {
            Method::GET => (api::graph::stats(state.knowledge.as_ref()).await, "graph_stats"),
            _ => (Err(ApiError::MethodNotAllowed), "graph_stats"),
        },
        ["api", "graph", "sow-knowledge"] => match method {
            Method::POST => (
                api::graph::add_sow_knowledge(state.knowledge.as_ref(), body).await,
                "graph_knowledge",
            ),
            _ => (Err(ApiError::MethodNotAllowed), "graph_knowledge"),
        },
        _ => (Err(ApiError::NotFound("Not Found")), "not_found"),
    };

    (result.unwrap_or_else(Response::from), label)
}

fn metrics_response(registry: &MetricsRegistry) -> Response<Body> {
    match registry.gather() {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(e) => {
            tracing::error!(%e, "metrics encoding failed");
            let mut response = Response::new(Body::from("metrics unavailable"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
