// src/status/probe.rs
use super::model::ServiceCheckResult;
use crate::db::{GraphConnectivity, RelationalStore};
use crate::error::ProbeError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

pub const API_SERVICE: &str = "API Backend";
pub const GRAPH_SERVICE: &str = "Neo4j Graph DB";
pub const RELATIONAL_SERVICE: &str = "PostgreSQL";
pub const FRONTEND_SERVICE: &str = "Web Frontend";

/// One dependency check. Implementations must return within their own
/// time bound and turn every failure into a `down` result.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;
    fn port(&self) -> u16;
    /// Longest time `probe` may take before it reports `down`.
    fn time_bound(&self) -> Duration;
    async fn probe(&self) -> ServiceCheckResult;
}

/// Run `check` under `limit`, mapping its outcome onto a result record.
pub async fn bounded<F>(name: &str, port: u16, limit: Duration, check: F) -> ServiceCheckResult
where
    F: Future<Output = Result<String, ProbeError>>,
{
    let outcome = match timeout(limit, check).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ProbeError::Timeout(limit.as_millis() as u64)),
    };

    match outcome {
        Ok(detail) => {
            debug!(service = name, %detail, "probe up");
            ServiceCheckResult::up(name, port, &detail)
        }
        Err(e) => {
            warn!(service = name, error = %e, "probe down");
            ServiceCheckResult::down(name, port, &e.to_string())
        }
    }
}

/// The serving process itself. Reaching this code proves it is alive.
pub struct SelfProbe {
    port: u16,
}

impl SelfProbe {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Probe for SelfProbe {
    fn name(&self) -> &str {
        API_SERVICE
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn time_bound(&self) -> Duration {
        Duration::ZERO
    }

    async fn probe(&self) -> ServiceCheckResult {
        ServiceCheckResult::up(API_SERVICE, self.port, "Serving requests")
    }
}

pub struct GraphProbe {
    store: Arc<dyn GraphConnectivity>,
    port: u16,
    timeout: Duration,
}

impl GraphProbe {
    pub fn new(store: Arc<dyn GraphConnectivity>, port: u16, timeout: Duration) -> Self {
        Self {
            store,
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for GraphProbe {
    fn name(&self) -> &str {
        GRAPH_SERVICE
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn time_bound(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self) -> ServiceCheckResult {
        bounded(GRAPH_SERVICE, self.port, self.timeout, async {
            self.store.verify_connectivity().await?;
            Ok::<_, ProbeError>("Bolt connection active".to_string())
        })
        .await
    }
}

pub struct RelationalProbe {
    store: Arc<dyn RelationalStore>,
    port: u16,
    timeout: Duration,
}

impl RelationalProbe {
    pub fn new(store: Arc<dyn RelationalStore>, port: u16, timeout: Duration) -> Self {
        Self {
            store,
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for RelationalProbe {
    fn name(&self) -> &str {
        RELATIONAL_SERVICE
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn time_bound(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self) -> ServiceCheckResult {
        bounded(RELATIONAL_SERVICE, self.port, self.timeout, async {
            let version = self.store.server_version().await?;
            Ok::<_, ProbeError>(short_version(&version))
        })
        .await
    }
}

/// `"PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc ..."` keeps
/// everything before the first comma.
pub fn short_version(version: &str) -> String {
    let head = version.split(',').next().unwrap_or_default().trim();
    if head.is_empty() {
        "Connected".to_string()
    } else {
        head.to_string()
    }
}

/// Tries each candidate URL in order; the first 2xx or 304 wins.
pub struct FrontendProbe {
    client: Client,
    candidates: Vec<Url>,
    port: u16,
    timeout: Duration,
}

impl FrontendProbe {
    pub fn new(candidates: Vec<Url>, port: u16, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            candidates,
            port,
            timeout,
        })
    }

    async fn try_candidate(&self, url: &Url) -> Result<(), ProbeError> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_MODIFIED {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl Probe for FrontendProbe {
    fn name(&self) -> &str {
        FRONTEND_SERVICE
    }

    fn port(&self) -> u16 {
        self.port
    }

    /// Candidates are tried one after another, each under the full timeout.
    fn time_bound(&self) -> Duration {
        self.timeout * self.candidates.len().max(1) as u32
    }

    async fn probe(&self) -> ServiceCheckResult {
        for url in &self.candidates {
            match timeout(self.timeout, self.try_candidate(url)).await {
                Ok(Ok(())) => {
                    debug!(service = FRONTEND_SERVICE, %url, "probe up");
                    return ServiceCheckResult::up(FRONTEND_SERVICE, self.port, "Dev server running");
                }
                Ok(Err(e)) => debug!(%url, error = %e, "frontend candidate failed"),
                Err(_) => debug!(%url, "frontend candidate timed out"),
            }
        }

        warn!(
            service = FRONTEND_SERVICE,
            candidates = self.candidates.len(),
            "probe down: no candidate answered"
        );
        ServiceCheckResult::down(FRONTEND_SERVICE, self.port, "Not started")
    }
}
