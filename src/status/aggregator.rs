// src/status/aggregator.rs
use super::model::{AggregateStatus, ServiceCheckResult, ServiceDescriptor};
use super::probe::Probe;
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Slack given to a probe beyond its declared bound before the aggregator
/// stops waiting for it.
pub(crate) const GUARD_SLACK: Duration = Duration::from_secs(1);

/// Fans a status request out to every configured probe.
pub struct Aggregator {
    probes: Vec<Arc<dyn Probe>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Aggregator {
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self {
            probes,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Configured dependencies in declaration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.probes
            .iter()
            .map(|p| ServiceDescriptor::new(p.name(), p.port()))
            .collect()
    }

    /// Longest `run` can take: the slowest probe's bound plus the guard
    /// slack, after which every probe has either answered or been abandoned.
    pub fn time_bound(&self) -> Duration {
        self.probes
            .iter()
            .map(|p| p.time_bound())
            .max()
            .unwrap_or(Duration::ZERO)
            + GUARD_SLACK
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Run every probe concurrently and collect results by declaration
    /// index. Always yields exactly one entry per probe.
    pub async fn run(&self) -> AggregateStatus {
        let start = Instant::now();

        let tasks = self.probes.iter().map(|probe| {
            let probe = probe.clone();
            let guard = probe.time_bound() + GUARD_SLACK;
            let metrics = self.metrics.clone();
            async move {
                let name = probe.name().to_string();
                let port = probe.port();
                let started = Instant::now();
                let mut task = tokio::spawn(async move { probe.probe().await });

                let result = match timeout(guard, &mut task).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_err)) => {
                        error!(service = %name, error = %join_err, "probe crashed");
                        ServiceCheckResult::unknown(&join_err.to_string())
                    }
                    Err(_) => {
                        task.abort();
                        warn!(service = %name, "probe overran its bound, abandoned");
                        ServiceCheckResult::down(
                            name.as_str(),
                            port,
                            &format!("timed out after {}ms", guard.as_millis()),
                        )
                    }
                };

                if let Some(metrics) = &metrics {
                    metrics.record_probe(&name, result.is_up(), started.elapsed());
                }
                result
            }
        });

        // join_all keeps input order regardless of completion order.
        let services = futures::future::join_all(tasks).await;
        let aggregate = AggregateStatus::from_services(services, start.elapsed());

        let up = aggregate.services.iter().filter(|s| s.is_up()).count();
        info!(
            "Status check complete: {}/{} up in {}ms",
            up,
            aggregate.services.len(),
            aggregate.check_ms
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_status_check(aggregate.is_healthy());
        }

        aggregate
    }
}
