// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Request metrics
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,

    // Probe metrics
    pub probe_duration_seconds: HistogramVec,
    pub probe_up: IntGaugeVec,
    pub status_checks_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("cocoon_http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "cocoon_http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "route"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "cocoon_probe_duration_seconds",
                "Dependency probe duration in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 3.0, 6.0]),
            &["service"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_up = IntGaugeVec::new(
            Opts::new(
                "cocoon_probe_up",
                "Last probe result per dependency (1=up, 0=down)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(probe_up.clone()))?;

        let status_checks_total = IntCounterVec::new(
            Opts::new(
                "cocoon_status_checks_total",
                "Aggregated status checks by overall result",
            ),
            &["status"],
        )?;
        registry.register(Box::new(status_checks_total.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            probe_duration_seconds,
            probe_up,
            status_checks_total,
        })
    }

    pub fn record_request(&self, method: &str, route: &str, status_code: u16, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, route, &status])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_probe(&self, service: &str, up: bool, duration: Duration) {
        self.probe_duration_seconds
            .with_label_values(&[service])
            .observe(duration.as_secs_f64());
        self.probe_up
            .with_label_values(&[service])
            .set(if up { 1 } else { 0 });
    }

    pub fn record_status_check(&self, healthy: bool) {
        let status = if healthy { "healthy" } else { "degraded" };
        self.status_checks_total.with_label_values(&[status]).inc();
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
