// src/status/mod.rs
mod aggregator;
mod model;
mod page;
mod probe;

pub use aggregator::Aggregator;
pub use model::{
    sanitize_detail, AggregateStatus, OverallStatus, ServiceCheckResult, ServiceDescriptor,
    ServiceState, DETAIL_MAX_CHARS,
};
pub use page::{render_status_page, FETCH_FAILED_DETAIL, HEALTH_PATH};
pub use probe::{
    bounded, short_version, FrontendProbe, GraphProbe, Probe, RelationalProbe, SelfProbe,
    API_SERVICE, FRONTEND_SERVICE, GRAPH_SERVICE, RELATIONAL_SERVICE,
};

use crate::config::Config;
use crate::db::{GraphConnectivity, RelationalStore};
use std::sync::Arc;
use std::time::Duration;

/// The fixed dependency list, in the order it is reported.
pub fn descriptors(config: &Config) -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new(API_SERVICE, config.server.listen_addr.port()),
        ServiceDescriptor::new(GRAPH_SERVICE, config.neo4j_port()),
        ServiceDescriptor::new(RELATIONAL_SERVICE, config.postgres_port()),
        ServiceDescriptor::new(FRONTEND_SERVICE, config.status.frontend.port),
    ]
}

/// Worst-case duration of one `/status/health` request under `config`.
/// Matches [`Aggregator::time_bound`] for the probes of [`build_probes`].
pub fn aggregate_time_bound(config: &Config) -> Duration {
    let candidates = config.status.frontend.candidates.len().max(1) as u32;
    config.status.probe_timeout() * candidates + aggregator::GUARD_SLACK
}

/// Probes for [`descriptors`], same order.
pub fn build_probes(
    config: &Config,
    graph: Arc<dyn GraphConnectivity>,
    relational: Arc<dyn RelationalStore>,
) -> Result<Vec<Arc<dyn Probe>>, reqwest::Error> {
    let limit = config.status.probe_timeout();
    let frontend = FrontendProbe::new(
        config.status.frontend.candidates.clone(),
        config.status.frontend.port,
        limit,
    )?;

    Ok(vec![
        Arc::new(SelfProbe::new(config.server.listen_addr.port())),
        Arc::new(GraphProbe::new(graph, config.neo4j_port(), limit)),
        Arc::new(RelationalProbe::new(relational, config.postgres_port(), limit)),
        Arc::new(frontend),
    ])
}
