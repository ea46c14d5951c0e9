// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use cocoon_api::db::{
    validate_identifier, GraphConnectivity, GraphStats, KnowledgeGraph, KnowledgeSummary, NewSow,
    RelationalStore, SowDocument, SowKnowledge, SowRepository, SowSummary,
};
use cocoon_api::config::Config;
use cocoon_api::error::StoreError;
use cocoon_api::server::{AppState, RequestHandler, ServerBuilder};
use cocoon_api::status::{self, Aggregator, Probe, ServiceCheckResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use url::Url;

/// Graph store whose connectivity check sleeps, then succeeds or fails.
pub struct FakeGraph {
    pub delay: Duration,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeGraph {
    pub fn up() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            error: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn down(error: &str) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            error: Some(error.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            error: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl GraphConnectivity for FakeGraph {
    async fn verify_connectivity(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        match &self.error {
            Some(msg) => Err(StoreError::Decode(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KnowledgeGraph for FakeGraph {
    async fn stats(&self) -> Result<GraphStats, StoreError> {
        match &self.error {
            Some(msg) => Err(StoreError::Decode(msg.clone())),
            None => Ok(GraphStats {
                nodes: 3,
                relationships: 1,
                labels: vec!["Deliverable".to_string(), "Milestone".to_string()],
            }),
        }
    }

    async fn add_knowledge(
        &self,
        knowledge: &SowKnowledge,
    ) -> Result<KnowledgeSummary, StoreError> {
        for entity in &knowledge.entities {
            validate_identifier(&entity.label)?;
        }
        for rel in &knowledge.relationships {
            validate_identifier(&rel.rel_type)?;
        }
        Ok(KnowledgeSummary {
            status: "ok".to_string(),
            entities_added: knowledge.entities.len(),
            relationships_added: knowledge.relationships.len(),
        })
    }
}

/// Relational store answering `SELECT version()` after a delay.
pub struct FakeRelational {
    pub delay: Duration,
    pub version: Result<String, ()>,
}

impl FakeRelational {
    pub fn up(version: &str) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            version: Ok(version.to_string()),
        })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            version: Err(()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            version: Ok("PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc".to_string()),
        })
    }
}

#[async_trait]
impl RelationalStore for FakeRelational {
    async fn server_version(&self) -> Result<String, StoreError> {
        sleep(self.delay).await;
        self.version
            .clone()
            .map_err(|_| StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[derive(Default)]
pub struct InMemorySows {
    rows: Mutex<Vec<SowDocument>>,
    next_id: AtomicUsize,
}

impl InMemorySows {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        })
    }
}

#[async_trait]
impl SowRepository for InMemorySows {
    async fn list(&self) -> Result<Vec<SowSummary>, StoreError> {
        let rows = self.rows.lock().await;
        let mut summaries: Vec<SowSummary> = rows.iter().map(SowSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }

    async fn create(&self, new: NewSow) -> Result<SowDocument, StoreError> {
        let now = Utc::now();
        let doc = SowDocument {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) as i32,
            title: new.title.unwrap_or_default(),
            status: "draft".to_string(),
            uploaded_at: now,
            updated_at: now,
            content: new.content,
            metadata: new.metadata,
        };
        self.rows.lock().await.push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, id: i32) -> Result<Option<SowDocument>, StoreError> {
        Ok(self.rows.lock().await.iter().find(|d| d.id == id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|d| d.id != id);
        Ok(rows.len() != before)
    }
}

pub enum Behavior {
    Up,
    Down,
    Panic,
}

/// Probe with a fixed name, latency and outcome.
pub struct FakeProbe {
    pub name: String,
    pub port: u16,
    pub delay: Duration,
    pub bound: Duration,
    pub behavior: Behavior,
}

impl FakeProbe {
    pub fn new(name: &str, port: u16, delay: Duration, behavior: Behavior) -> Arc<dyn Probe> {
        Arc::new(Self {
            name: name.to_string(),
            port,
            delay,
            bound: delay,
            behavior,
        })
    }

    /// Claims `bound` but actually takes `delay`.
    pub fn overrunning(name: &str, bound: Duration, delay: Duration) -> Arc<dyn Probe> {
        Arc::new(Self {
            name: name.to_string(),
            port: 1,
            delay,
            bound,
            behavior: Behavior::Up,
        })
    }
}

#[async_trait]
impl Probe for FakeProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn time_bound(&self) -> Duration {
        self.bound
    }

    async fn probe(&self) -> ServiceCheckResult {
        sleep(self.delay).await;
        match self.behavior {
            Behavior::Up => ServiceCheckResult::up(self.name.as_str(), self.port, "ok"),
            Behavior::Down => {
                ServiceCheckResult::down(self.name.as_str(), self.port, "connection refused")
            }
            Behavior::Panic => panic!("probe exploded"),
        }
    }
}

/// App state wired the way `serve` wires it, with fakes for the stores.
pub fn app_state(config: &Config, graph: Arc<FakeGraph>, relational: Arc<FakeRelational>) -> AppState {
    let probes = status::build_probes(config, graph.clone(), relational.clone()).unwrap();
    let aggregator = Aggregator::new(probes);
    let page = status::render_status_page(&aggregator.descriptors(), config.status.poll_interval());

    AppState {
        aggregator: Arc::new(aggregator),
        status_page: Arc::from(page),
        sows: InMemorySows::new(),
        knowledge: graph.clone(),
        graph_health: graph,
        relational_health: relational,
        probe_timeout: config.status.probe_timeout(),
        metrics: None,
    }
}

/// A real listener serving `state` on a loopback port.
pub struct RunningServer {
    pub base: Url,
    shutdown: Option<oneshot::Sender<()>>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    pub async fn start(state: AppState, grace: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let builder = ServerBuilder::new(listener.local_addr().unwrap())
            .with_handler(RequestHandler::new(Arc::new(state)))
            .with_shutdown_grace(grace);
        let task = tokio::spawn(builder.serve_on(listener, async move {
            let _ = rx.await;
        }));

        Self {
            base,
            shutdown: Some(tx),
            task,
        }
    }

    pub fn shut_down(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Accepts TCP connections (via the backlog) but never answers them.
pub async fn silent_listener() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    (listener, url)
}
