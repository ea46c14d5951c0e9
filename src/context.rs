// src/context.rs
use crate::config::Config;
use crate::db::{GraphStore, PgStore};
use crate::error::StoreError;
use std::sync::Arc;
use tracing::{info, warn};

/// Process-wide database handles, built once at startup and passed to
/// whatever needs them.
#[derive(Clone)]
pub struct AppContext {
    pub postgres: Arc<PgStore>,
    pub graph: Arc<GraphStore>,
}

impl AppContext {
    /// Create the pool and the driver. Unreachable databases do not stop
    /// the boot; they show up as `down` on the status page instead.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let graph = GraphStore::connect(&config.neo4j).await?;
        let postgres = PgStore::connect_lazy(&config.postgres)?;
        info!(
            min = config.postgres.min_connections,
            max = config.postgres.max_connections,
            "PostgreSQL pool created"
        );

        if let Err(e) = postgres.init_schema().await {
            warn!(error = %e, "PostgreSQL tables not initialized, continuing");
        }

        Ok(Self {
            postgres: Arc::new(postgres),
            graph: Arc::new(graph),
        })
    }

    pub async fn close(self) {
        self.postgres.close().await;
        drop(self.graph);
        info!("Database handles released");
    }
}
