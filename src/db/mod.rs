// src/db/mod.rs
mod models;
mod neo4j;
mod postgres;

pub use models::*;
pub use neo4j::{validate_identifier, GraphStore};
pub use postgres::PgStore;

use crate::error::StoreError;
use async_trait::async_trait;

/// What the relational health probe needs from the pool.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Borrow one pooled connection, run `SELECT version()`, give it back.
    async fn server_version(&self) -> Result<String, StoreError>;
}

#[async_trait]
pub trait SowRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<SowSummary>, StoreError>;
    async fn create(&self, new: NewSow) -> Result<SowDocument, StoreError>;
    async fn get(&self, id: i32) -> Result<Option<SowDocument>, StoreError>;
    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}

/// What the graph health probe needs from the driver.
#[async_trait]
pub trait GraphConnectivity: Send + Sync {
    async fn verify_connectivity(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    async fn stats(&self) -> Result<GraphStats, StoreError>;
    async fn add_knowledge(&self, knowledge: &SowKnowledge)
        -> Result<KnowledgeSummary, StoreError>;
}
