// src/api/health.rs
//
// `GET /health`: the compact two-store check older clients poll.

use crate::db::{GraphConnectivity, RelationalStore};
use crate::status::sanitize_detail;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyHealth {
    pub status: String,
    pub neo4j: String,
    pub postgres: String,
}

pub async fn check(
    graph: &dyn GraphConnectivity,
    relational: &dyn RelationalStore,
    limit: Duration,
) -> LegacyHealth {
    let (neo4j, postgres) = tokio::join!(
        store_state(limit, graph.verify_connectivity()),
        store_state(limit, async { relational.server_version().await.map(|_| ()) }),
    );

    let healthy = neo4j == "connected" && postgres == "connected";
    LegacyHealth {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        neo4j,
        postgres,
    }
}

async fn store_state<F, E>(limit: Duration, check: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match timeout(limit, check).await {
        Ok(Ok(())) => "connected".to_string(),
        Ok(Err(e)) => format!("error: {}", sanitize_detail(&e.to_string())),
        Err(_) => format!("error: timed out after {}ms", limit.as_millis()),
    }
}
