// src/db/neo4j.rs
use super::{GraphConnectivity, GraphStats, KnowledgeGraph, KnowledgeSummary, SowKnowledge};
use crate::config::Neo4jConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use neo4rs::{query, BoltType, Graph, Query, Row};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared Bolt driver. Each call borrows a session from the driver's pool
/// for the length of one query.
#[derive(Clone)]
pub struct GraphStore {
    graph: Arc<Graph>,
}

impl GraphStore {
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, StoreError> {
        let graph = Graph::new(&config.uri, &config.user, &config.password).await?;
        info!(uri = %config.uri, "Neo4j driver created");
        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    async fn single_row(&self, q: Query, what: &'static str) -> Result<Row, StoreError> {
        let mut stream = self.graph.execute(q).await?;
        stream.next().await?.ok_or(StoreError::EmptyResult(what))
    }
}

#[async_trait]
impl GraphConnectivity for GraphStore {
    async fn verify_connectivity(&self) -> Result<(), StoreError> {
        self.single_row(query("RETURN 1 AS ok"), "connectivity check")
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl KnowledgeGraph for GraphStore {
    async fn stats(&self) -> Result<GraphStats, StoreError> {
        let nodes = self
            .single_row(query("MATCH (n) RETURN count(n) AS count"), "node count")
            .await?;
        let rels = self
            .single_row(query("MATCH ()-[r]->() RETURN count(r) AS count"), "relationship count")
            .await?;
        let labels = self
            .single_row(
                query("CALL db.labels() YIELD label RETURN collect(label) AS labels"),
                "labels",
            )
            .await?;

        Ok(GraphStats {
            nodes: nodes.get::<i64>("count").map_err(decode)?,
            relationships: rels.get::<i64>("count").map_err(decode)?,
            labels: labels.get::<Vec<String>>("labels").map_err(decode)?,
        })
    }

    async fn add_knowledge(
        &self,
        knowledge: &SowKnowledge,
    ) -> Result<KnowledgeSummary, StoreError> {
        // Labels and relationship types cannot be bound as parameters, so
        // they are checked before anything is written.
        for entity in &knowledge.entities {
            validate_identifier(&entity.label)?;
        }
        for rel in &knowledge.relationships {
            validate_identifier(&rel.rel_type)?;
        }

        let sow_id = knowledge.sow_id;

        for entity in &knowledge.entities {
            let cypher = format!(
                "MERGE (n:`{}` {{name: $name, sow_id: $sow_id}}) SET n += $props",
                entity.label
            );
            let q = query(&cypher)
                .param("name", entity.name.clone())
                .param("sow_id", sow_id)
                .param("props", bolt_properties(&entity.properties));
            self.graph.run(q).await?;
        }

        for rel in &knowledge.relationships {
            let cypher = format!(
                "MATCH (a {{name: $from_name, sow_id: $sow_id}}), \
                 (b {{name: $to_name, sow_id: $sow_id}}) \
                 MERGE (a)-[r:`{}`]->(b)",
                rel.rel_type
            );
            let q = query(&cypher)
                .param("from_name", rel.from.clone())
                .param("to_name", rel.to.clone())
                .param("sow_id", sow_id);
            self.graph.run(q).await?;
        }

        debug!(
            sow_id,
            entities = knowledge.entities.len(),
            relationships = knowledge.relationships.len(),
            "SoW knowledge merged"
        );

        Ok(KnowledgeSummary {
            status: "ok".to_string(),
            entities_added: knowledge.entities.len(),
            relationships_added: knowledge.relationships.len(),
        })
    }
}

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`, the identifiers we are willing to
/// splice into Cypher text.
pub fn validate_identifier(ident: &str) -> Result<(), StoreError> {
    let mut chars = ident.chars();
    let head_ok = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(ident.to_string()))
    }
}

/// Scalars map to their Bolt counterparts; arrays and objects are stored as
/// JSON text; nulls are dropped.
fn bolt_properties(props: &Map<String, Value>) -> HashMap<String, BoltType> {
    props
        .iter()
        .filter_map(|(key, value)| {
            let bolt = match value {
                Value::Null => return None,
                Value::Bool(b) => BoltType::from(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => BoltType::from(i),
                    None => BoltType::from(n.as_f64().unwrap_or_default()),
                },
                Value::String(s) => BoltType::from(s.clone()),
                other => BoltType::from(other.to_string()),
            };
            Some((key.clone(), bolt))
        })
        .collect()
}

fn decode(err: impl std::fmt::Display) -> StoreError {
    StoreError::Decode(err.to_string())
}
