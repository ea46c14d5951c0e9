// src/api/graph.rs
use super::{json_response, read_json};
use crate::db::{KnowledgeGraph, SowKnowledge};
use crate::error::ApiError;
use hyper::{Body, Response, StatusCode};

pub async fn stats(graph: &dyn KnowledgeGraph) -> Result<Response<Body>, ApiError> {
    let stats = graph.stats().await?;
    Ok(json_response(StatusCode::OK, &stats))
}

/// Entity properties are opaque; only labels and relationship types are
/// checked, since those end up in the query text.
pub async fn add_sow_knowledge(
    graph: &dyn KnowledgeGraph,
    body: Body,
) -> Result<Response<Body>, ApiError> {
    let knowledge: SowKnowledge = read_json(body).await?;
    let summary = graph.add_knowledge(&knowledge).await?;
    Ok(json_response(StatusCode::OK, &summary))
}
