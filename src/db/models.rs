// src/db/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SowDocument {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content: Option<Value>,
    pub metadata: Option<Value>,
}

/// Row shape of the listing endpoint; leaves the JSON bodies out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SowSummary {
    pub id: i32,
    pub title: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SowDocument> for SowSummary {
    fn from(doc: &SowDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            status: doc.status.clone(),
            uploaded_at: doc.uploaded_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSow {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: i64,
    pub relationships: i64,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SowKnowledge {
    pub sow_id: i64,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    pub label: String,
    pub name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSummary {
    pub status: String,
    pub entities_added: usize,
    pub relationships_added: usize,
}
