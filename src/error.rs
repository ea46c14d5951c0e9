// src/error.rs
use hyper::StatusCode;

/// Failures from the relational pool or the graph driver.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("graph error: {0}")]
    Graph(#[from] neo4rs::Error),

    #[error("invalid identifier {0:?}: expected letters, digits and underscores")]
    InvalidIdentifier(String),

    #[error("graph query returned no rows: {0}")]
    EmptyResult(&'static str),

    #[error("graph row decode failed: {0}")]
    Decode(String),
}

/// Expected unavailability of a dependency. Always turned into a `down`
/// result, never propagated out of a probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Body(_) | ApiError::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(StoreError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
