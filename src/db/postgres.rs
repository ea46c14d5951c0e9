// src/db/postgres.rs
use super::{NewSow, RelationalStore, SowDocument, SowRepository, SowSummary};
use crate::config::PostgresConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

const CREATE_SOW_DOCUMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS sow_documents (
        id              SERIAL PRIMARY KEY,
        title           TEXT NOT NULL,
        status          TEXT NOT NULL DEFAULT 'draft',
        uploaded_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        content         JSONB,
        metadata        JSONB
    )
"#;

const CREATE_REVIEW_RESULTS: &str = r#"
    CREATE TABLE IF NOT EXISTS review_results (
        id              SERIAL PRIMARY KEY,
        sow_id          INTEGER REFERENCES sow_documents(id) ON DELETE CASCADE,
        reviewer        TEXT,
        score           REAL,
        findings        JSONB,
        reviewed_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Bounded Postgres pool. Every operation checks out one connection and
/// returns it when the borrow ends, including on error.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Build the pool without dialing; connections are opened on first use.
    pub fn connect_lazy(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy(&config.url)?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the application tables if they are missing.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(CREATE_SOW_DOCUMENTS).execute(&mut *conn).await?;
        sqlx::query(CREATE_REVIEW_RESULTS).execute(&mut *conn).await?;
        info!("PostgreSQL tables initialized");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl RelationalStore for PgStore {
    async fn server_version(&self) -> Result<String, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let version: Option<String> = sqlx::query_scalar("SELECT version()")
            .fetch_one(&mut *conn)
            .await?;
        debug!(?version, "PostgreSQL version query answered");
        Ok(version.unwrap_or_default())
    }
}

#[async_trait]
impl SowRepository for PgStore {
    async fn list(&self) -> Result<Vec<SowSummary>, StoreError> {
        let rows = sqlx::query_as::<_, SowSummary>(
            "SELECT id, title, status, uploaded_at, updated_at \
             FROM sow_documents ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create(&self, new: NewSow) -> Result<SowDocument, StoreError> {
        let row = sqlx::query_as::<_, SowDocument>(
            "INSERT INTO sow_documents (title, content, metadata) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.title.unwrap_or_default())
        .bind(new.content)
        .bind(new.metadata)
        .fetch_one(&self.pool)
        .await?;
        info!(id = row.id, "SoW document created");
        Ok(row)
    }

    async fn get(&self, id: i32) -> Result<Option<SowDocument>, StoreError> {
        let row = sqlx::query_as::<_, SowDocument>("SELECT * FROM sow_documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sow_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
