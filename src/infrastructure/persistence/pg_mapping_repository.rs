//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct MappingRow {
    alias: String,
    original_url: String,
    created_by: String,
    topic: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<MappingRow> for UrlMapping {
    fn from(row: MappingRow) -> Self {
        Self {
            alias: row.alias,
            original_url: row.original_url,
            created_by: row.created_by,
            topic: row.topic,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository for alias mappings.
///
/// The primary key on `alias` is the only uniqueness check; inserts never
/// look before they write.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        let alias = new_mapping.alias.clone();

        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO url_mappings (alias, original_url, created_by, topic)
            VALUES ($1, $2, $3, $4)
            RETURNING alias, original_url, created_by, topic, created_at
            "#,
        )
        .bind(&new_mapping.alias)
        .bind(&new_mapping.original_url)
        .bind(&new_mapping.created_by)
        .bind(&new_mapping.topic)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => {
                AppError::conflict("Alias already exists", json!({ "alias": alias }))
            }
            other => other,
        })?;

        Ok(row.into())
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlMapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, original_url, created_by, topic, created_at
            FROM url_mappings
            WHERE alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_topic(&self, topic: &str) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, original_url, created_by, topic, created_at
            FROM url_mappings
            WHERE topic = $1
            ORDER BY alias
            "#,
        )
        .bind(topic)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<UrlMapping>, AppError> {
        let rows = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, original_url, created_by, topic, created_at
            FROM url_mappings
            WHERE created_by = $1
            ORDER BY alias
            "#,
        )
        .bind(owner)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
