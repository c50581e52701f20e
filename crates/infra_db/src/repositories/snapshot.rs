//! Snapshot repository implementation
//!
//! Snapshots are append-only: there is no update or delete.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::limit_offset;
use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a snapshot
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if a snapshot with the same id
    /// was already recorded
    pub async fn append(&self, row: &SnapshotRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (id, tenant_id, entity_type, entity_id, timestamp, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(row.entity_type)
        .bind(row.entity_id)
        .bind(row.timestamp)
        .bind(&row.data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Pages through one entity's snapshots ordered by timestamp then id
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        entity_type: i16,
        entity_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<SnapshotRow>, u64), DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM snapshots
            WHERE tenant_id = $1 AND entity_type = $2 AND entity_id = $3
            "#,
        )
        .bind(tenant_id)
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
            r#"
            SELECT id, tenant_id, entity_type, entity_id, timestamp, data
            FROM snapshots
            WHERE tenant_id = $1 AND entity_type = $2 AND entity_id = $3
            ORDER BY timestamp {direction}, id {direction}
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(tenant_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total.max(0) as u64))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Numeric code of the entity type
    pub entity_type: i16,
    pub entity_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}
