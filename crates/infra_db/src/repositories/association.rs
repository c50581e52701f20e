//! Association repository implementation

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::limit_offset;
use crate::error::DatabaseError;

/// Repository for associations between parties
#[derive(Debug, Clone)]
pub struct AssociationRepository {
    pool: PgPool,
}

impl AssociationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM associations WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<AssociationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT id, tenant_id, association_type, first_party_id, second_party_id,
                   effective_from, effective_to, created_at, updated_at
            FROM associations
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM associations WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Pages through a tenant's associations ordered by creation time then id
    ///
    /// # Arguments
    ///
    /// * `party_id` - Restricts the page to associations with the party on
    ///   either side
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        party_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<AssociationRow>, u64), DatabaseError> {
        const FILTER: &str = r#"
            tenant_id = $1
            AND ($2::uuid IS NULL OR first_party_id = $2 OR second_party_id = $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM associations WHERE {FILTER}"
        ))
        .bind(tenant_id)
        .bind(party_id)
        .fetch_one(&self.pool)
        .await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, AssociationRow>(&format!(
            r#"
            SELECT id, tenant_id, association_type, first_party_id, second_party_id,
                   effective_from, effective_to, created_at, updated_at
            FROM associations
            WHERE {FILTER}
            ORDER BY created_at {direction}, id {direction}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(tenant_id)
        .bind(party_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total.max(0) as u64))
    }

    /// Inserts or replaces an association
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the id belongs to another
    /// tenant, and `DatabaseError::ForeignKeyViolation` if either party does
    /// not exist
    pub async fn save(&self, row: &AssociationRow) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO associations (
                id, tenant_id, association_type, first_party_id, second_party_id,
                effective_from, effective_to, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                association_type = EXCLUDED.association_type,
                first_party_id = EXCLUDED.first_party_id,
                second_party_id = EXCLUDED.second_party_id,
                effective_from = EXCLUDED.effective_from,
                effective_to = EXCLUDED.effective_to,
                updated_at = EXCLUDED.updated_at
            WHERE associations.tenant_id = EXCLUDED.tenant_id
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.association_type)
        .bind(row.first_party_id)
        .bind(row.second_party_id)
        .bind(row.effective_from)
        .bind(row.effective_to)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::duplicate("Association", "id", row.id));
        }

        tx.commit().await?;
        debug!(association_id = %row.id, "Saved association");
        Ok(())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssociationRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub association_type: String,
    pub first_party_id: Uuid,
    pub second_party_id: Uuid,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
