//! Mandate repository implementation

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::limit_offset;
use crate::error::DatabaseError;

/// Repository for mandates and their mandataries
#[derive(Debug, Clone)]
pub struct MandateRepository {
    pool: PgPool,
}

impl MandateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM mandates WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<MandateRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, MandateRow>(
            r#"
            SELECT id, tenant_id, mandate_type, required_mandataries,
                   effective_from, effective_to, created_at, updated_at
            FROM mandates
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_mandataries(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Deletes a mandate; its mandataries cascade
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM mandates WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Pages through a tenant's mandates ordered by creation time then id
    ///
    /// # Arguments
    ///
    /// * `party_id` - Restricts the page to mandates under which the party
    ///   holds any role
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        party_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<MandateRecord>, u64), DatabaseError> {
        const FILTER: &str = r#"
            m.tenant_id = $1 AND (
                $2::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM mandataries x
                    WHERE x.mandate_id = m.id AND x.party_id = $2
                )
            )
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM mandates m WHERE {FILTER}"
        ))
        .bind(tenant_id)
        .bind(party_id)
        .fetch_one(&self.pool)
        .await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, MandateRow>(&format!(
            r#"
            SELECT m.id, m.tenant_id, m.mandate_type, m.required_mandataries,
                   m.effective_from, m.effective_to, m.created_at, m.updated_at
            FROM mandates m
            WHERE {FILTER}
            ORDER BY m.created_at {direction}, m.id {direction}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(tenant_id)
        .bind(party_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((self.with_mandataries(rows).await?, total.max(0) as u64))
    }

    /// Inserts or replaces a mandate and its mandataries
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the id belongs to another
    /// tenant, and `DatabaseError::ForeignKeyViolation` if a mandatary names
    /// a party that does not exist
    pub async fn save(&self, record: &MandateRecord) -> Result<(), DatabaseError> {
        let row = &record.mandate;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO mandates (
                id, tenant_id, mandate_type, required_mandataries,
                effective_from, effective_to, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                mandate_type = EXCLUDED.mandate_type,
                required_mandataries = EXCLUDED.required_mandataries,
                effective_from = EXCLUDED.effective_from,
                effective_to = EXCLUDED.effective_to,
                updated_at = EXCLUDED.updated_at
            WHERE mandates.tenant_id = EXCLUDED.tenant_id
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.mandate_type)
        .bind(row.required_mandataries)
        .bind(row.effective_from)
        .bind(row.effective_to)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await?;

        // Another tenant owns the id; its mandataries stay untouched
        if result.rows_affected() == 0 {
            return Err(DatabaseError::duplicate("Mandate", "id", row.id));
        }

        Self::replace_mandataries(&mut tx, row.id, &record.mandataries).await?;

        tx.commit().await?;
        debug!(mandate_id = %row.id, mandataries = record.mandataries.len(), "Saved mandate");
        Ok(())
    }

    async fn replace_mandataries(
        tx: &mut Transaction<'_, Postgres>,
        mandate_id: Uuid,
        mandataries: &[MandataryRow],
    ) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM mandataries WHERE mandate_id = $1")
            .bind(mandate_id)
            .execute(&mut **tx)
            .await?;

        if mandataries.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO mandataries (mandate_id, party_id, role) ");
        builder.push_values(mandataries, |mut b, m| {
            b.push_bind(mandate_id).push_bind(m.party_id).push_bind(&m.role);
        });
        builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    async fn with_mandataries(&self, rows: Vec<MandateRow>) -> Result<Vec<MandateRecord>, DatabaseError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mandataries = sqlx::query_as::<_, MandataryRow>(
            r#"
            SELECT mandate_id, party_id, role
            FROM mandataries
            WHERE mandate_id = ANY($1)
            ORDER BY party_id, role
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_mandate: HashMap<Uuid, Vec<MandataryRow>> = HashMap::new();
        for mandatary in mandataries {
            by_mandate.entry(mandatary.mandate_id).or_default().push(mandatary);
        }

        Ok(rows
            .into_iter()
            .map(|mandate| MandateRecord {
                mandataries: by_mandate.remove(&mandate.id).unwrap_or_default(),
                mandate,
            })
            .collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MandateRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub mandate_type: String,
    /// Numeric code of the required-mandataries rule
    pub required_mandataries: i16,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MandataryRow {
    pub mandate_id: Uuid,
    pub party_id: Uuid,
    pub role: String,
}

/// A mandate with its mandataries
#[derive(Debug, Clone)]
pub struct MandateRecord {
    pub mandate: MandateRow,
    pub mandataries: Vec<MandataryRow>,
}
