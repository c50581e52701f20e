//! Organization repository implementation

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::party::{PartyChildren, PartyRepository, PartyRow};
use super::{contains_pattern, limit_offset};
use crate::error::DatabaseError;

const PARTY_TYPE: &str = "organization";

/// Repository for organizations and their sub-entities
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
    parties: PartyRepository,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            parties: PartyRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn exists(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        self.parties.exists(tenant_id, id, Some(PARTY_TYPE)).await
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        self.parties.delete(tenant_id, id, Some(PARTY_TYPE)).await
    }

    /// Retrieves an organization with all its sub-entities
    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<OrganizationRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT p.id, p.tenant_id, p.name, p.created_at, p.updated_at,
                   o.countries_of_tax_residence
            FROM parties p
            INNER JOIN organizations o ON o.id = p.id
            WHERE p.tenant_id = $1 AND p.id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_children(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Pages through a tenant's organizations ordered by name then id
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        name_filter: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<OrganizationRecord>, u64), DatabaseError> {
        let pattern = name_filter.map(contains_pattern);
        let total = self
            .parties
            .count(tenant_id, Some(PARTY_TYPE), pattern.as_deref())
            .await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, OrganizationRow>(&format!(
            r#"
            SELECT p.id, p.tenant_id, p.name, p.created_at, p.updated_at,
                   o.countries_of_tax_residence
            FROM parties p
            INNER JOIN organizations o ON o.id = p.id
            WHERE p.tenant_id = $1 AND ($2::text IS NULL OR p.name ILIKE $2)
            ORDER BY p.name COLLATE "C" {direction}, p.id {direction}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(tenant_id)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((self.with_children(rows).await?, total))
    }

    /// Inserts or replaces an organization and all its sub-entities
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the id is held by another
    /// tenant or by a person
    pub async fn save(&self, record: &OrganizationRecord) -> Result<(), DatabaseError> {
        let row = &record.organization;
        let mut tx = self.pool.begin().await?;

        PartyRepository::upsert(&mut tx, &row.party_row()).await?;
        sqlx::query(
            r#"
            INSERT INTO organizations (id, countries_of_tax_residence)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET countries_of_tax_residence = EXCLUDED.countries_of_tax_residence
            "#,
        )
        .bind(row.id)
        .bind(&row.countries_of_tax_residence)
        .execute(&mut *tx)
        .await?;
        PartyRepository::replace_children(&mut tx, row.id, &record.children).await?;

        tx.commit().await?;
        debug!(organization_id = %row.id, "Saved organization");
        Ok(())
    }

    async fn with_children(&self, rows: Vec<OrganizationRow>) -> Result<Vec<OrganizationRecord>, DatabaseError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut children: HashMap<Uuid, PartyChildren> = self.parties.load_children(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|organization| OrganizationRecord {
                children: children.remove(&organization.id).unwrap_or_default(),
                organization,
            })
            .collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

/// Database row joining `parties` and `organizations`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub countries_of_tax_residence: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn party_row(&self) -> PartyRow {
        PartyRow {
            id: self.id,
            tenant_id: self.tenant_id,
            party_type: PARTY_TYPE.to_string(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// An organization with its sub-entities
#[derive(Debug, Clone)]
pub struct OrganizationRecord {
    pub organization: OrganizationRow,
    pub children: PartyChildren,
}
