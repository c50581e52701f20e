//! Party repository implementation
//!
//! This module provides database access for what organizations and persons
//! have in common: the `parties` row carrying tenant, type and name, and the
//! sub-entity tables keyed by their natural composite keys.
//!
//! # Sub-entities
//!
//! Sub-entities are written as a set: saving a party deletes its existing
//! rows in every sub-entity table and inserts the current ones, inside the
//! caller's transaction. Loading batches every table by `party_id = ANY($1)`
//! so a page of parties costs one query per table rather than per party.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::{contains_pattern, limit_offset};
use crate::error::DatabaseError;

/// Sub-entity tables, each with a `party_id` column
const CHILD_TABLES: [&str; 11] = [
    "contact_mechanisms",
    "physical_addresses",
    "identity_documents",
    "tax_numbers",
    "external_references",
    "preferences",
    "attributes",
    "roles",
    "locks",
    "statuses",
    "sources_of_funds",
];

/// Repository for the columns and sub-entities shared by every party
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    /// Creates a new PartyRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checks whether a party exists for the tenant, optionally of one type
    pub async fn exists(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        party_type: Option<&str>,
    ) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM parties
                WHERE tenant_id = $1 AND id = $2 AND ($3::text IS NULL OR party_type = $3)
            )
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(party_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<PartyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PartyRow>(
            r#"
            SELECT id, tenant_id, party_type, name, created_at, updated_at
            FROM parties
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Deletes a party; sub-entities, associations and mandataries cascade
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        party_type: Option<&str>,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM parties
            WHERE tenant_id = $1 AND id = $2 AND ($3::text IS NULL OR party_type = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(party_type)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Pages through a tenant's parties ordered by name then id
    ///
    /// # Arguments
    ///
    /// * `name_filter` - Case-insensitive substring the name must contain
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        name_filter: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<PartyRow>, u64), DatabaseError> {
        let pattern = name_filter.map(contains_pattern);
        let total = self.count(tenant_id, None, pattern.as_deref()).await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, PartyRow>(&format!(
            r#"
            SELECT id, tenant_id, party_type, name, created_at, updated_at
            FROM parties
            WHERE tenant_id = $1 AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY name COLLATE "C" {direction}, id {direction}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(tenant_id)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Counts a tenant's parties, optionally of one type and matching a pattern
    pub async fn count(
        &self,
        tenant_id: Uuid,
        party_type: Option<&str>,
        name_pattern: Option<&str>,
    ) -> Result<u64, DatabaseError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM parties
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR party_type = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            "#,
        )
        .bind(tenant_id)
        .bind(party_type)
        .bind(name_pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.max(0) as u64)
    }

    /// Inserts or updates the `parties` row inside a transaction
    ///
    /// The update only applies to a row of the same tenant and party type;
    /// ownership is checked by the statement itself, never by a prior read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the id belongs to another
    /// tenant or to a party of the other type
    pub async fn upsert(tx: &mut Transaction<'_, Postgres>, row: &PartyRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO parties (id, tenant_id, party_type, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, updated_at = EXCLUDED.updated_at
            WHERE parties.tenant_id = EXCLUDED.tenant_id AND parties.party_type = EXCLUDED.party_type
            "#,
        )
        .bind(row.id)
        .bind(row.tenant_id)
        .bind(&row.party_type)
        .bind(&row.name)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::duplicate("Party", "id", row.id));
        }
        Ok(())
    }

    /// Loads the sub-entities of the given parties
    ///
    /// Every requested id is present in the result, with empty collections
    /// when it has no sub-entities.
    pub async fn load_children(&self, party_ids: &[Uuid]) -> Result<HashMap<Uuid, PartyChildren>, DatabaseError> {
        let mut children: HashMap<Uuid, PartyChildren> = party_ids
            .iter()
            .map(|id| (*id, PartyChildren::default()))
            .collect();
        if party_ids.is_empty() {
            return Ok(children);
        }

        macro_rules! load {
            ($row:ty, $field:ident, $sql:literal) => {
                let rows = sqlx::query_as::<_, $row>($sql)
                    .bind(party_ids)
                    .fetch_all(&self.pool)
                    .await?;
                for row in rows {
                    if let Some(entry) = children.get_mut(&row.party_id) {
                        entry.$field.push(row);
                    }
                }
            };
        }

        load!(
            ContactMechanismRow,
            contact_mechanisms,
            "SELECT party_id, role, contact_mechanism_type, value
             FROM contact_mechanisms WHERE party_id = ANY($1) ORDER BY party_id, role"
        );
        load!(
            PhysicalAddressRow,
            physical_addresses,
            "SELECT party_id, role, address_type, building_name, building_floor, complex_name,
                    complex_unit_number, farm_name, farm_number, line1, line2, line3, site_block,
                    site_number, street_name, street_number, suburb, city, region, postal_code,
                    country, latitude, longitude
             FROM physical_addresses WHERE party_id = ANY($1) ORDER BY party_id, role"
        );
        load!(
            IdentityDocumentRow,
            identity_documents,
            "SELECT party_id, document_type, country_of_issue, date_of_issue, date_of_expiry, number
             FROM identity_documents WHERE party_id = ANY($1)
             ORDER BY party_id, document_type, country_of_issue, date_of_issue"
        );
        load!(
            TaxNumberRow,
            tax_numbers,
            "SELECT party_id, tax_number_type, country_of_issue, number
             FROM tax_numbers WHERE party_id = ANY($1)
             ORDER BY party_id, tax_number_type, country_of_issue"
        );
        load!(
            ExternalReferenceRow,
            external_references,
            "SELECT party_id, reference_type, value
             FROM external_references WHERE party_id = ANY($1) ORDER BY party_id, reference_type"
        );
        load!(
            PreferenceRow,
            preferences,
            "SELECT party_id, preference_type, value
             FROM preferences WHERE party_id = ANY($1) ORDER BY party_id, preference_type"
        );
        load!(
            AttributeRow,
            attributes,
            "SELECT party_id, attribute_type, value, unit
             FROM attributes WHERE party_id = ANY($1) ORDER BY party_id, attribute_type"
        );
        load!(
            DatedEntryRow,
            roles,
            "SELECT party_id, role_type AS code, effective_from, effective_to
             FROM roles WHERE party_id = ANY($1) ORDER BY party_id, role_type"
        );
        load!(
            DatedEntryRow,
            locks,
            "SELECT party_id, lock_type AS code, effective_from, effective_to
             FROM locks WHERE party_id = ANY($1) ORDER BY party_id, lock_type"
        );
        load!(
            DatedEntryRow,
            statuses,
            "SELECT party_id, status_type AS code, effective_from, effective_to
             FROM statuses WHERE party_id = ANY($1) ORDER BY party_id, status_type"
        );
        load!(
            SourceOfFundsRow,
            sources_of_funds,
            "SELECT party_id, source_of_funds_type, percentage, description
             FROM sources_of_funds WHERE party_id = ANY($1) ORDER BY party_id, source_of_funds_type"
        );

        Ok(children)
    }

    /// Replaces every sub-entity of a party inside a transaction
    pub async fn replace_children(
        tx: &mut Transaction<'_, Postgres>,
        party_id: Uuid,
        children: &PartyChildren,
    ) -> Result<(), DatabaseError> {
        for table in CHILD_TABLES {
            sqlx::query(&format!("DELETE FROM {table} WHERE party_id = $1"))
                .bind(party_id)
                .execute(&mut **tx)
                .await?;
        }

        if !children.contact_mechanisms.is_empty() {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO contact_mechanisms (party_id, role, contact_mechanism_type, value) ",
            );
            query.push_values(&children.contact_mechanisms, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.role)
                    .push_bind(&row.contact_mechanism_type)
                    .push_bind(&row.value);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.physical_addresses.is_empty() {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO physical_addresses (party_id, role, address_type, building_name, \
                 building_floor, complex_name, complex_unit_number, farm_name, farm_number, line1, \
                 line2, line3, site_block, site_number, street_name, street_number, suburb, city, \
                 region, postal_code, country, latitude, longitude) ",
            );
            query.push_values(&children.physical_addresses, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.role)
                    .push_bind(&row.address_type)
                    .push_bind(&row.building_name)
                    .push_bind(&row.building_floor)
                    .push_bind(&row.complex_name)
                    .push_bind(&row.complex_unit_number)
                    .push_bind(&row.farm_name)
                    .push_bind(&row.farm_number)
                    .push_bind(&row.line1)
                    .push_bind(&row.line2)
                    .push_bind(&row.line3)
                    .push_bind(&row.site_block)
                    .push_bind(&row.site_number)
                    .push_bind(&row.street_name)
                    .push_bind(&row.street_number)
                    .push_bind(&row.suburb)
                    .push_bind(&row.city)
                    .push_bind(&row.region)
                    .push_bind(&row.postal_code)
                    .push_bind(&row.country)
                    .push_bind(&row.latitude)
                    .push_bind(&row.longitude);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.identity_documents.is_empty() {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO identity_documents (party_id, document_type, country_of_issue, \
                 date_of_issue, date_of_expiry, number) ",
            );
            query.push_values(&children.identity_documents, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.document_type)
                    .push_bind(&row.country_of_issue)
                    .push_bind(row.date_of_issue)
                    .push_bind(row.date_of_expiry)
                    .push_bind(&row.number);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.tax_numbers.is_empty() {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO tax_numbers (party_id, tax_number_type, country_of_issue, number) ",
            );
            query.push_values(&children.tax_numbers, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.tax_number_type)
                    .push_bind(&row.country_of_issue)
                    .push_bind(&row.number);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.external_references.is_empty() {
            let mut query =
                QueryBuilder::<Postgres>::new("INSERT INTO external_references (party_id, reference_type, value) ");
            query.push_values(&children.external_references, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.reference_type)
                    .push_bind(&row.value);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.preferences.is_empty() {
            let mut query =
                QueryBuilder::<Postgres>::new("INSERT INTO preferences (party_id, preference_type, value) ");
            query.push_values(&children.preferences, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.preference_type)
                    .push_bind(&row.value);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.attributes.is_empty() {
            let mut query =
                QueryBuilder::<Postgres>::new("INSERT INTO attributes (party_id, attribute_type, value, unit) ");
            query.push_values(&children.attributes, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.attribute_type)
                    .push_bind(&row.value)
                    .push_bind(&row.unit);
            });
            query.build().execute(&mut **tx).await?;
        }

        for (table, column, rows) in [
            ("roles", "role_type", &children.roles),
            ("locks", "lock_type", &children.locks),
            ("statuses", "status_type", &children.statuses),
        ] {
            if rows.is_empty() {
                continue;
            }
            let mut query = QueryBuilder::<Postgres>::new(format!(
                "INSERT INTO {table} (party_id, {column}, effective_from, effective_to) "
            ));
            query.push_values(rows, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.code)
                    .push_bind(row.effective_from)
                    .push_bind(row.effective_to);
            });
            query.build().execute(&mut **tx).await?;
        }

        if !children.sources_of_funds.is_empty() {
            let mut query = QueryBuilder::<Postgres>::new(
                "INSERT INTO sources_of_funds (party_id, source_of_funds_type, percentage, description) ",
            );
            query.push_values(&children.sources_of_funds, |mut b, row| {
                b.push_bind(row.party_id)
                    .push_bind(&row.source_of_funds_type)
                    .push_bind(row.percentage)
                    .push_bind(&row.description);
            });
            query.build().execute(&mut **tx).await?;
        }

        debug!(party_id = %party_id, "Replaced party sub-entities");
        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

/// Database row for the `parties` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartyRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub party_type: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every sub-entity of one party
#[derive(Debug, Clone, Default)]
pub struct PartyChildren {
    pub contact_mechanisms: Vec<ContactMechanismRow>,
    pub physical_addresses: Vec<PhysicalAddressRow>,
    pub identity_documents: Vec<IdentityDocumentRow>,
    pub tax_numbers: Vec<TaxNumberRow>,
    pub external_references: Vec<ExternalReferenceRow>,
    pub preferences: Vec<PreferenceRow>,
    pub attributes: Vec<AttributeRow>,
    pub roles: Vec<DatedEntryRow>,
    pub locks: Vec<DatedEntryRow>,
    pub statuses: Vec<DatedEntryRow>,
    /// Only persons carry sources of funds
    pub sources_of_funds: Vec<SourceOfFundsRow>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactMechanismRow {
    pub party_id: Uuid,
    pub role: String,
    pub contact_mechanism_type: String,
    pub value: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhysicalAddressRow {
    pub party_id: Uuid,
    pub role: String,
    pub address_type: String,
    pub building_name: Option<String>,
    pub building_floor: Option<String>,
    pub complex_name: Option<String>,
    pub complex_unit_number: Option<String>,
    pub farm_name: Option<String>,
    pub farm_number: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub site_block: Option<String>,
    pub site_number: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub suburb: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdentityDocumentRow {
    pub party_id: Uuid,
    pub document_type: String,
    pub country_of_issue: String,
    pub date_of_issue: Option<NaiveDate>,
    pub date_of_expiry: Option<NaiveDate>,
    pub number: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaxNumberRow {
    pub party_id: Uuid,
    pub tax_number_type: String,
    pub country_of_issue: String,
    pub number: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExternalReferenceRow {
    pub party_id: Uuid,
    pub reference_type: String,
    pub value: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PreferenceRow {
    pub party_id: Uuid,
    pub preference_type: String,
    pub value: String,
}

/// Attribute row; the typed value is stored as JSONB
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttributeRow {
    pub party_id: Uuid,
    pub attribute_type: String,
    pub value: serde_json::Value,
    pub unit: Option<String>,
}

/// Row shared by the `roles`, `locks` and `statuses` tables
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatedEntryRow {
    pub party_id: Uuid,
    pub code: String,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceOfFundsRow {
    pub party_id: Uuid,
    pub source_of_funds_type: String,
    pub percentage: Option<i32>,
    pub description: Option<String>,
}
