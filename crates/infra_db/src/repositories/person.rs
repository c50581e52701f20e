//! Person repository implementation

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::PageRequest;

use super::party::{PartyChildren, PartyRepository, PartyRow};
use super::{contains_pattern, limit_offset};
use crate::error::DatabaseError;

const PARTY_TYPE: &str = "person";

const PERSON_COLUMNS: &str = r#"
    p.id, p.tenant_id, p.name, p.created_at, p.updated_at,
    n.given_name, n.middle_names, n.surname, n.preferred_name, n.initials, n.title,
    n.date_of_birth, n.date_of_death, n.country_of_birth, n.country_of_residence,
    n.countries_of_citizenship, n.countries_of_tax_residence, n.language, n.gender, n.race,
    n.marital_status, n.marital_status_date, n.marriage_type, n.occupation,
    n.employment_status, n.residency_status, n.time_to_contact
"#;

/// Repository for persons and their sub-entities
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: PgPool,
    parties: PartyRepository,
}

impl PersonRepository {
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

    pub async fn find(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<PersonRecord>, DatabaseError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!(
            r#"
            SELECT {PERSON_COLUMNS}
            FROM parties p
            INNER JOIN persons n ON n.id = p.id
            WHERE p.tenant_id = $1 AND p.id = $2
            "#
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_children(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Pages through a tenant's persons ordered by name then id
    pub async fn find_page(
        &self,
        tenant_id: Uuid,
        name_filter: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<PersonRecord>, u64), DatabaseError> {
        let pattern = name_filter.map(contains_pattern);
        let total = self
            .parties
            .count(tenant_id, Some(PARTY_TYPE), pattern.as_deref())
            .await?;

        let direction = page.sort_direction.as_sql();
        let (limit, offset) = limit_offset(page);
        let rows = sqlx::query_as::<_, PersonRow>(&format!(
            r#"
            SELECT {PERSON_COLUMNS}
            FROM parties p
            INNER JOIN persons n ON n.id = p.id
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

    /// Inserts or replaces a person and all its sub-entities
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the id is held by another
    /// tenant or by an organization
    pub async fn save(&self, record: &PersonRecord) -> Result<(), DatabaseError> {
        let row = &record.person;
        let mut tx = self.pool.begin().await?;

        PartyRepository::upsert(&mut tx, &row.party_row()).await?;
        sqlx::query(
            r#"
            INSERT INTO persons (
                id, given_name, middle_names, surname, preferred_name, initials, title,
                date_of_birth, date_of_death, country_of_birth, country_of_residence,
                countries_of_citizenship, countries_of_tax_residence, language, gender, race,
                marital_status, marital_status_date, marriage_type, occupation,
                employment_status, residency_status, time_to_contact
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23
            )
            ON CONFLICT (id) DO UPDATE SET
                given_name = EXCLUDED.given_name,
                middle_names = EXCLUDED.middle_names,
                surname = EXCLUDED.surname,
                preferred_name = EXCLUDED.preferred_name,
                initials = EXCLUDED.initials,
                title = EXCLUDED.title,
                date_of_birth = EXCLUDED.date_of_birth,
                date_of_death = EXCLUDED.date_of_death,
                country_of_birth = EXCLUDED.country_of_birth,
                country_of_residence = EXCLUDED.country_of_residence,
                countries_of_citizenship = EXCLUDED.countries_of_citizenship,
                countries_of_tax_residence = EXCLUDED.countries_of_tax_residence,
                language = EXCLUDED.language,
                gender = EXCLUDED.gender,
                race = EXCLUDED.race,
                marital_status = EXCLUDED.marital_status,
                marital_status_date = EXCLUDED.marital_status_date,
                marriage_type = EXCLUDED.marriage_type,
                occupation = EXCLUDED.occupation,
                employment_status = EXCLUDED.employment_status,
                residency_status = EXCLUDED.residency_status,
                time_to_contact = EXCLUDED.time_to_contact
            "#,
        )
        .bind(row.id)
        .bind(&row.given_name)
        .bind(&row.middle_names)
        .bind(&row.surname)
        .bind(&row.preferred_name)
        .bind(&row.initials)
        .bind(&row.title)
        .bind(row.date_of_birth)
        .bind(row.date_of_death)
        .bind(&row.country_of_birth)
        .bind(&row.country_of_residence)
        .bind(&row.countries_of_citizenship)
        .bind(&row.countries_of_tax_residence)
        .bind(&row.language)
        .bind(&row.gender)
        .bind(&row.race)
        .bind(&row.marital_status)
        .bind(row.marital_status_date)
        .bind(&row.marriage_type)
        .bind(&row.occupation)
        .bind(&row.employment_status)
        .bind(&row.residency_status)
        .bind(&row.time_to_contact)
        .execute(&mut *tx)
        .await?;
        PartyRepository::replace_children(&mut tx, row.id, &record.children).await?;

        tx.commit().await?;
        debug!(person_id = %row.id, "Saved person");
        Ok(())
    }

    async fn with_children(&self, rows: Vec<PersonRow>) -> Result<Vec<PersonRecord>, DatabaseError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut children: HashMap<Uuid, PartyChildren> = self.parties.load_children(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|person| PersonRecord {
                children: children.remove(&person.id).unwrap_or_default(),
                person,
            })
            .collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

/// Database row joining `parties` and `persons`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub given_name: Option<String>,
    pub middle_names: Option<String>,
    pub surname: Option<String>,
    pub preferred_name: Option<String>,
    pub initials: Option<String>,
    pub title: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub country_of_birth: Option<String>,
    pub country_of_residence: Option<String>,
    pub countries_of_citizenship: Vec<String>,
    pub countries_of_tax_residence: Vec<String>,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub marital_status: Option<String>,
    pub marital_status_date: Option<NaiveDate>,
    pub marriage_type: Option<String>,
    pub occupation: Option<String>,
    pub employment_status: Option<String>,
    pub residency_status: Option<String>,
    pub time_to_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonRow {
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

/// A person with its sub-entities
#[derive(Debug, Clone)]
pub struct PersonRecord {
    pub person: PersonRow,
    pub children: PartyChildren,
}
