//! Reference data repository implementation
//!
//! All catalogues share the `reference_data` table, discriminated by the
//! `catalogue` column. Rows are read far more often than written; writes
//! happen when catalogues are seeded.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct ReferenceDataRepository {
    pool: PgPool,
}

impl ReferenceDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads a catalogue's rows, optionally for one locale
    ///
    /// Rows are ordered by locale id, then sort index in `sort_direction`
    /// with unindexed rows last, then name. The locale comparison ignores
    /// case.
    pub async fn find_records(
        &self,
        catalogue: &str,
        locale_id: Option<&str>,
        sort_direction: &str,
    ) -> Result<Vec<ReferenceRow>, DatabaseError> {
        let direction = if sort_direction.eq_ignore_ascii_case("ASC") { "ASC" } else { "DESC" };
        let rows = sqlx::query_as::<_, ReferenceRow>(&format!(
            r#"
            SELECT catalogue, code, locale_id, sort_index, name, description,
                   parent_code, category, value_type, unit_type, measurement_system
            FROM reference_data
            WHERE catalogue = $1 AND ($2::text IS NULL OR LOWER(locale_id) = LOWER($2))
            ORDER BY locale_id COLLATE "C" ASC,
                     sort_index {direction} NULLS LAST,
                     name COLLATE "C" ASC
            "#
        ))
        .bind(catalogue)
        .bind(locale_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(catalogue, locale_id, rows = rows.len(), "Loaded reference data");
        Ok(rows)
    }

    /// Loads attribute constraints for one role type, or all of them
    pub async fn find_constraints(&self, role_type: Option<&str>) -> Result<Vec<ConstraintRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ConstraintRow>(
            r#"
            SELECT role_type, attribute_type, constraint_type, value
            FROM role_type_attribute_type_constraints
            WHERE $1::text IS NULL OR role_type = $1
            ORDER BY role_type, attribute_type, constraint_type
            "#,
        )
        .bind(role_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts or updates catalogue rows by `(catalogue, code, locale_id)`
    pub async fn upsert_records(&self, rows: &[ReferenceRow]) -> Result<u64, DatabaseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            r#"INSERT INTO reference_data (
                catalogue, code, locale_id, sort_index, name, description,
                parent_code, category, value_type, unit_type, measurement_system
            ) "#,
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(&row.catalogue)
                .push_bind(&row.code)
                .push_bind(&row.locale_id)
                .push_bind(row.sort_index)
                .push_bind(&row.name)
                .push_bind(&row.description)
                .push_bind(&row.parent_code)
                .push_bind(&row.category)
                .push_bind(&row.value_type)
                .push_bind(row.unit_type)
                .push_bind(row.measurement_system);
        });
        builder.push(
            r#" ON CONFLICT (catalogue, code, locale_id) DO UPDATE SET
                sort_index = EXCLUDED.sort_index,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                parent_code = EXCLUDED.parent_code,
                category = EXCLUDED.category,
                value_type = EXCLUDED.value_type,
                unit_type = EXCLUDED.unit_type,
                measurement_system = EXCLUDED.measurement_system"#,
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Inserts or updates attribute constraints by their composite key
    pub async fn upsert_constraints(&self, rows: &[ConstraintRow]) -> Result<u64, DatabaseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO role_type_attribute_type_constraints (role_type, attribute_type, constraint_type, value) ",
        );
        builder.push_values(rows, |mut b, row| {
            b.push_bind(&row.role_type)
                .push_bind(&row.attribute_type)
                .push_bind(&row.constraint_type)
                .push_bind(&row.value);
        });
        builder.push(
            " ON CONFLICT (role_type, attribute_type, constraint_type) DO UPDATE SET value = EXCLUDED.value",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReferenceRow {
    pub catalogue: String,
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub parent_code: Option<String>,
    pub category: Option<String>,
    pub value_type: Option<String>,
    pub unit_type: Option<i16>,
    pub measurement_system: Option<i16>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConstraintRow {
    pub role_type: String,
    pub attribute_type: String,
    pub constraint_type: String,
    pub value: Option<String>,
}
