//! PostgreSQL Reference Data Adapter
//!
//! Serves every catalogue from the shared `reference_data` table. Typed
//! lookups (`find_all`, `find_by_locale`, ...) come from
//! `ReferenceDataPortExt` on top of [`ReferenceDataPort::find_records`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{
    CodeEnum, DomainPort, HealthCheckResult, HealthCheckable, NumericCodeEnum, PortError,
};
use domain_party::codes::{ConstraintType, MeasurementSystem, MeasurementUnitType, ValueType};
use domain_party::ports::ReferenceDataPort;
use domain_party::reference::{
    Catalogue, ReferenceRecord, RoleTypeAttributeTypeConstraint, SortIndexOrder,
};

use super::ping;
use crate::repositories::reference::{ConstraintRow, ReferenceDataRepository, ReferenceRow};

const ADAPTER_ID: &str = "postgres-reference-data-adapter";

/// PostgreSQL-backed implementation of [`ReferenceDataPort`]
#[derive(Debug, Clone)]
pub struct PostgresReferenceDataAdapter {
    repository: ReferenceDataRepository,
    pool: PgPool,
}

impl PostgresReferenceDataAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReferenceDataRepository::new(pool.clone()),
            pool,
        }
    }

    /// Loads catalogue rows and attribute constraints, replacing rows with
    /// the same key
    #[instrument(skip_all, fields(records = records.len(), constraints = constraints.len()))]
    pub async fn seed(
        &self,
        records: &[ReferenceRecord],
        constraints: &[RoleTypeAttributeTypeConstraint],
    ) -> Result<(), PortError> {
        let rows: Vec<ReferenceRow> = records.iter().map(record_to_row).collect();
        let constraint_rows: Vec<ConstraintRow> = constraints
            .iter()
            .map(|c| ConstraintRow {
                role_type: c.role_type.clone(),
                attribute_type: c.attribute_type.clone(),
                constraint_type: c.constraint_type.code().to_string(),
                value: c.value.clone(),
            })
            .collect();

        self.repository.upsert_records(&rows).await?;
        self.repository.upsert_constraints(&constraint_rows).await?;
        info!("Seeded reference data");
        Ok(())
    }
}

impl DomainPort for PostgresReferenceDataAdapter {}

#[async_trait]
impl HealthCheckable for PostgresReferenceDataAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl ReferenceDataPort for PostgresReferenceDataAdapter {
    #[instrument(skip(self, catalogue), fields(catalogue = %catalogue.code()))]
    async fn find_records(
        &self,
        catalogue: Catalogue,
        locale_id: Option<&str>,
        order: SortIndexOrder,
    ) -> Result<Vec<ReferenceRecord>, PortError> {
        let rows = self
            .repository
            .find_records(catalogue.code(), locale_id, order.as_sql())
            .await?;
        rows.into_iter().map(record_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn find_role_type_attribute_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError> {
        let rows = self.repository.find_constraints(role_type).await?;
        rows.into_iter()
            .map(|row| {
                Ok(RoleTypeAttributeTypeConstraint::new(
                    row.role_type,
                    row.attribute_type,
                    ConstraintType::from_code(&row.constraint_type)?,
                    row.value,
                ))
            })
            .collect()
    }
}

fn record_to_row(record: &ReferenceRecord) -> ReferenceRow {
    ReferenceRow {
        catalogue: record.catalogue.code().to_string(),
        code: record.code.clone(),
        locale_id: record.locale_id.clone(),
        sort_index: record.sort_index,
        name: record.name.clone(),
        description: record.description.clone(),
        parent_code: record.parent_code.clone(),
        category: record.category.clone(),
        value_type: record.value_type.map(|v| v.code().to_string()),
        // Both enumerations use single-digit codes
        unit_type: record.unit_type.map(|u| u.numeric_code() as i16),
        measurement_system: record.measurement_system.map(|m| m.numeric_code() as i16),
    }
}

fn record_from_row(row: ReferenceRow) -> Result<ReferenceRecord, PortError> {
    let mut record = ReferenceRecord::new(
        Catalogue::from_code(&row.catalogue)?,
        row.code,
        row.locale_id,
        row.sort_index,
        row.name,
        row.description,
    );
    record.parent_code = row.parent_code;
    record.category = row.category;
    record.value_type = row.value_type.as_deref().map(ValueType::from_code).transpose()?;
    record.unit_type = row
        .unit_type
        .map(|code| MeasurementUnitType::from_numeric_code(i32::from(code)))
        .transpose()?;
    record.measurement_system = row
        .measurement_system
        .map(|code| MeasurementSystem::from_numeric_code(i32::from(code)))
        .transpose()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_row_mapping() {
        let record = ReferenceRecord::new(Catalogue::AttributeType, "height", "en-ZA", Some(3), "Height", "Height")
            .with_category("physical")
            .with_value_type(ValueType::Decimal)
            .with_unit_type(MeasurementUnitType::Length);

        let row = record_to_row(&record);
        assert_eq!(row.catalogue, "attribute_type");
        assert_eq!(row.value_type.as_deref(), Some("decimal"));
        assert_eq!(row.unit_type, Some(1));
        assert_eq!(record_from_row(row).unwrap(), record);
    }

    #[test]
    fn test_unknown_catalogue_is_rejected() {
        let mut row = record_to_row(&ReferenceRecord::new(Catalogue::Gender, "f", "en", None, "Female", "Female"));
        row.catalogue = "planet".into();
        assert!(matches!(record_from_row(row), Err(PortError::Transformation { .. })));
    }
}
