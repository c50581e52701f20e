//! PostgreSQL Snapshot Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, NumericCodeEnum, Page, PageRequest, PortError,
    SnapshotId, TenantId,
};
use domain_party::codes::EntityType;
use domain_party::ports::SnapshotPort;
use domain_party::snapshot::Snapshot;

use super::ping;
use crate::repositories::snapshot::{SnapshotRepository, SnapshotRow};

const ADAPTER_ID: &str = "postgres-snapshot-adapter";

/// PostgreSQL-backed implementation of [`SnapshotPort`]
#[derive(Debug, Clone)]
pub struct PostgresSnapshotAdapter {
    repository: SnapshotRepository,
    pool: PgPool,
}

impl PostgresSnapshotAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SnapshotRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresSnapshotAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSnapshotAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl SnapshotPort for PostgresSnapshotAdapter {
    #[instrument(skip(self, snapshot), fields(tenant_id = %snapshot.tenant_id, entity_id = %snapshot.entity_id))]
    async fn append(&self, snapshot: &Snapshot) -> Result<(), PortError> {
        let row = SnapshotRow {
            id: *snapshot.id.as_uuid(),
            tenant_id: *snapshot.tenant_id.as_uuid(),
            entity_type: entity_type_code(snapshot.entity_type),
            entity_id: snapshot.entity_id,
            timestamp: snapshot.timestamp,
            data: snapshot.data.clone(),
        };
        Ok(self.repository.append(&row).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, entity_id = %entity_id))]
    async fn find_page_by_tenant_and_entity(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Snapshot>, PortError> {
        let (rows, total) = self
            .repository
            .find_page(tenant_id.into(), entity_type_code(entity_type), entity_id, &page)
            .await?;
        let items = rows
            .into_iter()
            .map(snapshot_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, page))
    }
}

fn entity_type_code(entity_type: EntityType) -> i16 {
    // Entity type codes are single digits
    entity_type.numeric_code() as i16
}

fn snapshot_from_row(row: SnapshotRow) -> Result<Snapshot, PortError> {
    Ok(Snapshot {
        id: SnapshotId::from_uuid(row.id),
        tenant_id: TenantId::from_uuid(row.tenant_id),
        entity_type: EntityType::from_numeric_code(i32::from(row.entity_type))?,
        entity_id: row.entity_id,
        timestamp: row.timestamp,
        data: row.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_codes_fit_storage() {
        for entity_type in [
            EntityType::Association,
            EntityType::Mandate,
            EntityType::Organization,
            EntityType::Person,
        ] {
            let code = entity_type_code(entity_type);
            assert_eq!(EntityType::from_numeric_code(i32::from(code)).unwrap(), entity_type);
        }
    }
}
