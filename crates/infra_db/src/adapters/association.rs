//! PostgreSQL Association Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{
    AssociationId, DomainPort, HealthCheckResult, HealthCheckable, Page, PageRequest, PartyId,
    PortError, TenantId,
};
use domain_party::association::Association;
use domain_party::ports::AssociationPort;

use super::ping;
use crate::repositories::association::{AssociationRepository, AssociationRow};

const ADAPTER_ID: &str = "postgres-association-adapter";

/// PostgreSQL-backed implementation of [`AssociationPort`]
#[derive(Debug, Clone)]
pub struct PostgresAssociationAdapter {
    repository: AssociationRepository,
    pool: PgPool,
}

impl PostgresAssociationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AssociationRepository::new(pool.clone()),
            pool,
        }
    }

    async fn page(
        &self,
        tenant_id: TenantId,
        party_id: Option<PartyId>,
        page: PageRequest,
    ) -> Result<Page<Association>, PortError> {
        let (rows, total) = self
            .repository
            .find_page(tenant_id.into(), party_id.map(Into::into), &page)
            .await?;
        Ok(Page::new(rows.into_iter().map(association_from_row).collect(), total, page))
    }
}

impl DomainPort for PostgresAssociationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresAssociationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl AssociationPort for PostgresAssociationAdapter {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, association_id = %id))]
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError> {
        Ok(self.repository.exists(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, association_id = %id))]
    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
    ) -> Result<Option<Association>, PortError> {
        let row = self.repository.find(tenant_id.into(), id.into()).await?;
        Ok(row.map(association_from_row))
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, association_id = %id))]
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError> {
        Ok(self.repository.delete(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Association>, PortError> {
        self.page(tenant_id, None, page).await
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %party_id))]
    async fn find_page_by_tenant_and_party_id(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Association>, PortError> {
        self.page(tenant_id, Some(party_id), page).await
    }

    #[instrument(skip(self, association), fields(tenant_id = %association.tenant_id, association_id = %association.id))]
    async fn save(&self, association: &Association) -> Result<(), PortError> {
        Ok(self.repository.save(&association_to_row(association)).await?)
    }
}

fn association_to_row(association: &Association) -> AssociationRow {
    AssociationRow {
        id: *association.id.as_uuid(),
        tenant_id: *association.tenant_id.as_uuid(),
        association_type: association.association_type.clone(),
        first_party_id: *association.first_party_id.as_uuid(),
        second_party_id: *association.second_party_id.as_uuid(),
        effective_from: association.effective_from,
        effective_to: association.effective_to,
        created_at: association.created_at,
        updated_at: association.updated_at,
    }
}

fn association_from_row(row: AssociationRow) -> Association {
    Association {
        id: AssociationId::from_uuid(row.id),
        tenant_id: TenantId::from_uuid(row.tenant_id),
        association_type: row.association_type,
        first_party_id: PartyId::from_uuid(row.first_party_id),
        second_party_id: PartyId::from_uuid(row.second_party_id),
        effective_from: row.effective_from,
        effective_to: row.effective_to,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
