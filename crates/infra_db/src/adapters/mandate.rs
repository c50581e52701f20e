//! PostgreSQL Mandate Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, MandateId, NumericCodeEnum, Page, PageRequest,
    PartyId, PortError, TenantId,
};
use domain_party::codes::RequiredMandataries;
use domain_party::mandate::{Mandatary, Mandate};
use domain_party::ports::MandatePort;

use super::ping;
use crate::repositories::mandate::{MandataryRow, MandateRecord, MandateRepository, MandateRow};

const ADAPTER_ID: &str = "postgres-mandate-adapter";

/// PostgreSQL-backed implementation of [`MandatePort`]
#[derive(Debug, Clone)]
pub struct PostgresMandateAdapter {
    repository: MandateRepository,
    pool: PgPool,
}

impl PostgresMandateAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: MandateRepository::new(pool.clone()),
            pool,
        }
    }

    async fn page(
        &self,
        tenant_id: TenantId,
        party_id: Option<PartyId>,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PortError> {
        let (records, total) = self
            .repository
            .find_page(tenant_id.into(), party_id.map(Into::into), &page)
            .await?;
        let items = records
            .into_iter()
            .map(mandate_from_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = items.len(), total, "Listed mandates");
        Ok(Page::new(items, total, page))
    }
}

impl DomainPort for PostgresMandateAdapter {}

#[async_trait]
impl HealthCheckable for PostgresMandateAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl MandatePort for PostgresMandateAdapter {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, mandate_id = %id))]
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError> {
        Ok(self.repository.exists(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, mandate_id = %id))]
    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: MandateId,
    ) -> Result<Option<Mandate>, PortError> {
        self.repository
            .find(tenant_id.into(), id.into())
            .await?
            .map(mandate_from_record)
            .transpose()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, mandate_id = %id))]
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError> {
        Ok(self.repository.delete(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PortError> {
        self.page(tenant_id, None, page).await
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %party_id))]
    async fn find_page_by_tenant_and_party_id(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PortError> {
        self.page(tenant_id, Some(party_id), page).await
    }

    #[instrument(skip(self, mandate), fields(tenant_id = %mandate.tenant_id, mandate_id = %mandate.id))]
    async fn save(&self, mandate: &Mandate) -> Result<(), PortError> {
        Ok(self.repository.save(&mandate_to_record(mandate)?).await?)
    }
}

fn mandate_to_record(mandate: &Mandate) -> Result<MandateRecord, PortError> {
    let mandate_id = *mandate.id.as_uuid();
    let required_mandataries = i16::try_from(mandate.required_mandataries.numeric_code())
        .map_err(|_| PortError::internal("required mandataries code out of range"))?;

    Ok(MandateRecord {
        mandate: MandateRow {
            id: mandate_id,
            tenant_id: *mandate.tenant_id.as_uuid(),
            mandate_type: mandate.mandate_type.clone(),
            required_mandataries,
            effective_from: mandate.effective_from,
            effective_to: mandate.effective_to,
            created_at: mandate.created_at,
            updated_at: mandate.updated_at,
        },
        mandataries: mandate
            .mandataries
            .iter()
            .map(|m| MandataryRow {
                mandate_id,
                party_id: *m.party_id.as_uuid(),
                role: m.role.clone(),
            })
            .collect(),
    })
}

fn mandate_from_record(record: MandateRecord) -> Result<Mandate, PortError> {
    let MandateRecord { mandate: row, mandataries } = record;
    let id = MandateId::from_uuid(row.id);

    let mut mandate = Mandate::with_id(
        id,
        TenantId::from_uuid(row.tenant_id),
        row.mandate_type,
        RequiredMandataries::from_numeric_code(i32::from(row.required_mandataries))?,
    );
    mandate.mandataries = mandataries
        .into_iter()
        .map(|m| Mandatary {
            mandate_id: id,
            party_id: PartyId::from_uuid(m.party_id),
            role: m.role,
        })
        .collect();
    mandate.effective_from = row.effective_from;
    mandate.effective_to = row.effective_to;
    mandate.created_at = row.created_at;
    mandate.updated_at = row.updated_at;
    Ok(mandate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandate_row_mapping() {
        let mut mandate = Mandate::new(TenantId::new(), "banking", RequiredMandataries::AtLeastTwo);
        mandate.add_mandatary(PartyId::new(), "signatory");
        mandate.add_mandatary(PartyId::new(), "signatory");

        let record = mandate_to_record(&mandate).unwrap();
        assert_eq!(record.mandate.required_mandataries, 3);
        assert_eq!(record.mandataries.len(), 2);
        assert_eq!(mandate_from_record(record).unwrap(), mandate);
    }

    #[test]
    fn test_unknown_required_mandataries_code() {
        let mandate = Mandate::new(TenantId::new(), "banking", RequiredMandataries::Any);
        let mut record = mandate_to_record(&mandate).unwrap();
        record.mandate.required_mandataries = 9;

        let error = mandate_from_record(record).unwrap_err();
        assert!(matches!(error, PortError::Transformation { .. }));
    }
}
