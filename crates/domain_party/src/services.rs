//! Party domain services
//!
//! [`PartyService`] layers the business outcomes over the persistence ports:
//! creating an entity whose id is taken yields a `Duplicate*` error, reading,
//! updating or deleting a missing one yields `*NotFound`. Both are ordinary
//! values a caller can translate without abandoning its unit of work.
//!
//! Every successful create or update appends a [`Snapshot`] of the stored
//! aggregate. A change whose snapshot cannot be appended is undone, so no
//! stored version is left without its history entry.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use core_kernel::{AssociationId, MandateId, Page, PageRequest, PartyId, PortError, TenantId};

use crate::association::Association;
use crate::codes::EntityType;
use crate::config::PartyConfig;
use crate::error::PartyError;
use crate::mandate::Mandate;
use crate::party::{Organization, Party, Person};
use crate::ports::{
    AssociationPort, MandatePort, OrganizationPort, PartyPort, PersonPort, ReferenceDataPort,
    ReferenceDataPortExt, SnapshotPort,
};
use crate::reference::{Catalogue, ReferenceData};
use crate::snapshot::Snapshot;
use crate::validation::{PartyValidator, ValidationResult};

/// The ports a [`PartyService`] works through
#[derive(Clone)]
pub struct PartyPorts {
    pub organizations: Arc<dyn OrganizationPort>,
    pub persons: Arc<dyn PersonPort>,
    pub parties: Arc<dyn PartyPort>,
    pub mandates: Arc<dyn MandatePort>,
    pub associations: Arc<dyn AssociationPort>,
    pub snapshots: Arc<dyn SnapshotPort>,
    pub reference_data: Arc<dyn ReferenceDataPort>,
}

#[cfg(any(test, feature = "mock"))]
impl PartyPorts {
    /// Wires every port to the in-memory adapters
    pub fn in_memory(
        store: crate::ports::mock::MockPartyStore,
        reference_data: crate::ports::mock::MockReferenceDataPort,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            organizations: store.clone(),
            persons: store.clone(),
            parties: store.clone(),
            mandates: store.clone(),
            associations: store.clone(),
            snapshots: store,
            reference_data: Arc::new(reference_data),
        }
    }
}

/// Service for managing parties, mandates and associations
pub struct PartyService {
    ports: PartyPorts,
    config: PartyConfig,
}

impl PartyService {
    pub fn new(ports: PartyPorts, config: PartyConfig) -> Self {
        Self { ports, config }
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Organizations
    // ---------------------------------------------------------------------

    /// Validates and stores a new organization
    ///
    /// # Errors
    ///
    /// * `DuplicateOrganization` if a party with the same id exists in the tenant
    /// * `ValidationFailed` if structural or reference checks fail
    #[instrument(skip(self, organization), fields(tenant_id = %organization.tenant_id, organization_id = %organization.id))]
    pub async fn create_organization(&self, organization: Organization) -> Result<Organization, PartyError> {
        let (tenant_id, organization_id) = (organization.tenant_id, organization.id);
        if self.ports.parties.exists_by_tenant_and_id(tenant_id, organization_id).await? {
            return Err(PartyError::DuplicateOrganization {
                tenant_id,
                organization_id,
            });
        }
        self.validate_organization(&organization).await?;
        let snapshot = Snapshot::capture(tenant_id, EntityType::Organization, *organization_id.as_uuid(), &organization)?;

        match self.ports.organizations.save(&organization).await {
            Err(PortError::Conflict { .. }) => {
                return Err(PartyError::DuplicateOrganization {
                    tenant_id,
                    organization_id,
                })
            }
            result => result?,
        }
        self.record(
            snapshot,
            self.ports.organizations.delete_by_tenant_and_id(tenant_id, organization_id),
        )
        .await?;

        info!(name = %organization.name, "Organization created");
        Ok(organization)
    }

    #[instrument(skip(self, organization), fields(tenant_id = %organization.tenant_id, organization_id = %organization.id))]
    pub async fn update_organization(&self, mut organization: Organization) -> Result<Organization, PartyError> {
        let (tenant_id, organization_id) = (organization.tenant_id, organization.id);
        let Some(previous) = self
            .ports
            .organizations
            .find_by_tenant_and_id(tenant_id, organization_id)
            .await?
        else {
            return Err(PartyError::OrganizationNotFound {
                tenant_id,
                organization_id,
            });
        };
        self.validate_organization(&organization).await?;

        organization.updated_at = Utc::now();
        let snapshot = Snapshot::capture(tenant_id, EntityType::Organization, *organization_id.as_uuid(), &organization)?;
        self.ports.organizations.save(&organization).await?;
        self.record(snapshot, self.ports.organizations.save(&previous)).await?;

        info!("Organization updated");
        Ok(organization)
    }

    pub async fn find_organization(
        &self,
        tenant_id: TenantId,
        organization_id: PartyId,
    ) -> Result<Option<Organization>, PartyError> {
        Ok(self
            .ports
            .organizations
            .find_by_tenant_and_id(tenant_id, organization_id)
            .await?)
    }

    pub async fn get_organization(
        &self,
        tenant_id: TenantId,
        organization_id: PartyId,
    ) -> Result<Organization, PartyError> {
        self.find_organization(tenant_id, organization_id)
            .await?
            .ok_or(PartyError::OrganizationNotFound {
                tenant_id,
                organization_id,
            })
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, organization_id = %organization_id))]
    pub async fn delete_organization(&self, tenant_id: TenantId, organization_id: PartyId) -> Result<(), PartyError> {
        if !self
            .ports
            .organizations
            .delete_by_tenant_and_id(tenant_id, organization_id)
            .await?
        {
            return Err(PartyError::OrganizationNotFound {
                tenant_id,
                organization_id,
            });
        }
        info!("Organization deleted");
        Ok(())
    }

    pub async fn list_organizations(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Organization>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self.ports.organizations.find_page_by_tenant(tenant_id, page).await?)
    }

    /// Lists organizations whose name contains `filter`, ignoring case
    pub async fn filter_organizations(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .organizations
            .find_page_by_tenant_and_name_filter(tenant_id, filter.trim(), page)
            .await?)
    }

    async fn validate_organization(&self, organization: &Organization) -> Result<(), PartyError> {
        let mut result = PartyValidator::validate_organization(organization);
        result.merge(
            PartyValidator::validate_organization_references(
                &*self.ports.reference_data,
                organization,
                &self.config.default_locale,
            )
            .await?,
        );
        Self::finish(result)
    }

    // ---------------------------------------------------------------------
    // Persons
    // ---------------------------------------------------------------------

    #[instrument(skip(self, person), fields(tenant_id = %person.tenant_id, person_id = %person.id))]
    pub async fn create_person(&self, person: Person) -> Result<Person, PartyError> {
        let (tenant_id, person_id) = (person.tenant_id, person.id);
        if self.ports.parties.exists_by_tenant_and_id(tenant_id, person_id).await? {
            return Err(PartyError::DuplicatePerson { tenant_id, person_id });
        }
        self.validate_person(&person).await?;
        let snapshot = Snapshot::capture(tenant_id, EntityType::Person, *person_id.as_uuid(), &person)?;

        match self.ports.persons.save(&person).await {
            Err(PortError::Conflict { .. }) => return Err(PartyError::DuplicatePerson { tenant_id, person_id }),
            result => result?,
        }
        self.record(snapshot, self.ports.persons.delete_by_tenant_and_id(tenant_id, person_id))
            .await?;

        info!("Person created");
        Ok(person)
    }

    #[instrument(skip(self, person), fields(tenant_id = %person.tenant_id, person_id = %person.id))]
    pub async fn update_person(&self, mut person: Person) -> Result<Person, PartyError> {
        let (tenant_id, person_id) = (person.tenant_id, person.id);
        let Some(previous) = self.ports.persons.find_by_tenant_and_id(tenant_id, person_id).await? else {
            return Err(PartyError::PersonNotFound { tenant_id, person_id });
        };
        self.validate_person(&person).await?;

        person.updated_at = Utc::now();
        let snapshot = Snapshot::capture(tenant_id, EntityType::Person, *person_id.as_uuid(), &person)?;
        self.ports.persons.save(&person).await?;
        self.record(snapshot, self.ports.persons.save(&previous)).await?;

        info!("Person updated");
        Ok(person)
    }

    pub async fn find_person(&self, tenant_id: TenantId, person_id: PartyId) -> Result<Option<Person>, PartyError> {
        Ok(self.ports.persons.find_by_tenant_and_id(tenant_id, person_id).await?)
    }

    pub async fn get_person(&self, tenant_id: TenantId, person_id: PartyId) -> Result<Person, PartyError> {
        self.find_person(tenant_id, person_id)
            .await?
            .ok_or(PartyError::PersonNotFound { tenant_id, person_id })
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, person_id = %person_id))]
    pub async fn delete_person(&self, tenant_id: TenantId, person_id: PartyId) -> Result<(), PartyError> {
        if !self.ports.persons.delete_by_tenant_and_id(tenant_id, person_id).await? {
            return Err(PartyError::PersonNotFound { tenant_id, person_id });
        }
        info!("Person deleted");
        Ok(())
    }

    pub async fn list_persons(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Person>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self.ports.persons.find_page_by_tenant(tenant_id, page).await?)
    }

    pub async fn filter_persons(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Person>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .persons
            .find_page_by_tenant_and_name_filter(tenant_id, filter.trim(), page)
            .await?)
    }

    async fn validate_person(&self, person: &Person) -> Result<(), PartyError> {
        let mut result = PartyValidator::validate_person(person);
        result.merge(
            PartyValidator::validate_person_references(
                &*self.ports.reference_data,
                person,
                &self.config.default_locale,
            )
            .await?,
        );
        Self::finish(result)
    }

    // ---------------------------------------------------------------------
    // Parties of either type
    // ---------------------------------------------------------------------

    pub async fn party_exists(&self, tenant_id: TenantId, party_id: PartyId) -> Result<bool, PartyError> {
        Ok(self.ports.parties.exists_by_tenant_and_id(tenant_id, party_id).await?)
    }

    pub async fn get_party(&self, tenant_id: TenantId, party_id: PartyId) -> Result<Party, PartyError> {
        self.ports
            .parties
            .find_by_tenant_and_id(tenant_id, party_id)
            .await?
            .ok_or(PartyError::PartyNotFound { tenant_id, party_id })
    }

    /// Deletes a party of either type along with its associations and mandataries
    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %party_id))]
    pub async fn delete_party(&self, tenant_id: TenantId, party_id: PartyId) -> Result<(), PartyError> {
        if !self.ports.parties.delete_by_tenant_and_id(tenant_id, party_id).await? {
            return Err(PartyError::PartyNotFound { tenant_id, party_id });
        }
        info!("Party deleted");
        Ok(())
    }

    pub async fn list_parties(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Party>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self.ports.parties.find_page_by_tenant(tenant_id, page).await?)
    }

    pub async fn filter_parties(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Party>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .parties
            .find_page_by_tenant_and_name_filter(tenant_id, filter.trim(), page)
            .await?)
    }

    // ---------------------------------------------------------------------
    // Mandates
    // ---------------------------------------------------------------------

    /// Stores a new mandate
    ///
    /// Every mandatary must be a party of the mandate's tenant.
    #[instrument(skip(self, mandate), fields(tenant_id = %mandate.tenant_id, mandate_id = %mandate.id))]
    pub async fn create_mandate(&self, mandate: Mandate) -> Result<Mandate, PartyError> {
        let (tenant_id, mandate_id) = (mandate.tenant_id, mandate.id);
        if self.ports.mandates.exists_by_tenant_and_id(tenant_id, mandate_id).await? {
            return Err(PartyError::DuplicateMandate { tenant_id, mandate_id });
        }
        self.validate_mandate(&mandate).await?;
        let snapshot = Snapshot::capture(tenant_id, EntityType::Mandate, *mandate_id.as_uuid(), &mandate)?;

        match self.ports.mandates.save(&mandate).await {
            Err(PortError::Conflict { .. }) => return Err(PartyError::DuplicateMandate { tenant_id, mandate_id }),
            result => result?,
        }
        self.record(snapshot, self.ports.mandates.delete_by_tenant_and_id(tenant_id, mandate_id))
            .await?;

        info!(mandataries = mandate.mandataries.len(), "Mandate created");
        Ok(mandate)
    }

    #[instrument(skip(self, mandate), fields(tenant_id = %mandate.tenant_id, mandate_id = %mandate.id))]
    pub async fn update_mandate(&self, mut mandate: Mandate) -> Result<Mandate, PartyError> {
        let (tenant_id, mandate_id) = (mandate.tenant_id, mandate.id);
        let Some(previous) = self.ports.mandates.find_by_tenant_and_id(tenant_id, mandate_id).await? else {
            return Err(PartyError::MandateNotFound { tenant_id, mandate_id });
        };
        self.validate_mandate(&mandate).await?;

        mandate.updated_at = Utc::now();
        let snapshot = Snapshot::capture(tenant_id, EntityType::Mandate, *mandate_id.as_uuid(), &mandate)?;
        self.ports.mandates.save(&mandate).await?;
        self.record(snapshot, self.ports.mandates.save(&previous)).await?;

        info!("Mandate updated");
        Ok(mandate)
    }

    pub async fn get_mandate(&self, tenant_id: TenantId, mandate_id: MandateId) -> Result<Mandate, PartyError> {
        self.ports
            .mandates
            .find_by_tenant_and_id(tenant_id, mandate_id)
            .await?
            .ok_or(PartyError::MandateNotFound { tenant_id, mandate_id })
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, mandate_id = %mandate_id))]
    pub async fn delete_mandate(&self, tenant_id: TenantId, mandate_id: MandateId) -> Result<(), PartyError> {
        if !self.ports.mandates.delete_by_tenant_and_id(tenant_id, mandate_id).await? {
            return Err(PartyError::MandateNotFound { tenant_id, mandate_id });
        }
        info!("Mandate deleted");
        Ok(())
    }

    pub async fn list_mandates(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Mandate>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self.ports.mandates.find_page_by_tenant(tenant_id, page).await?)
    }

    /// Lists the mandates in which a party is a mandatary
    pub async fn list_mandates_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .mandates
            .find_page_by_tenant_and_party_id(tenant_id, party_id, page)
            .await?)
    }

    async fn validate_mandate(&self, mandate: &Mandate) -> Result<(), PartyError> {
        let mut result = PartyValidator::validate_mandate(mandate);
        let port = &*self.ports.reference_data;
        let locale = self.config.default_locale.as_str();

        if !port.code_exists(Catalogue::MandateType, &mandate.mandate_type, locale).await? {
            result.add_error(format!("Unknown mandate type '{}'", mandate.mandate_type));
        }
        for mandatary in &mandate.mandataries {
            if !port.code_exists(Catalogue::MandataryRole, &mandatary.role, locale).await? {
                result.add_error(format!("Unknown mandatary role '{}'", mandatary.role));
            }
        }
        for party_id in mandate.mandatary_party_ids() {
            if !self.ports.parties.exists_by_tenant_and_id(mandate.tenant_id, party_id).await? {
                result.add_error(format!("Mandatary party {} does not exist", party_id));
            }
        }
        Self::finish(result)
    }

    // ---------------------------------------------------------------------
    // Associations
    // ---------------------------------------------------------------------

    /// Stores a new association between two existing parties
    #[instrument(skip(self, association), fields(tenant_id = %association.tenant_id, association_id = %association.id))]
    pub async fn create_association(&self, association: Association) -> Result<Association, PartyError> {
        let (tenant_id, association_id) = (association.tenant_id, association.id);
        if self
            .ports
            .associations
            .exists_by_tenant_and_id(tenant_id, association_id)
            .await?
        {
            return Err(PartyError::DuplicateAssociation {
                tenant_id,
                association_id,
            });
        }
        self.validate_association(&association).await?;
        let snapshot = Snapshot::capture(tenant_id, EntityType::Association, *association_id.as_uuid(), &association)?;

        match self.ports.associations.save(&association).await {
            Err(PortError::Conflict { .. }) => {
                return Err(PartyError::DuplicateAssociation {
                    tenant_id,
                    association_id,
                })
            }
            result => result?,
        }
        self.record(
            snapshot,
            self.ports.associations.delete_by_tenant_and_id(tenant_id, association_id),
        )
        .await?;

        info!(
            first_party_id = %association.first_party_id,
            second_party_id = %association.second_party_id,
            "Association created"
        );
        Ok(association)
    }

    #[instrument(skip(self, association), fields(tenant_id = %association.tenant_id, association_id = %association.id))]
    pub async fn update_association(&self, mut association: Association) -> Result<Association, PartyError> {
        let (tenant_id, association_id) = (association.tenant_id, association.id);
        let Some(previous) = self
            .ports
            .associations
            .find_by_tenant_and_id(tenant_id, association_id)
            .await?
        else {
            return Err(PartyError::AssociationNotFound {
                tenant_id,
                association_id,
            });
        };
        self.validate_association(&association).await?;

        association.updated_at = Utc::now();
        let snapshot = Snapshot::capture(tenant_id, EntityType::Association, *association_id.as_uuid(), &association)?;
        self.ports.associations.save(&association).await?;
        self.record(snapshot, self.ports.associations.save(&previous)).await?;

        info!("Association updated");
        Ok(association)
    }

    pub async fn get_association(
        &self,
        tenant_id: TenantId,
        association_id: AssociationId,
    ) -> Result<Association, PartyError> {
        self.ports
            .associations
            .find_by_tenant_and_id(tenant_id, association_id)
            .await?
            .ok_or(PartyError::AssociationNotFound {
                tenant_id,
                association_id,
            })
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, association_id = %association_id))]
    pub async fn delete_association(
        &self,
        tenant_id: TenantId,
        association_id: AssociationId,
    ) -> Result<(), PartyError> {
        if !self
            .ports
            .associations
            .delete_by_tenant_and_id(tenant_id, association_id)
            .await?
        {
            return Err(PartyError::AssociationNotFound {
                tenant_id,
                association_id,
            });
        }
        info!("Association deleted");
        Ok(())
    }

    pub async fn list_associations(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Association>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self.ports.associations.find_page_by_tenant(tenant_id, page).await?)
    }

    /// Lists the associations a party takes part in, on either side
    pub async fn list_associations_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Association>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .associations
            .find_page_by_tenant_and_party_id(tenant_id, party_id, page)
            .await?)
    }

    async fn validate_association(&self, association: &Association) -> Result<(), PartyError> {
        let mut result = PartyValidator::validate_association(association);
        if !self
            .ports
            .reference_data
            .code_exists(
                Catalogue::AssociationType,
                &association.association_type,
                &self.config.default_locale,
            )
            .await?
        {
            result.add_error(format!("Unknown association type '{}'", association.association_type));
        }
        for party_id in [association.first_party_id, association.second_party_id] {
            if !self
                .ports
                .parties
                .exists_by_tenant_and_id(association.tenant_id, party_id)
                .await?
            {
                result.add_error(format!("Associated party {} does not exist", party_id));
            }
        }
        Self::finish(result)
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Pages through the recorded history of an entity, oldest first
    pub async fn list_snapshots(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Snapshot>, PartyError> {
        let page = self.config.clamp(page);
        Ok(self
            .ports
            .snapshots
            .find_page_by_tenant_and_entity(tenant_id, entity_type, entity_id, page)
            .await?)
    }

    /// Appends the snapshot of a change that is already stored
    ///
    /// When the append fails, `undo` restores the previous state before the
    /// append error is returned.
    async fn record<T, U>(&self, snapshot: Snapshot, undo: U) -> Result<(), PartyError>
    where
        U: Future<Output = Result<T, PortError>>,
    {
        match self.ports.snapshots.append(&snapshot).await {
            Ok(()) => {
                debug!(snapshot_id = %snapshot.id, entity_type = %snapshot.entity_type, "Snapshot recorded");
                Ok(())
            }
            Err(append_error) => {
                warn!(entity_id = %snapshot.entity_id, error = %append_error, "Snapshot append failed, undoing change");
                if let Err(undo_error) = undo.await {
                    error!(entity_id = %snapshot.entity_id, error = %undo_error, "Undoing unrecorded change failed");
                }
                Err(append_error.into())
            }
        }
    }

    fn finish(result: ValidationResult) -> Result<(), PartyError> {
        for warning in &result.warnings {
            warn!(warning = %warning, "Validation warning");
        }
        result.into_result()
    }
}

/// Locale-scoped lookups over the reference catalogues
///
/// Listings use the configured sort-index direction.
pub struct ReferenceDataService {
    port: Arc<dyn ReferenceDataPort>,
    config: PartyConfig,
}

impl ReferenceDataService {
    pub fn new(port: Arc<dyn ReferenceDataPort>, config: PartyConfig) -> Self {
        Self { port, config }
    }

    /// Every row of `T`'s catalogue across all locales
    #[instrument(skip(self))]
    pub async fn find_all<T: ReferenceData>(&self) -> Result<Vec<T>, PartyError> {
        let rows: Vec<T> = self.port.find_all(self.config.sort_index_order).await?;
        debug!(catalogue = %T::CATALOGUE, count = rows.len(), "Loaded reference data");
        Ok(rows)
    }

    /// Rows of `T`'s catalogue for one locale; empty when the locale is unknown
    #[instrument(skip(self))]
    pub async fn find_by_locale<T: ReferenceData>(&self, locale_id: &str) -> Result<Vec<T>, PartyError> {
        let rows: Vec<T> = self
            .port
            .find_by_locale(locale_id, self.config.sort_index_order)
            .await?;
        debug!(catalogue = %T::CATALOGUE, count = rows.len(), "Loaded reference data");
        Ok(rows)
    }

    /// Rows for the configured default locale
    pub async fn find_for_default_locale<T: ReferenceData>(&self) -> Result<Vec<T>, PartyError> {
        self.find_by_locale(&self.config.default_locale).await
    }

    pub async fn find_by_code<T: ReferenceData>(&self, code: &str, locale_id: &str) -> Result<Option<T>, PartyError> {
        Ok(self.port.find_by_code(code, locale_id).await?)
    }
}
