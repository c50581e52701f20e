//! Party Domain Ports
//!
//! This module defines the repository ports of the party domain. Each
//! aggregate (organization, person, mandate, association) and the snapshot
//! history has its own port; reference data is read through
//! [`ReferenceDataPort`].
//!
//! # Architecture
//!
//! - **PostgreSQL adapters**: `infra_db::adapters`
//! - **In-memory adapters**: [`mock`], for tests (feature `mock`)
//!
//! Every aggregate operation takes the tenant id. An entity stored under one
//! tenant is invisible to every other tenant: lookups return `None`,
//! existence checks return `false` and deletes affect nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_party::ports::OrganizationPort;
//! use std::sync::Arc;
//!
//! pub struct Directory {
//!     organizations: Arc<dyn OrganizationPort>,
//! }
//!
//! impl Directory {
//!     pub async fn lookup(&self, tenant_id: TenantId, id: PartyId) -> Result<Option<Organization>, PortError> {
//!         self.organizations.find_by_tenant_and_id(tenant_id, id).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use uuid::Uuid;

use core_kernel::{
    AssociationId, DomainPort, HealthCheckable, MandateId, Page, PageRequest, PartyId, PortError,
    TenantId,
};

use crate::association::Association;
use crate::codes::EntityType;
use crate::mandate::Mandate;
use crate::party::{Organization, Party, Person};
use crate::reference::{
    Catalogue, ReferenceData, ReferenceRecord, RoleTypeAttributeTypeConstraint, SortIndexOrder,
};
use crate::snapshot::Snapshot;

/// Persistence port for organizations
///
/// Listings are ordered by name, then id, in the request's sort direction.
#[async_trait]
pub trait OrganizationPort: DomainPort + HealthCheckable {
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: PartyId,
    ) -> Result<Option<Organization>, PortError>;

    /// Deletes the organization and its sub-entities
    ///
    /// # Returns
    ///
    /// True if an organization was deleted
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Organization>, PortError>;

    /// Lists organizations whose name contains `filter`, ignoring case
    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, PortError>;

    /// Inserts or replaces the organization with all its sub-entities
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the id is taken by another tenant or by a person
    async fn save(&self, organization: &Organization) -> Result<(), PortError>;
}

/// Persistence port for persons
///
/// Listings are ordered by name, then id, in the request's sort direction.
#[async_trait]
pub trait PersonPort: DomainPort + HealthCheckable {
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: PartyId,
    ) -> Result<Option<Person>, PortError>;

    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Person>, PortError>;

    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Person>, PortError>;

    async fn save(&self, person: &Person) -> Result<(), PortError>;
}

/// Type-agnostic access to parties of either type
#[async_trait]
pub trait PartyPort: DomainPort + HealthCheckable {
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<Option<Party>, PortError>;

    /// Deletes the party, whichever its type
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError>;

    async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Party>, PortError>;

    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Party>, PortError>;
}

/// Persistence port for mandates
///
/// Listings are ordered by creation time, then id.
#[async_trait]
pub trait MandatePort: DomainPort + HealthCheckable {
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError>;

    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: MandateId,
    ) -> Result<Option<Mandate>, PortError>;

    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError>;

    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PortError>;

    /// Lists the mandates under which `party_id` holds any role
    async fn find_page_by_tenant_and_party_id(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Mandate>, PortError>;

    async fn save(&self, mandate: &Mandate) -> Result<(), PortError>;
}

/// Persistence port for associations
///
/// Listings are ordered by creation time, then id.
#[async_trait]
pub trait AssociationPort: DomainPort + HealthCheckable {
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError>;

    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
    ) -> Result<Option<Association>, PortError>;

    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError>;

    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Association>, PortError>;

    /// Lists the associations with `party_id` on either side
    async fn find_page_by_tenant_and_party_id(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: PageRequest,
    ) -> Result<Page<Association>, PortError>;

    async fn save(&self, association: &Association) -> Result<(), PortError>;
}

/// Append-only snapshot history
#[async_trait]
pub trait SnapshotPort: DomainPort + HealthCheckable {
    async fn append(&self, snapshot: &Snapshot) -> Result<(), PortError>;

    /// Pages through an entity's history in timestamp order
    async fn find_page_by_tenant_and_entity(
        &self,
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Snapshot>, PortError>;
}

/// Read-only access to reference catalogues
///
/// Records come back ordered by locale id, then sort index in `order` with
/// rows lacking an index last, then name. Locale filtering ignores case; a
/// locale with no rows yields an empty result.
#[async_trait]
pub trait ReferenceDataPort: DomainPort + HealthCheckable {
    async fn find_records(
        &self,
        catalogue: Catalogue,
        locale_id: Option<&str>,
        order: SortIndexOrder,
    ) -> Result<Vec<ReferenceRecord>, PortError>;

    /// Constraints for `role_type`, or every constraint when `None`
    async fn find_role_type_attribute_type_constraints(
        &self,
        role_type: Option<&str>,
    ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError>;
}

/// Typed lookups over [`ReferenceDataPort`]
#[async_trait]
pub trait ReferenceDataPortExt: ReferenceDataPort {
    /// Every row of catalogue `T`, across all locales
    async fn find_all<T: ReferenceData>(&self, order: SortIndexOrder) -> Result<Vec<T>, PortError> {
        let records = self.find_records(T::CATALOGUE, None, order).await?;
        to_rows(records)
    }

    /// The rows of catalogue `T` for one locale
    async fn find_by_locale<T: ReferenceData>(
        &self,
        locale_id: &str,
        order: SortIndexOrder,
    ) -> Result<Vec<T>, PortError> {
        let records = self.find_records(T::CATALOGUE, Some(locale_id), order).await?;
        to_rows(records)
    }

    async fn find_by_code<T: ReferenceData>(&self, code: &str, locale_id: &str) -> Result<Option<T>, PortError> {
        let rows: Vec<T> = self.find_by_locale(locale_id, SortIndexOrder::default()).await?;
        Ok(rows.into_iter().find(|row| row.code() == code))
    }

    /// Whether `code` exists in `catalogue` for the locale
    async fn code_exists(&self, catalogue: Catalogue, code: &str, locale_id: &str) -> Result<bool, PortError> {
        let records = self
            .find_records(catalogue, Some(locale_id), SortIndexOrder::default())
            .await?;
        Ok(records.iter().any(|record| record.code == code))
    }
}

// Blanket implementation for all ReferenceDataPort implementors
impl<T: ReferenceDataPort + ?Sized> ReferenceDataPortExt for T {}

fn to_rows<T: ReferenceData>(records: Vec<ReferenceRecord>) -> Result<Vec<T>, PortError> {
    records
        .into_iter()
        .map(|record| T::from_record(record).map_err(PortError::from))
        .collect()
}

/// In-memory implementations of the party ports for testing
///
/// These adapters keep state in process and apply the same tenant scoping,
/// ordering and conflict rules as the PostgreSQL adapters.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{HealthCheckResult, SortDirection};

    use crate::codes::PartyType;
    use crate::party::PartyAggregate;
    use crate::reference::sort_records_by;

    fn order_by<T, K: Ord>(items: &mut [T], direction: SortDirection, key: impl Fn(&T) -> K) {
        items.sort_by(|a, b| {
            let ordering = key(a).cmp(&key(b));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    fn name_matches(name: &str, filter: &str) -> bool {
        name.to_lowercase().contains(&filter.to_lowercase())
    }

    /// In-memory store backing every aggregate port
    #[derive(Debug, Default, Clone)]
    pub struct MockPartyStore {
        organizations: Arc<RwLock<HashMap<PartyId, Organization>>>,
        persons: Arc<RwLock<HashMap<PartyId, Person>>>,
        mandates: Arc<RwLock<HashMap<MandateId, Mandate>>>,
        associations: Arc<RwLock<HashMap<AssociationId, Association>>>,
        snapshots: Arc<RwLock<Vec<Snapshot>>>,
    }

    impl MockPartyStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of snapshots recorded across all tenants
        pub async fn snapshot_count(&self) -> usize {
            self.snapshots.read().await.len()
        }

        /// Removes associations and mandataries that reference a deleted party
        async fn cascade_party_delete(&self, party_id: PartyId) {
            self.associations
                .write()
                .await
                .retain(|_, association| !association.involves(party_id));
            for mandate in self.mandates.write().await.values_mut() {
                mandate.mandataries.retain(|m| m.party_id != party_id);
            }
        }

        async fn party_owner(&self, id: PartyId) -> Option<(TenantId, PartyType)> {
            if let Some(organization) = self.organizations.read().await.get(&id) {
                return Some((organization.tenant_id, PartyType::Organization));
            }
            self.persons
                .read()
                .await
                .get(&id)
                .map(|person| (person.tenant_id, PartyType::Person))
        }

        async fn check_party_slot(
            &self,
            tenant_id: TenantId,
            id: PartyId,
            party_type: PartyType,
        ) -> Result<(), PortError> {
            match self.party_owner(id).await {
                Some((owner, existing_type)) if owner != tenant_id || existing_type != party_type => {
                    Err(PortError::conflict(format!("Party id {} is already in use", id)))
                }
                _ => Ok(()),
            }
        }
    }

    impl DomainPort for MockPartyStore {}

    #[async_trait]
    impl HealthCheckable for MockPartyStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-party-store", 0)
        }
    }

    #[async_trait]
    impl OrganizationPort for MockPartyStore {
        async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            Ok(OrganizationPort::find_by_tenant_and_id(self, tenant_id, id).await?.is_some())
        }

        async fn find_by_tenant_and_id(
            &self,
            tenant_id: TenantId,
            id: PartyId,
        ) -> Result<Option<Organization>, PortError> {
            Ok(self
                .organizations
                .read()
                .await
                .get(&id)
                .filter(|o| o.tenant_id == tenant_id)
                .cloned())
        }

        async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            let removed = {
                let mut organizations = self.organizations.write().await;
                let owned = organizations.get(&id).is_some_and(|o| o.tenant_id == tenant_id);
                owned && organizations.remove(&id).is_some()
            };
            if removed {
                self.cascade_party_delete(id).await;
            }
            Ok(removed)
        }

        async fn find_page_by_tenant(
            &self,
            tenant_id: TenantId,
            page: PageRequest,
        ) -> Result<Page<Organization>, PortError> {
            OrganizationPort::find_page_by_tenant_and_name_filter(self, tenant_id, "", page).await
        }

        async fn find_page_by_tenant_and_name_filter(
            &self,
            tenant_id: TenantId,
            filter: &str,
            page: PageRequest,
        ) -> Result<Page<Organization>, PortError> {
            let mut items: Vec<_> = self
                .organizations
                .read()
                .await
                .values()
                .filter(|o| o.tenant_id == tenant_id && name_matches(&o.name, filter))
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |o| (o.name.clone(), o.id));
            Ok(page.paginate(items))
        }

        async fn save(&self, organization: &Organization) -> Result<(), PortError> {
            self.check_party_slot(organization.tenant_id, organization.id, PartyType::Organization)
                .await?;
            self.organizations
                .write()
                .await
                .insert(organization.id, organization.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl PersonPort for MockPartyStore {
        async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            Ok(PersonPort::find_by_tenant_and_id(self, tenant_id, id).await?.is_some())
        }

        async fn find_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<Option<Person>, PortError> {
            Ok(self
                .persons
                .read()
                .await
                .get(&id)
                .filter(|p| p.tenant_id == tenant_id)
                .cloned())
        }

        async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            let removed = {
                let mut persons = self.persons.write().await;
                let owned = persons.get(&id).is_some_and(|p| p.tenant_id == tenant_id);
                owned && persons.remove(&id).is_some()
            };
            if removed {
                self.cascade_party_delete(id).await;
            }
            Ok(removed)
        }

        async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Person>, PortError> {
            PersonPort::find_page_by_tenant_and_name_filter(self, tenant_id, "", page).await
        }

        async fn find_page_by_tenant_and_name_filter(
            &self,
            tenant_id: TenantId,
            filter: &str,
            page: PageRequest,
        ) -> Result<Page<Person>, PortError> {
            let mut items: Vec<_> = self
                .persons
                .read()
                .await
                .values()
                .filter(|p| p.tenant_id == tenant_id && name_matches(&p.name, filter))
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |p| (p.name.clone(), p.id));
            Ok(page.paginate(items))
        }

        async fn save(&self, person: &Person) -> Result<(), PortError> {
            self.check_party_slot(person.tenant_id, person.id, PartyType::Person)
                .await?;
            self.persons.write().await.insert(person.id, person.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl PartyPort for MockPartyStore {
        async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            Ok(matches!(self.party_owner(id).await, Some((owner, _)) if owner == tenant_id))
        }

        async fn find_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<Option<Party>, PortError> {
            if let Some(organization) = OrganizationPort::find_by_tenant_and_id(self, tenant_id, id).await? {
                return Ok(Some(organization.to_party()));
            }
            Ok(PersonPort::find_by_tenant_and_id(self, tenant_id, id)
                .await?
                .map(|person| person.to_party()))
        }

        async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
            if OrganizationPort::delete_by_tenant_and_id(self, tenant_id, id).await? {
                return Ok(true);
            }
            PersonPort::delete_by_tenant_and_id(self, tenant_id, id).await
        }

        async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Party>, PortError> {
            PartyPort::find_page_by_tenant_and_name_filter(self, tenant_id, "", page).await
        }

        async fn find_page_by_tenant_and_name_filter(
            &self,
            tenant_id: TenantId,
            filter: &str,
            page: PageRequest,
        ) -> Result<Page<Party>, PortError> {
            let mut items: Vec<Party> = self
                .organizations
                .read()
                .await
                .values()
                .filter(|o| o.tenant_id == tenant_id && name_matches(&o.name, filter))
                .map(|o| o.to_party())
                .collect();
            items.extend(
                self.persons
                    .read()
                    .await
                    .values()
                    .filter(|p| p.tenant_id == tenant_id && name_matches(&p.name, filter))
                    .map(|p| p.to_party()),
            );
            order_by(&mut items, page.sort_direction, |p| (p.name.clone(), p.id));
            Ok(page.paginate(items))
        }
    }

    #[async_trait]
    impl MandatePort for MockPartyStore {
        async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError> {
            Ok(MandatePort::find_by_tenant_and_id(self, tenant_id, id).await?.is_some())
        }

        async fn find_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<Option<Mandate>, PortError> {
            Ok(self
                .mandates
                .read()
                .await
                .get(&id)
                .filter(|m| m.tenant_id == tenant_id)
                .cloned())
        }

        async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: MandateId) -> Result<bool, PortError> {
            let mut mandates = self.mandates.write().await;
            let owned = mandates.get(&id).is_some_and(|m| m.tenant_id == tenant_id);
            Ok(owned && mandates.remove(&id).is_some())
        }

        async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Mandate>, PortError> {
            let mut items: Vec<_> = self
                .mandates
                .read()
                .await
                .values()
                .filter(|m| m.tenant_id == tenant_id)
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |m| (m.created_at, m.id));
            Ok(page.paginate(items))
        }

        async fn find_page_by_tenant_and_party_id(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            page: PageRequest,
        ) -> Result<Page<Mandate>, PortError> {
            let mut items: Vec<_> = self
                .mandates
                .read()
                .await
                .values()
                .filter(|m| m.tenant_id == tenant_id && m.has_mandatary(party_id))
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |m| (m.created_at, m.id));
            Ok(page.paginate(items))
        }

        async fn save(&self, mandate: &Mandate) -> Result<(), PortError> {
            let mut mandates = self.mandates.write().await;
            if let Some(existing) = mandates.get(&mandate.id) {
                if existing.tenant_id != mandate.tenant_id {
                    return Err(PortError::conflict(format!("Mandate id {} is already in use", mandate.id)));
                }
            }
            mandates.insert(mandate.id, mandate.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl AssociationPort for MockPartyStore {
        async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError> {
            Ok(AssociationPort::find_by_tenant_and_id(self, tenant_id, id).await?.is_some())
        }

        async fn find_by_tenant_and_id(
            &self,
            tenant_id: TenantId,
            id: AssociationId,
        ) -> Result<Option<Association>, PortError> {
            Ok(self
                .associations
                .read()
                .await
                .get(&id)
                .filter(|a| a.tenant_id == tenant_id)
                .cloned())
        }

        async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: AssociationId) -> Result<bool, PortError> {
            let mut associations = self.associations.write().await;
            let owned = associations.get(&id).is_some_and(|a| a.tenant_id == tenant_id);
            Ok(owned && associations.remove(&id).is_some())
        }

        async fn find_page_by_tenant(
            &self,
            tenant_id: TenantId,
            page: PageRequest,
        ) -> Result<Page<Association>, PortError> {
            let mut items: Vec<_> = self
                .associations
                .read()
                .await
                .values()
                .filter(|a| a.tenant_id == tenant_id)
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |a| (a.created_at, a.id));
            Ok(page.paginate(items))
        }

        async fn find_page_by_tenant_and_party_id(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            page: PageRequest,
        ) -> Result<Page<Association>, PortError> {
            let mut items: Vec<_> = self
                .associations
                .read()
                .await
                .values()
                .filter(|a| a.tenant_id == tenant_id && a.involves(party_id))
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |a| (a.created_at, a.id));
            Ok(page.paginate(items))
        }

        async fn save(&self, association: &Association) -> Result<(), PortError> {
            let mut associations = self.associations.write().await;
            if let Some(existing) = associations.get(&association.id) {
                if existing.tenant_id != association.tenant_id {
                    return Err(PortError::conflict(format!(
                        "Association id {} is already in use",
                        association.id
                    )));
                }
            }
            associations.insert(association.id, association.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl SnapshotPort for MockPartyStore {
        async fn append(&self, snapshot: &Snapshot) -> Result<(), PortError> {
            let mut snapshots = self.snapshots.write().await;
            if snapshots.iter().any(|s| s.id == snapshot.id) {
                return Err(PortError::conflict(format!("Snapshot {} already recorded", snapshot.id)));
            }
            snapshots.push(snapshot.clone());
            Ok(())
        }

        async fn find_page_by_tenant_and_entity(
            &self,
            tenant_id: TenantId,
            entity_type: EntityType,
            entity_id: Uuid,
            page: PageRequest,
        ) -> Result<Page<Snapshot>, PortError> {
            let mut items: Vec<_> = self
                .snapshots
                .read()
                .await
                .iter()
                .filter(|s| {
                    s.tenant_id == tenant_id && s.entity_type == entity_type && s.entity_id == entity_id
                })
                .cloned()
                .collect();
            order_by(&mut items, page.sort_direction, |s| (s.timestamp, s.id));
            Ok(page.paginate(items))
        }
    }

    /// In-memory reference catalogues
    #[derive(Debug, Default, Clone)]
    pub struct MockReferenceDataPort {
        records: Arc<RwLock<Vec<ReferenceRecord>>>,
        constraints: Arc<RwLock<Vec<RoleTypeAttributeTypeConstraint>>>,
    }

    impl MockReferenceDataPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with catalogue rows for testing
        pub async fn with_records(records: Vec<ReferenceRecord>) -> Self {
            let port = Self::new();
            port.records.write().await.extend(records);
            port
        }

        pub async fn add_record(&self, record: ReferenceRecord) {
            self.records.write().await.push(record);
        }

        pub async fn add_constraint(&self, constraint: RoleTypeAttributeTypeConstraint) {
            self.constraints.write().await.push(constraint);
        }
    }

    impl DomainPort for MockReferenceDataPort {}

    #[async_trait]
    impl HealthCheckable for MockReferenceDataPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-reference-data-port", 0)
        }
    }

    #[async_trait]
    impl ReferenceDataPort for MockReferenceDataPort {
        async fn find_records(
            &self,
            catalogue: Catalogue,
            locale_id: Option<&str>,
            order: SortIndexOrder,
        ) -> Result<Vec<ReferenceRecord>, PortError> {
            let mut records: Vec<_> = self
                .records
                .read()
                .await
                .iter()
                .filter(|r| r.catalogue == catalogue)
                .filter(|r| locale_id.map_or(true, |locale| core_kernel::locale_matches(&r.locale_id, locale)))
                .cloned()
                .collect();
            sort_records_by(&mut records, order, |r| (r.locale_id.as_str(), r.sort_index, r.name.as_str()));
            Ok(records)
        }

        async fn find_role_type_attribute_type_constraints(
            &self,
            role_type: Option<&str>,
        ) -> Result<Vec<RoleTypeAttributeTypeConstraint>, PortError> {
            let mut constraints: Vec<_> = self
                .constraints
                .read()
                .await
                .iter()
                .filter(|c| role_type.map_or(true, |role_type| c.role_type == role_type))
                .cloned()
                .collect();
            constraints.sort_by(|a, b| {
                (&a.role_type, &a.attribute_type, a.constraint_type)
                    .cmp(&(&b.role_type, &b.attribute_type, b.constraint_type))
            });
            Ok(constraints)
        }
    }
}
