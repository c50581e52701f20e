//! PostgreSQL Party Adapter
//!
//! This module provides the database adapter for the party aggregates,
//! implementing [`OrganizationPort`], [`PersonPort`] and [`PartyPort`] on top
//! of the organization, person and party repositories.
//!
//! # Overview
//!
//! The `PostgresPartyAdapter` serves as the bridge between the domain layer's
//! port interfaces and the database layer. It:
//!
//! - Translates domain requests into repository operations
//! - Converts database row types back to domain models
//! - Handles error translation between database and port errors
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresPartyAdapter;
//! use domain_party::ports::{OrganizationPort, PartyPort};
//! use std::sync::Arc;
//!
//! let adapter = Arc::new(PostgresPartyAdapter::new(pool));
//! let organizations: Arc<dyn OrganizationPort> = adapter.clone();
//! let parties: Arc<dyn PartyPort> = adapter;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    CodeEnum, DomainPort, HealthCheckResult, HealthCheckable, Page, PageRequest, PartyId,
    PortError, TenantId,
};
use domain_party::address::PhysicalAddress;
use domain_party::codes::PartyType;
use domain_party::collection::KeyedSet;
use domain_party::contact::ContactMechanism;
use domain_party::document::{IdentityDocument, TaxNumber};
use domain_party::party::{Organization, Party, PartyAggregate, Person};
use domain_party::ports::{OrganizationPort, PartyPort, PersonPort};
use domain_party::profile::{
    Attribute, ExternalReference, Lock, Preference, Role, SourceOfFunds, Status,
};

use super::{ping, transformation};
use crate::repositories::organization::{OrganizationRecord, OrganizationRepository, OrganizationRow};
use crate::repositories::party::{
    AttributeRow, ContactMechanismRow, DatedEntryRow, ExternalReferenceRow, IdentityDocumentRow,
    PartyChildren, PartyRepository, PartyRow, PhysicalAddressRow, PreferenceRow, SourceOfFundsRow,
    TaxNumberRow,
};
use crate::repositories::person::{PersonRecord, PersonRepository, PersonRow};

const ADAPTER_ID: &str = "postgres-party-adapter";

/// PostgreSQL-backed implementation of the party ports
///
/// # Health Checking
///
/// Health checks perform a simple query to ensure the connection pool is
/// operational.
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants; an id already
/// held by another tenant or by the other party type surfaces as
/// `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresPartyAdapter {
    organizations: OrganizationRepository,
    persons: PersonRepository,
    parties: PartyRepository,
    pool: PgPool,
}

impl PostgresPartyAdapter {
    /// Creates a new PostgreSQL party adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            organizations: OrganizationRepository::new(pool.clone()),
            persons: PersonRepository::new(pool.clone()),
            parties: PartyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPartyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPartyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, ADAPTER_ID).await
    }
}

#[async_trait]
impl OrganizationPort for PostgresPartyAdapter {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.organizations.exists(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: PartyId,
    ) -> Result<Option<Organization>, PortError> {
        debug!("Fetching organization");
        self.organizations
            .find(tenant_id.into(), id.into())
            .await?
            .map(organization_from_record)
            .transpose()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.organizations.delete(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant(
        &self,
        tenant_id: TenantId,
        page: PageRequest,
    ) -> Result<Page<Organization>, PortError> {
        self.organization_page(tenant_id, None, page).await
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Organization>, PortError> {
        self.organization_page(tenant_id, Some(filter), page).await
    }

    #[instrument(skip(self, organization), fields(tenant_id = %organization.tenant_id, party_id = %organization.id))]
    async fn save(&self, organization: &Organization) -> Result<(), PortError> {
        let record = organization_to_record(organization)?;
        Ok(self.organizations.save(&record).await?)
    }
}

#[async_trait]
impl PersonPort for PostgresPartyAdapter {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.persons.exists(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn find_by_tenant_and_id(
        &self,
        tenant_id: TenantId,
        id: PartyId,
    ) -> Result<Option<Person>, PortError> {
        debug!("Fetching person");
        self.persons
            .find(tenant_id.into(), id.into())
            .await?
            .map(person_from_record)
            .transpose()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.persons.delete(tenant_id.into(), id.into()).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Person>, PortError> {
        self.person_page(tenant_id, None, page).await
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Person>, PortError> {
        self.person_page(tenant_id, Some(filter), page).await
    }

    #[instrument(skip(self, person), fields(tenant_id = %person.tenant_id, party_id = %person.id))]
    async fn save(&self, person: &Person) -> Result<(), PortError> {
        let record = person_to_record(person)?;
        Ok(self.persons.save(&record).await?)
    }
}

#[async_trait]
impl PartyPort for PostgresPartyAdapter {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn exists_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.parties.exists(tenant_id.into(), id.into(), None).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn find_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<Option<Party>, PortError> {
        self.parties
            .find(tenant_id.into(), id.into())
            .await?
            .map(party_from_row)
            .transpose()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, party_id = %id))]
    async fn delete_by_tenant_and_id(&self, tenant_id: TenantId, id: PartyId) -> Result<bool, PortError> {
        Ok(self.parties.delete(tenant_id.into(), id.into(), None).await?)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant(&self, tenant_id: TenantId, page: PageRequest) -> Result<Page<Party>, PortError> {
        self.party_page(tenant_id, None, page).await
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    async fn find_page_by_tenant_and_name_filter(
        &self,
        tenant_id: TenantId,
        filter: &str,
        page: PageRequest,
    ) -> Result<Page<Party>, PortError> {
        self.party_page(tenant_id, Some(filter), page).await
    }
}

impl PostgresPartyAdapter {
    async fn organization_page(
        &self,
        tenant_id: TenantId,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Organization>, PortError> {
        let (records, total) = self
            .organizations
            .find_page(tenant_id.into(), name_filter, &page)
            .await?;
        let items = records
            .into_iter()
            .map(organization_from_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = items.len(), total, "Listed organizations");
        Ok(Page::new(items, total, page))
    }

    async fn person_page(
        &self,
        tenant_id: TenantId,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Person>, PortError> {
        let (records, total) = self.persons.find_page(tenant_id.into(), name_filter, &page).await?;
        let items = records
            .into_iter()
            .map(person_from_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = items.len(), total, "Listed persons");
        Ok(Page::new(items, total, page))
    }

    async fn party_page(
        &self,
        tenant_id: TenantId,
        name_filter: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Party>, PortError> {
        let (rows, total) = self.parties.find_page(tenant_id.into(), name_filter, &page).await?;
        let items = rows
            .into_iter()
            .map(party_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, page))
    }
}

// ============================================================================
// Row <-> domain conversions
// ============================================================================

fn party_from_row(row: PartyRow) -> Result<Party, PortError> {
    Ok(Party {
        id: PartyId::from_uuid(row.id),
        tenant_id: TenantId::from_uuid(row.tenant_id),
        party_type: PartyType::from_code(&row.party_type)?,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// The keyed collections decoded from a party's sub-entity rows
struct PartySets {
    contact_mechanisms: KeyedSet<ContactMechanism>,
    physical_addresses: KeyedSet<PhysicalAddress>,
    identity_documents: KeyedSet<IdentityDocument>,
    tax_numbers: KeyedSet<TaxNumber>,
    external_references: KeyedSet<ExternalReference>,
    preferences: KeyedSet<Preference>,
    attributes: KeyedSet<Attribute>,
    roles: KeyedSet<Role>,
    locks: KeyedSet<Lock>,
    statuses: KeyedSet<Status>,
    sources_of_funds: KeyedSet<SourceOfFunds>,
}

impl PartySets {
    fn from_children(children: PartyChildren) -> Result<Self, PortError> {
        let attributes = children
            .attributes
            .into_iter()
            .map(|row| {
                Ok(Attribute {
                    party_id: PartyId::from_uuid(row.party_id),
                    attribute_type: row.attribute_type,
                    value: serde_json::from_value(row.value).map_err(transformation)?,
                    unit: row.unit,
                })
            })
            .collect::<Result<KeyedSet<_>, PortError>>()?;

        Ok(Self {
            contact_mechanisms: children
                .contact_mechanisms
                .into_iter()
                .map(|row| ContactMechanism {
                    party_id: PartyId::from_uuid(row.party_id),
                    contact_mechanism_type: row.contact_mechanism_type,
                    role: row.role,
                    value: row.value,
                })
                .collect(),
            physical_addresses: children
                .physical_addresses
                .into_iter()
                .map(|row| PhysicalAddress {
                    party_id: PartyId::from_uuid(row.party_id),
                    role: row.role,
                    address_type: row.address_type,
                    building_name: row.building_name,
                    building_floor: row.building_floor,
                    complex_name: row.complex_name,
                    complex_unit_number: row.complex_unit_number,
                    farm_name: row.farm_name,
                    farm_number: row.farm_number,
                    line1: row.line1,
                    line2: row.line2,
                    line3: row.line3,
                    site_block: row.site_block,
                    site_number: row.site_number,
                    street_name: row.street_name,
                    street_number: row.street_number,
                    suburb: row.suburb,
                    city: row.city,
                    region: row.region,
                    postal_code: row.postal_code,
                    country: row.country,
                    latitude: row.latitude,
                    longitude: row.longitude,
                })
                .collect(),
            identity_documents: children
                .identity_documents
                .into_iter()
                .map(|row| IdentityDocument {
                    party_id: PartyId::from_uuid(row.party_id),
                    document_type: row.document_type,
                    country_of_issue: row.country_of_issue,
                    date_of_issue: row.date_of_issue,
                    date_of_expiry: row.date_of_expiry,
                    number: row.number,
                })
                .collect(),
            tax_numbers: children
                .tax_numbers
                .into_iter()
                .map(|row| TaxNumber {
                    party_id: PartyId::from_uuid(row.party_id),
                    tax_number_type: row.tax_number_type,
                    country_of_issue: row.country_of_issue,
                    number: row.number,
                })
                .collect(),
            external_references: children
                .external_references
                .into_iter()
                .map(|row| ExternalReference {
                    party_id: PartyId::from_uuid(row.party_id),
                    reference_type: row.reference_type,
                    value: row.value,
                })
                .collect(),
            preferences: children
                .preferences
                .into_iter()
                .map(|row| Preference {
                    party_id: PartyId::from_uuid(row.party_id),
                    preference_type: row.preference_type,
                    value: row.value,
                })
                .collect(),
            attributes,
            roles: children
                .roles
                .into_iter()
                .map(|row| Role {
                    party_id: PartyId::from_uuid(row.party_id),
                    role_type: row.code,
                    effective_from: row.effective_from,
                    effective_to: row.effective_to,
                })
                .collect(),
            locks: children
                .locks
                .into_iter()
                .map(|row| Lock {
                    party_id: PartyId::from_uuid(row.party_id),
                    lock_type: row.code,
                    effective_from: row.effective_from,
                    effective_to: row.effective_to,
                })
                .collect(),
            statuses: children
                .statuses
                .into_iter()
                .map(|row| Status {
                    party_id: PartyId::from_uuid(row.party_id),
                    status_type: row.code,
                    effective_from: row.effective_from,
                    effective_to: row.effective_to,
                })
                .collect(),
            sources_of_funds: children
                .sources_of_funds
                .into_iter()
                .map(|row| SourceOfFunds {
                    party_id: PartyId::from_uuid(row.party_id),
                    source_of_funds_type: row.source_of_funds_type,
                    percentage: row.percentage,
                    description: row.description,
                })
                .collect(),
        })
    }
}

/// Flattens the sub-entities common to both party types into rows
fn children_of<A: PartyAggregate>(party: &A) -> Result<PartyChildren, PortError> {
    let party_id = *party.id().as_uuid();
    let dated = |code: &str, from, to| DatedEntryRow {
        party_id,
        code: code.to_string(),
        effective_from: from,
        effective_to: to,
    };

    Ok(PartyChildren {
        contact_mechanisms: party
            .contact_mechanisms()
            .iter()
            .map(|c| ContactMechanismRow {
                party_id,
                role: c.role.clone(),
                contact_mechanism_type: c.contact_mechanism_type.clone(),
                value: c.value.clone(),
            })
            .collect(),
        physical_addresses: party
            .physical_addresses()
            .iter()
            .map(|a| PhysicalAddressRow {
                party_id,
                role: a.role.clone(),
                address_type: a.address_type.clone(),
                building_name: a.building_name.clone(),
                building_floor: a.building_floor.clone(),
                complex_name: a.complex_name.clone(),
                complex_unit_number: a.complex_unit_number.clone(),
                farm_name: a.farm_name.clone(),
                farm_number: a.farm_number.clone(),
                line1: a.line1.clone(),
                line2: a.line2.clone(),
                line3: a.line3.clone(),
                site_block: a.site_block.clone(),
                site_number: a.site_number.clone(),
                street_name: a.street_name.clone(),
                street_number: a.street_number.clone(),
                suburb: a.suburb.clone(),
                city: a.city.clone(),
                region: a.region.clone(),
                postal_code: a.postal_code.clone(),
                country: a.country.clone(),
                latitude: a.latitude.clone(),
                longitude: a.longitude.clone(),
            })
            .collect(),
        identity_documents: party
            .identity_documents()
            .iter()
            .map(|d| IdentityDocumentRow {
                party_id,
                document_type: d.document_type.clone(),
                country_of_issue: d.country_of_issue.clone(),
                date_of_issue: d.date_of_issue,
                date_of_expiry: d.date_of_expiry,
                number: d.number.clone(),
            })
            .collect(),
        tax_numbers: party
            .tax_numbers()
            .iter()
            .map(|t| TaxNumberRow {
                party_id,
                tax_number_type: t.tax_number_type.clone(),
                country_of_issue: t.country_of_issue.clone(),
                number: t.number.clone(),
            })
            .collect(),
        external_references: party
            .external_references()
            .iter()
            .map(|r| ExternalReferenceRow {
                party_id,
                reference_type: r.reference_type.clone(),
                value: r.value.clone(),
            })
            .collect(),
        preferences: party
            .preferences()
            .iter()
            .map(|p| PreferenceRow {
                party_id,
                preference_type: p.preference_type.clone(),
                value: p.value.clone(),
            })
            .collect(),
        attributes: party
            .attributes()
            .iter()
            .map(|a| {
                Ok(AttributeRow {
                    party_id,
                    attribute_type: a.attribute_type.clone(),
                    value: serde_json::to_value(&a.value).map_err(transformation)?,
                    unit: a.unit.clone(),
                })
            })
            .collect::<Result<Vec<_>, PortError>>()?,
        roles: party
            .roles()
            .iter()
            .map(|r| dated(&r.role_type, r.effective_from, r.effective_to))
            .collect(),
        locks: party
            .locks()
            .iter()
            .map(|l| dated(&l.lock_type, l.effective_from, l.effective_to))
            .collect(),
        statuses: party
            .statuses()
            .iter()
            .map(|s| dated(&s.status_type, s.effective_from, s.effective_to))
            .collect(),
        sources_of_funds: Vec::new(),
    })
}

fn organization_to_record(organization: &Organization) -> Result<OrganizationRecord, PortError> {
    Ok(OrganizationRecord {
        organization: OrganizationRow {
            id: *organization.id.as_uuid(),
            tenant_id: *organization.tenant_id.as_uuid(),
            name: organization.name.clone(),
            countries_of_tax_residence: organization.countries_of_tax_residence.clone(),
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        },
        children: children_of(organization)?,
    })
}

fn organization_from_record(record: OrganizationRecord) -> Result<Organization, PortError> {
    let OrganizationRecord { organization: row, children } = record;
    let sets = PartySets::from_children(children)?;

    let mut organization = Organization::with_id(
        PartyId::from_uuid(row.id),
        TenantId::from_uuid(row.tenant_id),
        row.name,
    );
    organization.countries_of_tax_residence = row.countries_of_tax_residence;
    organization.contact_mechanisms = sets.contact_mechanisms;
    organization.physical_addresses = sets.physical_addresses;
    organization.identity_documents = sets.identity_documents;
    organization.tax_numbers = sets.tax_numbers;
    organization.external_references = sets.external_references;
    organization.preferences = sets.preferences;
    organization.attributes = sets.attributes;
    organization.roles = sets.roles;
    organization.locks = sets.locks;
    organization.statuses = sets.statuses;
    organization.created_at = row.created_at;
    organization.updated_at = row.updated_at;
    Ok(organization)
}

fn person_to_record(person: &Person) -> Result<PersonRecord, PortError> {
    let party_id = *person.id.as_uuid();
    let mut children = children_of(person)?;
    children.sources_of_funds = person
        .sources_of_funds
        .iter()
        .map(|s| SourceOfFundsRow {
            party_id,
            source_of_funds_type: s.source_of_funds_type.clone(),
            percentage: s.percentage,
            description: s.description.clone(),
        })
        .collect();

    Ok(PersonRecord {
        person: PersonRow {
            id: party_id,
            tenant_id: *person.tenant_id.as_uuid(),
            name: person.name.clone(),
            given_name: person.given_name.clone(),
            middle_names: person.middle_names.clone(),
            surname: person.surname.clone(),
            preferred_name: person.preferred_name.clone(),
            initials: person.initials.clone(),
            title: person.title.clone(),
            date_of_birth: person.date_of_birth,
            date_of_death: person.date_of_death,
            country_of_birth: person.country_of_birth.clone(),
            country_of_residence: person.country_of_residence.clone(),
            countries_of_citizenship: person.countries_of_citizenship.clone(),
            countries_of_tax_residence: person.countries_of_tax_residence.clone(),
            language: person.language.clone(),
            gender: person.gender.clone(),
            race: person.race.clone(),
            marital_status: person.marital_status.clone(),
            marital_status_date: person.marital_status_date,
            marriage_type: person.marriage_type.clone(),
            occupation: person.occupation.clone(),
            employment_status: person.employment_status.clone(),
            residency_status: person.residency_status.clone(),
            time_to_contact: person.time_to_contact.clone(),
            created_at: person.created_at,
            updated_at: person.updated_at,
        },
        children,
    })
}

fn person_from_record(record: PersonRecord) -> Result<Person, PortError> {
    let PersonRecord { person: row, children } = record;
    let sets = PartySets::from_children(children)?;

    let mut person = Person::with_id(
        PartyId::from_uuid(row.id),
        TenantId::from_uuid(row.tenant_id),
        row.name,
    );
    person.given_name = row.given_name;
    person.middle_names = row.middle_names;
    person.surname = row.surname;
    person.preferred_name = row.preferred_name;
    person.initials = row.initials;
    person.title = row.title;
    person.date_of_birth = row.date_of_birth;
    person.date_of_death = row.date_of_death;
    person.country_of_birth = row.country_of_birth;
    person.country_of_residence = row.country_of_residence;
    person.countries_of_citizenship = row.countries_of_citizenship;
    person.countries_of_tax_residence = row.countries_of_tax_residence;
    person.language = row.language;
    person.gender = row.gender;
    person.race = row.race;
    person.marital_status = row.marital_status;
    person.marital_status_date = row.marital_status_date;
    person.marriage_type = row.marriage_type;
    person.occupation = row.occupation;
    person.employment_status = row.employment_status;
    person.residency_status = row.residency_status;
    person.time_to_contact = row.time_to_contact;
    person.contact_mechanisms = sets.contact_mechanisms;
    person.physical_addresses = sets.physical_addresses;
    person.identity_documents = sets.identity_documents;
    person.tax_numbers = sets.tax_numbers;
    person.external_references = sets.external_references;
    person.preferences = sets.preferences;
    person.attributes = sets.attributes;
    person.roles = sets.roles;
    person.locks = sets.locks;
    person.statuses = sets.statuses;
    person.sources_of_funds = sets.sources_of_funds;
    person.created_at = row.created_at;
    person.updated_at = row.updated_at;
    Ok(person)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain_party::profile::AttributeValue;
    use rust_decimal_macros::dec;

    fn sample_person() -> Person {
        let mut person = Person::new(TenantId::new(), "Jane Doe");
        person.given_name = Some("Jane".into());
        person.date_of_birth = NaiveDate::from_ymd_opt(1990, 4, 12);
        person.countries_of_citizenship = vec!["ZA".into(), "GB".into()];
        person.add_contact_mechanism(ContactMechanism::new(person.id, "email_address", "personal_email", "jane@example.test"));
        person.add_attribute(Attribute::new(person.id, "height", AttributeValue::Decimal(dec!(1.72))).with_unit("m"));
        person.add_role(Role::new(person.id, "employee").effective_between(NaiveDate::from_ymd_opt(2020, 1, 1), None));
        let mut funds = SourceOfFunds::new(person.id, "salary");
        funds.percentage = Some(80);
        person.add_source_of_funds(funds);
        person
    }

    #[test]
    fn test_person_survives_row_mapping() {
        let person = sample_person();
        let record = person_to_record(&person).unwrap();

        assert_eq!(record.children.contact_mechanisms.len(), 1);
        assert_eq!(record.children.sources_of_funds.len(), 1);
        assert_eq!(record.children.roles[0].code, "employee");

        let restored = person_from_record(record).unwrap();
        assert_eq!(restored, person);
    }

    #[test]
    fn test_organization_rows_carry_no_sources_of_funds() {
        let mut organization = Organization::new(TenantId::new(), "Acme");
        organization.add_lock(Lock::new(organization.id, "legal_hold"));
        let record = organization_to_record(&organization).unwrap();

        assert!(record.children.sources_of_funds.is_empty());
        assert_eq!(record.children.locks.len(), 1);
        assert_eq!(organization_from_record(record).unwrap(), organization);
    }

    #[test]
    fn test_unknown_party_type_is_a_transformation_error() {
        let row = PartyRow {
            id: uuid::Uuid::new_v4(),
            tenant_id: uuid::Uuid::new_v4(),
            party_type: "robot".into(),
            name: "R2".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(matches!(party_from_row(row), Err(PortError::Transformation { .. })));
    }

    #[test]
    fn test_corrupt_attribute_value_is_a_transformation_error() {
        let party_id = uuid::Uuid::new_v4();
        let children = PartyChildren {
            attributes: vec![AttributeRow {
                party_id,
                attribute_type: "height".into(),
                value: serde_json::json!({"type": "unknown"}),
                unit: None,
            }],
            ..PartyChildren::default()
        };
        assert!(matches!(
            PartySets::from_children(children),
            Err(PortError::Transformation { .. })
        ));
    }
}
