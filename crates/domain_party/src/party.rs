//! Party aggregates
//!
//! A party is a person or an organization. [`Organization`] and [`Person`]
//! are the aggregate roots: each owns keyed collections of sub-entities
//! (contact mechanisms, addresses, identity documents, tax numbers, ...)
//! and belongs to exactly one tenant. [`Party`] is the type-agnostic view
//! shared by both, used for listings and lookups that span party types.
//!
//! Sub-entities are identified by natural keys scoped to the owning party.
//! Adding a sub-entity stamps the aggregate's id into it and replaces any
//! existing entry with the same key.
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::TenantId;
//! use domain_party::contact::ContactMechanism;
//! use domain_party::party::Organization;
//!
//! let mut organization = Organization::new(TenantId::new(), "Acme Holdings");
//! let email = ContactMechanism::new(organization.id, "email_address", "main_email", "info@acme.test");
//! assert!(organization.add_contact_mechanism(email).is_none());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{PartyId, TenantId};

use crate::address::PhysicalAddress;
use crate::codes::PartyType;
use crate::collection::KeyedSet;
use crate::contact::ContactMechanism;
use crate::document::{IdentityDocument, TaxNumber};
use crate::keys::{
    AttributeId, ContactMechanismId, ExternalReferenceId, IdentityDocumentId, LockId,
    PhysicalAddressId, PreferenceId, RoleId, SourceOfFundsId, StatusId, TaxNumberId,
};
use crate::profile::{
    Attribute, ExternalReference, Lock, Preference, Role, SourceOfFunds, Status,
};

/// The type-agnostic view of a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub tenant_id: TenantId,
    pub party_type: PartyType,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Behaviour shared by the party aggregate roots
pub trait PartyAggregate {
    const PARTY_TYPE: PartyType;

    fn id(&self) -> PartyId;

    fn tenant_id(&self) -> TenantId;

    fn name(&self) -> &str;

    fn countries_of_tax_residence(&self) -> &[String];

    fn contact_mechanisms(&self) -> &KeyedSet<ContactMechanism>;

    fn physical_addresses(&self) -> &KeyedSet<PhysicalAddress>;

    fn identity_documents(&self) -> &KeyedSet<IdentityDocument>;

    fn tax_numbers(&self) -> &KeyedSet<TaxNumber>;

    fn external_references(&self) -> &KeyedSet<ExternalReference>;

    fn preferences(&self) -> &KeyedSet<Preference>;

    fn attributes(&self) -> &KeyedSet<Attribute>;

    fn roles(&self) -> &KeyedSet<Role>;

    fn locks(&self) -> &KeyedSet<Lock>;

    fn statuses(&self) -> &KeyedSet<Status>;

    fn to_party(&self) -> Party;
}

/// Generates add/remove methods for keyed collections of a party aggregate
macro_rules! party_collections {
    (
        $aggregate:ident {
            $(
                $field:ident: $entity:ident => $add:ident, $remove:ident($($arg:ident: $arg_ty:ty),+) via $key:ident;
            )+
        }
    ) => {
        impl $aggregate {
            $(
                /// Adds or replaces the entry with the same natural key
                pub fn $add(&mut self, mut item: $entity) -> Option<$entity> {
                    item.party_id = self.id;
                    self.touch();
                    self.$field.upsert(item)
                }

                pub fn $remove(&mut self, $($arg: $arg_ty),+) -> Option<$entity> {
                    let removed = self.$field.remove(&$key::new(self.id, $($arg),+));
                    if removed.is_some() {
                        self.touch();
                    }
                    removed
                }
            )+
        }
    };
}

macro_rules! common_party_collections {
    ($aggregate:ident) => {
        party_collections! {
            $aggregate {
                contact_mechanisms: ContactMechanism
                    => add_contact_mechanism, remove_contact_mechanism(role: &str) via ContactMechanismId;
                physical_addresses: PhysicalAddress
                    => add_physical_address, remove_physical_address(role: &str) via PhysicalAddressId;
                identity_documents: IdentityDocument
                    => add_identity_document, remove_identity_document(
                        document_type: &str,
                        country_of_issue: &str,
                        date_of_issue: Option<NaiveDate>
                    ) via IdentityDocumentId;
                tax_numbers: TaxNumber
                    => add_tax_number, remove_tax_number(tax_number_type: &str, country_of_issue: &str) via TaxNumberId;
                external_references: ExternalReference
                    => add_external_reference, remove_external_reference(reference_type: &str) via ExternalReferenceId;
                preferences: Preference
                    => add_preference, remove_preference(preference_type: &str) via PreferenceId;
                attributes: Attribute
                    => add_attribute, remove_attribute(attribute_type: &str) via AttributeId;
                roles: Role => add_role, remove_role(role_type: &str) via RoleId;
                locks: Lock => add_lock, remove_lock(lock_type: &str) via LockId;
                statuses: Status => add_status, remove_status(status_type: &str) via StatusId;
            }
        }

        impl $aggregate {
            /// Records a modification
            pub fn touch(&mut self) {
                self.updated_at = Utc::now();
            }

            pub fn contact_mechanism(&self, role: &str) -> Option<&ContactMechanism> {
                self.contact_mechanisms.get(&ContactMechanismId::new(self.id, role))
            }

            pub fn physical_address(&self, role: &str) -> Option<&PhysicalAddress> {
                self.physical_addresses.get(&PhysicalAddressId::new(self.id, role))
            }

            pub fn attribute(&self, attribute_type: &str) -> Option<&Attribute> {
                self.attributes.get(&AttributeId::new(self.id, attribute_type))
            }

            pub fn has_role(&self, role_type: &str) -> bool {
                self.roles.contains(&RoleId::new(self.id, role_type))
            }

            pub fn is_locked(&self) -> bool {
                !self.locks.is_empty()
            }
        }

        impl PartyAggregate for $aggregate {
            const PARTY_TYPE: PartyType = PartyType::$aggregate;

            fn id(&self) -> PartyId {
                self.id
            }

            fn tenant_id(&self) -> TenantId {
                self.tenant_id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn countries_of_tax_residence(&self) -> &[String] {
                &self.countries_of_tax_residence
            }

            fn contact_mechanisms(&self) -> &KeyedSet<ContactMechanism> {
                &self.contact_mechanisms
            }

            fn physical_addresses(&self) -> &KeyedSet<PhysicalAddress> {
                &self.physical_addresses
            }

            fn identity_documents(&self) -> &KeyedSet<IdentityDocument> {
                &self.identity_documents
            }

            fn tax_numbers(&self) -> &KeyedSet<TaxNumber> {
                &self.tax_numbers
            }

            fn external_references(&self) -> &KeyedSet<ExternalReference> {
                &self.external_references
            }

            fn preferences(&self) -> &KeyedSet<Preference> {
                &self.preferences
            }

            fn attributes(&self) -> &KeyedSet<Attribute> {
                &self.attributes
            }

            fn roles(&self) -> &KeyedSet<Role> {
                &self.roles
            }

            fn locks(&self) -> &KeyedSet<Lock> {
                &self.locks
            }

            fn statuses(&self) -> &KeyedSet<Status> {
                &self.statuses
            }

            fn to_party(&self) -> Party {
                Party {
                    id: self.id,
                    tenant_id: self.tenant_id,
                    party_type: Self::PARTY_TYPE,
                    name: self.name.clone(),
                    created_at: self.created_at,
                    updated_at: self.updated_at,
                }
            }
        }
    };
}

/// An organization: a company, trust, government body or similar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Organization {
    pub id: PartyId,
    pub tenant_id: TenantId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// ISO 3166-1 alpha-2 codes
    #[serde(default)]
    pub countries_of_tax_residence: Vec<String>,
    #[serde(default)]
    pub contact_mechanisms: KeyedSet<ContactMechanism>,
    #[serde(default)]
    pub physical_addresses: KeyedSet<PhysicalAddress>,
    #[serde(default)]
    pub identity_documents: KeyedSet<IdentityDocument>,
    #[serde(default)]
    pub tax_numbers: KeyedSet<TaxNumber>,
    #[serde(default)]
    pub external_references: KeyedSet<ExternalReference>,
    #[serde(default)]
    pub preferences: KeyedSet<Preference>,
    #[serde(default)]
    pub attributes: KeyedSet<Attribute>,
    #[serde(default)]
    pub roles: KeyedSet<Role>,
    #[serde(default)]
    pub locks: KeyedSet<Lock>,
    #[serde(default)]
    pub statuses: KeyedSet<Status>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self::with_id(PartyId::new_v7(), tenant_id, name)
    }

    /// Creates an organization with a caller-assigned id
    pub fn with_id(id: PartyId, tenant_id: TenantId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            name: name.into(),
            countries_of_tax_residence: Vec::new(),
            contact_mechanisms: KeyedSet::new(),
            physical_addresses: KeyedSet::new(),
            identity_documents: KeyedSet::new(),
            tax_numbers: KeyedSet::new(),
            external_references: KeyedSet::new(),
            preferences: KeyedSet::new(),
            attributes: KeyedSet::new(),
            roles: KeyedSet::new(),
            locks: KeyedSet::new(),
            statuses: KeyedSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

common_party_collections!(Organization);

/// A natural person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Person {
    pub id: PartyId,
    pub tenant_id: TenantId,
    /// Full name as displayed in listings
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub given_name: Option<String>,
    #[validate(length(max = 100))]
    pub middle_names: Option<String>,
    #[validate(length(max = 100))]
    pub surname: Option<String>,
    #[validate(length(max = 100))]
    pub preferred_name: Option<String>,
    #[validate(length(max = 20))]
    pub initials: Option<String>,
    #[validate(length(max = 30))]
    pub title: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    #[validate(length(equal = 2))]
    pub country_of_birth: Option<String>,
    #[validate(length(equal = 2))]
    pub country_of_residence: Option<String>,
    #[serde(default)]
    pub countries_of_citizenship: Vec<String>,
    #[serde(default)]
    pub countries_of_tax_residence: Vec<String>,
    /// ISO 639-1 language code
    #[validate(length(equal = 2))]
    pub language: Option<String>,
    #[validate(length(max = 30))]
    pub gender: Option<String>,
    #[validate(length(max = 30))]
    pub race: Option<String>,
    #[validate(length(max = 30))]
    pub marital_status: Option<String>,
    pub marital_status_date: Option<NaiveDate>,
    #[validate(length(max = 30))]
    pub marriage_type: Option<String>,
    #[validate(length(max = 30))]
    pub occupation: Option<String>,
    #[validate(length(max = 30))]
    pub employment_status: Option<String>,
    #[validate(length(max = 30))]
    pub residency_status: Option<String>,
    #[validate(length(max = 30))]
    pub time_to_contact: Option<String>,
    #[serde(default)]
    pub contact_mechanisms: KeyedSet<ContactMechanism>,
    #[serde(default)]
    pub physical_addresses: KeyedSet<PhysicalAddress>,
    #[serde(default)]
    pub identity_documents: KeyedSet<IdentityDocument>,
    #[serde(default)]
    pub tax_numbers: KeyedSet<TaxNumber>,
    #[serde(default)]
    pub external_references: KeyedSet<ExternalReference>,
    #[serde(default)]
    pub preferences: KeyedSet<Preference>,
    #[serde(default)]
    pub attributes: KeyedSet<Attribute>,
    #[serde(default)]
    pub roles: KeyedSet<Role>,
    #[serde(default)]
    pub locks: KeyedSet<Lock>,
    #[serde(default)]
    pub statuses: KeyedSet<Status>,
    #[serde(default)]
    pub sources_of_funds: KeyedSet<SourceOfFunds>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self::with_id(PartyId::new_v7(), tenant_id, name)
    }

    /// Creates a person with a caller-assigned id
    pub fn with_id(id: PartyId, tenant_id: TenantId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            name: name.into(),
            given_name: None,
            middle_names: None,
            surname: None,
            preferred_name: None,
            initials: None,
            title: None,
            date_of_birth: None,
            date_of_death: None,
            country_of_birth: None,
            country_of_residence: None,
            countries_of_citizenship: Vec::new(),
            countries_of_tax_residence: Vec::new(),
            language: None,
            gender: None,
            race: None,
            marital_status: None,
            marital_status_date: None,
            marriage_type: None,
            occupation: None,
            employment_status: None,
            residency_status: None,
            time_to_contact: None,
            contact_mechanisms: KeyedSet::new(),
            physical_addresses: KeyedSet::new(),
            identity_documents: KeyedSet::new(),
            tax_numbers: KeyedSet::new(),
            external_references: KeyedSet::new(),
            preferences: KeyedSet::new(),
            attributes: KeyedSet::new(),
            roles: KeyedSet::new(),
            locks: KeyedSet::new(),
            statuses: KeyedSet::new(),
            sources_of_funds: KeyedSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a person from given name and surname; the display name joins both
    pub fn named(tenant_id: TenantId, given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        let given_name = given_name.into();
        let surname = surname.into();
        let mut person = Self::new(tenant_id, format!("{} {}", given_name, surname));
        person.initials = given_name.chars().next().map(|c| c.to_uppercase().to_string());
        person.given_name = Some(given_name);
        person.surname = Some(surname);
        person
    }

    /// Age in whole years on `date`, when the date of birth is known
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| date.years_since(dob))
    }

    pub fn add_source_of_funds(&mut self, mut item: SourceOfFunds) -> Option<SourceOfFunds> {
        item.party_id = self.id;
        self.touch();
        self.sources_of_funds.upsert(item)
    }

    pub fn remove_source_of_funds(&mut self, source_of_funds_type: &str) -> Option<SourceOfFunds> {
        let removed = self
            .sources_of_funds
            .remove(&SourceOfFundsId::new(self.id, source_of_funds_type));
        if removed.is_some() {
            self.touch();
        }
        removed
    }
}

common_party_collections!(Person);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::address_types;

    #[test]
    fn test_add_stamps_party_id() {
        let mut organization = Organization::new(TenantId::new(), "Acme");
        let foreign = PartyId::new();
        organization.add_tax_number(TaxNumber::new(foreign, "za_income_tax_number", "ZA", "9001"));

        let stored = organization.tax_numbers.iter().next().unwrap();
        assert_eq!(stored.party_id, organization.id);
    }

    #[test]
    fn test_add_replaces_by_natural_key() {
        let mut person = Person::named(TenantId::new(), "Thandi", "Nkosi");
        let id = person.id;
        person.add_contact_mechanism(ContactMechanism::new(id, "mobile_number", "personal_mobile", "0821234567"));
        let previous = person.add_contact_mechanism(ContactMechanism::new(
            id,
            "mobile_number",
            "personal_mobile",
            "0831234567",
        ));

        assert_eq!(previous.map(|c| c.value), Some("0821234567".to_string()));
        assert_eq!(person.contact_mechanisms.len(), 1);
        assert_eq!(person.contact_mechanism("personal_mobile").unwrap().value, "0831234567");
    }

    #[test]
    fn test_remove_by_key() {
        let mut organization = Organization::new(TenantId::new(), "Acme");
        let id = organization.id;
        organization.add_physical_address(PhysicalAddress::new(
            id,
            "business",
            address_types::UNSTRUCTURED,
            "Cape Town",
            "ZA",
        ));
        assert!(organization.remove_physical_address("residential").is_none());
        assert!(organization.remove_physical_address("business").is_some());
        assert!(organization.physical_addresses.is_empty());
    }

    #[test]
    fn test_to_party_view() {
        let person = Person::named(TenantId::new(), "Sipho", "Dlamini");
        let party = person.to_party();
        assert_eq!(party.party_type, PartyType::Person);
        assert_eq!(party.name, "Sipho Dlamini");
        assert_eq!(person.initials.as_deref(), Some("S"));
    }

    #[test]
    fn test_age_on() {
        let mut person = Person::new(TenantId::new(), "Jane Doe");
        person.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15);
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), Some(29));
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), Some(30));
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()), None);
    }
}
