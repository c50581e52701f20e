//! Test Data Builders
//!
//! Provides builder patterns for constructing parties, mandates and
//! associations with sensible defaults. Every default code exists in
//! [`ReferenceDataFixtures`](crate::fixtures::ReferenceDataFixtures), so a
//! default build passes reference validation. Names are generated with
//! `fake` unless a test sets them.

use chrono::NaiveDate;
use core_kernel::{PartyId, TenantId};
use domain_party::address::PhysicalAddress;
use domain_party::association::Association;
use domain_party::codes::RequiredMandataries;
use domain_party::contact::ContactMechanism;
use domain_party::document::{IdentityDocument, TaxNumber};
use domain_party::mandate::Mandate;
use domain_party::party::{Organization, Person};
use domain_party::profile::{Attribute, AttributeValue, Role};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use crate::fixtures::{DateFixtures, IdFixtures};

/// Builder for test organizations
pub struct OrganizationBuilder {
    id: PartyId,
    tenant_id: TenantId,
    name: String,
    countries_of_tax_residence: Vec<String>,
    email: Option<String>,
    with_address: bool,
    roles: Vec<String>,
}

impl Default for OrganizationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganizationBuilder {
    /// Creates a new builder with a generated company name
    pub fn new() -> Self {
        Self {
            id: PartyId::new_v7(),
            tenant_id: IdFixtures::tenant_id(),
            name: CompanyName().fake(),
            countries_of_tax_residence: vec!["ZA".to_string()],
            email: None,
            with_address: false,
            roles: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: PartyId) -> Self {
        self.id = id;
        self
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a main email contact mechanism
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Adds a business street address in Cape Town
    pub fn with_business_address(mut self) -> Self {
        self.with_address = true;
        self
    }

    pub fn with_role(mut self, role_type: impl Into<String>) -> Self {
        self.roles.push(role_type.into());
        self
    }

    pub fn build(self) -> Organization {
        let mut organization = Organization::with_id(self.id, self.tenant_id, self.name);
        organization.countries_of_tax_residence = self.countries_of_tax_residence;
        if let Some(email) = self.email {
            organization.add_contact_mechanism(ContactMechanism::new(self.id, "email_address", "main_email", email));
        }
        if self.with_address {
            organization.add_physical_address(PhysicalAddress::street(
                self.id,
                "business",
                "1",
                "Long Street",
                "Cape Town",
                "8001",
                "ZA",
            ));
        }
        for role_type in self.roles {
            organization.add_role(Role::new(self.id, role_type));
        }
        organization
    }
}

/// Builder for test persons
pub struct PersonBuilder {
    id: PartyId,
    tenant_id: TenantId,
    given_name: String,
    surname: String,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    marital_status: Option<String>,
    marriage_type: Option<String>,
    email: Option<String>,
    passport: Option<String>,
    tax_number: Option<String>,
    employee_number: Option<String>,
}

impl Default for PersonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonBuilder {
    /// Creates a new builder with generated given name and surname
    pub fn new() -> Self {
        Self {
            id: PartyId::new_v7(),
            tenant_id: IdFixtures::tenant_id(),
            given_name: FirstName().fake(),
            surname: LastName().fake(),
            date_of_birth: Some(DateFixtures::date_of_birth()),
            gender: None,
            marital_status: None,
            marriage_type: None,
            email: None,
            passport: None,
            tax_number: None,
            employee_number: None,
        }
    }

    pub fn with_id(mut self, id: PartyId) -> Self {
        self.id = id;
        self
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_names(mut self, given_name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.given_name = given_name.into();
        self.surname = surname.into();
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Sets marital status and marriage type together
    pub fn married(mut self, marriage_type: impl Into<String>) -> Self {
        self.marital_status = Some("married".to_string());
        self.marriage_type = Some(marriage_type.into());
        self
    }

    /// Adds a main email; passing `None` generates one
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = Some(email.unwrap_or_else(|| SafeEmail().fake()));
        self
    }

    /// Adds a South African passport
    pub fn with_passport(mut self, number: impl Into<String>) -> Self {
        self.passport = Some(number.into());
        self
    }

    /// Adds a South African income tax number
    pub fn with_tax_number(mut self, number: impl Into<String>) -> Self {
        self.tax_number = Some(number.into());
        self
    }

    /// Gives the person the employee role with the given employee number
    pub fn employee(mut self, employee_number: impl Into<String>) -> Self {
        self.employee_number = Some(employee_number.into());
        self
    }

    pub fn build(self) -> Person {
        let mut person = Person::named(self.tenant_id, self.given_name, self.surname);
        person.id = self.id;
        person.date_of_birth = self.date_of_birth;
        person.gender = self.gender;
        person.marital_status = self.marital_status;
        person.marriage_type = self.marriage_type;

        if let Some(email) = self.email {
            person.add_contact_mechanism(ContactMechanism::new(self.id, "email_address", "main_email", email));
        }
        if let Some(number) = self.passport {
            person.add_identity_document(
                IdentityDocument::new(self.id, "passport", "ZA", number)
                    .issued_on(DateFixtures::employment_start()),
            );
        }
        if let Some(number) = self.tax_number {
            person.add_tax_number(TaxNumber::new(self.id, "income_tax", "ZA", number));
        }
        if let Some(employee_number) = self.employee_number {
            person.add_role(Role::new(self.id, "employee"));
            person.add_attribute(Attribute::new(
                self.id,
                "employee_number",
                AttributeValue::String(employee_number),
            ));
        }
        person
    }
}

/// Builder for test mandates
pub struct MandateBuilder {
    tenant_id: TenantId,
    mandate_type: String,
    required_mandataries: RequiredMandataries,
    mandataries: Vec<PartyId>,
    effective_from: Option<NaiveDate>,
}

impl Default for MandateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MandateBuilder {
    /// A banking mandate that any single signatory may exercise
    pub fn new() -> Self {
        Self {
            tenant_id: IdFixtures::tenant_id(),
            mandate_type: "banking".to_string(),
            required_mandataries: RequiredMandataries::Any,
            mandataries: Vec::new(),
            effective_from: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_required_mandataries(mut self, required: RequiredMandataries) -> Self {
        self.required_mandataries = required;
        self
    }

    /// Adds a signatory
    pub fn with_signatory(mut self, party_id: PartyId) -> Self {
        self.mandataries.push(party_id);
        self
    }

    pub fn effective_from(mut self, date: NaiveDate) -> Self {
        self.effective_from = Some(date);
        self
    }

    pub fn build(self) -> Mandate {
        let mut mandate = Mandate::new(self.tenant_id, self.mandate_type, self.required_mandataries);
        for party_id in self.mandataries {
            mandate.add_mandatary(party_id, "signatory");
        }
        mandate.effective_from = self.effective_from;
        mandate
    }
}

/// Builder for test associations
pub struct AssociationBuilder {
    tenant_id: TenantId,
    association_type: String,
    first_party_id: PartyId,
    second_party_id: PartyId,
    effective_from: Option<NaiveDate>,
    effective_to: Option<NaiveDate>,
}

impl AssociationBuilder {
    /// An employment association from `first_party_id` to `second_party_id`
    pub fn between(first_party_id: PartyId, second_party_id: PartyId) -> Self {
        Self {
            tenant_id: IdFixtures::tenant_id(),
            association_type: "employment".to_string(),
            first_party_id,
            second_party_id,
            effective_from: None,
            effective_to: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn with_type(mut self, association_type: impl Into<String>) -> Self {
        self.association_type = association_type.into();
        self
    }

    pub fn effective_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    pub fn build(self) -> Association {
        let mut association = Association::new(
            self.tenant_id,
            self.association_type,
            self.first_party_id,
            self.second_party_id,
        );
        association.effective_from = self.effective_from;
        association.effective_to = self.effective_to;
        association
    }
}
