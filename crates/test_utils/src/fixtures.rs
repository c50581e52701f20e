//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the party domain. The reference
//! catalogues here cover every code the builders use, so aggregates built
//! with default builders pass reference validation.

use chrono::NaiveDate;
use core_kernel::{PartyId, TenantId};
use domain_party::codes::{ConstraintType, MeasurementSystem, MeasurementUnitType, ValueType};
use domain_party::ports::mock::{MockPartyStore, MockReferenceDataPort};
use domain_party::reference::{Catalogue, ReferenceRecord, RoleTypeAttributeTypeConstraint};
use domain_party::services::{PartyPorts, PartyService};
use domain_party::PartyConfig;
use uuid::Uuid;

/// Locale the fixture catalogues are primarily written in
pub const FIXTURE_LOCALE: &str = "en-US";

/// Secondary locale with a partial translation of some catalogues
pub const FIXTURE_SECONDARY_LOCALE: &str = "af-ZA";

/// Fixture for reference catalogues
pub struct ReferenceDataFixtures;

impl ReferenceDataFixtures {
    fn record(catalogue: Catalogue, code: &str, sort_index: Option<i32>, name: &str) -> ReferenceRecord {
        ReferenceRecord::new(catalogue, code, FIXTURE_LOCALE, sort_index, name, name)
    }

    /// Every catalogue row the builders rely on, in the primary locale
    pub fn records() -> Vec<ReferenceRecord> {
        use Catalogue::*;

        let mut records = vec![
            Self::record(ContactMechanismType, "email_address", Some(2), "Email Address"),
            Self::record(ContactMechanismType, "mobile_number", Some(1), "Mobile Number"),
            Self::record(ContactMechanismRole, "main_email", Some(1), "Main Email").with_parent_code("email_address"),
            Self::record(ContactMechanismRole, "personal_mobile", Some(1), "Personal Mobile")
                .with_parent_code("mobile_number"),
            Self::record(PhysicalAddressType, "street", Some(1), "Street"),
            Self::record(PhysicalAddressRole, "business", Some(2), "Business"),
            Self::record(PhysicalAddressRole, "residential", Some(1), "Residential"),
            Self::record(IdentityDocumentType, "passport", Some(1), "Passport"),
            Self::record(TaxNumberType, "income_tax", Some(1), "Income Tax"),
            Self::record(ExternalReferenceType, "crm_id", None, "CRM Identifier"),
            Self::record(PreferenceType, "newsletter", None, "Newsletter").with_category("marketing"),
            Self::record(RoleType, "employee", Some(1), "Employee"),
            Self::record(RoleType, "employer", Some(2), "Employer"),
            Self::record(LockType, "legal_hold", None, "Legal Hold"),
            Self::record(StatusType, "active", Some(1), "Active"),
            Self::record(Title, "mr", Some(2), "Mr"),
            Self::record(Title, "ms", Some(1), "Ms"),
            Self::record(Gender, "female", Some(1), "Female"),
            Self::record(Gender, "male", Some(2), "Male"),
            Self::record(Race, "unspecified", None, "Unspecified"),
            Self::record(MaritalStatus, "married", Some(1), "Married"),
            Self::record(MaritalStatus, "single", Some(2), "Single"),
            Self::record(MarriageType, "in_community_of_property", None, "In Community Of Property")
                .with_parent_code("married"),
            Self::record(Occupation, "engineer", None, "Engineer"),
            Self::record(EmploymentStatus, "employed", Some(1), "Employed"),
            Self::record(ResidencyStatus, "citizen", Some(1), "Citizen"),
            Self::record(TimeToContact, "morning", Some(1), "Morning"),
            Self::record(SourceOfFundsType, "salary", Some(1), "Salary"),
            Self::record(AssociationType, "employment", Some(1), "Employment"),
            Self::record(MandateType, "banking", None, "Banking"),
            Self::record(MandataryRole, "signatory", None, "Signatory"),
            Self::record(NextOfKinType, "spouse", None, "Spouse"),
            Self::record(IndustryClassification, "6511", None, "Life Insurance")
                .with_parent_code("isic")
                .with_category("financial"),
            Self::record(AttributeType, "employee_number", Some(1), "Employee Number")
                .with_category("employment")
                .with_value_type(ValueType::String),
            Self::record(AttributeType, "height", Some(2), "Height")
                .with_category("physical")
                .with_value_type(ValueType::Decimal)
                .with_unit_type(MeasurementUnitType::Length),
            Self::record(MeasurementUnit, "m", Some(1), "Metre")
                .with_measurement_system(MeasurementSystem::Metric)
                .with_unit_type(MeasurementUnitType::Length),
        ];
        records.extend(Self::secondary_locale_records());
        records
    }

    /// A partial translation in the secondary locale
    pub fn secondary_locale_records() -> Vec<ReferenceRecord> {
        [("female", Some(1), "Vroulik"), ("male", Some(2), "Manlik")]
            .into_iter()
            .map(|(code, sort_index, name)| {
                ReferenceRecord::new(Catalogue::Gender, code, FIXTURE_SECONDARY_LOCALE, sort_index, name, name)
            })
            .collect()
    }

    /// Attribute constraints for employees: a required, six-digit employee number
    pub fn constraints() -> Vec<RoleTypeAttributeTypeConstraint> {
        vec![
            RoleTypeAttributeTypeConstraint::new("employee", "employee_number", ConstraintType::Required, None),
            RoleTypeAttributeTypeConstraint::new(
                "employee",
                "employee_number",
                ConstraintType::Pattern,
                Some("[0-9]{6}".to_string()),
            ),
        ]
    }

    /// An in-memory reference port holding the fixture catalogues
    pub async fn mock_port() -> MockReferenceDataPort {
        let port = MockReferenceDataPort::with_records(Self::records()).await;
        for constraint in Self::constraints() {
            port.add_constraint(constraint).await;
        }
        port
    }
}

/// A party service over in-memory ports seeded with the fixture catalogues
pub async fn in_memory_service() -> PartyService {
    let ports = PartyPorts::in_memory(MockPartyStore::new(), ReferenceDataFixtures::mock_port().await);
    PartyService::new(ports, PartyConfig::default())
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// A fixed tenant for deterministic tests
    pub fn tenant_id() -> TenantId {
        TenantId::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001))
    }

    /// A second fixed tenant for isolation tests
    pub fn other_tenant_id() -> TenantId {
        TenantId::from_uuid(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0002))
    }

    /// A fresh party id
    pub fn party_id() -> PartyId {
        PartyId::new_v7()
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    pub fn date_of_birth() -> NaiveDate {
        NaiveDate::from_ymd_opt(1985, 3, 14).unwrap_or_default()
    }

    pub fn employment_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
    }
}
