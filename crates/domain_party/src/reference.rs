//! Localized reference data
//!
//! Reference data are the closed, largely static lookup lists used to
//! populate and validate party attributes: genders, titles, identity
//! document types, measurement units and so on. Every catalogue row is
//! keyed by `(code, locale_id)` and carries an optional sort index and a
//! display name. Rows are seeded by migration and are read-only at runtime.
//!
//! All catalogues share one storage shape, [`ReferenceRecord`]; the typed
//! rows implement [`ReferenceData`] to convert from and to it. Ordering for
//! listings is defined by [`sort_records`]:
//!
//! 1. locale id ascending
//! 2. sort index in the configured [`SortIndexOrder`], rows without an index last
//! 3. name ascending

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{code_enum, locale_matches, InvalidCodeError, PortError};

use crate::codes::{ConstraintType, MeasurementSystem, MeasurementUnitType, ValueType};
use crate::collection::Keyed;
use crate::keys::{ReferenceKey, RoleTypeAttributeConstraintId};

code_enum! {
    /// The reference-data catalogues of the party domain
    pub enum Catalogue("reference catalogue") {
        AssociationType => ("association_type", "Association Type"),
        AttributeType => ("attribute_type", "Attribute Type"),
        ContactMechanismRole => ("contact_mechanism_role", "Contact Mechanism Role"),
        ContactMechanismType => ("contact_mechanism_type", "Contact Mechanism Type"),
        EmploymentStatus => ("employment_status", "Employment Status"),
        ExternalReferenceType => ("external_reference_type", "External Reference Type"),
        Gender => ("gender", "Gender"),
        IdentityDocumentType => ("identity_document_type", "Identity Document Type"),
        IndustryClassification => ("industry_classification", "Industry Classification"),
        LockType => ("lock_type", "Lock Type"),
        MandataryRole => ("mandatary_role", "Mandatary Role"),
        MandateType => ("mandate_type", "Mandate Type"),
        MaritalStatus => ("marital_status", "Marital Status"),
        MarriageType => ("marriage_type", "Marriage Type"),
        MeasurementUnit => ("measurement_unit", "Measurement Unit"),
        NextOfKinType => ("next_of_kin_type", "Next Of Kin Type"),
        Occupation => ("occupation", "Occupation"),
        PhysicalAddressRole => ("physical_address_role", "Physical Address Role"),
        PhysicalAddressType => ("physical_address_type", "Physical Address Type"),
        PreferenceType => ("preference_type", "Preference Type"),
        Race => ("race", "Race"),
        ResidencyStatus => ("residency_status", "Residency Status"),
        RoleType => ("role_type", "Role Type"),
        SourceOfFundsType => ("source_of_funds_type", "Source Of Funds Type"),
        StatusType => ("status_type", "Status Type"),
        TaxNumberType => ("tax_number_type", "Tax Number Type"),
        TimeToContact => ("time_to_contact", "Time To Contact"),
        Title => ("title", "Title"),
    }
}

/// Direction in which reference rows are ordered by sort index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortIndexOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortIndexOrder {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortIndexOrder::Descending => "DESC",
            SortIndexOrder::Ascending => "ASC",
        }
    }

    /// Compares two sort indexes; a missing index sorts after any present one
    pub fn compare(&self, a: Option<i32>, b: Option<i32>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => match self {
                SortIndexOrder::Descending => b.cmp(&a),
                SortIndexOrder::Ascending => a.cmp(&b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Failure converting a stored record into a typed reference row
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("Expected a {expected} record, found {actual}")]
    CatalogueMismatch {
        expected: Catalogue,
        actual: Catalogue,
    },

    #[error("{catalogue} '{code}' is missing required field {field}")]
    MissingField {
        catalogue: Catalogue,
        code: String,
        field: &'static str,
    },

    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),
}

impl From<ReferenceDataError> for PortError {
    fn from(error: ReferenceDataError) -> Self {
        PortError::Transformation {
            message: error.to_string(),
        }
    }
}

/// The storage shape shared by every catalogue
///
/// Catalogue-specific columns are optional here and required by the typed
/// row that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub catalogue: Catalogue,
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    /// Code of the owning row in another catalogue
    pub parent_code: Option<String>,
    pub category: Option<String>,
    pub value_type: Option<ValueType>,
    pub unit_type: Option<MeasurementUnitType>,
    pub measurement_system: Option<MeasurementSystem>,
}

impl ReferenceRecord {
    pub fn new(
        catalogue: Catalogue,
        code: impl Into<String>,
        locale_id: impl Into<String>,
        sort_index: Option<i32>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            catalogue,
            code: code.into(),
            locale_id: locale_id.into(),
            sort_index,
            name: name.into(),
            description: description.into(),
            parent_code: None,
            category: None,
            value_type: None,
            unit_type: None,
            measurement_system: None,
        }
    }

    pub fn with_parent_code(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_unit_type(mut self, unit_type: MeasurementUnitType) -> Self {
        self.unit_type = Some(unit_type);
        self
    }

    pub fn with_measurement_system(mut self, system: MeasurementSystem) -> Self {
        self.measurement_system = Some(system);
        self
    }

    pub fn key(&self) -> ReferenceKey {
        ReferenceKey::new(&self.code, &self.locale_id)
    }

    fn expect_catalogue(&self, expected: Catalogue) -> Result<(), ReferenceDataError> {
        if self.catalogue == expected {
            Ok(())
        } else {
            Err(ReferenceDataError::CatalogueMismatch {
                expected,
                actual: self.catalogue,
            })
        }
    }

    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T, ReferenceDataError> {
        value.ok_or_else(|| ReferenceDataError::MissingField {
            catalogue: self.catalogue,
            code: self.code.clone(),
            field,
        })
    }
}

/// A typed row of one reference catalogue
pub trait ReferenceData: Sized + Clone + Send + Sync + 'static {
    const CATALOGUE: Catalogue;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError>;

    fn to_record(&self) -> ReferenceRecord;

    fn code(&self) -> &str;

    fn locale_id(&self) -> &str;

    fn sort_index(&self) -> Option<i32>;

    fn name(&self) -> &str;

    fn key(&self) -> ReferenceKey {
        ReferenceKey::new(self.code(), self.locale_id())
    }
}

macro_rules! reference_accessors {
    () => {
        fn code(&self) -> &str {
            &self.code
        }

        fn locale_id(&self) -> &str {
            &self.locale_id
        }

        fn sort_index(&self) -> Option<i32> {
            self.sort_index
        }

        fn name(&self) -> &str {
            &self.name
        }
    };
}

macro_rules! simple_reference {
    ($($(#[$meta:meta])* $name:ident => $catalogue:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
            pub struct $name {
                pub code: String,
                pub locale_id: String,
                pub sort_index: Option<i32>,
                pub name: String,
                pub description: String,
            }

            impl ReferenceData for $name {
                const CATALOGUE: Catalogue = Catalogue::$catalogue;

                fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
                    record.expect_catalogue(Self::CATALOGUE)?;
                    Ok(Self {
                        code: record.code,
                        locale_id: record.locale_id,
                        sort_index: record.sort_index,
                        name: record.name,
                        description: record.description,
                    })
                }

                fn to_record(&self) -> ReferenceRecord {
                    ReferenceRecord::new(
                        Self::CATALOGUE,
                        &self.code,
                        &self.locale_id,
                        self.sort_index,
                        &self.name,
                        &self.description,
                    )
                }

                reference_accessors!();
            }
        )+
    };
}

simple_reference! {
    AssociationType => AssociationType;
    ContactMechanismType => ContactMechanismType;
    EmploymentStatus => EmploymentStatus;
    ExternalReferenceType => ExternalReferenceType;
    Gender => Gender;
    IdentityDocumentType => IdentityDocumentType;
    /// A kind of lock that suspends processing for a party
    LockType => LockType;
    MandataryRole => MandataryRole;
    MandateType => MandateType;
    MaritalStatus => MaritalStatus;
    NextOfKinType => NextOfKinType;
    Occupation => Occupation;
    PhysicalAddressRole => PhysicalAddressRole;
    /// The structure of a physical address: building, farm, street, etc.
    PhysicalAddressType => PhysicalAddressType;
    Race => Race;
    ResidencyStatus => ResidencyStatus;
    RoleType => RoleType;
    SourceOfFundsType => SourceOfFundsType;
    StatusType => StatusType;
    TaxNumberType => TaxNumberType;
    TimeToContact => TimeToContact;
    Title => Title;
}

/// A marriage type, valid only for its marital status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageType {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub marital_status: String,
}

impl ReferenceData for MarriageType {
    const CATALOGUE: Catalogue = Catalogue::MarriageType;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let marital_status = record.require(record.parent_code.clone(), "marital_status")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            marital_status,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_parent_code(&self.marital_status)
    }

    reference_accessors!();
}

/// An industry classification within a classification system such as ISIC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryClassification {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub system: String,
    pub category: Option<String>,
}

impl ReferenceData for IndustryClassification {
    const CATALOGUE: Catalogue = Catalogue::IndustryClassification;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let system = record.require(record.parent_code.clone(), "system")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            system,
            category: record.category,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        let mut record = ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_parent_code(&self.system);
        record.category = self.category.clone();
        record
    }

    reference_accessors!();
}

/// A role a contact mechanism of a given type can play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMechanismRole {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub contact_mechanism_type: String,
}

impl ReferenceData for ContactMechanismRole {
    const CATALOGUE: Catalogue = Catalogue::ContactMechanismRole;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let contact_mechanism_type =
            record.require(record.parent_code.clone(), "contact_mechanism_type")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            contact_mechanism_type,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_parent_code(&self.contact_mechanism_type)
    }

    reference_accessors!();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceType {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub category: String,
}

impl ReferenceData for PreferenceType {
    const CATALOGUE: Catalogue = Catalogue::PreferenceType;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let category = record.require(record.category.clone(), "category")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            category,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_category(&self.category)
    }

    reference_accessors!();
}

/// The definition of an attribute a party can carry
///
/// Attribute values are typed by `value_type`; measured attributes name the
/// quantity they measure in `unit_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub value_type: ValueType,
    pub unit_type: Option<MeasurementUnitType>,
}

impl ReferenceData for AttributeType {
    const CATALOGUE: Catalogue = Catalogue::AttributeType;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let category = record.require(record.category.clone(), "category")?;
        let value_type = record.require(record.value_type, "value_type")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            category,
            value_type,
            unit_type: record.unit_type,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        let mut record = ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_category(&self.category)
        .with_value_type(self.value_type);
        record.unit_type = self.unit_type;
        record
    }

    reference_accessors!();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    pub code: String,
    pub locale_id: String,
    pub sort_index: Option<i32>,
    pub name: String,
    pub description: String,
    pub system: MeasurementSystem,
    pub unit_type: MeasurementUnitType,
}

impl ReferenceData for MeasurementUnit {
    const CATALOGUE: Catalogue = Catalogue::MeasurementUnit;

    fn from_record(record: ReferenceRecord) -> Result<Self, ReferenceDataError> {
        record.expect_catalogue(Self::CATALOGUE)?;
        let system = record.require(record.measurement_system, "measurement_system")?;
        let unit_type = record.require(record.unit_type, "unit_type")?;
        Ok(Self {
            code: record.code,
            locale_id: record.locale_id,
            sort_index: record.sort_index,
            name: record.name,
            description: record.description,
            system,
            unit_type,
        })
    }

    fn to_record(&self) -> ReferenceRecord {
        ReferenceRecord::new(
            Self::CATALOGUE,
            &self.code,
            &self.locale_id,
            self.sort_index,
            &self.name,
            &self.description,
        )
        .with_measurement_system(self.system)
        .with_unit_type(self.unit_type)
    }

    reference_accessors!();
}

/// A constraint on an attribute for parties holding a role
///
/// Not localized. The meaning of `value` depends on the constraint type:
/// a length for `MaxSize`/`MinSize`, a regular expression for `Pattern`
/// and a catalogue code for `Reference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTypeAttributeTypeConstraint {
    pub role_type: String,
    pub attribute_type: String,
    pub constraint_type: ConstraintType,
    pub value: Option<String>,
}

impl RoleTypeAttributeTypeConstraint {
    pub fn new(
        role_type: impl Into<String>,
        attribute_type: impl Into<String>,
        constraint_type: ConstraintType,
        value: Option<String>,
    ) -> Self {
        Self {
            role_type: role_type.into(),
            attribute_type: attribute_type.into(),
            constraint_type,
            value,
        }
    }
}

impl Keyed for RoleTypeAttributeTypeConstraint {
    type Key = RoleTypeAttributeConstraintId;

    fn key(&self) -> Self::Key {
        RoleTypeAttributeConstraintId::new(&self.role_type, &self.attribute_type, self.constraint_type)
    }
}

/// Orders rows by locale, then sort index in `order`, then name
pub fn sort_records<T: ReferenceData>(rows: &mut [T], order: SortIndexOrder) {
    sort_records_by(rows, order, |row| (row.locale_id(), row.sort_index(), row.name()));
}

/// [`sort_records`] over any row shape, given its `(locale_id, sort_index, name)`
pub fn sort_records_by<T, F>(rows: &mut [T], order: SortIndexOrder, fields: F)
where
    F: Fn(&T) -> (&str, Option<i32>, &str),
{
    rows.sort_by(|a, b| {
        let (a_locale, a_index, a_name) = fields(a);
        let (b_locale, b_index, b_name) = fields(b);
        a_locale
            .cmp(b_locale)
            .then_with(|| order.compare(a_index, b_index))
            .then_with(|| a_name.cmp(b_name))
    });
}

/// Keeps the rows whose locale matches `locale_id`, ignoring ASCII case
pub fn filter_by_locale<T: ReferenceData>(rows: Vec<T>, locale_id: &str) -> Vec<T> {
    rows.into_iter()
        .filter(|row| locale_matches(row.locale_id(), locale_id))
        .collect()
}
