//! Party profile entries
//!
//! The smaller keyed sub-entities of a party: external references,
//! preferences, attributes, roles, locks, statuses and sources of funds.
//! Each is unique per party and type code.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PartyId;

use crate::codes::ValueType;
use crate::collection::Keyed;
use crate::keys::{
    AttributeId, ExternalReferenceId, LockId, PreferenceId, RoleId, SourceOfFundsId, StatusId,
};

/// An identifier for the party in an external system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExternalReference {
    pub party_id: PartyId,
    #[validate(length(min = 1, max = 30))]
    pub reference_type: String,
    #[validate(length(min = 1, max = 100))]
    pub value: String,
}

impl ExternalReference {
    pub fn new(party_id: PartyId, reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            party_id,
            reference_type: reference_type.into(),
            value: value.into(),
        }
    }
}

impl Keyed for ExternalReference {
    type Key = ExternalReferenceId;

    fn key(&self) -> Self::Key {
        ExternalReferenceId::new(self.party_id, &self.reference_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Preference {
    pub party_id: PartyId,
    #[validate(length(min = 1, max = 30))]
    pub preference_type: String,
    #[validate(length(min = 1, max = 200))]
    pub value: String,
}

impl Preference {
    pub fn new(party_id: PartyId, preference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            party_id,
            preference_type: preference_type.into(),
            value: value.into(),
        }
    }
}

impl Keyed for Preference {
    type Key = PreferenceId;

    fn key(&self) -> Self::Key {
        PreferenceId::new(self.party_id, &self.preference_type)
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Boolean(bool),
    Date(NaiveDate),
    Decimal(Decimal),
    Double(f64),
    Integer(i64),
    String(String),
}

impl AttributeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeValue::Boolean(_) => ValueType::Boolean,
            AttributeValue::Date(_) => ValueType::Date,
            AttributeValue::Decimal(_) => ValueType::Decimal,
            AttributeValue::Double(_) => ValueType::Double,
            AttributeValue::Integer(_) => ValueType::Integer,
            AttributeValue::String(_) => ValueType::String,
        }
    }

    /// The value rendered as text, as size and pattern constraints see it
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Boolean(value) => value.to_string(),
            AttributeValue::Date(value) => value.format("%Y-%m-%d").to_string(),
            AttributeValue::Decimal(value) => value.to_string(),
            AttributeValue::Double(value) => value.to_string(),
            AttributeValue::Integer(value) => value.to_string(),
            AttributeValue::String(value) => value.clone(),
        }
    }
}

/// An attribute of a party, typed by its attribute type
///
/// Measured attributes carry the code of the measurement unit the value is
/// expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Attribute {
    pub party_id: PartyId,
    #[validate(length(min = 1, max = 30))]
    pub attribute_type: String,
    pub value: AttributeValue,
    #[validate(length(min = 1, max = 30))]
    pub unit: Option<String>,
}

impl Attribute {
    pub fn new(party_id: PartyId, attribute_type: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            party_id,
            attribute_type: attribute_type.into(),
            value,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Keyed for Attribute {
    type Key = AttributeId;

    fn key(&self) -> Self::Key {
        AttributeId::new(self.party_id, &self.attribute_type)
    }
}

/// Declares a typed, dated party entry keyed by party and type code
macro_rules! dated_entry {
    ($(#[$meta:meta])* $name:ident, $key:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
        pub struct $name {
            pub party_id: PartyId,
            #[validate(length(min = 1, max = 30))]
            pub $field: String,
            pub effective_from: Option<NaiveDate>,
            pub effective_to: Option<NaiveDate>,
        }

        impl $name {
            pub fn new(party_id: PartyId, $field: impl Into<String>) -> Self {
                Self {
                    party_id,
                    $field: $field.into(),
                    effective_from: None,
                    effective_to: None,
                }
            }

            pub fn effective_between(
                mut self,
                effective_from: Option<NaiveDate>,
                effective_to: Option<NaiveDate>,
            ) -> Self {
                self.effective_from = effective_from;
                self.effective_to = effective_to;
                self
            }

            /// Whether the entry applies on `date`; open bounds are unbounded
            pub fn is_effective_on(&self, date: NaiveDate) -> bool {
                self.effective_from.map_or(true, |from| from <= date)
                    && self.effective_to.map_or(true, |to| date <= to)
            }
        }

        impl Keyed for $name {
            type Key = $key;

            fn key(&self) -> Self::Key {
                $key::new(self.party_id, &self.$field)
            }
        }
    };
}

dated_entry!(
    /// A role a party plays, such as employee or policyholder
    Role, RoleId, role_type
);
dated_entry!(
    /// A lock suspending processing for a party
    Lock, LockId, lock_type
);
dated_entry!(Status, StatusId, status_type);

/// A source of the party's funds, with an optional share in percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SourceOfFunds {
    pub party_id: PartyId,
    #[validate(length(min = 1, max = 30))]
    pub source_of_funds_type: String,
    #[validate(range(min = 1, max = 100))]
    pub percentage: Option<i32>,
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

impl SourceOfFunds {
    pub fn new(party_id: PartyId, source_of_funds_type: impl Into<String>) -> Self {
        Self {
            party_id,
            source_of_funds_type: source_of_funds_type.into(),
            percentage: None,
            description: None,
        }
    }
}

impl Keyed for SourceOfFunds {
    type Key = SourceOfFundsId;

    fn key(&self) -> Self::Key {
        SourceOfFundsId::new(self.party_id, &self.source_of_funds_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_attribute_value_text() {
        assert_eq!(AttributeValue::Decimal(dec!(182.50)).as_text(), "182.50");
        assert_eq!(
            AttributeValue::Date(NaiveDate::from_ymd_opt(1985, 6, 1).unwrap()).as_text(),
            "1985-06-01"
        );
        assert_eq!(AttributeValue::Integer(7).value_type(), ValueType::Integer);
    }

    #[test]
    fn test_attribute_value_serde_is_tagged() {
        let json = serde_json::to_value(AttributeValue::Boolean(true)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "boolean", "value": true}));
    }

    #[test]
    fn test_role_effective_window() {
        let role = Role::new(PartyId::new(), "employee").effective_between(
            NaiveDate::from_ymd_opt(2020, 1, 1),
            NaiveDate::from_ymd_opt(2020, 12, 31),
        );
        assert!(role.is_effective_on(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()));
        assert!(!role.is_effective_on(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()));
        assert!(Role::new(PartyId::new(), "employee")
            .is_effective_on(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()));
    }
}
