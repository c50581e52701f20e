//! Composite natural keys
//!
//! Sub-entities owned by a party or mandate are identified by the owner's id
//! plus one to three discriminating fields, never by a surrogate id. Keys
//! are immutable values: equality and hashing are structural over every
//! field, and optional fields compare `None == None`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{MandateId, PartyId};

use crate::codes::ConstraintType;

/// Identity of a localized reference-data row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceKey {
    pub code: String,
    pub locale_id: String,
}

impl ReferenceKey {
    pub fn new(code: impl Into<String>, locale_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            locale_id: locale_id.into(),
        }
    }
}

/// Identity of a contact mechanism: one mechanism per role per party
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactMechanismId {
    pub party_id: PartyId,
    pub role: String,
}

impl ContactMechanismId {
    pub fn new(party_id: PartyId, role: impl Into<String>) -> Self {
        Self {
            party_id,
            role: role.into(),
        }
    }
}

/// Identity of a physical address: one address per role per party
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalAddressId {
    pub party_id: PartyId,
    pub role: String,
}

impl PhysicalAddressId {
    pub fn new(party_id: PartyId, role: impl Into<String>) -> Self {
        Self {
            party_id,
            role: role.into(),
        }
    }
}

/// Identity of a tax number
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxNumberId {
    pub party_id: PartyId,
    pub tax_number_type: String,
    pub country_of_issue: String,
}

impl TaxNumberId {
    pub fn new(
        party_id: PartyId,
        tax_number_type: impl Into<String>,
        country_of_issue: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            tax_number_type: tax_number_type.into(),
            country_of_issue: country_of_issue.into(),
        }
    }
}

/// Identity of an identity document
///
/// The issue date is optional; two documents of the same type and country
/// without an issue date share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityDocumentId {
    pub party_id: PartyId,
    pub document_type: String,
    pub country_of_issue: String,
    pub date_of_issue: Option<NaiveDate>,
}

impl IdentityDocumentId {
    pub fn new(
        party_id: PartyId,
        document_type: impl Into<String>,
        country_of_issue: impl Into<String>,
        date_of_issue: Option<NaiveDate>,
    ) -> Self {
        Self {
            party_id,
            document_type: document_type.into(),
            country_of_issue: country_of_issue.into(),
            date_of_issue,
        }
    }
}

macro_rules! party_type_key {
    ($(#[$meta:meta])* $name:ident, $field:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            pub party_id: PartyId,
            pub $field: String,
        }

        impl $name {
            pub fn new(party_id: PartyId, $field: impl Into<String>) -> Self {
                Self {
                    party_id,
                    $field: $field.into(),
                }
            }
        }
    };
}

party_type_key!(
    /// Identity of an external reference: one per reference type per party
    ExternalReferenceId, reference_type
);
party_type_key!(
    /// Identity of a source of funds
    SourceOfFundsId, source_of_funds_type
);
party_type_key!(
    /// Identity of a preference
    PreferenceId, preference_type
);
party_type_key!(
    /// Identity of an attribute
    AttributeId, attribute_type
);
party_type_key!(
    /// Identity of a role held by a party
    RoleId, role_type
);
party_type_key!(
    /// Identity of a lock placed on a party
    LockId, lock_type
);
party_type_key!(
    /// Identity of a status assigned to a party
    StatusId, status_type
);

/// Identity of a mandatary: a party may hold several roles under one mandate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MandataryId {
    pub mandate_id: MandateId,
    pub party_id: PartyId,
    pub role: String,
}

impl MandataryId {
    pub fn new(mandate_id: MandateId, party_id: PartyId, role: impl Into<String>) -> Self {
        Self {
            mandate_id,
            party_id,
            role: role.into(),
        }
    }
}

/// Identity of a constraint on an attribute for parties holding a role
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleTypeAttributeConstraintId {
    pub role_type: String,
    pub attribute_type: String,
    pub constraint_type: ConstraintType,
}

impl RoleTypeAttributeConstraintId {
    pub fn new(
        role_type: impl Into<String>,
        attribute_type: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> Self {
        Self {
            role_type: role_type.into(),
            attribute_type: attribute_type.into(),
            constraint_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_keys_hash_equal() {
        let party_id = PartyId::new();
        let a = TaxNumberId::new(party_id, "za_income_tax_number", "ZA");
        let b = TaxNumberId::new(party_id, "za_income_tax_number", "ZA");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_keys_differ_on_any_field() {
        let party_id = PartyId::new();
        let base = TaxNumberId::new(party_id, "za_income_tax_number", "ZA");
        assert_ne!(base, TaxNumberId::new(PartyId::new(), "za_income_tax_number", "ZA"));
        assert_ne!(base, TaxNumberId::new(party_id, "za_vat_number", "ZA"));
        assert_ne!(base, TaxNumberId::new(party_id, "za_income_tax_number", "GB"));
    }

    #[test]
    fn test_optional_fields_are_null_tolerant() {
        let party_id = PartyId::new();
        let a = IdentityDocumentId::new(party_id, "za_id_card", "ZA", None);
        let b = IdentityDocumentId::new(party_id, "za_id_card", "ZA", None);
        let c = IdentityDocumentId::new(
            party_id,
            "za_id_card",
            "ZA",
            NaiveDate::from_ymd_opt(2012, 5, 1),
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_mandatary_roles_are_distinct_keys() {
        let mandate_id = MandateId::new();
        let party_id = PartyId::new();
        assert_ne!(
            MandataryId::new(mandate_id, party_id, "signatory"),
            MandataryId::new(mandate_id, party_id, "approver"),
        );
    }

    #[test]
    fn test_constraint_key_includes_constraint_type() {
        let a = RoleTypeAttributeConstraintId::new("employee", "height", ConstraintType::Required);
        let b = RoleTypeAttributeConstraintId::new("employee", "height", ConstraintType::MaxSize);
        assert_ne!(a, b);
    }
}
