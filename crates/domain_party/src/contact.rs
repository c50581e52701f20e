//! Contact mechanisms

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PartyId;

use crate::collection::Keyed;
use crate::keys::ContactMechanismId;

/// A way of contacting a party, such as a mobile number or email address
///
/// A party holds at most one contact mechanism per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactMechanism {
    pub party_id: PartyId,
    /// Code from the contact mechanism type catalogue
    #[validate(length(min = 1, max = 30))]
    pub contact_mechanism_type: String,
    /// Code from the contact mechanism role catalogue
    #[validate(length(min = 1, max = 30))]
    pub role: String,
    #[validate(length(min = 1, max = 4000))]
    pub value: String,
}

impl ContactMechanism {
    pub fn new(
        party_id: PartyId,
        contact_mechanism_type: impl Into<String>,
        role: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            contact_mechanism_type: contact_mechanism_type.into(),
            role: role.into(),
            value: value.into(),
        }
    }
}

impl Keyed for ContactMechanism {
    type Key = ContactMechanismId;

    fn key(&self) -> Self::Key {
        ContactMechanismId::new(self.party_id, &self.role)
    }
}
