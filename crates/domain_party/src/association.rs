//! Associations between two parties

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AssociationId, PartyId, TenantId};

/// A typed relationship between two parties, such as employer and employee
///
/// The relationship is directed: the association type describes the first
/// party's relation to the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Association {
    pub id: AssociationId,
    pub tenant_id: TenantId,
    /// Code from the association type catalogue
    #[validate(length(min = 1, max = 30))]
    pub association_type: String,
    pub first_party_id: PartyId,
    pub second_party_id: PartyId,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Association {
    pub fn new(
        tenant_id: TenantId,
        association_type: impl Into<String>,
        first_party_id: PartyId,
        second_party_id: PartyId,
    ) -> Self {
        Self::with_id(
            AssociationId::new_v7(),
            tenant_id,
            association_type,
            first_party_id,
            second_party_id,
        )
    }

    pub fn with_id(
        id: AssociationId,
        tenant_id: TenantId,
        association_type: impl Into<String>,
        first_party_id: PartyId,
        second_party_id: PartyId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            association_type: association_type.into(),
            first_party_id,
            second_party_id,
            effective_from: None,
            effective_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `party_id` is on either side of the association
    pub fn involves(&self, party_id: PartyId) -> bool {
        self.first_party_id == party_id || self.second_party_id == party_id
    }

    /// The party on the other side from `party_id`
    pub fn counterparty(&self, party_id: PartyId) -> Option<PartyId> {
        if self.first_party_id == party_id {
            Some(self.second_party_id)
        } else if self.second_party_id == party_id {
            Some(self.first_party_id)
        } else {
            None
        }
    }

    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.effective_from.map_or(true, |from| from <= date)
            && self.effective_to.map_or(true, |to| date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_either_side() {
        let (p1, p2) = (PartyId::new(), PartyId::new());
        let association = Association::new(TenantId::new(), "employment", p1, p2);

        assert!(association.involves(p1));
        assert!(association.involves(p2));
        assert!(!association.involves(PartyId::new()));
        assert_eq!(association.counterparty(p1), Some(p2));
        assert_eq!(association.counterparty(p2), Some(p1));
        assert_eq!(association.counterparty(PartyId::new()), None);
    }
}
