//! Mandates
//!
//! A mandate grants one or more parties (the mandataries) authority to act,
//! for example as signatories on behalf of an organization. Each mandatary
//! is identified by `(mandate_id, party_id, role)`, so a party may hold
//! several roles under the same mandate.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{MandateId, PartyId, TenantId};

use crate::codes::RequiredMandataries;
use crate::collection::{Keyed, KeyedSet};
use crate::keys::MandataryId;

/// A party granted authority under a mandate in a given role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandatary {
    pub mandate_id: MandateId,
    pub party_id: PartyId,
    /// Code from the mandatary role catalogue
    pub role: String,
}

impl Keyed for Mandatary {
    type Key = MandataryId;

    fn key(&self) -> Self::Key {
        MandataryId::new(self.mandate_id, self.party_id, &self.role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Mandate {
    pub id: MandateId,
    pub tenant_id: TenantId,
    /// Code from the mandate type catalogue
    #[validate(length(min = 1, max = 30))]
    pub mandate_type: String,
    pub required_mandataries: RequiredMandataries,
    #[serde(default)]
    pub mandataries: KeyedSet<Mandatary>,
    pub effective_from: Option<NaiveDate>,
    pub effective_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mandate {
    pub fn new(
        tenant_id: TenantId,
        mandate_type: impl Into<String>,
        required_mandataries: RequiredMandataries,
    ) -> Self {
        Self::with_id(MandateId::new_v7(), tenant_id, mandate_type, required_mandataries)
    }

    pub fn with_id(
        id: MandateId,
        tenant_id: TenantId,
        mandate_type: impl Into<String>,
        required_mandataries: RequiredMandataries,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            tenant_id,
            mandate_type: mandate_type.into(),
            required_mandataries,
            mandataries: KeyedSet::new(),
            effective_from: None,
            effective_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Grants `party_id` the given role; returns false if it already held it
    pub fn add_mandatary(&mut self, party_id: PartyId, role: impl Into<String>) -> bool {
        let replaced = self.mandataries.upsert(Mandatary {
            mandate_id: self.id,
            party_id,
            role: role.into(),
        });
        self.updated_at = Utc::now();
        replaced.is_none()
    }

    pub fn remove_mandatary(&mut self, party_id: PartyId, role: &str) -> Option<Mandatary> {
        let removed = self.mandataries.remove(&MandataryId::new(self.id, party_id, role));
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Whether `party_id` holds any role under this mandate
    pub fn has_mandatary(&self, party_id: PartyId) -> bool {
        self.mandataries.iter().any(|m| m.party_id == party_id)
    }

    /// The distinct parties holding a role under this mandate
    pub fn mandatary_party_ids(&self) -> BTreeSet<PartyId> {
        self.mandataries.iter().map(|m| m.party_id).collect()
    }

    /// Whether the parties in `acting` together satisfy the mandate's rule
    ///
    /// Parties that are not mandataries are ignored.
    pub fn is_authorized(&self, acting: &[PartyId]) -> bool {
        let mandataries = self.mandatary_party_ids();
        let acting: BTreeSet<_> = acting
            .iter()
            .filter(|party_id| mandataries.contains(*party_id))
            .collect();
        self.required_mandataries
            .is_satisfied(acting.len(), mandataries.len())
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
    fn test_party_may_hold_several_roles() {
        let mut mandate = Mandate::new(TenantId::new(), "banking", RequiredMandataries::Any);
        let party_id = PartyId::new();
        assert!(mandate.add_mandatary(party_id, "signatory"));
        assert!(mandate.add_mandatary(party_id, "approver"));
        assert!(!mandate.add_mandatary(party_id, "signatory"));

        assert_eq!(mandate.mandataries.len(), 2);
        assert_eq!(mandate.mandatary_party_ids().len(), 1);
        assert!(mandate.has_mandatary(party_id));
    }

    #[test]
    fn test_is_authorized_at_least_two() {
        let mut mandate = Mandate::new(TenantId::new(), "banking", RequiredMandataries::AtLeastTwo);
        let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
        for party_id in [a, b, c] {
            mandate.add_mandatary(party_id, "signatory");
        }

        assert!(!mandate.is_authorized(&[a]));
        assert!(!mandate.is_authorized(&[a, a]));
        assert!(!mandate.is_authorized(&[a, PartyId::new()]));
        assert!(mandate.is_authorized(&[a, c]));
    }

    #[test]
    fn test_remove_mandatary() {
        let mut mandate = Mandate::new(TenantId::new(), "banking", RequiredMandataries::All);
        let party_id = PartyId::new();
        mandate.add_mandatary(party_id, "signatory");
        assert!(mandate.remove_mandatary(party_id, "approver").is_none());
        assert!(mandate.remove_mandatary(party_id, "signatory").is_some());
        assert!(!mandate.has_mandatary(party_id));
    }
}
