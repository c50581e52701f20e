//! Party domain errors
//!
//! Not-found and duplicate outcomes are business-rule errors: expected,
//! recoverable results that a caller inspects and translates (for example
//! to HTTP 404 / 409). They carry the tenant and entity identifiers and do
//! not invalidate the caller's unit of work. See
//! [`PartyError::is_business_rule`].

use thiserror::Error;

use core_kernel::{AssociationId, InvalidCodeError, MandateId, PartyId, PortError, TenantId};

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    #[error("Party {party_id} not found for tenant {tenant_id}")]
    PartyNotFound { tenant_id: TenantId, party_id: PartyId },

    #[error("Organization {organization_id} not found for tenant {tenant_id}")]
    OrganizationNotFound {
        tenant_id: TenantId,
        organization_id: PartyId,
    },

    #[error("Person {person_id} not found for tenant {tenant_id}")]
    PersonNotFound { tenant_id: TenantId, person_id: PartyId },

    #[error("Mandate {mandate_id} not found for tenant {tenant_id}")]
    MandateNotFound {
        tenant_id: TenantId,
        mandate_id: MandateId,
    },

    #[error("Association {association_id} not found for tenant {tenant_id}")]
    AssociationNotFound {
        tenant_id: TenantId,
        association_id: AssociationId,
    },

    #[error("Organization {organization_id} already exists for tenant {tenant_id}")]
    DuplicateOrganization {
        tenant_id: TenantId,
        organization_id: PartyId,
    },

    #[error("Person {person_id} already exists for tenant {tenant_id}")]
    DuplicatePerson { tenant_id: TenantId, person_id: PartyId },

    #[error("Mandate {mandate_id} already exists for tenant {tenant_id}")]
    DuplicateMandate {
        tenant_id: TenantId,
        mandate_id: MandateId,
    },

    #[error("Association {association_id} already exists for tenant {tenant_id}")]
    DuplicateAssociation {
        tenant_id: TenantId,
        association_id: AssociationId,
    },

    /// An enumeration code outside its closed set; a data-integrity fault
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),

    #[error("Party validation failed: {0}")]
    ValidationFailed(String),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl PartyError {
    /// Creates a ValidationFailed error from validation errors
    pub fn validation_failed(errors: Vec<String>) -> Self {
        PartyError::ValidationFailed(errors.join("; "))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PartyError::PartyNotFound { .. }
                | PartyError::OrganizationNotFound { .. }
                | PartyError::PersonNotFound { .. }
                | PartyError::MandateNotFound { .. }
                | PartyError::AssociationNotFound { .. }
        )
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            PartyError::DuplicateOrganization { .. }
                | PartyError::DuplicatePerson { .. }
                | PartyError::DuplicateMandate { .. }
                | PartyError::DuplicateAssociation { .. }
        )
    }

    /// Whether this is an expected business outcome rather than a fault
    ///
    /// Business-rule errors leave the surrounding unit of work committable.
    pub fn is_business_rule(&self) -> bool {
        self.is_not_found() || self.is_duplicate()
    }
}
