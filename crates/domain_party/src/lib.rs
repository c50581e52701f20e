//! Party Domain
//!
//! Organizations and persons (collectively parties), the mandates that let
//! parties act for one another, associations between parties, and the
//! locale-scoped reference catalogues that give their codes meaning.
//!
//! # Identity
//!
//! Aggregates carry generated identifiers scoped to a tenant. Their
//! sub-entities (contact mechanisms, addresses, documents, roles...) are
//! identified by natural composite keys from [`keys`] and held in a
//! [`KeyedSet`], where adding an entity with an existing key replaces it.
//!
//! # Reference data
//!
//! Catalogue rows are read through [`ReferenceDataPort`] and always come back
//! ordered by locale, then sort index, then name. Locale filtering ignores
//! case and an unknown locale yields no rows.
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::TenantId;
//! use domain_party::contact::ContactMechanism;
//! use domain_party::party::Organization;
//!
//! let mut organization = Organization::new(TenantId::new(), "Acme Holdings");
//! let id = organization.id;
//!
//! organization.add_contact_mechanism(ContactMechanism::new(id, "email", "work", "info@acme.example"));
//! organization.add_contact_mechanism(ContactMechanism::new(id, "email", "work", "sales@acme.example"));
//!
//! // Same (party, role) key, so the second replaces the first
//! assert_eq!(organization.contact_mechanisms.len(), 1);
//! assert_eq!(organization.contact_mechanism("work").unwrap().value, "sales@acme.example");
//! ```

pub mod address;
pub mod association;
pub mod codes;
pub mod collection;
pub mod config;
pub mod contact;
pub mod document;
pub mod error;
pub mod keys;
pub mod mandate;
pub mod party;
pub mod ports;
pub mod profile;
pub mod reference;
pub mod services;
pub mod snapshot;
pub mod validation;

pub use association::Association;
pub use codes::{
    ConstraintType, EntityType, MeasurementSystem, MeasurementUnitType, PartyType,
    RequiredMandataries, ValueType,
};
pub use collection::{Keyed, KeyedSet};
pub use config::PartyConfig;
pub use error::PartyError;
pub use mandate::{Mandatary, Mandate};
pub use party::{Organization, Party, PartyAggregate, Person};
pub use ports::{
    AssociationPort, MandatePort, OrganizationPort, PartyPort, PersonPort, ReferenceDataPort,
    ReferenceDataPortExt, SnapshotPort,
};
pub use reference::{Catalogue, ReferenceData, ReferenceRecord, SortIndexOrder};
pub use services::{PartyPorts, PartyService, ReferenceDataService};
pub use snapshot::Snapshot;
pub use validation::{PartyValidator, ValidationResult};
