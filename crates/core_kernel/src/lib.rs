//! Core Kernel - Foundational types for the party domain
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure crates:
//! - Strongly-typed identifiers, including the tenant isolation boundary
//! - Closed code enumerations with explicit code tables
//! - Locale identifiers for localized reference data
//! - Paging primitives
//! - Port error and health-check abstractions

pub mod codes;
pub mod error;
pub mod identifiers;
pub mod locale;
pub mod paging;
pub mod ports;

pub use codes::{CodeEnum, NumericCodeEnum, InvalidCodeError};
pub use error::CoreError;
pub use identifiers::{TenantId, PartyId, MandateId, AssociationId, SnapshotId};
pub use locale::{LocaleId, InvalidLocaleError, locale_matches};
pub use paging::{Page, PageRequest, SortDirection};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
};

#[doc(hidden)]
pub use serde as __serde;
