//! Strongly-typed identifiers for party domain entities
//!
//! Every aggregate is addressed by a UUID, and every aggregate lookup is
//! scoped by a [`TenantId`]. Newtype wrappers keep a tenant id from being
//! passed where a party id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Isolation boundary
define_id!(TenantId, "TNT");

// Aggregates
define_id!(PartyId, "PTY");
define_id!(MandateId, "MND");
define_id!(AssociationId, "ASC");

// History
define_id!(SnapshotId, "SNP");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_id_display() {
        let id = PartyId::new();
        assert!(id.to_string().starts_with("PTY-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = TenantId::new();
        let parsed: TenantId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_id_parsing_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: MandateId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let party_id = PartyId::from(uuid);
        let back: Uuid = party_id.into();
        assert_eq!(uuid, back);
    }
}
