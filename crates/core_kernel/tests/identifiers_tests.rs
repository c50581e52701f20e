//! Unit tests for the identifier newtypes
//!
//! Tests cover creation, parsing, conversion and display formatting.

use std::collections::HashSet;

use core_kernel::{TenantId, PartyId, MandateId, AssociationId, SnapshotId};
use uuid::Uuid;

mod party_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = PartyId::new();
        let id2 = PartyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = PartyId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = PartyId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = PartyId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(PartyId::prefix(), "PTY");
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = PartyId::new();
        let parsed: PartyId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("PTY-not-a-uuid".parse::<PartyId>().is_err());
    }

    #[test]
    fn test_json_serialization_is_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = PartyId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
        let back: PartyId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

mod prefixes {
    use super::*;

    #[test]
    fn test_all_prefixes_are_distinct() {
        let prefixes: HashSet<&str> = [
            TenantId::prefix(),
            PartyId::prefix(),
            MandateId::prefix(),
            AssociationId::prefix(),
            SnapshotId::prefix(),
        ]
        .into_iter()
        .collect();
        assert_eq!(prefixes.len(), 5);
    }

    #[test]
    fn test_display_uses_prefix() {
        assert!(TenantId::new().to_string().starts_with("TNT-"));
        assert!(MandateId::new().to_string().starts_with("MND-"));
        assert!(AssociationId::new().to_string().starts_with("ASC-"));
        assert!(SnapshotId::new().to_string().starts_with("SNP-"));
    }

    #[test]
    fn test_hash_set_usage() {
        let tenant = TenantId::new();
        let mut set = HashSet::new();
        set.insert(tenant);
        set.insert(tenant);
        assert_eq!(set.len(), 1);
    }
}
