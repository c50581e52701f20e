//! Entity snapshots
//!
//! A snapshot is an append-only record of an entity's state at a point in
//! time. Snapshots are never updated or deleted; the history of an entity
//! is read back in timestamp order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{SnapshotId, TenantId};

use crate::codes::EntityType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub tenant_id: TenantId,
    pub entity_type: EntityType,
    /// Raw id of the recorded entity, whatever its id type
    pub entity_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl Snapshot {
    pub fn new(
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: SnapshotId::new_v7(),
            tenant_id,
            entity_type,
            entity_id,
            timestamp: Utc::now(),
            data,
        }
    }

    /// Captures the serialized state of `entity`
    pub fn capture<T: Serialize>(
        tenant_id: TenantId,
        entity_type: EntityType,
        entity_id: Uuid,
        entity: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(tenant_id, entity_type, entity_id, serde_json::to_value(entity)?))
    }

    /// Deserializes the recorded state
    pub fn restore<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::Organization;

    #[test]
    fn test_capture_and_restore() {
        let organization = Organization::new(TenantId::new(), "Acme");
        let snapshot = Snapshot::capture(
            organization.tenant_id,
            EntityType::Organization,
            *organization.id.as_uuid(),
            &organization,
        )
        .unwrap();

        assert_eq!(snapshot.entity_type, EntityType::Organization);
        let restored: Organization = snapshot.restore().unwrap();
        assert_eq!(restored, organization);
    }
}
