//! Domain Adapters
//!
//! This module provides adapter implementations for the party domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements one or more of the domain's port traits
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresPartyAdapter;
//! use domain_party::ports::OrganizationPort;
//! use std::sync::Arc;
//!
//! let port: Arc<dyn OrganizationPort> = Arc::new(PostgresPartyAdapter::new(pool));
//! let organization = port.find_by_tenant_and_id(tenant_id, party_id).await?;
//! ```

pub mod association;
pub mod mandate;
pub mod party;
pub mod reference;
pub mod snapshot;

pub use association::PostgresAssociationAdapter;
pub use mandate::PostgresMandateAdapter;
pub use party::PostgresPartyAdapter;
pub use reference::PostgresReferenceDataAdapter;
pub use snapshot::PostgresSnapshotAdapter;

use std::fmt::Display;
use std::time::Instant;

use sqlx::PgPool;

use core_kernel::{HealthCheckResult, PortError};

/// Checks database connectivity with `SELECT 1`
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {}", e)),
    }
}

/// Wraps a failure to map a stored value onto its domain type
pub(crate) fn transformation(error: impl Display) -> PortError {
    PortError::Transformation {
        message: error.to_string(),
    }
}
