//! Ports shared by the party repositories
//!
//! `domain_party` declares one port trait per aggregate and for reference
//! data. `infra_db` implements them over PostgreSQL and the `mock` feature
//! of `domain_party` implements them in memory. Both report failures as
//! [`PortError`] so the service layer never sees adapter-specific errors.
//!
//! ```text
//!                PartyService
//!                     │
//!     OrganizationPort, MandatePort, ReferenceDataPort, ...
//!          ▲                                  ▲
//!   Postgres adapters (infra_db)     in-memory store (mock)
//! ```

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::InvalidCodeError;

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// Failure reported by a repository port
#[derive(Debug, Error)]
pub enum PortError {
    /// No row exists for the tenant and key
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },

    /// The store rejected the data
    #[error("Invalid data: {message}")]
    Validation { message: String },

    /// The key is already taken, by another tenant or another party type
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Store unavailable: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// A stored value no longer maps onto a domain type, such as an unknown code
    #[error("Cannot map stored value: {message}")]
    Transformation { message: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Retrying may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<InvalidCodeError> for PortError {
    fn from(error: InvalidCodeError) -> Self {
        Self::Transformation {
            message: error.to_string(),
        }
    }
}

/// Implemented by every repository port so adapters can sit behind `Arc<dyn _>`
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Outcome of probing one adapter's backing store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self::with_status(adapter_id, AdapterHealth::Healthy, latency_ms, None)
    }

    pub fn unhealthy(adapter_id: impl Into<String>, latency_ms: u64, message: impl Into<String>) -> Self {
        Self::with_status(adapter_id, AdapterHealth::Unhealthy, latency_ms, Some(message.into()))
    }

    fn with_status(
        adapter_id: impl Into<String>,
        status: AdapterHealth,
        latency_ms: u64,
        message: Option<String>,
    ) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let error = PortError::not_found("Organization", "123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "Organization 123 not found");
    }

    #[test]
    fn test_transient_errors() {
        let timeout = PortError::Timeout {
            operation: "find_organization".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());
        assert!(PortError::connection("refused").is_transient());
        assert!(!PortError::conflict("party id taken").is_transient());
    }

    #[test]
    fn test_invalid_code_maps_to_transformation() {
        let error: PortError = InvalidCodeError::new("party type", "robot").into();
        assert!(matches!(error, PortError::Transformation { .. }));
        assert!(error.to_string().contains("robot"));
    }

    #[test]
    fn test_unhealthy_carries_message() {
        let result = HealthCheckResult::unhealthy("postgres", 12, "down");
        assert_eq!(result.status, AdapterHealth::Unhealthy);
        assert_eq!(result.message.as_deref(), Some("down"));
    }
}
