//! Infrastructure Database Layer
//!
//! This crate provides PostgreSQL persistence for the party domain using
//! SQLx: repositories that own the SQL, adapters that implement the domain
//! ports on top of them, and the connection pool with its migrations.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer:
//!
//! - [`repositories`]: tenant-scoped SQL over row types
//! - [`adapters`]: `domain_party` port implementations mapping rows to
//!   aggregates and `DatabaseError` to `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresPartyAdapter;
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let parties = PostgresPartyAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{
    PostgresAssociationAdapter, PostgresMandateAdapter, PostgresPartyAdapter,
    PostgresReferenceDataAdapter, PostgresSnapshotAdapter,
};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
