//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! party test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built reference catalogues and fixed test values
//! - `builders`: Builder patterns for party aggregates
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for pages, orderings and port errors
//! - `generators`: Property-based test data generators
//! - `logging`: Tracing subscriber for test output

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;
pub mod logging;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::init_test_tracing;
