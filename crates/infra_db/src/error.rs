//! Database error types
//!
//! This module defines the error types that can occur during database operations,
//! and their translation into the `PortError` the domain layer sees.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
///
/// This enum captures all possible database-related errors, including
/// connection issues, query failures, and constraint violations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation, or an id owned by another tenant
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped to its domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Organization", "PTY-123");
    /// assert!(error.to_string().contains("Organization"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Creates a duplicate entry error
    pub fn duplicate(entity: &str, field: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!(
            "{} with {} '{}' already exists",
            entity, field, value
        ))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

/// Maps a PostgreSQL error code to a DatabaseError variant
///
/// See <https://www.postgresql.org/docs/current/errcodes-appendix.html>
fn from_pg_code(code: &str, message: String) -> DatabaseError {
    match code {
        "23505" => DatabaseError::DuplicateEntry(message),
        "23503" => DatabaseError::ForeignKeyViolation(message),
        "23514" | "23502" | "22001" => DatabaseError::ConstraintViolation(message),
        "40001" | "40P01" => DatabaseError::TransactionFailed(message),
        code if code.starts_with("08") => DatabaseError::ConnectionFailed(message),
        _ => DatabaseError::QueryFailed(message),
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// This function analyzes the SQLx error and maps it to the appropriate
/// DatabaseError variant based on the PostgreSQL error code.
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::SerializationError(error.to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => from_pg_code(code.as_ref(), db_err.message().to_string()),
                None => DatabaseError::QueryFailed(db_err.message().to_string()),
            },
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(&error)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::SerializationError(error.to_string())
    }
}

/// Translates database errors into the port error the domain sees
///
/// - `NotFound` -> `PortError::NotFound`
/// - `DuplicateEntry` -> `PortError::Conflict`
/// - Foreign key and check violations -> `PortError::Validation`
/// - Connection failures -> `PortError::Connection`
/// - `SerializationError` -> `PortError::Transformation`
/// - Other errors -> `PortError::Internal`
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(message) => PortError::not_found("record", message),
            DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
            DatabaseError::ForeignKeyViolation(message) | DatabaseError::ConstraintViolation(message) => {
                PortError::validation(message)
            }
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::Timeout {
                operation: "acquire connection".to_string(),
                duration_ms: 0,
            },
            DatabaseError::SerializationError(message) => PortError::Transformation { message },
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_codes_map_to_variants() {
        assert!(matches!(
            from_pg_code("23505", "dup".into()),
            DatabaseError::DuplicateEntry(_)
        ));
        assert!(matches!(
            from_pg_code("23503", "fk".into()),
            DatabaseError::ForeignKeyViolation(_)
        ));
        assert!(matches!(
            from_pg_code("08006", "lost".into()),
            DatabaseError::ConnectionFailed(_)
        ));
        assert!(matches!(
            from_pg_code("42P01", "missing table".into()),
            DatabaseError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_duplicate_becomes_conflict() {
        let error: PortError = DatabaseError::duplicate("Organization", "id", "PTY-1").into();
        assert!(error.is_conflict());
    }

    #[test]
    fn test_connection_errors_are_transient() {
        let error: PortError = DatabaseError::ConnectionFailed("refused".into()).into();
        assert!(error.is_transient());
        let error: PortError = DatabaseError::PoolExhausted.into();
        assert!(error.is_transient());
    }

    #[test]
    fn test_row_not_found() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(error.is_not_found());
    }
}
