//! Repository implementations for the party aggregates
//!
//! Repositories own the SQL. They speak in row types keyed by raw `Uuid`s
//! and leave the mapping to domain types to the adapters.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Every aggregate query is scoped by `tenant_id`
//! - Writes that touch several tables run in one transaction
//! - Listings return one page plus the total row count

pub mod association;
pub mod mandate;
pub mod organization;
pub mod party;
pub mod person;
pub mod reference;
pub mod snapshot;

pub use association::AssociationRepository;
pub use mandate::MandateRepository;
pub use organization::OrganizationRepository;
pub use party::PartyRepository;
pub use person::PersonRepository;
pub use reference::ReferenceDataRepository;
pub use snapshot::SnapshotRepository;

use core_kernel::PageRequest;

/// Builds an `ILIKE` pattern matching names that contain `filter`
///
/// `%`, `_` and the escape character itself match literally.
pub(crate) fn contains_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LIMIT` and `OFFSET` bind values for a page
pub(crate) fn limit_offset(page: &PageRequest) -> (i64, i64) {
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("acme"), "%acme%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(limit_offset(&PageRequest::new(0, 20)), (20, 0));
        assert_eq!(limit_offset(&PageRequest::new(3, 25)), (25, 75));
    }
}
