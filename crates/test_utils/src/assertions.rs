//! Custom Test Assertions
//!
//! Provides assertion helpers for pages, reference orderings and port
//! errors that give more meaningful failure messages than `assert!`.

use std::fmt::Debug;

use core_kernel::{Page, PortError};
use domain_party::reference::{ReferenceData, SortIndexOrder};
use domain_party::PartyError;

/// Asserts the shape of a page: its item count, total and page count
///
/// # Panics
///
/// Panics if any of the three differ from what is expected
pub fn assert_page<T: Debug>(page: &Page<T>, items: usize, total: u64) {
    assert_eq!(
        page.items.len(),
        items,
        "Expected {} items on page {}, got {:?}",
        items,
        page.page_index,
        page.items
    );
    assert_eq!(page.total, total, "Expected total {}, got {}", total, page.total);

    let expected_pages = if total == 0 {
        0
    } else {
        total.div_ceil(u64::from(page.page_size.max(1)))
    };
    assert_eq!(page.total_pages(), expected_pages, "Page count mismatch for total {}", total);
}

/// Asserts that a page lists exactly `expected`, in order, by some key
pub fn assert_page_keys<T, K, F>(page: &Page<T>, key: F, expected: &[K])
where
    K: PartialEq + Debug,
    F: Fn(&T) -> K,
{
    let actual: Vec<K> = page.items.iter().map(key).collect();
    assert_eq!(actual.as_slice(), expected, "Page items out of order");
}

/// Asserts that reference rows are ordered by locale, then sort index in
/// the given direction with missing indexes last, then name
///
/// Comparison is by byte order, matching the `COLLATE "C"` the
/// PostgreSQL adapter orders with.
pub fn assert_reference_order<T: ReferenceData + Debug>(rows: &[T], order: SortIndexOrder) {
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordering = a
            .locale_id()
            .cmp(b.locale_id())
            .then_with(|| order.compare(a.sort_index(), b.sort_index()))
            .then_with(|| a.name().cmp(b.name()));
        assert!(
            ordering.is_le(),
            "Reference rows out of {:?} order: {:?} before {:?}",
            order,
            a,
            b
        );
    }
}

/// Asserts a port result failed with `NotFound`
pub fn assert_not_found<T: Debug>(result: Result<T, PortError>) {
    match result {
        Err(error) if error.is_not_found() => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

/// Asserts a port result failed with `Conflict`
pub fn assert_conflict<T: Debug>(result: Result<T, PortError>) {
    match result {
        Err(error) if error.is_conflict() => {}
        other => panic!("Expected Conflict, got {:?}", other),
    }
}

/// Asserts a service result failed validation and that some error message
/// contains `fragment`
pub fn assert_validation_error<T: Debug>(result: Result<T, PartyError>, fragment: &str) {
    match result {
        Err(PartyError::ValidationFailed(errors)) => assert!(
            errors.contains(fragment),
            "No validation error mentions {:?}: {}",
            fragment,
            errors
        ),
        other => panic!("Expected ValidationFailed, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PageRequest;
    use domain_party::reference::Gender;

    fn gender(locale: &str, sort_index: Option<i32>, name: &str) -> Gender {
        Gender {
            code: name.to_lowercase(),
            locale_id: locale.to_string(),
            sort_index,
            name: name.to_string(),
            description: name.to_string(),
        }
    }

    #[test]
    fn test_assert_page() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(0, 2));
        assert_page(&page, 2, 5);
        assert_page_keys(&page, |n| *n, &[1, 2]);
    }

    #[test]
    fn test_reference_order_descending() {
        let rows = vec![
            gender("af-ZA", Some(1), "Vroulik"),
            gender("en-US", Some(2), "Male"),
            gender("en-US", Some(1), "Female"),
            gender("en-US", None, "Other"),
        ];
        assert_reference_order(&rows, SortIndexOrder::Descending);
    }

    #[test]
    #[should_panic(expected = "out of")]
    fn test_reference_order_detects_missing_index_first() {
        let rows = vec![gender("en-US", None, "Other"), gender("en-US", Some(1), "Female")];
        assert_reference_order(&rows, SortIndexOrder::Ascending);
    }

    #[test]
    fn test_assert_not_found() {
        assert_not_found::<()>(Err(PortError::not_found("Organization", "ORG-1")));
    }
}
