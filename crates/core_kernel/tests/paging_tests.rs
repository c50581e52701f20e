//! Property tests for paging

use core_kernel::{Page, PageRequest, SortDirection};
use proptest::prelude::*;

proptest! {
    #[test]
    fn pages_partition_the_input(len in 0usize..200, page_size in 1u32..50) {
        let items: Vec<usize> = (0..len).collect();
        let pages = (len as u64).div_ceil(u64::from(page_size)).max(1);
        let mut seen = Vec::new();
        for index in 0..pages {
            let page = PageRequest::new(index as u32, page_size).paginate(items.clone());
            prop_assert_eq!(page.total, len as u64);
            prop_assert!(page.items.len() <= page_size as usize);
            seen.extend(page.items);
        }
        prop_assert_eq!(seen, items);
    }

    #[test]
    fn clamped_page_size_never_exceeds_max(size in 0u32..10_000, max in 1u32..500) {
        let request = PageRequest::new(0, size).clamped(max);
        prop_assert!(request.page_size >= 1);
        prop_assert!(request.page_size <= max);
    }
}

#[test]
fn test_page_map_keeps_paging() {
    let page = Page::new(vec![1, 2], 7, PageRequest::new(2, 2)).map(|n| n * 10);
    assert_eq!(page.items, vec![10, 20]);
    assert_eq!(page.total, 7);
    assert_eq!(page.page_index, 2);
    assert_eq!(page.total_pages(), 4);
}

#[test]
fn test_sort_direction_sql() {
    assert_eq!(SortDirection::Ascending.as_sql(), "ASC");
    assert_eq!(SortDirection::Descending.as_sql(), "DESC");
    let request = PageRequest::default().with_sort_direction(SortDirection::Descending);
    assert_eq!(request.sort_direction, SortDirection::Descending);
}
