//! Page arithmetic for ordered result sets.

/// Results per page.
pub const PAGE_SIZE: usize = 10;
/// Hard cap on pageable pages; results ranked past `PAGE_SIZE * MAX_PAGES`
/// are never returned.
pub const MAX_PAGES: usize = 10;

/// Number of pages for a candidate set of `n` results, after the cap.
pub fn total_pages(n: usize) -> usize {
    n.min(PAGE_SIZE * MAX_PAGES).div_ceil(PAGE_SIZE)
}

/// Slice one page out of an ordered set.
///
/// Pages past the end of the set, or past the page cap, come back empty
/// rather than erroring.
pub fn page_slice<T: Clone>(items: &[T], page_number: usize) -> Vec<T> {
    if page_number >= MAX_PAGES {
        return Vec::new();
    }
    let capped = &items[..items.len().min(PAGE_SIZE * MAX_PAGES)];
    let start = page_number * PAGE_SIZE;
    if start >= capped.len() {
        return Vec::new();
    }
    let end = (start + PAGE_SIZE).min(capped.len());
    capped[start..end].to_vec()
}
