//! Page slicing over an ordered result set.

use crate::document::ResultItem;

/// One page of results plus the size of the full set it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<ResultItem>,
    pub total: usize,
}

/// Slice `items` to page `page` (1-based) of size `limit`.
///
/// `total` is always the unpaginated count. Pages past the end are empty
/// rather than an error; `page` and `limit` of zero are treated as one.
pub fn paginate(items: Vec<ResultItem>, page: usize, limit: usize) -> Page {
    let total = items.len();
    let page = page.max(1);
    let limit = limit.max(1);

    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);

    let items = items.into_iter().skip(start).take(end - start).collect();
    Page { items, total }
}
