// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Page size the remote user listing paginates with.
pub const USERS_PAGE_SIZE: usize = 5;

/// Neighbor links of one result page. `total` is a page count and is absent
/// when the backing query cannot cheaply count the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<u32>,
    pub current: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
}

/// The remote API's envelope around paged listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageLinks,
}

impl<T> Paginated<T> {
    /// Slices one page out of a fully materialized result set, producing the
    /// same envelope the remote API wraps around paged listings. Pages are
    /// 1-based; a requested page past the end yields an empty slice rather
    /// than an error.
    #[must_use]
    pub fn from_page(items: Vec<T>, page: u32, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = items.len().div_ceil(page_size) as u32;
        let start = (page as usize - 1) * page_size;
        let data: Vec<T> = items.into_iter().skip(start).take(page_size).collect();

        let prev = (page > 1).then(|| {
            if total_pages > 0 {
                (page - 1).min(total_pages)
            } else {
                page - 1
            }
        });
        let next = if total_pages > 0 {
            (page < total_pages).then(|| page + 1)
        } else {
            (data.len() == page_size).then(|| page + 1)
        };
        Self {
            data,
            pagination: PageLinks {
                prev,
                current: page,
                next,
                total: (total_pages > 0).then_some(total_pages),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page_links_both_ways() {
        let page = Paginated::from_page((0..12).collect::<Vec<_>>(), 2, 5);
        assert_eq!(page.data, vec![5, 6, 7, 8, 9]);
        assert_eq!(page.pagination.prev, Some(1));
        assert_eq!(page.pagination.current, 2);
        assert_eq!(page.pagination.next, Some(3));
        assert_eq!(page.pagination.total, Some(3));
    }

    #[test]
    fn first_and_last_pages_drop_dangling_links() {
        let first = Paginated::from_page((0..12).collect::<Vec<_>>(), 1, 5);
        assert_eq!(first.pagination.prev, None);
        assert_eq!(first.pagination.next, Some(2));

        let last = Paginated::from_page((0..12).collect::<Vec<_>>(), 3, 5);
        assert_eq!(last.data, vec![10, 11]);
        assert_eq!(last.pagination.next, None);
    }

    #[test]
    fn page_zero_is_treated_as_page_one() {
        let page = Paginated::from_page(vec![1, 2, 3], 0, 5);
        assert_eq!(page.pagination.current, 1);
        assert_eq!(page.data, vec![1, 2, 3]);
    }

    #[test]
    fn page_past_the_end_is_empty_with_clamped_prev() {
        let page = Paginated::from_page((0..4).collect::<Vec<_>>(), 9, 5);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.prev, Some(1));
        assert_eq!(page.pagination.current, 9);
        assert_eq!(page.pagination.next, None);
    }

    #[test]
    fn empty_set_has_no_total() {
        let page = Paginated::from_page(Vec::<i32>::new(), 1, 5);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, None);
        assert_eq!(page.pagination.next, None);
    }
}
