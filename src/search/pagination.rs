//! Pagination over a filtered view.

use serde::Serialize;

/// One page of a filtered view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

/// Number of pages for `total_items`. Never less than one.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Clamp a requested page into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size))
}

/// Slice `records` into the requested page. Out-of-range pages clamp.
pub fn paginate<T>(records: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = records.len();
    let current_page = clamp_page(page, total_items, page_size);
    let items = records
        .into_iter()
        .skip((current_page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        current_page,
        total_pages: total_pages(total_items, page_size),
        total_items,
        page_size,
    }
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_one_page() {
        let page = paginate(Vec::<u32>::new(), 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for n in 0..40usize {
            for p in 1..12usize {
                let expected = std::cmp::max(1, (n + p - 1) / p);
                assert_eq!(total_pages(n, p), expected, "n={} p={}", n, p);
            }
        }
    }

    #[test]
    fn test_pages_concatenate_to_input() {
        let data: Vec<u32> = (0..23).collect();
        for p in 1..9usize {
            let pages = total_pages(data.len(), p);
            let joined: Vec<u32> = (1..=pages)
                .flat_map(|n| paginate(data.clone(), n, p).items)
                .collect();
            assert_eq!(joined, data, "page size {}", p);
        }
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let data: Vec<u32> = (0..25).collect();
        let last = paginate(data.clone(), 99, 10);
        assert_eq!(last.current_page, 3);
        assert_eq!(last.items, vec![20, 21, 22, 23, 24]);

        let first = paginate(data, 0, 10);
        assert_eq!(first.current_page, 1);
        assert_eq!(first.items.len(), 10);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let page = paginate(vec![1, 2, 3], 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![2]);
        assert_eq!(page.total_pages, 3);
    }
}
