//! Page arithmetic. Pages are 1-based.

use std::ops::Range;

/// Number of pages needed for `len` items; zero for an empty list
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Index range of page `n`; empty for page 0
pub fn page_range(n: usize, page_size: usize) -> Range<usize> {
    if n == 0 {
        return 0..0;
    }
    let start = (n - 1) * page_size;
    start..start + page_size
}

/// Clamp a page number into `[1, page_count]`, or 1 when there are no pages
pub fn clamp_page(n: usize, page_count: usize) -> usize {
    n.clamp(1, page_count.max(1))
}

/// One page of a filtered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// 1-based page number
    pub number: usize,
    pub page_count: usize,
    /// Length of the whole filtered view
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.page_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Take page `n` from an iterator of `total` items
pub fn paginate<T>(
    items: impl Iterator<Item = T>,
    total: usize,
    n: usize,
    page_size: usize,
) -> Page<T> {
    let range = page_range(n, page_size);
    Page {
        number: n,
        page_count: page_count(total, page_size),
        total,
        items: items.skip(range.start).take(range.len()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(18, 9), 2);
        assert_eq!(page_count(19, 9), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(5, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn test_pages_cover_every_item_once() {
        for page_size in [9usize, 10] {
            for len in 0..40usize {
                let pages = page_count(len, page_size);
                let mut seen = Vec::new();
                for n in 1..=pages {
                    let page = paginate(0..len, len, n, page_size);
                    assert!(!page.is_empty());
                    seen.extend(page.items);
                }
                assert_eq!(seen, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = paginate(0..5, 5, 2, 10);
        assert!(page.is_empty());
        assert!(paginate(0..5, 5, 0, 10).is_empty());
    }

    #[test]
    fn test_previous_next_flags() {
        let page = paginate(0..25, 25, 2, 10);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());

        let last = paginate(0..25, 25, 3, 10);
        assert!(!last.has_next());
        assert_eq!(last.items.len(), 5);
    }
}
