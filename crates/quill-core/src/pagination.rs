//! Page requests, result pages and the page-link window shown under a list.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 50;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::Validation("Page numbers start at 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(DomainError::Validation(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Build from optional query parameters, falling back to the first page.
    pub fn from_query(page: Option<u32>, page_size: Option<u32>) -> Result<Self, DomainError> {
        Self::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn first() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of results plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Slice a full, already ordered collection.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total_count = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self::new(items, total_count, request)
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }
}

/// `ceil(total / page_size)`; zero when there is nothing to show.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// An entry in the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    /// Pages were skipped between the neighbouring links.
    Gap,
}

/// Page links to show for `current` out of `total_pages`.
///
/// Always includes the first and last page plus a three-page window around
/// `current`; the window slides inward at either end. Returns nothing when
/// there is at most one page.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageLink> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);

    let mut start = current.saturating_sub(1).max(1);
    let mut end = (current + 1).min(total_pages);
    if current == 1 {
        end = total_pages.min(3);
    }
    if current == total_pages {
        start = total_pages.saturating_sub(2).max(1);
    }

    let mut pages: Vec<u32> = (start..=end).collect();
    pages.push(1);
    pages.push(total_pages);
    pages.sort_unstable();
    pages.dedup();

    let mut links = Vec::with_capacity(pages.len() * 2);
    let mut previous: Option<u32> = None;
    for page in pages {
        if previous.is_some_and(|p| page != p + 1) {
            links.push(PageLink::Gap);
        }
        links.push(PageLink::Page(page));
        previous = Some(page);
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    use PageLink::{Gap, Page as P};

    #[test]
    fn test_total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(13, 5), 3);
        assert_eq!(total_pages(16, 5), 4);
    }

    #[test]
    fn test_first_page_of_twelve() {
        assert_eq!(page_window(1, total_pages(12, 5)), vec![P(1), P(2), P(3)]);
    }

    #[test]
    fn test_window_in_the_middle_has_gaps() {
        assert_eq!(
            page_window(5, 10),
            vec![P(1), Gap, P(4), P(5), P(6), Gap, P(10)]
        );
    }

    #[test]
    fn test_window_slides_at_the_edges() {
        assert_eq!(page_window(10, 10), vec![P(1), Gap, P(8), P(9), P(10)]);
        assert_eq!(page_window(1, 10), vec![P(1), P(2), P(3), Gap, P(10)]);
        assert_eq!(page_window(2, 10), vec![P(1), P(2), P(3), Gap, P(10)]);
    }

    #[test]
    fn test_no_links_for_single_page() {
        assert!(page_window(1, 1).is_empty());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        assert_eq!(page_window(99, 3), vec![P(1), P(2), P(3)]);
    }

    #[test]
    fn test_page_request_bounds() {
        assert!(PageRequest::new(0, 5).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());

        let req = PageRequest::new(3, 5).unwrap();
        assert_eq!(req.offset(), 10);
        assert_eq!(req.limit(), 5);
    }

    #[test]
    fn test_page_from_all_never_exceeds_page_size() {
        let all: Vec<u32> = (0..12).collect();
        for page in 1..=4 {
            let req = PageRequest::new(page, 5).unwrap();
            let result = Page::from_all(all.clone(), req);
            assert!(result.items.len() <= 5);
            assert_eq!(result.total_count, 12);
            assert_eq!(result.total_pages(), 3);
        }
        let last = Page::from_all(all, PageRequest::new(3, 5).unwrap());
        assert_eq!(last.items, vec![10, 11]);
    }
}
