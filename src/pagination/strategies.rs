//! Pagination strategy implementations

use super::types::{NextPage, PageRequest, PaginationState, Paginator, DEFAULT_PAGE_SIZE};

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination over the Admin API search endpoint.
///
/// The search API reports no reliable "has more" marker, so a page holding
/// exactly `page_size` records is taken to mean another page may follow. A
/// short page ends the iteration. Without `return_all` only one page is read.
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Records per page
    pub page_size: u32,
    /// Keep reading full pages
    pub return_all: bool,
}

impl PageNumberPaginator {
    /// Create a new page number paginator starting at page 1
    pub fn new(page_size: u32, return_all: bool) -> Self {
        Self {
            page_size,
            return_all,
        }
    }

    /// Paginator reading every record with the default page size
    pub fn all() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, true)
    }

    /// Paginator reading a single page of `limit` records
    pub fn limited(limit: u32) -> Self {
        Self::new(limit, false)
    }
}

impl Paginator for PageNumberPaginator {
    fn initial_page(&self, state: &mut PaginationState) -> PageRequest {
        if state.page == 0 {
            state.page = 1;
        }
        PageRequest::new(state.page, self.page_size)
    }

    fn process_response(&self, records_count: usize, state: &mut PaginationState) -> NextPage {
        state.add_fetched(records_count as u64);

        if !self.return_all || records_count != self.page_size as usize {
            state.mark_done();
            return NextPage::Done;
        }

        state.next_page();
        NextPage::Continue {
            page: PageRequest::new(state.page, self.page_size),
        }
    }
}
