//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by search requests.

use serde::{Deserialize, Serialize};

/// Page size used when the caller asks for every record
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest `limit` the node accepts
pub const MAX_PAGE_SIZE: u32 = 500;

/// Page coordinates sent in a search body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Records per page
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// First page with the default page size
    pub fn first() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Result of the next page computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available
    Continue {
        /// Page to request next
        page: PageRequest,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Current page number (0 until the first request is planned)
    pub page: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Page coordinates for the first request
    fn initial_page(&self, state: &mut PaginationState) -> PageRequest;

    /// Process a response and determine if there's a next page
    fn process_response(&self, records_count: usize, state: &mut PaginationState) -> NextPage;
}
