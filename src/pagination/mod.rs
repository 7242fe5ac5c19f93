//! Pagination module
//!
//! # Overview
//!
//! Admin API searches are paged with `page` and `limit` in the request body.
//! The paginator plans those coordinates and decides, from the size of each
//! returned page, whether another request is needed.

mod strategies;
mod types;

pub use strategies::PageNumberPaginator;
pub use types::{
    NextPage, PageRequest, PaginationState, Paginator, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

#[cfg(test)]
mod tests;
