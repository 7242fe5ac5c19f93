//! HTTP client module
//!
//! Provides the authenticated HTTP client and the [`Transport`] seam the
//! operation handlers are written against.
//!
//! # Features
//!
//! - **Authentication**: OAuth2 client credentials through the auth module
//! - **Transport trait**: handlers take `&dyn Transport`, so tests can swap in fakes
//! - **Error classification**: non-2xx responses become `Error::HttpStatus`

mod client;
mod transport;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use transport::{has_body, ShopwareClient, Transport};

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
