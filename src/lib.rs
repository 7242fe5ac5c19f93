// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Shopware Node
//!
//! A workflow node for the Shopware 6 Admin API: create, read, update and
//! delete customers, products, orders and categories.
//!
//! ## Features
//!
//! - **OAuth2 client credentials**: tokens cached and refreshed per shop
//! - **Typed operations**: every input item is parsed into typed parameters
//!   before any request is sent
//! - **Order pricing**: line items, shipping costs, taxes and totals are
//!   calculated locally and written with the order
//! - **Dropdown loaders**: currencies, tax rates, states and the other option
//!   lists the editor needs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shopware_node::{config::load_config, http::ShopwareClient, node::ShopwareNode, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = load_config("shopware.yaml")?;
//!     let node = ShopwareNode::new(ShopwareClient::new(&config)?);
//!
//!     let rows = node
//!         .execute("customer", "get", &[json!({ "id": "0190f3a2c4e07b5e9d3f8a1b2c3d4e5f" })])
//!         .await?;
//!     for row in rows {
//!         println!("{}", row.json);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          ShopwareNode                           │
//! │      execute(resource, operation, items) → Vec<ExecutionItem>   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Resources│  Lookups  │    Pricing    │  Search   │   Options   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Customer │ Currency  │ Line items    │ Criteria  │ Currencies  │
//! │ Product  │ Tax rate  │ Shipping      │ Filters   │ Tax rates   │
//! │ Order    │ Customer  │ Cart totals   │ Pages     │ States      │
//! │ Category │ States    │ Delivery dates│           │ ...         │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//!                                │
//!                 Transport (OAuth2 + reqwest, /api)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the node
pub mod error;

/// Common types and type aliases
pub mod types;

/// OAuth2 client credentials authentication
pub mod auth;

/// HTTP client and the Admin API transport
pub mod http;

/// Page number pagination for getMany
pub mod pagination;

/// Search criteria and filter tables
pub mod search;

/// Price and delivery date calculation
pub mod pricing;

/// Remote look-ups used while building payloads
pub mod lookups;

/// Resource operations
pub mod resources;

/// Dropdown loaders
pub mod load_options;

/// Command routing and item execution
pub mod node;

/// Node description for the host editor
pub mod description;

/// Configuration and credentials
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use node::{Command, ShopwareNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
