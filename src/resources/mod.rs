//! Resource operations
//!
//! One module per Admin API resource. Handlers take typed parameters for a
//! single input item and return the JSON records produced for it; the node
//! wraps them into output rows.

pub mod category;
pub mod common;
pub mod customer;
pub mod fields;
pub mod order;
pub mod params;
pub mod product;

use tokio::sync::OnceCell;

use crate::error::Result;
use crate::http::Transport;
use crate::lookups;

/// State shared by the items of one execution
pub struct Context<'a> {
    pub transport: &'a dyn Transport,
    default_currency: OnceCell<String>,
}

impl<'a> Context<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            default_currency: OnceCell::new(),
        }
    }

    /// Default currency id, looked up once per execution
    pub async fn default_currency_id(&self) -> Result<&str> {
        self.default_currency
            .get_or_try_init(|| lookups::default_currency_id(self.transport))
            .await
            .map(String::as_str)
    }
}
