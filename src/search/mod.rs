//! Search module
//!
//! Builds Admin API search criteria and runs them.
//!
//! # Overview
//!
//! - `SearchBody` / `SearchFilter`: the `POST /search/{entity}` request body
//! - filter tables translating getMany UI filters into criteria
//! - `search` / `search_first`: run a body and unwrap the `data` array

mod filters;
mod types;

pub use filters::{
    build_filters, construct_search_body, fields_from_filters, filter_for, filter_names,
    parse_fields, FIELDS_KEY,
};
pub use types::{RangeParameters, SearchBody, SearchFilter, SortField, SortOrder};

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::{JsonValue, Method};
use tracing::debug;

/// Run a search and return the `data` records
pub async fn search(
    transport: &dyn Transport,
    entity: &str,
    body: &SearchBody,
) -> Result<Vec<JsonValue>> {
    let endpoint = format!("/search/{entity}");
    debug!(entity, "Searching");
    let response = transport
        .api_request(Method::POST, &endpoint, body.to_value()?, &[])
        .await?;

    match response.get("data") {
        Some(JsonValue::Array(records)) => Ok(records.clone()),
        Some(JsonValue::Null) | None => Ok(Vec::new()),
        Some(other) => Err(Error::decode(format!(
            "Expected an array in search response for {entity}, got {other}"
        ))),
    }
}

/// Run a search and return the first record, if any
pub async fn search_first(
    transport: &dyn Transport,
    entity: &str,
    body: &SearchBody,
) -> Result<Option<JsonValue>> {
    Ok(search(transport, entity, body).await?.into_iter().next())
}
