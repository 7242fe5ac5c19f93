//! get / getMany / delete, shared by every resource

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::fields::default_fields;
use super::Context;
use crate::error::{Error, Result};
use crate::pagination::{
    NextPage, PageNumberPaginator, PaginationState, Paginator, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::search::{construct_search_body, fields_from_filters, search, search_first, SearchBody};
use crate::types::{JsonObject, JsonValue, Method, Resource};

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    pub id: String,
    #[serde(default)]
    pub filters: JsonObject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetManyParams {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub filters: JsonObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteParams {
    pub id: String,
}

/// Fresh record id (UUIDv7 in Shopware's hex form)
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Ids must be given
pub fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        Err(Error::operation("The 'id' parameter is required"))
    } else {
        Ok(id)
    }
}

/// Error for an update or look-up of a record that is not there
pub fn does_not_exist(resource: Resource, id: &str) -> Error {
    Error::operation_with_description(
        format!("{} does not exist", resource.label()),
        format!("There is no {} with id {id}", resource.entity()),
    )
}

/// Fetch one record by id
pub async fn fetch_by_id<S: AsRef<str>>(
    ctx: &Context<'_>,
    resource: Resource,
    fields: &[S],
    id: &str,
) -> Result<Option<JsonValue>> {
    let body = SearchBody::new(resource.entity(), fields).equals("id", id);
    search_first(ctx.transport, resource.entity(), &body).await
}

/// Fetch one record by id, failing when it does not exist
pub async fn require_by_id<S: AsRef<str>>(
    ctx: &Context<'_>,
    resource: Resource,
    fields: &[S],
    id: &str,
) -> Result<JsonValue> {
    fetch_by_id(ctx, resource, fields, id)
        .await?
        .ok_or_else(|| does_not_exist(resource, id))
}

/// Records matching an id, restricted to `filters.fields` when set
pub async fn get(ctx: &Context<'_>, resource: Resource, params: GetParams) -> Result<Vec<JsonValue>> {
    let id = require_id(&params.id)?;
    let fields = fields_from_filters(&params.filters, default_fields(resource));
    let body = SearchBody::new(resource.entity(), &fields).equals("id", id);
    search(ctx.transport, resource.entity(), &body).await
}

/// Search with the resource's filter table, one page or all of them
pub async fn get_many(
    ctx: &Context<'_>,
    resource: Resource,
    params: GetManyParams,
) -> Result<Vec<JsonValue>> {
    let paginator = if params.return_all {
        PageNumberPaginator::all()
    } else {
        if params.limit == 0 || params.limit > MAX_PAGE_SIZE {
            return Err(Error::operation_with_description(
                "Invalid limit",
                format!("Limit must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        PageNumberPaginator::limited(params.limit)
    };
    let fields = fields_from_filters(&params.filters, default_fields(resource));

    let mut state = PaginationState::new();
    let mut page = paginator.initial_page(&mut state);
    let mut records = Vec::new();

    loop {
        let body = construct_search_body(page, &fields, resource, &params.filters)?;
        let batch = search(ctx.transport, resource.entity(), &body).await?;
        debug!(resource = %resource, page = page.page, count = batch.len(), "Fetched page");

        let next = paginator.process_response(batch.len(), &mut state);
        records.extend(batch);
        match next {
            NextPage::Continue { page: next_page } => page = next_page,
            NextPage::Done => break,
        }
    }

    info!(resource = %resource, total = state.total_fetched, "getMany complete");
    Ok(records)
}

/// Delete a record by id
pub async fn delete(ctx: &Context<'_>, resource: Resource, params: DeleteParams) -> Result<JsonValue> {
    let id = require_id(&params.id)?;
    let endpoint = format!("/{}/{id}", resource.entity());
    ctx.transport
        .api_request(Method::DELETE, &endpoint, JsonValue::Null, &[])
        .await?;

    info!(resource = %resource, id, "Deleted");
    Ok(json!({
        "success": true,
        "id": id,
        "message": format!("{} {id} deleted successfully", resource.label()),
    }))
}

/// Drop unset values from a request body: `""`, `null` and empty arrays,
/// recursively through nested objects and arrays
pub fn prune(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            map.retain(|_, v| !is_unset(v));
            for v in map.values_mut() {
                prune(v);
            }
            map.retain(|_, v| !is_unset(v));
        }
        JsonValue::Array(items) => items.iter_mut().for_each(prune),
        _ => {}
    }
}

fn is_unset(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        _ => false,
    }
}
