//! Per-resource filter tables
//!
//! The host sends getMany filters as a flat object of UI names
//! (`createdAtMax`, `minPriceUi`, ...). Each resource has a table mapping
//! those names onto criteria filters.

use super::types::{SearchBody, SearchFilter};
use crate::error::{Error, Result};
use crate::pagination::PageRequest;
use crate::types::{JsonObject, JsonValue, Resource};

/// Filter key carrying the comma-separated field subset; never a criteria filter
pub const FIELDS_KEY: &str = "fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Equals(&'static str),
    /// Comma-separated ids to an `equalsAny` on `id`
    Ids,
    Gte(&'static str),
    Lte(&'static str),
    Lt(&'static str),
    /// `{ price: { currency, minPrice } }` to a gross price lower bound
    MinPrice,
    /// `{ price: { currency, maxPrice } }` to a gross price upper bound
    MaxPrice,
}

const ORDER_FILTERS: &[(&str, Rule)] = &[
    ("createdAtMax", Rule::Lte("orderDateTime")),
    ("createdAtMin", Rule::Gte("orderDateTime")),
    ("currency", Rule::Equals("currency.name")),
    (
        "deliveryState",
        Rule::Equals("deliveries.stateMachineState.technicalName"),
    ),
    ("ids", Rule::Ids),
    ("maxShippingTotal", Rule::Lte("shippingTotal")),
    ("maxTotal", Rule::Lte("amountTotal")),
    ("minShippingTotal", Rule::Gte("shippingTotal")),
    ("minTotal", Rule::Gte("amountTotal")),
    ("orderNumber", Rule::Equals("orderNumber")),
    ("salesChannel", Rule::Equals("salesChannelId")),
    ("state", Rule::Equals("stateMachineState.technicalName")),
    (
        "transactionState",
        Rule::Equals("transactions.stateMachineState.technicalName"),
    ),
];

const CUSTOMER_FILTERS: &[(&str, Rule)] = &[
    ("accountType", Rule::Equals("accountType")),
    ("birthday", Rule::Equals("birthday")),
    ("createdAtMax", Rule::Lte("createdAt")),
    ("createdAtMin", Rule::Gte("createdAt")),
    ("createdBy", Rule::Equals("createdById")),
    ("customerNumber", Rule::Equals("customerNumber")),
    ("defaultPaymentMethod", Rule::Equals("defaultPaymentMethodId")),
    ("email", Rule::Equals("email")),
    ("firstLoginAfter", Rule::Gte("firstLogin")),
    ("firstLoginBefore", Rule::Lte("firstLogin")),
    ("firstName", Rule::Equals("firstName")),
    ("group", Rule::Equals("groupId")),
    ("guest", Rule::Equals("guest")),
    ("ids", Rule::Ids),
    ("language", Rule::Equals("languageId")),
    ("lastLoginAfter", Rule::Gte("lastLogin")),
    ("lastLoginBefore", Rule::Lte("lastLogin")),
    ("lastName", Rule::Equals("lastName")),
    ("lastOrderDate", Rule::Lt("lastOrderDate")),
    ("maxOrderCount", Rule::Lte("orderCount")),
    ("maxOrderTotalAmount", Rule::Lte("orderTotalAmount")),
    ("maxReviews", Rule::Lte("reviewCount")),
    ("minOrderCount", Rule::Gte("orderCount")),
    ("minOrderTotalAmount", Rule::Gte("orderTotalAmount")),
    ("minReviews", Rule::Gte("reviewCount")),
    ("salesChannel", Rule::Equals("salesChannelId")),
];

const PRODUCT_FILTERS: &[(&str, Rule)] = &[
    ("active", Rule::Equals("active")),
    ("available", Rule::Equals("available")),
    ("createdAtMax", Rule::Lte("createdAt")),
    ("createdAtMin", Rule::Gte("createdAt")),
    ("ean", Rule::Equals("ean")),
    ("ids", Rule::Ids),
    ("manufacturer", Rule::Equals("manufacturerId")),
    ("maxPriceUi", Rule::MaxPrice),
    ("maxSales", Rule::Lte("sales")),
    ("maxStock", Rule::Lte("stock")),
    ("minPriceUi", Rule::MinPrice),
    ("minSales", Rule::Gte("sales")),
    ("minStock", Rule::Gte("stock")),
    ("name", Rule::Equals("name")),
    ("parentId", Rule::Equals("parentId")),
    ("productNumber", Rule::Equals("productNumber")),
    ("purchaseSteps", Rule::Equals("purchaseSteps")),
    ("tax", Rule::Equals("taxId")),
];

const CATEGORY_FILTERS: &[(&str, Rule)] = &[
    ("active", Rule::Equals("active")),
    ("childCountMax", Rule::Lte("childCount")),
    ("childCountMin", Rule::Gte("childCount")),
    ("createdAtMax", Rule::Lte("createdAt")),
    ("createdAtMin", Rule::Gte("createdAt")),
    ("ids", Rule::Ids),
    ("name", Rule::Equals("name")),
    ("parentId", Rule::Equals("parentId")),
];

fn table(resource: Resource) -> &'static [(&'static str, Rule)] {
    match resource {
        Resource::Customer => CUSTOMER_FILTERS,
        Resource::Product => PRODUCT_FILTERS,
        Resource::Order => ORDER_FILTERS,
        Resource::Category => CATEGORY_FILTERS,
    }
}

/// Filter names accepted for a resource
pub fn filter_names(resource: Resource) -> Vec<&'static str> {
    table(resource).iter().map(|(name, _)| *name).collect()
}

/// Translate one UI filter into a criteria filter
pub fn filter_for(resource: Resource, name: &str, value: &JsonValue) -> Result<SearchFilter> {
    let rule = table(resource)
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, rule)| *rule)
        .ok_or_else(|| {
            Error::operation_with_description(
                format!("Unknown filter '{name}' for resource {resource}"),
                format!("Supported filters: {}", filter_names(resource).join(", ")),
            )
        })?;

    Ok(match rule {
        Rule::Equals(field) => SearchFilter::equals(field, value.clone()),
        Rule::Ids => SearchFilter::equals_any("id", split_ids(value)),
        Rule::Gte(field) => SearchFilter::gte(field, value.clone()),
        Rule::Lte(field) => SearchFilter::lte(field, value.clone()),
        Rule::Lt(field) => SearchFilter::lt(field, value.clone()),
        Rule::MinPrice => {
            let (currency, bound) = price_bound(name, value, "minPrice")?;
            SearchFilter::gte(format!("price.{currency}.gross"), bound)
        }
        Rule::MaxPrice => {
            let (currency, bound) = price_bound(name, value, "maxPrice")?;
            SearchFilter::lte(format!("price.{currency}.gross"), bound)
        }
    })
}

fn split_ids(value: &JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::trim).map(String::from))
            .filter(|id| !id.is_empty())
            .collect(),
        JsonValue::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Read `{ price: { currency, <bound> } }`; the inner object is also accepted bare
fn price_bound(name: &str, value: &JsonValue, bound: &str) -> Result<(String, JsonValue)> {
    let price = value.get("price").unwrap_or(value);
    let currency = price
        .get("currency")
        .and_then(JsonValue::as_str)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::operation(format!("Filter '{name}' requires a currency")))?;
    let amount = price
        .get(bound)
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or_else(|| Error::operation(format!("Filter '{name}' requires {bound}")))?;
    Ok((currency.to_string(), amount))
}

/// Blank filter values mean "not set"
fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Build the criteria filters for a getMany call, skipping the field subset
pub fn build_filters(resource: Resource, filters: &JsonObject) -> Result<Vec<SearchFilter>> {
    filters
        .iter()
        .filter(|(key, value)| key.as_str() != FIELDS_KEY && !is_blank(value))
        .map(|(key, value)| filter_for(resource, key, value))
        .collect()
}

/// Parse a comma-separated field list, falling back to the defaults when empty
pub fn parse_fields(raw: Option<&str>, defaults: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();

    if parsed.is_empty() {
        defaults.iter().map(|f| (*f).to_string()).collect()
    } else {
        parsed
    }
}

/// Field subset from a filters object (`filters.fields`)
pub fn fields_from_filters(filters: &JsonObject, defaults: &[&str]) -> Vec<String> {
    parse_fields(
        filters.get(FIELDS_KEY).and_then(JsonValue::as_str),
        defaults,
    )
}

/// Search body for one getMany page.
///
/// `filter` is always present, empty when no filter is set.
pub fn construct_search_body(
    page: PageRequest,
    fields: &[String],
    resource: Resource,
    filters: &JsonObject,
) -> Result<SearchBody> {
    let criteria = build_filters(resource, filters)?;
    Ok(SearchBody::new(resource.entity(), fields)
        .page(page)
        .filters(criteria))
}
