//! Remote look-ups
//!
//! Each look-up is a single search request resolving something an operation
//! needs before it can build its payload: currencies, tax rates, customers,
//! product prices, shipping methods and state machine states.

mod types;

pub use types::{
    AddressRecord, CustomerRecord, LineItemData, MachineState, PriceContext, PriceEntry,
    ShippingMethodData, SYSTEM_LANGUAGE_ID,
};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::resources::fields::{LINE_ITEM_FIELDS, ORDER_ADDRESS_FIELDS, ORDER_CUSTOMER_FIELDS};
use crate::search::{search_first, SearchBody, SortOrder};
use crate::types::JsonValue;
use types::{
    ProductRecord, SalesChannelRecord, ShippingMethodRecord, StateMachineRecord, TaxRecord,
};

/// Order states in which the order has not been paid yet
const PRE_PAYMENT_STATES: &[&str] = &["open", "in_progress"];

fn decode<T: DeserializeOwned>(entity: &str, record: JsonValue) -> Result<T> {
    serde_json::from_value(record)
        .map_err(|e| Error::decode(format!("Unexpected {entity} record: {e}")))
}

fn not_found(label: &str, key: &str, value: &str) -> Error {
    Error::operation_with_description(
        format!("{label} does not exist"),
        format!("There is no {} with {key} {value}", label.to_lowercase()),
    )
}

/// Id of the shop's default currency (the one with factor 1)
pub async fn default_currency_id(transport: &dyn Transport) -> Result<String> {
    let body = SearchBody::new("currency", &["id"]).equals("factor", 1).limit(1);
    let record = search_first(transport, "currency", &body)
        .await?
        .ok_or_else(|| Error::operation("Default currency does not exist"))?;

    record
        .get("id")
        .and_then(JsonValue::as_str)
        .map(String::from)
        .ok_or_else(|| Error::decode("Currency record without id"))
}

/// Current tax rate of a product
pub async fn product_tax_rate(transport: &dyn Transport, product_id: &str) -> Result<Decimal> {
    let body = SearchBody::default()
        .include("product", &["id", "tax"])
        .include("tax", &["taxRate"])
        .association("tax", JsonValue::Null)
        .equals("id", product_id);
    let record = search_first(transport, "product", &body)
        .await?
        .ok_or_else(|| not_found("Product", "id", product_id))?;

    let product: ProductRecord = decode("product", record)?;
    product
        .tax
        .map(|t| t.tax_rate)
        .ok_or_else(|| Error::decode(format!("Product {product_id} has no tax")))
}

/// Rate of the first tax by position
pub async fn default_tax_rate(transport: &dyn Transport) -> Result<Decimal> {
    let body = SearchBody::new("tax", &["taxRate"])
        .sort("position", SortOrder::Asc)
        .limit(1);
    let record = search_first(transport, "tax", &body)
        .await?
        .ok_or_else(|| Error::operation("No tax rate is configured"))?;

    Ok(decode::<TaxRecord>("tax", record)?.tax_rate)
}

/// Registered customer with their default addresses
pub async fn customer_by_number(
    transport: &dyn Transport,
    customer_number: &str,
) -> Result<CustomerRecord> {
    let mut customer_fields: Vec<&str> = ORDER_CUSTOMER_FIELDS.to_vec();
    customer_fields.extend(["customerNumber", "defaultBillingAddress", "defaultShippingAddress"]);

    let body = SearchBody::default()
        .include("customer", &customer_fields)
        .include("customer_address", ORDER_ADDRESS_FIELDS)
        .association("defaultBillingAddress", JsonValue::Null)
        .association("defaultShippingAddress", JsonValue::Null)
        .equals("customerNumber", customer_number);
    let record = search_first(transport, "customer", &body)
        .await?
        .ok_or_else(|| not_found("Customer", "number", customer_number))?;

    decode("customer", record)
}

/// Product behind a line item, priced in the order currency
pub async fn line_item_data(
    transport: &dyn Transport,
    product_number: &str,
    prices: &PriceContext,
) -> Result<LineItemData> {
    let mut product_fields: Vec<&str> = LINE_ITEM_FIELDS.to_vec();
    product_fields.push("tax");

    let body = SearchBody::default()
        .include("product", &product_fields)
        .include("tax", &["taxRate"])
        .association("tax", JsonValue::Null)
        .equals("productNumber", product_number);
    debug!(product_number, "Resolving line item");
    let record = search_first(transport, "product", &body)
        .await?
        .ok_or_else(|| not_found("Product", "number", product_number))?;

    let product: ProductRecord = decode("product", record)?;
    let unit_price = product
        .price
        .as_deref()
        .and_then(|p| prices.net_price(p))
        .ok_or_else(|| {
            Error::operation_with_description(
                "Missing product price",
                format!(
                    "Product {product_number} has no price in currency {}",
                    prices.currency_id
                ),
            )
        })?;
    let tax_rate = product
        .tax
        .map(|t| t.tax_rate)
        .ok_or_else(|| Error::decode(format!("Product {product_number} has no tax")))?;

    Ok(LineItemData {
        label: product.name.unwrap_or_else(|| product_number.to_string()),
        product_id: product.id,
        states: product.states,
        unit_price,
        tax_rate,
    })
}

/// Price, tax and delivery time of a shipping method.
///
/// The price rule with the lowest starting quantity applies; a method without
/// price rules ships for free.
pub async fn shipping_method_data(
    transport: &dyn Transport,
    shipping_method_id: &str,
    prices: &PriceContext,
) -> Result<ShippingMethodData> {
    let body = SearchBody::default()
        .include("shipping_method", &["id", "tax", "deliveryTime", "prices"])
        .include("shipping_method_price", &["quantityStart", "currencyPrice"])
        .include("tax", &["taxRate"])
        .include("delivery_time", &["min", "max", "unit"])
        .association("prices", JsonValue::Null)
        .association("tax", JsonValue::Null)
        .association("deliveryTime", JsonValue::Null)
        .equals("id", shipping_method_id);
    let record = search_first(transport, "shipping-method", &body)
        .await?
        .ok_or_else(|| not_found("Shipping method", "id", shipping_method_id))?;

    let mut method: ShippingMethodRecord = decode("shipping method", record)?;
    method
        .prices
        .sort_by_key(|p| p.quantity_start.unwrap_or(Decimal::ONE));

    let unit_price = match method.prices.first() {
        None => Decimal::ZERO,
        Some(rule) => rule
            .currency_price
            .as_deref()
            .and_then(|p| prices.net_price(p))
            .ok_or_else(|| {
                Error::operation_with_description(
                    "Missing shipping price",
                    format!(
                        "Shipping method {shipping_method_id} has no price in currency {}",
                        prices.currency_id
                    ),
                )
            })?,
    };

    Ok(ShippingMethodData {
        id: method.id,
        unit_price,
        tax_rate: method.tax.map(|t| t.tax_rate),
        delivery_time: method.delivery_time,
    })
}

async fn sales_channel(transport: &dyn Transport, id: &str) -> Result<SalesChannelRecord> {
    let body = SearchBody::new("sales-channel", &["id", "shippingMethodId", "languageId"])
        .equals("id", id);
    let record = search_first(transport, "sales-channel", &body)
        .await?
        .ok_or_else(|| not_found("Sales channel", "id", id))?;
    decode("sales channel", record)
}

/// Default shipping method of a sales channel
pub async fn default_shipping_method(
    transport: &dyn Transport,
    sales_channel_id: &str,
) -> Result<String> {
    sales_channel(transport, sales_channel_id)
        .await?
        .shipping_method_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::operation(format!(
                "Sales channel {sales_channel_id} has no default shipping method"
            ))
        })
}

/// Language of a sales channel, or the system language
pub async fn default_language_id(
    transport: &dyn Transport,
    sales_channel_id: &str,
) -> Result<String> {
    let language = sales_channel(transport, sales_channel_id)
        .await?
        .language_id
        .filter(|id| !id.is_empty());
    Ok(language.unwrap_or_else(|| SYSTEM_LANGUAGE_ID.to_string()))
}

/// States of a state machine (`order.state`, `order_transaction.state`, ...)
pub async fn machine_states(
    transport: &dyn Transport,
    technical_name: &str,
) -> Result<Vec<MachineState>> {
    let body = SearchBody::default()
        .include("state_machine", &["states"])
        .include("state_machine_state", &["id", "technicalName", "name"])
        .association("states", JsonValue::Null)
        .equals("technicalName", technical_name);
    let Some(record) = search_first(transport, "state-machine", &body).await? else {
        return Ok(Vec::new());
    };

    Ok(decode::<StateMachineRecord>("state machine", record)?.states)
}

/// Ids of the order states in which the billing address may still change
pub async fn pre_payment_order_states(transport: &dyn Transport) -> Result<Vec<String>> {
    Ok(machine_states(transport, "order.state")
        .await?
        .into_iter()
        .filter(|s| PRE_PAYMENT_STATES.contains(&s.technical_name.as_str()))
        .map(|s| s.id)
        .collect())
}
