//! Order create / update
//!
//! Orders are written with every calculated part spelled out: line item
//! prices, shipping costs, the order price, transaction amounts and delivery
//! dates. The pieces share ids (billing address, delivery addresses) so they
//! are assembled here before the single write request.
//!
//! Line item products and shipping methods are resolved concurrently; the
//! first failing look-up fails the item.

mod create;
mod types;
mod update;

pub use create::create;
pub use types::{
    AddressValues, CreateOrderParams, DeliveryInput, ExistingOrder, GuestValues, LineItemInput,
    OrderAddress, OrderCustomer, OrderDelivery, OrderLineItem, OrderPayload, OrderTransaction,
    OrderUpdateFields, OrderUpdatePayload, TransactionInput, UpdateOrderParams,
    ORDER_TRANSITIONS,
};
pub use update::update;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;

use super::common::new_id;
use super::fields::ORDER_FIELDS;
use super::Context;
use crate::error::{Error, Result};
use crate::lookups::{self, LineItemData, PriceContext, ShippingMethodData};
use crate::pricing::{shipping_window, CalculatedPrice, CartPrice, Rounding};
use crate::search::{search, SearchBody};
use crate::types::{JsonValue, Resource};

/// Line items must name a product and order at least one unit
fn validate_line_items(items: &[LineItemInput]) -> Result<()> {
    for item in items {
        if item.product_number.trim().is_empty() {
            return Err(Error::operation("Missing product number for line item"));
        }
        if item.quantity == 0 {
            return Err(Error::operation_with_description(
                "Invalid quantity",
                format!(
                    "Quantity of line item {} must be at least 1",
                    item.product_number
                ),
            ));
        }
    }
    Ok(())
}

fn transactions(inputs: &[TransactionInput], price: &CartPrice) -> Vec<OrderTransaction> {
    inputs
        .iter()
        .map(|t| OrderTransaction {
            payment_method_id: t.payment_method.clone(),
            state_id: t.state.clone(),
            amount: price.as_amount(),
        })
        .collect()
}

async fn resolve_line_items(
    ctx: &Context<'_>,
    items: &[LineItemInput],
    prices: &PriceContext,
) -> Result<Vec<LineItemData>> {
    try_join_all(
        items
            .iter()
            .map(|item| lookups::line_item_data(ctx.transport, &item.product_number, prices)),
    )
    .await
}

async fn resolve_shipping_methods(
    ctx: &Context<'_>,
    methods: &[&str],
    prices: &PriceContext,
) -> Result<Vec<ShippingMethodData>> {
    try_join_all(
        methods
            .iter()
            .map(|id| lookups::shipping_method_data(ctx.transport, id, prices)),
    )
    .await
}

/// Line items with their calculated prices
fn build_line_items(
    inputs: &[LineItemInput],
    data: Vec<LineItemData>,
    rounding: &Rounding,
) -> Vec<OrderLineItem> {
    inputs
        .iter()
        .zip(data)
        .map(|(input, product)| OrderLineItem {
            id: new_id(),
            identifier: product.product_id.clone(),
            referenced_id: product.product_id.clone(),
            price: CalculatedPrice::net(
                product.unit_price,
                input.quantity,
                product.tax_rate,
                rounding,
            ),
            product_id: product.product_id,
            kind: "product",
            quantity: input.quantity,
            label: product.label,
            states: product.states,
        })
        .collect()
}

/// Tax rate for shipping methods whose tax follows the cart: the highest
/// rate in the cart, else the shop's default rate
async fn cart_tax_rate(
    ctx: &Context<'_>,
    rates: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal> {
    match rates.into_iter().max() {
        Some(rate) => Ok(rate),
        None => lookups::default_tax_rate(ctx.transport).await,
    }
}

fn shipping_costs(method: &ShippingMethodData, cart_rate: Decimal, rounding: &Rounding) -> CalculatedPrice {
    CalculatedPrice::net(
        method.unit_price,
        1,
        method.tax_rate.unwrap_or(cart_rate),
        rounding,
    )
}

fn build_delivery(
    input: &DeliveryInput,
    address_id: String,
    method: &ShippingMethodData,
    cart_rate: Decimal,
    rounding: &Rounding,
    now: DateTime<Utc>,
) -> Result<OrderDelivery> {
    let (earliest, latest) = match &method.delivery_time {
        Some(time) => {
            let window = shipping_window(now, time)?;
            (window.earliest, window.latest)
        }
        None => (now, now),
    };

    Ok(OrderDelivery {
        shipping_order_address_id: address_id,
        shipping_method_id: input.shipping_method.clone(),
        state_id: input.state.clone(),
        shipping_date_earliest: earliest,
        shipping_date_latest: latest,
        shipping_costs: shipping_costs(method, cart_rate, rounding),
    })
}

/// Re-read an order after writing it
async fn fetch_order(ctx: &Context<'_>, id: &str) -> Result<Vec<JsonValue>> {
    let body = SearchBody::new(Resource::Order.entity(), ORDER_FIELDS).equals("id", id);
    search(ctx.transport, Resource::Order.entity(), &body).await
}
