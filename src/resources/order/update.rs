use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use super::types::{
    ExistingOrder, OrderAddress, OrderUpdateFields, OrderUpdatePayload, UpdateOrderParams,
    ORDER_TRANSITIONS,
};
use super::{
    build_delivery, build_line_items, cart_tax_rate, fetch_order, resolve_line_items,
    resolve_shipping_methods, transactions, validate_line_items,
};
use crate::error::{Error, Result};
use crate::lookups::{self, PriceContext};
use crate::pricing::{CalculatedPrice, CartPrice};
use crate::resources::common::{does_not_exist, new_id, require_id};
use crate::resources::Context;
use crate::search::{search_first, SearchBody};
use crate::types::{JsonValue, Method, Resource};

/// Checks that need no request: state choice, transactions without line
/// items, line item quantities and every entered address
fn validate(fields: &OrderUpdateFields) -> Result<Option<&str>> {
    let transition = match fields.state.as_deref().map(str::trim) {
        None => None,
        Some(state) if ORDER_TRANSITIONS.contains(&state) => Some(state),
        Some(_) => {
            return Err(Error::operation_with_description(
                "Invalid order state",
                "Please specify a valid order state from the list",
            ))
        }
    };

    let has_line_items = fields.line_items.as_ref().is_some_and(|l| !l.is_empty());
    let has_transactions = fields.transactions.as_ref().is_some_and(|t| !t.is_empty());
    if has_transactions && !has_line_items {
        return Err(Error::operation_with_description(
            "Missing line items for transaction",
            "Line items are required for order transactions",
        ));
    }
    if let Some(items) = &fields.line_items {
        validate_line_items(items)?;
    }
    if let Some(address) = fields.billing_address_ui.as_ref().and_then(|a| a.first()) {
        address.validate("billing")?;
    }
    if let Some(address) = fields.shipping_address_ui.as_ref().and_then(|a| a.first()) {
        address.validate("shipping")?;
    }
    for delivery in fields.deliveries.iter().flat_map(|d| d.iter()) {
        delivery.own_address()?;
    }

    Ok(transition)
}

async fn existing_order(ctx: &Context<'_>, id: &str) -> Result<ExistingOrder> {
    let body = SearchBody::default()
        .equals("id", id)
        .association("currency", JsonValue::Null)
        .association("orderCustomer", JsonValue::Null);
    let record = search_first(ctx.transport, Resource::Order.entity(), &body)
        .await?
        .ok_or_else(|| does_not_exist(Resource::Order, id))?;

    serde_json::from_value(record)
        .map_err(|e| Error::decode(format!("Unexpected order record: {e}")))
}

/// Order address for deliveries shipping "to the customer" when the update
/// brings no new shipping address.
///
/// Registered customers get a copy of their default shipping address; guest
/// orders ship to the existing billing address.
async fn customer_delivery_address(
    ctx: &Context<'_>,
    order: &ExistingOrder,
) -> Result<(String, Option<OrderAddress>)> {
    let customer = order.order_customer.as_ref();
    let registered = customer
        .filter(|c| c.customer_id.is_some())
        .and_then(|c| c.customer_number.as_deref());

    if let Some(number) = registered {
        let record = lookups::customer_by_number(ctx.transport, number).await?;
        if let Some(address) = record
            .default_shipping_address
            .or(record.default_billing_address)
        {
            let copy = OrderAddress {
                id: new_id(),
                country_id: address.country_id,
                first_name: address.first_name,
                last_name: address.last_name,
                city: address.city,
                street: address.street,
                salutation_id: record.salutation_id,
            };
            return Ok((copy.id.clone(), Some(copy)));
        }
    }

    order
        .billing_address_id
        .clone()
        .map(|id| (id, None))
        .ok_or_else(|| {
            Error::operation_with_description(
                "Missing shipping address",
                format!("Order {} has no address to ship to", order.id),
            )
        })
}

pub async fn update(ctx: &Context<'_>, params: UpdateOrderParams) -> Result<Vec<JsonValue>> {
    let id = require_id(&params.id)?;
    let fields = params.update_fields;
    let transition = validate(&fields)?;

    let order = existing_order(ctx, id).await?;
    let salutation_id = order
        .order_customer
        .as_ref()
        .and_then(|c| c.salutation_id.clone());
    let mut payload = OrderUpdatePayload::default();

    if let Some(address) = fields.billing_address_ui.as_ref().and_then(|a| a.first()) {
        let pre_payment = lookups::pre_payment_order_states(ctx.transport).await?;
        if order
            .state_id
            .as_ref()
            .is_some_and(|state| pre_payment.contains(state))
        {
            let billing = address.to_order_address(new_id(), salutation_id.clone());
            payload.billing_address_id = Some(billing.id.clone());
            payload.billing_address = Some(billing);
        } else {
            warn!(id, "Order is past payment, billing address left unchanged");
        }
    }

    let shipping_address = fields
        .shipping_address_ui
        .as_ref()
        .and_then(|a| a.first())
        .map(|a| a.to_order_address(new_id(), salutation_id.clone()));
    if let Some(address) = &shipping_address {
        payload.addresses.push(address.clone());
    }

    let line_inputs = fields.line_items.as_deref().unwrap_or_default();
    let delivery_inputs = fields.deliveries.as_deref().unwrap_or_default();

    if !line_inputs.is_empty() || !delivery_inputs.is_empty() {
        let item_rounding = order.item_rounding.clone().unwrap_or_default();
        let total_rounding = order.total_rounding.clone().unwrap_or_default();
        let prices = PriceContext {
            currency_id: order.currency_id.clone(),
            default_currency_id: ctx.default_currency_id().await?.to_string(),
            factor: order.currency_factor,
        };

        let method_ids: Vec<&str> = delivery_inputs
            .iter()
            .map(|d| d.shipping_method.as_str())
            .collect();
        let (products, methods) = futures::try_join!(
            resolve_line_items(ctx, line_inputs, &prices),
            resolve_shipping_methods(ctx, &method_ids, &prices)
        )?;
        debug!(
            id,
            line_items = products.len(),
            deliveries = methods.len(),
            "Resolved order look-ups"
        );

        payload.line_items = build_line_items(line_inputs, products, &item_rounding);

        let previous_price = order
            .price
            .clone()
            .ok_or_else(|| Error::decode(format!("Order {id} has no price to build on")))?;
        let previous_shipping = order
            .shipping_costs
            .clone()
            .unwrap_or_else(CalculatedPrice::zero);

        let mut positions = vec![previous_price.positions_without(&previous_shipping)];
        positions.extend(payload.line_items.iter().map(|l| l.price.clone()));

        let shipping = if delivery_inputs.is_empty() {
            previous_shipping
        } else {
            let cart_rate = cart_tax_rate(
                ctx,
                positions
                    .iter()
                    .flat_map(|p| p.calculated_taxes.iter().map(|t| t.tax_rate)),
            )
            .await?;

            let mut fallback: Option<String> = shipping_address.as_ref().map(|a| a.id.clone());
            let now = Utc::now();
            for (input, method) in delivery_inputs.iter().zip(&methods) {
                let address_id = match input.own_address()? {
                    Some(values) => {
                        let address = values.to_order_address(new_id(), salutation_id.clone());
                        let id = address.id.clone();
                        payload.addresses.push(address);
                        id
                    }
                    None => match &fallback {
                        Some(id) => id.clone(),
                        None => {
                            let (id, copy) = customer_delivery_address(ctx, &order).await?;
                            payload.addresses.extend(copy);
                            fallback = Some(id.clone());
                            id
                        }
                    },
                };
                payload.deliveries.push(build_delivery(
                    input,
                    address_id,
                    method,
                    cart_rate,
                    &item_rounding,
                    now,
                )?);
            }

            let mut costs = vec![previous_shipping];
            costs.extend(payload.deliveries.iter().map(|d| d.shipping_costs.clone()));
            let shipping = CalculatedPrice::aggregate(&costs, &item_rounding);
            payload.shipping_costs = Some(shipping.clone());
            shipping
        };

        let price = CartPrice::from_parts(&positions, &shipping, &total_rounding);
        if let Some(inputs) = &fields.transactions {
            payload.transactions = transactions(inputs, &price);
        }
        payload.price = Some(price);
    }

    if let Some(transition) = transition {
        ctx.transport
            .api_request(
                Method::POST,
                &format!("/_action/order/{id}/state/{transition}"),
                json!({}),
                &[],
            )
            .await?;
        info!(id, transition, "Order state changed");
    }

    if payload.is_empty() {
        debug!(id, "No order fields to update");
    } else {
        ctx.transport
            .api_request(
                Method::PATCH,
                &format!("/order/{id}"),
                serde_json::to_value(&payload)?,
                &[],
            )
            .await?;
        info!(id, "Updated order");
    }

    fetch_order(ctx, id).await
}

