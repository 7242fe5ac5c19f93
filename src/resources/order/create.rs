use chrono::{DateTime, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use super::types::{
    AddressValues, CreateOrderParams, GuestValues, OrderAddress, OrderCustomer, OrderPayload,
};
use super::{
    build_delivery, build_line_items, cart_tax_rate, fetch_order, resolve_line_items,
    resolve_shipping_methods, shipping_costs, transactions, validate_line_items,
};
use crate::error::{Error, Result};
use crate::lookups::{self, AddressRecord, PriceContext};
use crate::pricing::{CalculatedPrice, CartPrice};
use crate::resources::common::new_id;
use crate::resources::params::{validate_email, CurrencyOption};
use crate::resources::Context;
use crate::types::{JsonValue, Method};

/// Who places the order, resolved before any price is computed
struct Buyer {
    customer: OrderCustomer,
    language_id: String,
    sales_channel_id: String,
    billing: OrderAddress,
    shipping: OrderAddress,
}

fn guest_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("guest-{suffix}")
}

/// Accepts RFC 3339 and the host's zone-less `YYYY-MM-DDTHH:MM:SS` (read as UTC)
fn parse_order_date(value: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(value) = value else {
        return Ok(Utc::now());
    };
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            Error::operation_with_description(
                "Invalid order date",
                format!("'{value}' is not a valid date and time"),
            )
        })
}

fn required_address<'a>(
    addresses: &'a [AddressValues],
    kind: &str,
) -> Result<&'a AddressValues> {
    let address = addresses.first().ok_or_else(|| {
        Error::operation_with_description(
            format!("Missing {kind} address"),
            format!("A {kind} address is required for guest orders"),
        )
    })?;
    address.validate(kind)?;
    Ok(address)
}

/// Everything about a guest is checked before the first request
struct GuestInput<'a> {
    guest: &'a GuestValues,
    sales_channel_id: &'a str,
    billing: &'a AddressValues,
    shipping: &'a AddressValues,
}

fn validate_guest(params: &CreateOrderParams) -> Result<GuestInput<'_>> {
    let guest = params.guest_ui.first().ok_or_else(|| {
        Error::operation_with_description(
            "Missing guest details",
            "Guest orders need the guest's name and email",
        )
    })?;
    for (value, field) in [(&guest.first_name, "first name"), (&guest.last_name, "last name")] {
        if value.trim().is_empty() {
            return Err(Error::operation_with_description(
                "Missing required value for guest",
                format!("Guest {field} must be a valid value."),
            ));
        }
    }
    validate_email(&guest.email)?;
    let sales_channel_id = params.sales_channel.as_deref().ok_or_else(|| {
        Error::operation_with_description(
            "Missing sales channel",
            "Guest orders need a sales channel",
        )
    })?;

    Ok(GuestInput {
        guest,
        sales_channel_id,
        billing: required_address(&params.billing_address_ui, "billing")?,
        shipping: required_address(&params.shipping_address_ui, "shipping")?,
    })
}

async fn guest_buyer(ctx: &Context<'_>, input: GuestInput<'_>) -> Result<Buyer> {
    let language_id = lookups::default_language_id(ctx.transport, input.sales_channel_id).await?;
    let salutation = input.guest.salutation.clone();

    Ok(Buyer {
        customer: OrderCustomer {
            first_name: input.guest.first_name.clone(),
            last_name: input.guest.last_name.clone(),
            email: input.guest.email.clone(),
            salutation_id: salutation.clone(),
            customer_id: None,
            customer_number: guest_number(),
        },
        language_id,
        sales_channel_id: input.sales_channel_id.to_string(),
        billing: input.billing.to_order_address(new_id(), salutation.clone()),
        shipping: input.shipping.to_order_address(new_id(), salutation),
    })
}

fn copy_address(record: &AddressRecord, id: String, salutation_id: Option<String>) -> OrderAddress {
    OrderAddress {
        id,
        country_id: record.country_id.clone(),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        city: record.city.clone(),
        street: record.street.clone(),
        salutation_id,
    }
}

async fn registered_buyer(ctx: &Context<'_>, customer_number: &str) -> Result<Buyer> {
    let customer = lookups::customer_by_number(ctx.transport, customer_number).await?;
    let billing_record = customer.default_billing_address.as_ref().ok_or_else(|| {
        Error::operation_with_description(
            "Missing billing address",
            format!("Customer {customer_number} has no default billing address"),
        )
    })?;
    let shipping_record = customer
        .default_shipping_address
        .as_ref()
        .unwrap_or(billing_record);

    let billing = copy_address(billing_record, new_id(), customer.salutation_id.clone());
    let shipping_id = if shipping_record.id == billing_record.id {
        billing.id.clone()
    } else {
        new_id()
    };
    let shipping = copy_address(shipping_record, shipping_id, customer.salutation_id.clone());

    Ok(Buyer {
        customer: OrderCustomer {
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            salutation_id: customer.salutation_id,
            customer_id: Some(customer.id),
            customer_number: customer_number.to_string(),
        },
        language_id: customer.language_id,
        sales_channel_id: customer.sales_channel_id,
        billing,
        shipping,
    })
}

pub async fn create(ctx: &Context<'_>, params: CreateOrderParams) -> Result<Vec<JsonValue>> {
    let currency: CurrencyOption = params.currency.parse()?;
    if params.line_items.is_empty() {
        return Err(Error::operation_with_description(
            "Missing order line items",
            "At least one line item must be provided",
        ));
    }
    validate_line_items(&params.line_items)?;
    let order_date = parse_order_date(params.date_and_time.as_deref())?;
    let delivery_addresses = params
        .deliveries
        .iter()
        .map(|d| d.own_address())
        .collect::<Result<Vec<_>>>()?;

    let buyer = if params.guest_order {
        let guest = validate_guest(&params)?;
        guest_buyer(ctx, guest).await?
    } else {
        let number = params.customer_number.as_deref().ok_or_else(|| {
            Error::operation_with_description(
                "Missing customer number",
                "Registered customer orders need the customer number",
            )
        })?;
        registered_buyer(ctx, number).await?
    };

    let prices = PriceContext {
        currency_id: currency.id.clone(),
        default_currency_id: ctx.default_currency_id().await?.to_string(),
        factor: currency.factor,
    };

    let method_ids: Vec<&str> = params
        .deliveries
        .iter()
        .map(|d| d.shipping_method.as_str())
        .collect();
    let (products, methods) = futures::try_join!(
        resolve_line_items(ctx, &params.line_items, &prices),
        resolve_shipping_methods(ctx, &method_ids, &prices)
    )?;
    debug!(
        line_items = products.len(),
        deliveries = methods.len(),
        "Resolved order look-ups"
    );

    let rounding = &currency.item_rounding;
    let line_items = build_line_items(&params.line_items, products, rounding);
    let positions: Vec<CalculatedPrice> = line_items.iter().map(|l| l.price.clone()).collect();
    let cart_rate = cart_tax_rate(
        ctx,
        positions
            .iter()
            .flat_map(|p| p.calculated_taxes.iter().map(|t| t.tax_rate)),
    )
    .await?;

    let mut addresses = Vec::new();
    if buyer.shipping.id != buyer.billing.id {
        addresses.push(buyer.shipping.clone());
    }

    let now = Utc::now();
    let mut deliveries = Vec::with_capacity(methods.len());
    for ((input, own_address), method) in params
        .deliveries
        .iter()
        .zip(&delivery_addresses)
        .zip(&methods)
    {
        let address_id = match own_address {
            None => buyer.shipping.id.clone(),
            Some(address) => {
                let address =
                    address.to_order_address(new_id(), buyer.customer.salutation_id.clone());
                let id = address.id.clone();
                addresses.push(address);
                id
            }
        };
        deliveries.push(build_delivery(input, address_id, method, cart_rate, rounding, now)?);
    }

    let shipping = if deliveries.is_empty() {
        let method_id =
            lookups::default_shipping_method(ctx.transport, &buyer.sales_channel_id).await?;
        let method = lookups::shipping_method_data(ctx.transport, &method_id, &prices).await?;
        shipping_costs(&method, cart_rate, rounding)
    } else {
        let costs: Vec<CalculatedPrice> =
            deliveries.iter().map(|d| d.shipping_costs.clone()).collect();
        CalculatedPrice::aggregate(&costs, rounding)
    };

    let price = CartPrice::from_parts(&positions, &shipping, &currency.total_rounding);
    let order_id = new_id();

    let payload = OrderPayload {
        id: order_id.clone(),
        order_number: params.order_number.clone(),
        currency_id: currency.id.clone(),
        language_id: buyer.language_id,
        sales_channel_id: buyer.sales_channel_id,
        billing_address_id: buyer.billing.id.clone(),
        order_date_time: order_date,
        state_id: params.state.clone(),
        currency_factor: currency.factor,
        item_rounding: currency.item_rounding.clone(),
        total_rounding: currency.total_rounding.clone(),
        order_customer: buyer.customer,
        billing_address: buyer.billing,
        transactions: transactions(&params.transactions, &price),
        line_items,
        price,
        shipping_costs: shipping,
        deliveries,
        addresses,
    };

    ctx.transport
        .api_request(Method::POST, "/order", serde_json::to_value(&payload)?, &[])
        .await?;
    info!(id = %order_id, total = %payload.price.total_price, "Created order");

    fetch_order(ctx, &order_id).await
}
