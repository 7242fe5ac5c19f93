//! Order parameters and request payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pricing::{CalculatedPrice, CartPrice, Rounding};
use crate::resources::params::{empty_as_none, FixedCollection};

// ============================================================================
// Parameters
// ============================================================================

/// Address entered on the node (`billingAddressValues`, `addressValues`, ...)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressValues {
    pub country: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub street: String,
}

impl AddressValues {
    /// Every field is required
    pub fn validate(&self, kind: &str) -> Result<()> {
        let fields = [
            ("country", &self.country),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("city", &self.city),
            ("street", &self.street),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            None => Ok(()),
            Some((key, _)) => Err(Error::operation_with_description(
                format!("Missing required value for {kind} address"),
                format!("{} address {key} must be a valid value.", capitalize(kind)),
            )),
        }
    }

    pub fn to_order_address(&self, id: String, salutation_id: Option<String>) -> OrderAddress {
        OrderAddress {
            id,
            country_id: self.country.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            city: self.city.clone(),
            street: self.street.clone(),
            salutation_id,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub salutation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub product_number: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub payment_method: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInput {
    pub shipping_method: String,
    pub state: String,
    /// Ship to the order's shipping address instead of `address_ui`
    #[serde(default)]
    pub customer_shipping_address: bool,
    #[serde(default)]
    pub address_ui: FixedCollection<AddressValues>,
}

impl DeliveryInput {
    /// The delivery's own address, validated; `None` when shipping to the
    /// order's shipping address
    pub fn own_address(&self) -> Result<Option<&AddressValues>> {
        if self.customer_shipping_address {
            return Ok(None);
        }
        let address = self.address_ui.first().ok_or_else(|| {
            Error::operation_with_description(
                "Missing shipping address",
                "A shipping address must be provided for the selected delivery if not using the customer one",
            )
        })?;
        address.validate("shipping")?;
        Ok(Some(address))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order_number: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_and_time: Option<String>,
    pub currency: String,
    pub state: String,
    #[serde(default)]
    pub guest_order: bool,
    #[serde(default)]
    pub guest_ui: FixedCollection<GuestValues>,
    #[serde(default)]
    pub billing_address_ui: FixedCollection<AddressValues>,
    #[serde(default)]
    pub shipping_address_ui: FixedCollection<AddressValues>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sales_channel: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub line_items: FixedCollection<LineItemInput>,
    #[serde(default)]
    pub transactions: FixedCollection<TransactionInput>,
    #[serde(default)]
    pub deliveries: FixedCollection<DeliveryInput>,
}

/// State transitions accepted by `_action/order/{id}/state/{transition}`
pub const ORDER_TRANSITIONS: &[&str] = &["cancel", "complete", "process", "reopen"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdateFields {
    pub billing_address_ui: Option<FixedCollection<AddressValues>>,
    pub shipping_address_ui: Option<FixedCollection<AddressValues>>,
    pub line_items: Option<FixedCollection<LineItemInput>>,
    pub transactions: Option<FixedCollection<TransactionInput>>,
    pub deliveries: Option<FixedCollection<DeliveryInput>>,
    /// `Some("")` is an explicit but invalid choice
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderParams {
    pub id: String,
    #[serde(default)]
    pub update_fields: OrderUpdateFields,
}

// ============================================================================
// Payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub id: String,
    pub country_id: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salutation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salutation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub customer_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: String,
    pub identifier: String,
    pub product_id: String,
    pub referenced_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub quantity: u32,
    pub label: String,
    pub states: Vec<String>,
    pub price: CalculatedPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTransaction {
    pub payment_method_id: String,
    pub state_id: String,
    pub amount: CalculatedPrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDelivery {
    pub shipping_order_address_id: String,
    pub shipping_method_id: String,
    pub state_id: String,
    pub shipping_date_earliest: DateTime<Utc>,
    pub shipping_date_latest: DateTime<Utc>,
    pub shipping_costs: CalculatedPrice,
}

/// `POST /order` body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub currency_id: String,
    pub language_id: String,
    pub sales_channel_id: String,
    pub billing_address_id: String,
    pub order_date_time: DateTime<Utc>,
    pub state_id: String,
    pub currency_factor: Decimal,
    pub item_rounding: Rounding,
    pub total_rounding: Rounding,
    pub order_customer: OrderCustomer,
    pub billing_address: OrderAddress,
    pub line_items: Vec<OrderLineItem>,
    pub price: CartPrice,
    pub shipping_costs: CalculatedPrice,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<OrderTransaction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<OrderDelivery>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<OrderAddress>,
}

/// `PATCH /order/{id}` body; unset parts are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<OrderAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<OrderLineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<CartPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_costs: Option<CalculatedPrice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<OrderTransaction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<OrderDelivery>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<OrderAddress>,
}

impl OrderUpdatePayload {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Existing Orders
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExistingOrderCustomer {
    pub customer_id: Option<String>,
    pub customer_number: Option<String>,
    pub salutation_id: Option<String>,
}

/// The parts of a stored order an update builds on
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingOrder {
    pub id: String,
    #[serde(default)]
    pub state_id: Option<String>,
    pub currency_id: String,
    #[serde(default = "one")]
    pub currency_factor: Decimal,
    #[serde(default)]
    pub billing_address_id: Option<String>,
    #[serde(default)]
    pub price: Option<CartPrice>,
    #[serde(default)]
    pub shipping_costs: Option<CalculatedPrice>,
    #[serde(default)]
    pub item_rounding: Option<Rounding>,
    #[serde(default)]
    pub total_rounding: Option<Rounding>,
    #[serde(default)]
    pub order_customer: Option<ExistingOrderCustomer>,
}

fn one() -> Decimal {
    Decimal::ONE
}
