//! Records returned by look-ups

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::pricing::DeliveryTime;

/// Fallback when a sales channel has no language
pub const SYSTEM_LANGUAGE_ID: &str = "2fbb5fe2e29a4d70aa5854ce7ce3e20b";

/// Currency prices are looked up in
#[derive(Debug, Clone, PartialEq)]
pub struct PriceContext {
    pub currency_id: String,
    pub default_currency_id: String,
    /// Exchange rate from the default currency
    pub factor: Decimal,
}

impl PriceContext {
    /// Net price in the context currency, converting the default currency
    /// price when no dedicated one exists
    pub fn net_price(&self, prices: &[PriceEntry]) -> Option<Decimal> {
        if let Some(price) = prices.iter().find(|p| p.currency_id == self.currency_id) {
            return Some(price.net);
        }
        prices
            .iter()
            .find(|p| p.currency_id == self.default_currency_id)
            .map(|p| p.net * self.factor)
    }
}

/// One entry of a `price` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub currency_id: String,
    pub net: Decimal,
    pub gross: Decimal,
    #[serde(default)]
    pub linked: bool,
}

/// Address as stored on a customer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRecord {
    pub id: String,
    pub country_id: String,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
}

/// Registered customer placing an order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerRecord {
    pub id: String,
    pub customer_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub salutation_id: Option<String>,
    pub sales_channel_id: String,
    pub language_id: String,
    pub default_billing_address_id: Option<String>,
    pub default_shipping_address_id: Option<String>,
    pub default_billing_address: Option<AddressRecord>,
    pub default_shipping_address: Option<AddressRecord>,
}

/// Product data a line item is built from
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemData {
    pub product_id: String,
    pub label: String,
    pub states: Vec<String>,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

/// Shipping method data a delivery is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingMethodData {
    pub id: String,
    pub unit_price: Decimal,
    /// `None` when the method's tax follows the cart
    pub tax_rate: Option<Decimal>,
    pub delivery_time: Option<DeliveryTime>,
}

// ============================================================================
// Raw Search Records
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct TaxRecord {
    #[serde(rename = "taxRate")]
    pub tax_rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub price: Option<Vec<PriceEntry>>,
    #[serde(default)]
    pub tax: Option<TaxRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShippingPriceRecord {
    #[serde(default)]
    pub quantity_start: Option<Decimal>,
    #[serde(default)]
    pub currency_price: Option<Vec<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ShippingMethodRecord {
    pub id: String,
    #[serde(default)]
    pub tax: Option<TaxRecord>,
    #[serde(default)]
    pub delivery_time: Option<DeliveryTime>,
    #[serde(default)]
    pub prices: Vec<ShippingPriceRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct SalesChannelRecord {
    pub shipping_method_id: Option<String>,
    pub language_id: Option<String>,
}

/// One state of a state machine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineState {
    pub id: String,
    pub technical_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StateMachineRecord {
    #[serde(default)]
    pub states: Vec<MachineState>,
}
