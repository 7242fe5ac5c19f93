//! Price calculation for orders and products
//!
//! All amounts are `Decimal` and serialize as JSON numbers in the shape the
//! Admin API stores for calculated prices. Unit prices are net; tax is added on
//! top and every derived amount is rounded half away from zero to the
//! currency's item rounding decimals.

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Decimals used when a currency carries no rounding information
pub const DEFAULT_DECIMALS: u32 = 2;

/// Round half away from zero to `decimals` places
pub fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Currency rounding settings (`itemRounding` / `totalRounding`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rounding {
    pub decimals: u32,
    pub interval: Decimal,
    pub round_for_net: bool,
}

impl Default for Rounding {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            interval: Decimal::new(1, 2),
            round_for_net: true,
        }
    }
}

impl Rounding {
    pub fn round(&self, value: Decimal) -> Decimal {
        round(value, self.decimals)
    }
}

/// Tax computed for one rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedTax {
    pub tax: Decimal,
    pub tax_rate: Decimal,
    /// Gross amount the tax belongs to
    pub price: Decimal,
}

/// Share of a price taxed at one rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRule {
    pub tax_rate: Decimal,
    pub percentage: Decimal,
}

/// Calculated price of a line item, shipping costs or a transaction amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedPrice {
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub calculated_taxes: Vec<CalculatedTax>,
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
}

impl CalculatedPrice {
    /// Price of `quantity` units at a net unit price with one tax rate
    pub fn net(unit_price: Decimal, quantity: u32, tax_rate: Decimal, rounding: &Rounding) -> Self {
        let total = rounding.round(unit_price * Decimal::from(quantity));
        let tax = rounding.round(total * tax_rate / Decimal::ONE_HUNDRED);
        Self {
            unit_price,
            total_price: total,
            quantity,
            calculated_taxes: vec![CalculatedTax {
                tax,
                tax_rate,
                price: total + tax,
            }],
            tax_rules: vec![TaxRule {
                tax_rate,
                percentage: Decimal::ONE_HUNDRED,
            }],
        }
    }

    /// A zero price, used for orders without shipping costs
    pub fn zero() -> Self {
        Self {
            unit_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
            quantity: 1,
            calculated_taxes: Vec::new(),
            tax_rules: Vec::new(),
        }
    }

    /// Sum several prices into one position of quantity 1
    pub fn aggregate(prices: &[CalculatedPrice], rounding: &Rounding) -> Self {
        let total: Decimal = prices.iter().map(|p| p.total_price).sum();
        let calculated_taxes = merge_taxes(prices.iter().flat_map(|p| p.calculated_taxes.iter()));
        let tax_rules = tax_rules(&calculated_taxes, rounding);
        Self {
            unit_price: total,
            total_price: total,
            quantity: 1,
            calculated_taxes,
            tax_rules,
        }
    }

    pub fn tax(&self) -> Decimal {
        self.calculated_taxes.iter().map(|t| t.tax).sum()
    }

    pub fn gross(&self) -> Decimal {
        self.total_price + self.tax()
    }
}

/// Whether unit prices are net or gross
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxStatus {
    #[default]
    Net,
    Gross,
    TaxFree,
}

/// Order-level price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPrice {
    pub net_price: Decimal,
    pub total_price: Decimal,
    #[serde(default)]
    pub calculated_taxes: Vec<CalculatedTax>,
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
    pub position_price: Decimal,
    pub raw_total: Decimal,
    #[serde(default)]
    pub tax_status: TaxStatus,
}

impl CartPrice {
    /// Order totals from the line item positions and the shipping costs
    pub fn from_parts(
        positions: &[CalculatedPrice],
        shipping: &CalculatedPrice,
        rounding: &Rounding,
    ) -> Self {
        let position_price: Decimal = positions.iter().map(|p| p.total_price).sum();
        let net_price = position_price + shipping.total_price;
        let calculated_taxes = merge_taxes(
            positions
                .iter()
                .chain(std::iter::once(shipping))
                .flat_map(|p| p.calculated_taxes.iter()),
        );
        let tax: Decimal = calculated_taxes.iter().map(|t| t.tax).sum();
        let raw_total = net_price + tax;
        let tax_rules = tax_rules(&calculated_taxes, rounding);

        Self {
            net_price,
            total_price: rounding.round(raw_total),
            calculated_taxes,
            tax_rules,
            position_price,
            raw_total,
            tax_status: TaxStatus::Net,
        }
    }

    /// Transaction amount paying the whole order
    pub fn as_amount(&self) -> CalculatedPrice {
        CalculatedPrice {
            unit_price: self.total_price,
            total_price: self.total_price,
            quantity: 1,
            calculated_taxes: self.calculated_taxes.clone(),
            tax_rules: self.tax_rules.clone(),
        }
    }

    /// The line item part of this price, i.e. everything but `shipping`
    pub fn positions_without(&self, shipping: &CalculatedPrice) -> CalculatedPrice {
        CalculatedPrice {
            unit_price: self.position_price,
            total_price: self.position_price,
            quantity: 1,
            calculated_taxes: subtract_taxes(&self.calculated_taxes, &shipping.calculated_taxes),
            tax_rules: Vec::new(),
        }
    }
}

/// Group calculated taxes by rate, ordered by rate
pub fn merge_taxes<'a>(taxes: impl IntoIterator<Item = &'a CalculatedTax>) -> Vec<CalculatedTax> {
    let mut by_rate: BTreeMap<Decimal, CalculatedTax> = BTreeMap::new();
    for tax in taxes {
        by_rate
            .entry(tax.tax_rate.normalize())
            .and_modify(|merged| {
                merged.tax += tax.tax;
                merged.price += tax.price;
            })
            .or_insert_with(|| tax.clone());
    }
    by_rate.into_values().collect()
}

/// Remove `removed` from `taxes` rate by rate, dropping rates that reach zero
pub fn subtract_taxes(taxes: &[CalculatedTax], removed: &[CalculatedTax]) -> Vec<CalculatedTax> {
    let removed = merge_taxes(removed);
    merge_taxes(taxes)
        .into_iter()
        .filter_map(|mut tax| {
            if let Some(r) = removed
                .iter()
                .find(|r| r.tax_rate.normalize() == tax.tax_rate.normalize())
            {
                tax.tax -= r.tax;
                tax.price -= r.price;
            }
            (!tax.price.is_zero() || !tax.tax.is_zero()).then_some(tax)
        })
        .collect()
}

/// Tax rules giving each rate its share of the taxed net amount
pub fn tax_rules(taxes: &[CalculatedTax], rounding: &Rounding) -> Vec<TaxRule> {
    let net_total: Decimal = taxes.iter().map(|t| t.price - t.tax).sum();
    let count = Decimal::from(taxes.len() as u64);

    taxes
        .iter()
        .map(|t| {
            let percentage = if net_total.is_zero() {
                rounding.round(Decimal::ONE_HUNDRED / count)
            } else {
                rounding.round((t.price - t.tax) * Decimal::ONE_HUNDRED / net_total)
            };
            TaxRule {
                tax_rate: t.tax_rate,
                percentage,
            }
        })
        .collect()
}

/// Net price for a gross price at `tax_rate` percent
pub fn gross_to_net(gross: Decimal, tax_rate: Decimal, decimals: u32) -> Decimal {
    let divisor = Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED;
    match gross.checked_div(divisor) {
        Some(net) if divisor > Decimal::ZERO => round(net, decimals),
        _ => round(gross, decimals),
    }
}

// ============================================================================
// Delivery Dates
// ============================================================================

/// Unit of a shipping method's delivery time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryUnit {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Delivery time of a shipping method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTime {
    pub min: u32,
    pub max: u32,
    pub unit: DeliveryUnit,
}

/// Earliest and latest shipping date of a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingWindow {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

fn shift(from: DateTime<Utc>, amount: u32, unit: DeliveryUnit) -> Option<DateTime<Utc>> {
    let amount_i64 = i64::from(amount);
    match unit {
        DeliveryUnit::Hour => from.checked_add_signed(Duration::hours(amount_i64)),
        DeliveryUnit::Day => from.checked_add_signed(Duration::days(amount_i64)),
        DeliveryUnit::Week => from.checked_add_signed(Duration::weeks(amount_i64)),
        DeliveryUnit::Month => from.checked_add_months(Months::new(amount)),
        DeliveryUnit::Year => from.checked_add_months(Months::new(amount.checked_mul(12)?)),
    }
}

/// Shipping dates for a delivery starting at `now`
pub fn shipping_window(now: DateTime<Utc>, time: &DeliveryTime) -> Result<ShippingWindow> {
    let out_of_range = || Error::decode(format!("Delivery time {time:?} is out of range"));
    Ok(ShippingWindow {
        earliest: shift(now, time.min, time.unit).ok_or_else(out_of_range)?,
        latest: shift(now, time.max, time.unit).ok_or_else(out_of_range)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;
    use test_case::test_case;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test_case("10.00", 2, "19", "20.00", "3.80" ; "whole amounts")]
    #[test_case("19.99", 3, "19", "59.97", "11.39" ; "rounded tax")]
    #[test_case("0.05", 1, "7", "0.05", "0.00" ; "tax below a cent")]
    #[test_case("4.165", 1, "0", "4.17", "0.00" ; "half rounds away from zero")]
    fn test_net_line_price(unit: &str, quantity: u32, rate: &str, total: &str, tax: &str) {
        let price = CalculatedPrice::net(dec(unit), quantity, dec(rate), &Rounding::default());
        assert_eq!(price.total_price, dec(total));
        assert_eq!(price.tax(), dec(tax));
        assert_eq!(price.gross(), dec(total) + dec(tax));
    }

    #[test]
    fn test_gross_matches_net_times_rate() {
        let rounding = Rounding::default();
        for (unit, quantity, rate) in [("12.34", 3, "19"), ("0.99", 7, "7"), ("100", 1, "5.5")] {
            let price = CalculatedPrice::net(dec(unit), quantity, dec(rate), &rounding);
            let expected = round(
                price.total_price * (Decimal::ONE + dec(rate) / Decimal::ONE_HUNDRED),
                2,
            );
            assert_eq!(price.gross(), expected);
        }
    }

    #[test]
    fn test_merge_taxes_groups_by_rate() {
        let rounding = Rounding::default();
        let a = CalculatedPrice::net(dec("10"), 1, dec("19"), &rounding);
        let b = CalculatedPrice::net(dec("5"), 2, dec("7"), &rounding);
        let c = CalculatedPrice::net(dec("20"), 1, dec("19.0"), &rounding);

        let merged = merge_taxes(
            [&a, &b, &c]
                .into_iter()
                .flat_map(|p| p.calculated_taxes.iter()),
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].tax_rate, dec("7"));
        assert_eq!(merged[0].tax, dec("0.70"));
        assert_eq!(merged[1].tax, dec("5.70"));
        assert_eq!(merged[1].price, dec("35.70"));
    }

    #[test]
    fn test_cart_price_includes_shipping() {
        let rounding = Rounding::default();
        let lines = vec![
            CalculatedPrice::net(dec("10"), 2, dec("19"), &rounding),
            CalculatedPrice::net(dec("30"), 1, dec("7"), &rounding),
        ];
        let shipping = CalculatedPrice::net(dec("5"), 1, dec("19"), &rounding);

        let cart = CartPrice::from_parts(&lines, &shipping, &rounding);

        assert_eq!(cart.position_price, dec("50"));
        assert_eq!(cart.net_price, dec("55"));
        // 25 * 0.19 + 30 * 0.07
        assert_eq!(cart.total_price, dec("61.85"));
        assert_eq!(cart.tax_status, TaxStatus::Net);
        let shares: Decimal = cart.tax_rules.iter().map(|r| r.percentage).sum();
        assert_eq!(shares, dec("100"));
        assert_eq!(cart.as_amount().total_price, cart.total_price);
    }

    #[test]
    fn test_positions_without_shipping() {
        let rounding = Rounding::default();
        let lines = vec![CalculatedPrice::net(dec("40"), 1, dec("19"), &rounding)];
        let shipping = CalculatedPrice::net(dec("4.90"), 1, dec("19"), &rounding);
        let cart = CartPrice::from_parts(&lines, &shipping, &rounding);

        let positions = cart.positions_without(&shipping);

        assert_eq!(positions.total_price, dec("40"));
        assert_eq!(positions.calculated_taxes, lines[0].calculated_taxes);
    }

    #[test]
    fn test_tax_rules_without_net_share_evenly() {
        let taxes = vec![
            CalculatedTax { tax: Decimal::ZERO, tax_rate: dec("7"), price: Decimal::ZERO },
            CalculatedTax { tax: Decimal::ZERO, tax_rate: dec("19"), price: Decimal::ZERO },
        ];
        let rules = tax_rules(&taxes, &Rounding::default());
        assert_eq!(rules[0].percentage, dec("50"));
    }

    #[test_case("119", "19", "100.00" ; "standard rate")]
    #[test_case("10", "7", "9.35" ; "reduced rate")]
    #[test_case("10", "0", "10.00" ; "no tax")]
    fn test_gross_to_net(gross: &str, rate: &str, net: &str) {
        assert_eq!(gross_to_net(dec(gross), dec(rate), 2), dec(net));
    }

    #[test]
    fn test_rounding_deserializes_from_currency_json() {
        let rounding: Rounding =
            serde_json::from_value(json!({ "decimals": 3, "interval": 0.001, "roundForNet": false }))
                .unwrap();
        assert_eq!(rounding.decimals, 3);
        assert_eq!(rounding.round(dec("1.23456")), dec("1.235"));
    }

    #[test]
    fn test_calculated_price_serializes_camel_case() {
        let price = CalculatedPrice::net(dec("2.5"), 2, dec("10"), &Rounding::default());
        let value = serde_json::to_value(&price).unwrap();
        assert_eq!(value["totalPrice"], json!(5.0));
        assert_eq!(value["calculatedTaxes"][0]["taxRate"], json!(10.0));
        assert_eq!(value["taxRules"][0]["percentage"], json!(100.0));
    }

    #[test_case(DeliveryUnit::Hour, 2, 5, "2024-01-31T02:00:00Z", "2024-01-31T05:00:00Z" ; "hours")]
    #[test_case(DeliveryUnit::Day, 1, 3, "2024-02-01T00:00:00Z", "2024-02-03T00:00:00Z" ; "days")]
    #[test_case(DeliveryUnit::Week, 1, 2, "2024-02-07T00:00:00Z", "2024-02-14T00:00:00Z" ; "weeks")]
    #[test_case(DeliveryUnit::Month, 1, 2, "2024-02-29T00:00:00Z", "2024-03-31T00:00:00Z" ; "months clamp")]
    #[test_case(DeliveryUnit::Year, 1, 1, "2025-01-31T00:00:00Z", "2025-01-31T00:00:00Z" ; "years")]
    fn test_shipping_window(unit: DeliveryUnit, min: u32, max: u32, earliest: &str, latest: &str) {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = shipping_window(now, &DeliveryTime { min, max, unit }).unwrap();
        assert_eq!(window.earliest.to_rfc3339_opts(chrono::SecondsFormat::Secs, true), earliest);
        assert_eq!(window.latest.to_rfc3339_opts(chrono::SecondsFormat::Secs, true), latest);
    }

    #[test]
    fn test_delivery_unit_rejects_unknown() {
        assert!(serde_json::from_value::<DeliveryUnit>(json!("fortnight")).is_err());
    }
}
