//! Dropdown loaders
//!
//! Each method fills one dropdown of the node's parameters with
//! `{ name, value }` options read from the shop. Most run a field-restricted
//! search; some encode several fields into the value so that an operation can
//! later work without another request (order currencies carry their factor and
//! rounding, tax options their rate).

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::lookups;
use crate::resources::fields::{
    CURRENCY_OPTION_FIELDS, GENERIC_OPTION_FIELDS, ORDER_CURRENCY_OPTION_FIELDS,
    SALUTATION_OPTION_FIELDS, TAX_OPTION_FIELDS,
};
use crate::search::{search, SearchBody};
use crate::types::{JsonValue, Method, OptionEntry};

/// Load-options method named by a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOptionsMethod {
    Products,
    Currencies,
    OrderCurrencies,
    TaxRates,
    Categories,
    SalesChannels,
    Languages,
    CustomerGroups,
    PaymentMethods,
    Countries,
    Salutations,
    OrderStates,
    TransactionStates,
    DeliveryStates,
    ShippingMethods,
    Manufacturers,
    Taxes,
}

impl LoadOptionsMethod {
    pub const ALL: [LoadOptionsMethod; 17] = [
        LoadOptionsMethod::Products,
        LoadOptionsMethod::Currencies,
        LoadOptionsMethod::OrderCurrencies,
        LoadOptionsMethod::TaxRates,
        LoadOptionsMethod::Categories,
        LoadOptionsMethod::SalesChannels,
        LoadOptionsMethod::Languages,
        LoadOptionsMethod::CustomerGroups,
        LoadOptionsMethod::PaymentMethods,
        LoadOptionsMethod::Countries,
        LoadOptionsMethod::Salutations,
        LoadOptionsMethod::OrderStates,
        LoadOptionsMethod::TransactionStates,
        LoadOptionsMethod::DeliveryStates,
        LoadOptionsMethod::ShippingMethods,
        LoadOptionsMethod::Manufacturers,
        LoadOptionsMethod::Taxes,
    ];

    /// Name used in parameter descriptions (`loadOptionsMethod`)
    pub fn name(self) -> &'static str {
        match self {
            LoadOptionsMethod::Products => "getProducts",
            LoadOptionsMethod::Currencies => "getCurrencies",
            LoadOptionsMethod::OrderCurrencies => "getOrderCurrencies",
            LoadOptionsMethod::TaxRates => "getTaxRates",
            LoadOptionsMethod::Categories => "getCategories",
            LoadOptionsMethod::SalesChannels => "getSalesChannels",
            LoadOptionsMethod::Languages => "getLanguages",
            LoadOptionsMethod::CustomerGroups => "getCustomerGroups",
            LoadOptionsMethod::PaymentMethods => "getPaymentMethods",
            LoadOptionsMethod::Countries => "getCountries",
            LoadOptionsMethod::Salutations => "getSalutations",
            LoadOptionsMethod::OrderStates => "getOrderStates",
            LoadOptionsMethod::TransactionStates => "getTransactionStates",
            LoadOptionsMethod::DeliveryStates => "getDeliveryStates",
            LoadOptionsMethod::ShippingMethods => "getShippingMethods",
            LoadOptionsMethod::Manufacturers => "getManufacturers",
            LoadOptionsMethod::Taxes => "getTaxes",
        }
    }
}

impl fmt::Display for LoadOptionsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoadOptionsMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| {
                Error::operation_with_description(
                    format!("Unknown load options method '{s}'"),
                    format!(
                        "Available methods: {}",
                        Self::ALL.map(LoadOptionsMethod::name).join(", ")
                    ),
                )
            })
    }
}

/// Search `entity` for `fields` and turn each record into an option.
///
/// The label is the second field. The value is the first field, or with
/// `map_value` every field joined by `-`, objects JSON-encoded.
pub async fn fetch_resource(
    transport: &dyn Transport,
    entity: &str,
    fields: &[&str],
    map_value: bool,
) -> Result<Vec<OptionEntry>> {
    let body = SearchBody::new(entity, fields);
    let records = search(transport, entity, &body).await?;
    debug!(entity, count = records.len(), "Loaded options");

    Ok(records
        .iter()
        .map(|record| {
            let name = fields.get(1).map(|f| text(&record[*f])).unwrap_or_default();
            let value = if map_value {
                fields
                    .iter()
                    .map(|f| text(&record[*f]))
                    .collect::<Vec<_>>()
                    .join("-")
            } else {
                text(&record[fields[0]])
            };
            OptionEntry::new(name, value)
        })
        .collect())
}

/// Option text of one field: strings verbatim, everything else as JSON
fn text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

async fn payment_methods(transport: &dyn Transport) -> Result<Vec<OptionEntry>> {
    let response = transport
        .api_request(Method::GET, "/payment-method", JsonValue::Null, &[])
        .await?;
    let records = match response.get("data") {
        Some(JsonValue::Array(records)) => records.as_slice(),
        Some(JsonValue::Null) | None => &[],
        Some(other) => {
            return Err(Error::decode(format!(
                "Expected an array of payment methods, got {other}"
            )))
        }
    };

    Ok(records
        .iter()
        .map(|r| OptionEntry::new(text(&r["name"]), text(&r["id"])))
        .collect())
}

async fn states(transport: &dyn Transport, machine: &str) -> Result<Vec<OptionEntry>> {
    Ok(lookups::machine_states(transport, machine)
        .await?
        .into_iter()
        .map(|s| {
            let name = s.name.unwrap_or_else(|| s.technical_name.clone());
            OptionEntry::new(name, s.id)
        })
        .collect())
}

/// Run one load-options method
pub async fn load(transport: &dyn Transport, method: LoadOptionsMethod) -> Result<Vec<OptionEntry>> {
    use LoadOptionsMethod as M;

    match method {
        M::Products => fetch_resource(transport, "product", GENERIC_OPTION_FIELDS, false).await,
        M::Currencies => fetch_resource(transport, "currency", CURRENCY_OPTION_FIELDS, false).await,
        M::OrderCurrencies => {
            fetch_resource(transport, "currency", ORDER_CURRENCY_OPTION_FIELDS, true).await
        }
        M::TaxRates => fetch_resource(transport, "tax", TAX_OPTION_FIELDS, true).await,
        M::Categories => fetch_resource(transport, "category", GENERIC_OPTION_FIELDS, true).await,
        M::SalesChannels => {
            fetch_resource(transport, "sales-channel", GENERIC_OPTION_FIELDS, false).await
        }
        M::Languages => fetch_resource(transport, "language", GENERIC_OPTION_FIELDS, false).await,
        M::CustomerGroups => {
            fetch_resource(transport, "customer-group", GENERIC_OPTION_FIELDS, false).await
        }
        M::PaymentMethods => payment_methods(transport).await,
        M::Countries => fetch_resource(transport, "country", GENERIC_OPTION_FIELDS, false).await,
        M::Salutations => {
            fetch_resource(transport, "salutation", SALUTATION_OPTION_FIELDS, false).await
        }
        M::OrderStates => states(transport, "order.state").await,
        M::TransactionStates => states(transport, "order_transaction.state").await,
        M::DeliveryStates => states(transport, "order_delivery.state").await,
        M::ShippingMethods => {
            fetch_resource(transport, "shipping-method", GENERIC_OPTION_FIELDS, false).await
        }
        M::Manufacturers => {
            fetch_resource(transport, "product-manufacturer", GENERIC_OPTION_FIELDS, false).await
        }
        M::Taxes => fetch_resource(transport, "tax", GENERIC_OPTION_FIELDS, false).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use crate::resources::params::{CategoryOption, CurrencyOption, TaxRateOption};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_method_names_round_trip() {
        for method in LoadOptionsMethod::ALL {
            assert_eq!(method.name().parse::<LoadOptionsMethod>().unwrap(), method);
        }
        let err = "getInvoices".parse::<LoadOptionsMethod>().unwrap_err();
        assert!(err.is_operation());
    }

    #[tokio::test]
    async fn test_plain_options_use_id_and_label() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/search/country",
            json!({ "data": [
                { "id": "de", "name": "Germany" },
                { "id": "fr", "name": "France" }
            ] }),
        );

        let options = load(&transport, LoadOptionsMethod::Countries).await.unwrap();

        assert_eq!(
            options,
            vec![OptionEntry::new("Germany", "de"), OptionEntry::new("France", "fr")]
        );
        let body = &transport.bodies(Method::POST, "/search/country")[0];
        assert_eq!(body["fields"], json!(["id", "name"]));
        assert_eq!(body["includes"], json!({ "country": ["id", "name"] }));
    }

    #[tokio::test]
    async fn test_order_currency_value_parses_back() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/search/currency",
            json!({ "data": [{
                "id": "usd",
                "isoCode": "USD",
                "factor": 1.1,
                "itemRounding": { "decimals": 2, "interval": 0.01, "roundForNet": true },
                "totalRounding": { "decimals": 2, "interval": 0.05, "roundForNet": false }
            }] }),
        );

        let options = load(&transport, LoadOptionsMethod::OrderCurrencies).await.unwrap();

        assert_eq!(options[0].name, "USD");
        let currency: CurrencyOption = options[0].value.parse().unwrap();
        assert_eq!(currency.id, "usd");
        assert_eq!(currency.factor, Decimal::new(11, 1));
        assert_eq!(currency.total_rounding.interval, Decimal::new(5, 2));
        assert!(!currency.total_rounding.round_for_net);
    }

    #[tokio::test]
    async fn test_tax_rate_and_category_values() {
        let transport = FakeTransport::new()
            .on(
                Method::POST,
                "/search/tax",
                json!({ "data": [{ "id": "t1", "name": "Reduced rate", "taxRate": 7 }] }),
            )
            .on(
                Method::POST,
                "/search/category",
                json!({ "data": [{ "id": "c1", "name": "Home" }] }),
            );

        let taxes = load(&transport, LoadOptionsMethod::TaxRates).await.unwrap();
        assert_eq!(taxes[0].value, "t1-Reduced rate-7");
        let tax: TaxRateOption = taxes[0].value.parse().unwrap();
        assert_eq!(tax.rate, Decimal::from(7));

        let categories = load(&transport, LoadOptionsMethod::Categories).await.unwrap();
        let category: CategoryOption = categories[0].value.parse().unwrap();
        assert_eq!((category.id.as_str(), category.name.as_str()), ("c1", "Home"));
    }

    #[tokio::test]
    async fn test_salutations_labelled_by_display_name() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/search/salutation",
            json!({ "data": [{ "id": "s1", "displayName": "Mrs.", "salutationKey": "mrs" }] }),
        );

        let options = load(&transport, LoadOptionsMethod::Salutations).await.unwrap();
        assert_eq!(options, vec![OptionEntry::new("Mrs.", "s1")]);
    }

    #[tokio::test]
    async fn test_payment_methods_use_plain_listing() {
        let transport = FakeTransport::new().on(
            Method::GET,
            "/payment-method",
            json!({ "data": [{ "id": "p1", "name": "Invoice" }] }),
        );

        let options = load(&transport, LoadOptionsMethod::PaymentMethods).await.unwrap();
        assert_eq!(options, vec![OptionEntry::new("Invoice", "p1")]);
    }

    #[tokio::test]
    async fn test_states_from_state_machine() {
        let transport = FakeTransport::new().on(
            Method::POST,
            "/search/state-machine",
            json!({ "data": [{ "states": [
                { "id": "s1", "technicalName": "open", "name": "Open" },
                { "id": "s2", "technicalName": "paid" }
            ] }] }),
        );

        let options = load(&transport, LoadOptionsMethod::TransactionStates).await.unwrap();

        assert_eq!(
            options,
            vec![OptionEntry::new("Open", "s1"), OptionEntry::new("paid", "s2")]
        );
        let body = &transport.bodies(Method::POST, "/search/state-machine")[0];
        assert_eq!(body["filter"][0]["value"], "order_transaction.state");
    }
}
