//! Product create / update

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::common::{prune, require_by_id, require_id};
use super::fields::PRODUCT_FIELDS;
use super::params::{empty_as_none, lenient_decimal, CategoryOption, FixedCollection, TaxRateOption};
use super::Context;
use crate::error::{Error, Result};
use crate::lookups;
use crate::pricing::{gross_to_net, round, DEFAULT_DECIMALS};
use crate::search::{search, SearchBody};
use crate::types::{JsonValue, Method, Resource};

/// Storefront visibility "all"
const VISIBILITY_ALL: u32 = 30;

fn yes() -> bool {
    true
}

/// One entry of the `prices` group
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInput {
    pub currency: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub gross_price: Option<Decimal>,
    #[serde(default)]
    pub auto_calculate_net: bool,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub net_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductParams {
    /// `false` creates a variant of `parent_id`
    #[serde(default = "yes")]
    pub parent: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
    pub product_number: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ean: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub default_gross_price: Option<Decimal>,
    #[serde(default)]
    pub default_auto_calculate_net: bool,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub default_net_price: Option<Decimal>,
    #[serde(default)]
    pub prices: FixedCollection<PriceInput>,
    pub tax_rate: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub sales_channels: Vec<String>,
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductUpdateFields {
    pub active: Option<bool>,
    pub categories: Option<Vec<String>>,
    #[serde(deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub ean: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub manufacturer: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
    pub prices: Option<FixedCollection<PriceInput>>,
    pub sales_channels: Option<Vec<String>>,
    pub stock: Option<i64>,
    #[serde(deserialize_with = "empty_as_none")]
    pub tax_rate: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductParams {
    pub id: String,
    #[serde(default)]
    pub update_fields: ProductUpdateFields,
}

/// One `price` entry. The net price is derived from the gross price when
/// requested or when no net price is given.
pub fn price_entry(
    currency_id: &str,
    gross: Option<Decimal>,
    net: Option<Decimal>,
    auto_calculate_net: bool,
    tax_rate: Decimal,
) -> Result<JsonValue> {
    let gross = gross.ok_or_else(|| {
        Error::operation_with_description(
            "Missing gross price",
            format!("A gross price is required for currency {currency_id}"),
        )
    })?;
    let net = match net {
        Some(net) if !auto_calculate_net && !net.is_zero() => round(net, DEFAULT_DECIMALS),
        _ => gross_to_net(gross, tax_rate, DEFAULT_DECIMALS),
    };

    Ok(json!({
        "currencyId": currency_id,
        "gross": gross,
        "net": net,
        "linked": true,
    }))
}

fn extra_prices(prices: &[PriceInput], tax_rate: Decimal) -> Result<Vec<JsonValue>> {
    prices
        .iter()
        .map(|p| {
            price_entry(
                &p.currency,
                p.gross_price,
                p.net_price,
                p.auto_calculate_net,
                tax_rate,
            )
        })
        .collect()
}

fn categories(values: &[String]) -> Result<Vec<JsonValue>> {
    values
        .iter()
        .map(|v| {
            let option: CategoryOption = v.parse()?;
            Ok(json!({ "id": option.id, "name": option.name }))
        })
        .collect()
}

fn visibilities(sales_channels: &[String]) -> Vec<JsonValue> {
    sales_channels
        .iter()
        .map(|id| json!({ "salesChannelId": id, "visibility": VISIBILITY_ALL }))
        .collect()
}

fn manufacturer(name: Option<String>) -> JsonValue {
    name.map_or(JsonValue::Null, |name| json!({ "name": name }))
}

async fn fetch_product(ctx: &Context<'_>, field: &str, value: &str) -> Result<Vec<JsonValue>> {
    let body = SearchBody::new(Resource::Product.entity(), PRODUCT_FIELDS).equals(field, value);
    search(ctx.transport, Resource::Product.entity(), &body).await
}

pub async fn create(ctx: &Context<'_>, params: CreateProductParams) -> Result<Vec<JsonValue>> {
    let tax: TaxRateOption = params.tax_rate.parse()?;
    let categories = categories(&params.categories)?;

    let extra = extra_prices(&params.prices, tax.rate)?;
    let mut prices = vec![price_entry(
        ctx.default_currency_id().await?,
        params.default_gross_price,
        params.default_net_price,
        params.default_auto_calculate_net,
        tax.rate,
    )?];
    prices.extend(extra);

    let parent_id = if params.parent {
        None
    } else {
        Some(params.parent_id.ok_or_else(|| {
            Error::operation_with_description(
                "Missing parent product",
                "A variant needs the id of its parent product",
            )
        })?)
    };

    let mut body = json!({
        "parentId": parent_id,
        "productNumber": params.product_number,
        "ean": params.ean,
        "name": params.name,
        "description": params.description,
        "price": prices,
        "taxId": tax.id,
        "manufacturer": manufacturer(params.manufacturer),
        "stock": params.stock,
        "categories": categories,
        "visibilities": visibilities(&params.sales_channels),
        "active": params.active,
    });
    prune(&mut body);

    ctx.transport
        .api_request(Method::POST, "/product", body, &[])
        .await?;
    info!(product_number = %params.product_number, "Created product");

    fetch_product(ctx, "productNumber", &params.product_number).await
}

pub async fn update(ctx: &Context<'_>, params: UpdateProductParams) -> Result<Vec<JsonValue>> {
    let id = require_id(&params.id)?;
    let fields = params.update_fields;
    let tax = fields
        .tax_rate
        .as_deref()
        .map(str::parse::<TaxRateOption>)
        .transpose()?;
    let categories = fields.categories.as_deref().map(categories).transpose()?;

    require_by_id(ctx, Resource::Product, &["id"], id).await?;

    let prices = match fields.prices.as_deref() {
        Some(prices) if !prices.is_empty() => {
            let rate = match &tax {
                Some(tax) => tax.rate,
                None => {
                    debug!(id, "Using the product's current tax rate");
                    lookups::product_tax_rate(ctx.transport, id).await?
                }
            };
            Some(extra_prices(prices, rate)?)
        }
        _ => None,
    };

    let mut body = json!({
        "active": fields.active,
        "categories": categories,
        "description": fields.description,
        "ean": fields.ean,
        "manufacturer": manufacturer(fields.manufacturer),
        "name": fields.name,
        "parentId": fields.parent_id,
        "price": prices,
        "visibilities": fields.sales_channels.as_deref().map(visibilities),
        "stock": fields.stock,
        "taxId": tax.map(|t| t.id),
    });
    prune(&mut body);

    if body.as_object().is_some_and(|m| m.is_empty()) {
        debug!(id, "No product fields to update");
    } else {
        ctx.transport
            .api_request(Method::PATCH, &format!("/product/{id}"), body, &[])
            .await?;
        info!(id, "Updated product");
    }

    fetch_product(ctx, "id", id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    const EUR: &str = "b7d2554b0ce847cd82f3ac9bd1c0dfca";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn transport() -> FakeTransport {
        FakeTransport::new()
            .on(Method::POST, "/search/currency", json!({ "data": [{ "id": EUR }] }))
            .on(Method::POST, "/product", JsonValue::Null)
            .on(
                Method::POST,
                "/search/product",
                json!({ "data": [{ "id": "p1", "productNumber": "SW-1" }] }),
            )
    }

    fn create_params(extra: JsonValue) -> CreateProductParams {
        let mut value = json!({
            "productNumber": "SW-1",
            "name": "Mug",
            "defaultGrossPrice": 11.9,
            "defaultAutoCalculateNet": true,
            "taxRate": "t1-Standard rate-19",
            "stock": 5,
            "categories": ["c1-Kitchen"],
            "salesChannels": ["sc1"],
        });
        if let (Some(map), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            map.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_price_entry_derives_net() {
        let entry = price_entry(EUR, Some(dec("11.9")), None, false, dec("19")).unwrap();
        assert_eq!(entry["net"], json!(10.0));

        let entry = price_entry(EUR, Some(dec("11.9")), Some(dec("9.5")), false, dec("19")).unwrap();
        assert_eq!(entry["net"], json!(9.5));

        let entry = price_entry(EUR, Some(dec("11.9")), Some(dec("9.5")), true, dec("19")).unwrap();
        assert_eq!(entry["net"], json!(10.0));

        let err = price_entry(EUR, None, None, true, dec("19")).unwrap_err();
        assert!(err.is_operation());
    }

    #[tokio::test]
    async fn test_create_builds_body() {
        let transport = transport();
        let ctx = Context::new(&transport);

        let result = create(
            &ctx,
            create_params(json!({
                "prices": { "price": [{
                    "currency": "usd1", "grossPrice": "13", "autoCalculateNet": false, "netPrice": 11
                }] },
                "manufacturer": "Acme",
                "ean": ""
            })),
        )
        .await
        .unwrap();
        assert_eq!(result[0]["id"], "p1");

        let body = &transport.bodies(Method::POST, "/product")[0];
        assert!(body.get("parentId").is_none());
        assert!(body.get("ean").is_none());
        assert_eq!(body["taxId"], "t1");
        assert_eq!(body["price"][0]["currencyId"], EUR);
        assert_eq!(body["price"][0]["net"], json!(10.0));
        assert_eq!(body["price"][1]["currencyId"], "usd1");
        assert_eq!(body["price"][1]["net"], json!(11.0));
        assert_eq!(body["manufacturer"], json!({ "name": "Acme" }));
        assert_eq!(body["categories"], json!([{ "id": "c1", "name": "Kitchen" }]));
        assert_eq!(
            body["visibilities"],
            json!([{ "salesChannelId": "sc1", "visibility": 30 }])
        );
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn test_default_currency_is_looked_up_once_per_execution() {
        let transport = transport();
        let ctx = Context::new(&transport);

        create(&ctx, create_params(json!({}))).await.unwrap();
        create(&ctx, create_params(json!({}))).await.unwrap();

        assert_eq!(transport.count(Method::POST, "/search/currency"), 1);
        assert_eq!(transport.count(Method::POST, "/product"), 2);
    }

    #[tokio::test]
    async fn test_create_variant_requires_parent() {
        let transport = transport();
        let ctx = Context::new(&transport);

        let err = create(&ctx, create_params(json!({ "parent": false })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing parent product");

        create(&ctx, create_params(json!({ "parent": false, "parentId": "p0" })))
            .await
            .unwrap();
        let body = &transport.bodies(Method::POST, "/product")[0];
        assert_eq!(body["parentId"], "p0");
    }

    #[tokio::test]
    async fn test_update_uses_current_tax_rate() {
        let transport = FakeTransport::new()
            .on(Method::POST, "/search/product", json!({ "data": [{ "id": "p1" }] }))
            .on(
                Method::POST,
                "/search/product",
                json!({ "data": [{ "id": "p1", "tax": { "taxRate": 7 } }] }),
            )
            .on(Method::POST, "/search/product", json!({ "data": [{ "id": "p1" }] }))
            .on(Method::PATCH, "/product/p1", JsonValue::Null);
        let ctx = Context::new(&transport);
        let params: UpdateProductParams = serde_json::from_value(json!({
            "id": "p1",
            "updateFields": {
                "prices": { "price": [{ "currency": EUR, "grossPrice": 10.7, "autoCalculateNet": true }] },
                "stock": 3
            }
        }))
        .unwrap();

        update(&ctx, params).await.unwrap();

        let body = &transport.bodies(Method::PATCH, "/product/p1")[0];
        assert_eq!(body["price"][0]["net"], json!(10.0));
        assert_eq!(body["stock"], 3);
        assert!(body.get("taxId").is_none());
        assert_eq!(transport.count(Method::POST, "/search/product"), 3);
    }

    #[tokio::test]
    async fn test_update_without_fields_skips_patch() {
        let transport = FakeTransport::new()
            .on(Method::POST, "/search/product", json!({ "data": [{ "id": "p1" }] }))
            .on(Method::PATCH, "/product/p1", JsonValue::Null);
        let ctx = Context::new(&transport);
        let params: UpdateProductParams =
            serde_json::from_value(json!({ "id": "p1", "updateFields": {} })).unwrap();

        let records = update(&ctx, params).await.unwrap();

        assert_eq!(records, vec![json!({ "id": "p1" })]);
        assert_eq!(transport.count(Method::PATCH, "/product/p1"), 0);
        assert_eq!(transport.count(Method::POST, "/search/product"), 2);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let transport =
            FakeTransport::new().on(Method::POST, "/search/product", json!({ "data": [] }));
        let ctx = Context::new(&transport);
        let params: UpdateProductParams =
            serde_json::from_value(json!({ "id": "p404", "updateFields": { "name": "x" } }))
                .unwrap();

        let err = update(&ctx, params).await.unwrap_err();
        assert_eq!(err.to_string(), "Product does not exist");
    }
}
