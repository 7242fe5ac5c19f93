//! Customer create / update
//!
//! get, getMany and delete go through [`super::common`].

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::common::{new_id, prune, require_by_id, require_id};
use super::fields::CUSTOMER_FIELDS;
use super::params::{empty_as_none, validate_email, FixedCollection};
use super::Context;
use crate::error::{Error, Result};
use crate::search::{search, SearchBody};
use crate::types::{JsonValue, Method, Resource};

/// One entry of the `addresses` group
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressInput {
    pub country: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub street: String,
    pub default_shipping_address: bool,
    pub default_billing_address: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerParams {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub customer_number: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sales_channel: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub addresses: FixedCollection<AddressInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerUpdateFields {
    pub addresses: Option<FixedCollection<AddressInput>>,
    #[serde(deserialize_with = "empty_as_none")]
    pub customer_number: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub group: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub language: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub payment_method: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub sales_channel: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerParams {
    pub id: String,
    #[serde(default)]
    pub update_fields: CustomerUpdateFields,
}

/// Addresses with their new ids and the ids of the default ones
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddresses {
    pub addresses: Vec<JsonValue>,
    pub default_shipping: Option<String>,
    pub default_billing: Option<String>,
}

/// Assign ids to addresses and pick the default shipping and billing ones.
///
/// At most one address may claim each default. With `require_defaults`, at
/// least one address must be given and each default must be claimed.
pub fn resolve_addresses(
    addresses: &[AddressInput],
    salutation_id: Option<&str>,
    require_defaults: bool,
) -> Result<ResolvedAddresses> {
    if require_defaults && addresses.is_empty() {
        return Err(Error::operation_with_description(
            "Missing default address",
            "At least one address must be provided",
        ));
    }

    let ids: Vec<String> = addresses.iter().map(|_| new_id()).collect();
    let default_shipping = pick_default(
        addresses,
        &ids,
        |a| a.default_shipping_address,
        "shipping",
        require_defaults,
    )?;
    let default_billing = pick_default(
        addresses,
        &ids,
        |a| a.default_billing_address,
        "billing",
        require_defaults,
    )?;

    let addresses = addresses
        .iter()
        .zip(&ids)
        .map(|(address, id)| {
            json!({
                "id": id,
                "countryId": address.country,
                "firstName": address.first_name,
                "lastName": address.last_name,
                "city": address.city,
                "street": address.street,
                "salutationId": salutation_id,
            })
        })
        .collect();

    Ok(ResolvedAddresses {
        addresses,
        default_shipping,
        default_billing,
    })
}

fn pick_default(
    addresses: &[AddressInput],
    ids: &[String],
    is_default: impl Fn(&AddressInput) -> bool,
    kind: &str,
    required: bool,
) -> Result<Option<String>> {
    let mut defaults = addresses.iter().zip(ids).filter(|(a, _)| is_default(a));
    let first = defaults.next().map(|(_, id)| id.clone());

    if defaults.next().is_some() {
        return Err(Error::operation_with_description(
            format!("Duplicate default {kind} address"),
            format!("Only one address can be a default {kind} address"),
        ));
    }
    if first.is_none() && required {
        return Err(Error::operation_with_description(
            format!("Missing default {kind} address"),
            format!("Customer must have a default {kind} address"),
        ));
    }
    Ok(first)
}

async fn fetch_customer(ctx: &Context<'_>, id: &str) -> Result<Vec<JsonValue>> {
    let body = SearchBody::new(Resource::Customer.entity(), CUSTOMER_FIELDS).equals("id", id);
    search(ctx.transport, Resource::Customer.entity(), &body).await
}

pub async fn create(ctx: &Context<'_>, params: CreateCustomerParams) -> Result<Vec<JsonValue>> {
    validate_email(&params.email)?;
    let resolved = resolve_addresses(&params.addresses, None, true)?;

    let id = new_id();
    let mut body = json!({
        "id": id,
        "firstName": params.first_name,
        "lastName": params.last_name,
        "email": params.email,
        "customerNumber": params.customer_number,
        "defaultPaymentMethodId": params.payment_method,
        "languageId": params.language,
        "salesChannelId": params.sales_channel,
        "groupId": params.group,
        "defaultShippingAddressId": resolved.default_shipping,
        "defaultBillingAddressId": resolved.default_billing,
        "addresses": resolved.addresses,
    });
    prune(&mut body);

    ctx.transport
        .api_request(Method::POST, "/customer", body, &[])
        .await?;
    info!(id, "Created customer");

    fetch_customer(ctx, &id).await
}

pub async fn update(ctx: &Context<'_>, params: UpdateCustomerParams) -> Result<Vec<JsonValue>> {
    let id = require_id(&params.id)?;
    let fields = params.update_fields;
    if let Some(email) = &fields.email {
        validate_email(email)?;
    }

    let current = require_by_id(ctx, Resource::Customer, &["id", "salutationId"], id).await?;
    let salutation_id = current.get("salutationId").and_then(JsonValue::as_str);

    let resolved = match &fields.addresses {
        Some(addresses) if !addresses.is_empty() => {
            Some(resolve_addresses(addresses, salutation_id, false)?)
        }
        _ => None,
    };

    let mut body = json!({
        "customerNumber": fields.customer_number,
        "email": fields.email,
        "firstName": fields.first_name,
        "lastName": fields.last_name,
        "groupId": fields.group,
        "languageId": fields.language,
        "defaultPaymentMethodId": fields.payment_method,
        "salesChannelId": fields.sales_channel,
    });
    if let (Some(resolved), Some(map)) = (resolved, body.as_object_mut()) {
        map.insert("addresses".into(), JsonValue::Array(resolved.addresses));
        map.insert("defaultShippingAddressId".into(), json!(resolved.default_shipping));
        map.insert("defaultBillingAddressId".into(), json!(resolved.default_billing));
    }
    prune(&mut body);

    if body.as_object().is_some_and(|m| m.is_empty()) {
        warn!(id, "No customer fields to update");
    } else {
        ctx.transport
            .api_request(Method::PATCH, &format!("/customer/{id}"), body, &[])
            .await?;
        info!(id, "Updated customer");
    }

    fetch_customer(ctx, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use pretty_assertions::assert_eq;

    fn address(shipping: bool, billing: bool) -> AddressInput {
        AddressInput {
            country: "de".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            city: "Berlin".into(),
            street: "Main 1".into(),
            default_shipping_address: shipping,
            default_billing_address: billing,
        }
    }

    fn create_params(addresses: JsonValue) -> CreateCustomerParams {
        serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "customerNumber": "10001",
            "paymentMethod": "pm1",
            "language": "",
            "salesChannel": "sc1",
            "group": "g1",
            "addresses": addresses,
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_addresses_picks_defaults() {
        let resolved = resolve_addresses(
            &[address(true, false), address(false, true)],
            Some("sal"),
            true,
        )
        .unwrap();

        assert_eq!(resolved.addresses.len(), 2);
        assert_eq!(
            resolved.default_shipping.as_deref(),
            resolved.addresses[0]["id"].as_str()
        );
        assert_eq!(
            resolved.default_billing.as_deref(),
            resolved.addresses[1]["id"].as_str()
        );
        assert_eq!(resolved.addresses[0]["salutationId"], "sal");
    }

    #[test]
    fn test_resolve_addresses_rules() {
        let missing = resolve_addresses(&[], None, true).unwrap_err();
        assert_eq!(missing.to_string(), "Missing default address");

        let duplicate =
            resolve_addresses(&[address(true, true), address(true, false)], None, true)
                .unwrap_err();
        assert_eq!(duplicate.to_string(), "Duplicate default shipping address");

        let duplicate =
            resolve_addresses(&[address(true, true), address(false, true)], None, true)
                .unwrap_err();
        assert_eq!(duplicate.to_string(), "Duplicate default billing address");

        let no_billing = resolve_addresses(&[address(true, false)], None, true).unwrap_err();
        assert_eq!(no_billing.to_string(), "Missing default billing address");

        let optional = resolve_addresses(&[address(false, false)], None, false).unwrap();
        assert_eq!(optional.default_shipping, None);
    }

    #[tokio::test]
    async fn test_create_posts_and_refetches() {
        let transport = FakeTransport::new()
            .on(Method::POST, "/customer", JsonValue::Null)
            .on(
                Method::POST,
                "/search/customer",
                json!({ "data": [{ "id": "c1", "customerNumber": "10001" }] }),
            );
        let ctx = Context::new(&transport);

        let params = create_params(json!({ "address": [{
            "country": "de", "firstName": "Ada", "lastName": "Lovelace",
            "city": "Berlin", "street": "Main 1",
            "defaultShippingAddress": true, "defaultBillingAddress": true
        }] }));
        let result = create(&ctx, params).await.unwrap();
        assert_eq!(result, vec![json!({ "id": "c1", "customerNumber": "10001" })]);

        let body = &transport.bodies(Method::POST, "/customer")[0];
        assert!(body.get("languageId").is_none());
        assert_eq!(body["groupId"], "g1");
        assert_eq!(body["defaultPaymentMethodId"], "pm1");
        let address_id = &body["addresses"][0]["id"];
        assert_eq!(&body["defaultShippingAddressId"], address_id);
        assert_eq!(&body["defaultBillingAddressId"], address_id);
        assert!(body["addresses"][0].get("salutationId").is_none());

        let search = &transport.bodies(Method::POST, "/search/customer")[0];
        assert_eq!(search["filter"][0]["value"], body["id"]);
    }

    #[tokio::test]
    async fn test_create_rejects_email_before_requests() {
        let transport = FakeTransport::new();
        let ctx = Context::new(&transport);
        let mut params = create_params(JsonValue::Null);
        params.email = "not-an-email".into();

        let err = create(&ctx, params).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let transport =
            FakeTransport::new().on(Method::POST, "/search/customer", json!({ "data": [] }));
        let ctx = Context::new(&transport);
        let params: UpdateCustomerParams = serde_json::from_value(json!({
            "id": "c404",
            "updateFields": { "firstName": "Grace" }
        }))
        .unwrap();

        let err = update(&ctx, params).await.unwrap_err();
        assert_eq!(err.to_string(), "Customer does not exist");
        assert_eq!(transport.count(Method::PATCH, "/customer/c404"), 0);
    }

    #[tokio::test]
    async fn test_update_adds_addresses_with_salutation() {
        let transport = FakeTransport::new()
            .on(
                Method::POST,
                "/search/customer",
                json!({ "data": [{ "id": "c1", "salutationId": "sal" }] }),
            )
            .on(Method::PATCH, "/customer/c1", JsonValue::Null);
        let ctx = Context::new(&transport);
        let params: UpdateCustomerParams = serde_json::from_value(json!({
            "id": "c1",
            "updateFields": {
                "lastName": "Hopper",
                "email": "",
                "addresses": { "address": [{
                    "country": "us", "firstName": "Grace", "lastName": "Hopper",
                    "city": "Arlington", "street": "Navy 1"
                }] }
            }
        }))
        .unwrap();

        update(&ctx, params).await.unwrap();

        let body = &transport.bodies(Method::PATCH, "/customer/c1")[0];
        assert_eq!(body["lastName"], "Hopper");
        assert!(body.get("email").is_none());
        assert!(body.get("defaultShippingAddressId").is_none());
        assert_eq!(body["addresses"][0]["salutationId"], "sal");
        assert_eq!(body["addresses"][0]["countryId"], "us");
    }

    #[tokio::test]
    async fn test_update_validates_email() {
        let transport = FakeTransport::new();
        let ctx = Context::new(&transport);
        let params: UpdateCustomerParams = serde_json::from_value(json!({
            "id": "c1",
            "updateFields": { "email": "nope" }
        }))
        .unwrap();

        assert!(update(&ctx, params).await.unwrap_err().is_operation());
        assert!(transport.requests().is_empty());
    }
}
