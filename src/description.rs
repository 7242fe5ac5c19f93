//! Node description
//!
//! What the host shows in its editor: the credential form, the resources and
//! operations, and the parameters each operation takes. Parameters backed by a
//! dropdown name the load-options method that fills it.

use serde::Serialize;

use crate::load_options::LoadOptionsMethod;
use crate::search::filter_names;
use crate::types::{Operation, Resource};

/// Kind of editor field a parameter is shown as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    DateTime,
    Options,
    MultiOptions,
    /// Repeated group of sub-fields
    FixedCollection,
    /// Optional fields, all under one key
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_options_method: Option<&'static str>,
}

const fn param(name: &'static str, kind: ParameterKind, required: bool) -> Parameter {
    Parameter {
        name,
        kind,
        required,
        load_options_method: None,
    }
}

const fn dropdown(
    name: &'static str,
    kind: ParameterKind,
    required: bool,
    method: &'static str,
) -> Parameter {
    Parameter {
        name,
        kind,
        required,
        load_options_method: Some(method),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescription {
    pub name: &'static str,
    pub parameters: Vec<Parameter>,
    /// Filter names accepted by `filters` (getMany only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub operations: Vec<OperationDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub version: &'static str,
    pub credentials: Vec<Parameter>,
    pub resources: Vec<ResourceDescription>,
    pub load_options_methods: Vec<&'static str>,
}

use ParameterKind as K;

const CREDENTIALS: &[Parameter] = &[
    param("domain", K::String, true),
    param("clientId", K::String, true),
    param("clientSecret", K::String, true),
];

const GET: &[Parameter] = &[
    param("id", K::String, true),
    param("filters", K::Collection, false),
];

const GET_MANY: &[Parameter] = &[
    param("returnAll", K::Boolean, false),
    param("limit", K::Number, false),
    param("filters", K::Collection, false),
];

const DELETE: &[Parameter] = &[param("id", K::String, true)];

const CUSTOMER_CREATE: &[Parameter] = &[
    param("firstName", K::String, true),
    param("lastName", K::String, true),
    param("email", K::String, true),
    param("customerNumber", K::String, false),
    dropdown("paymentMethod", K::Options, false, "getPaymentMethods"),
    dropdown("language", K::Options, false, "getLanguages"),
    dropdown("group", K::Options, false, "getCustomerGroups"),
    dropdown("salesChannel", K::Options, false, "getSalesChannels"),
    dropdown("addresses", K::FixedCollection, true, "getCountries"),
];

const CUSTOMER_UPDATE: &[Parameter] = &[
    param("id", K::String, true),
    param("updateFields", K::Collection, false),
    dropdown("updateFields.addresses", K::FixedCollection, false, "getCountries"),
    dropdown("updateFields.group", K::Options, false, "getCustomerGroups"),
    dropdown("updateFields.language", K::Options, false, "getLanguages"),
    dropdown("updateFields.paymentMethod", K::Options, false, "getPaymentMethods"),
    dropdown("updateFields.salesChannel", K::Options, false, "getSalesChannels"),
];

const PRODUCT_CREATE: &[Parameter] = &[
    param("parent", K::Boolean, false),
    param("parentId", K::String, false),
    param("productNumber", K::String, true),
    param("ean", K::String, false),
    param("name", K::String, true),
    param("description", K::String, false),
    param("defaultGrossPrice", K::Number, true),
    param("defaultAutoCalculateNet", K::Boolean, false),
    param("defaultNetPrice", K::Number, false),
    dropdown("prices", K::FixedCollection, false, "getCurrencies"),
    dropdown("taxRate", K::Options, true, "getTaxRates"),
    param("manufacturer", K::String, false),
    param("stock", K::Number, false),
    dropdown("categories", K::MultiOptions, false, "getCategories"),
    dropdown("salesChannels", K::MultiOptions, false, "getSalesChannels"),
    param("active", K::Boolean, false),
];

const PRODUCT_UPDATE: &[Parameter] = &[
    param("id", K::String, true),
    param("updateFields", K::Collection, false),
    dropdown("updateFields.categories", K::MultiOptions, false, "getCategories"),
    dropdown("updateFields.prices", K::FixedCollection, false, "getCurrencies"),
    dropdown("updateFields.salesChannels", K::MultiOptions, false, "getSalesChannels"),
    dropdown("updateFields.taxRate", K::Options, false, "getTaxRates"),
];

const CATEGORY_CREATE: &[Parameter] = &[
    param("parent", K::Boolean, false),
    param("createParent", K::Boolean, false),
    dropdown("parentId", K::Options, false, "getCategories"),
    param("parentCategoryName", K::String, false),
    param("parentCategoryDescription", K::String, false),
    param("categoryName", K::String, true),
    param("categoryDescription", K::String, false),
    param("children", K::FixedCollection, false),
];

const CATEGORY_UPDATE: &[Parameter] = &[
    param("id", K::String, true),
    param("updateFields", K::Collection, false),
    dropdown("updateFields.parentId", K::Options, false, "getCategories"),
];

const ORDER_CREATE: &[Parameter] = &[
    param("orderNumber", K::String, false),
    param("dateAndTime", K::DateTime, false),
    dropdown("currency", K::Options, true, "getOrderCurrencies"),
    dropdown("state", K::Options, true, "getOrderStates"),
    param("guestOrder", K::Boolean, false),
    dropdown("guestUi", K::FixedCollection, false, "getSalutations"),
    dropdown("billingAddressUi", K::FixedCollection, false, "getCountries"),
    dropdown("shippingAddressUi", K::FixedCollection, false, "getCountries"),
    dropdown("salesChannel", K::Options, false, "getSalesChannels"),
    param("customerNumber", K::String, false),
    param("lineItems", K::FixedCollection, true),
    dropdown("transactions.paymentMethod", K::Options, false, "getPaymentMethods"),
    dropdown("transactions.state", K::Options, false, "getTransactionStates"),
    dropdown("deliveries.shippingMethod", K::Options, false, "getShippingMethods"),
    dropdown("deliveries.state", K::Options, false, "getDeliveryStates"),
    dropdown("deliveries.addressUi", K::FixedCollection, false, "getCountries"),
];

const ORDER_UPDATE: &[Parameter] = &[
    param("id", K::String, true),
    param("updateFields", K::Collection, false),
    dropdown("updateFields.billingAddressUi", K::FixedCollection, false, "getCountries"),
    dropdown("updateFields.shippingAddressUi", K::FixedCollection, false, "getCountries"),
    param("updateFields.lineItems", K::FixedCollection, false),
    dropdown("updateFields.transactions.paymentMethod", K::Options, false, "getPaymentMethods"),
    dropdown("updateFields.transactions.state", K::Options, false, "getTransactionStates"),
    dropdown("updateFields.deliveries.shippingMethod", K::Options, false, "getShippingMethods"),
    dropdown("updateFields.deliveries.state", K::Options, false, "getDeliveryStates"),
    param("updateFields.state", K::Options, false),
];

fn parameters(resource: Resource, operation: Operation) -> &'static [Parameter] {
    match (resource, operation) {
        (_, Operation::Get) => GET,
        (_, Operation::GetMany) => GET_MANY,
        (_, Operation::Delete) => DELETE,
        (Resource::Customer, Operation::Create) => CUSTOMER_CREATE,
        (Resource::Customer, Operation::Update) => CUSTOMER_UPDATE,
        (Resource::Product, Operation::Create) => PRODUCT_CREATE,
        (Resource::Product, Operation::Update) => PRODUCT_UPDATE,
        (Resource::Category, Operation::Create) => CATEGORY_CREATE,
        (Resource::Category, Operation::Update) => CATEGORY_UPDATE,
        (Resource::Order, Operation::Create) => ORDER_CREATE,
        (Resource::Order, Operation::Update) => ORDER_UPDATE,
    }
}

/// Description of the whole node
pub fn description() -> NodeDescription {
    let resources = Resource::ALL
        .into_iter()
        .map(|resource| ResourceDescription {
            name: resource.entity(),
            display_name: resource.label(),
            operations: Operation::ALL
                .into_iter()
                .map(|operation| OperationDescription {
                    name: operation.as_str(),
                    parameters: parameters(resource, operation).to_vec(),
                    filters: if operation == Operation::GetMany {
                        filter_names(resource)
                    } else {
                        Vec::new()
                    },
                })
                .collect(),
        })
        .collect();

    NodeDescription {
        name: crate::NAME,
        display_name: "Shopware",
        version: crate::VERSION,
        credentials: CREDENTIALS.to_vec(),
        resources,
        load_options_methods: LoadOptionsMethod::ALL.map(LoadOptionsMethod::name).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Command;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_every_resource_has_every_operation() {
        let node = description();
        assert_eq!(node.resources.len(), 4);
        for resource in &node.resources {
            let names: Vec<_> = resource.operations.iter().map(|o| o.name).collect();
            assert_eq!(names, vec!["create", "get", "getMany", "update", "delete"]);
        }
    }

    #[test]
    fn test_described_operations_parse() {
        for resource in description().resources {
            for operation in resource.operations {
                let result = Command::parse(resource.name, operation.name, &json!({}));
                assert!(
                    !matches!(result, Err(crate::Error::UnknownCommand { .. })),
                    "{} {} is not routed",
                    resource.name,
                    operation.name
                );
            }
        }
    }

    #[test]
    fn test_load_options_methods_exist() {
        for resource in description().resources {
            for operation in resource.operations {
                for parameter in operation.parameters {
                    if let Some(method) = parameter.load_options_method {
                        assert!(method.parse::<LoadOptionsMethod>().is_ok(), "{method}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_credentials_and_filters_serialize() {
        let value = serde_json::to_value(description()).unwrap();
        assert_eq!(
            value["credentials"][1],
            json!({ "name": "clientId", "type": "string", "required": true })
        );
        let get_many = &value["resources"][2]["operations"][2];
        assert_eq!(get_many["name"], "getMany");
        assert!(get_many["filters"]
            .as_array()
            .unwrap()
            .contains(&json!("transactionState")));
        assert!(value["resources"][2]["operations"][0].get("filters").is_none());
    }
}
