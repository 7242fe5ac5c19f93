//! Common types used throughout the Shopware node
//!
//! This module contains shared type definitions, type aliases,
//! and the host-facing row types produced by every operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PATCH,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Resources & Operations
// ============================================================================

/// Admin API resource handled by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Customer,
    Product,
    Order,
    Category,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Customer,
        Resource::Product,
        Resource::Order,
        Resource::Category,
    ];

    /// Entity name as used in Admin API paths and search `includes`
    pub fn entity(self) -> &'static str {
        match self {
            Resource::Customer => "customer",
            Resource::Product => "product",
            Resource::Order => "order",
            Resource::Category => "category",
        }
    }

    /// Human-readable label used in result messages
    pub fn label(self) -> &'static str {
        match self {
            Resource::Customer => "Customer",
            Resource::Product => "Product",
            Resource::Order => "Order",
            Resource::Category => "Category",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Resource::Customer),
            "product" => Ok(Resource::Product),
            "order" => Ok(Resource::Order),
            "category" => Ok(Resource::Category),
            other => Err(Error::operation(format!("Unknown resource '{other}'"))),
        }
    }
}

/// Operation requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Create,
    Get,
    GetMany,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Get,
        Operation::GetMany,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::GetMany => "getMany",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Accepts the plain names and the per-resource delete aliases
    /// (`deleteCustomer`, `deleteProduct`, ...) the host sends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Operation::Create),
            "get" => Ok(Operation::Get),
            "getMany" | "get_many" | "get-many" => Ok(Operation::GetMany),
            "update" => Ok(Operation::Update),
            "delete" | "deleteCustomer" | "deleteProduct" | "deleteOrder" | "deleteCategory" => {
                Ok(Operation::Delete)
            }
            other => Err(Error::operation(format!("Unknown operation '{other}'"))),
        }
    }
}

// ============================================================================
// Host Rows
// ============================================================================

/// Link from an output row back to the input item that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output row returned to the workflow host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionItem {
    pub json: JsonValue,
    pub paired_item: PairedItem,
}

impl ExecutionItem {
    pub fn new(json: JsonValue, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    /// Error row emitted when continue-on-fail is enabled
    pub fn error(message: impl Into<String>, item: usize) -> Self {
        Self::new(serde_json::json!({ "error": message.into() }), item)
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some()
    }
}

/// Dropdown option returned by the load-options methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub name: String,
    pub value: String,
}

impl OptionEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
