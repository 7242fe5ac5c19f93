//! Node execution
//!
//! The host hands the node a resource, an operation and a list of input items.
//! Each item is turned into a typed [`Command`] and run in order; its records
//! become output rows paired with the item.
//!
//! ```text
//! items ──► Command::parse ──► Command::run ──► ExecutionItem { json, pairedItem }
//!                 │                  │
//!                 └── Operation ─────┴── Api (wrapped with the item index)
//! ```

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::resources::common::{self, DeleteParams, GetManyParams, GetParams};
use crate::resources::params::from_item;
use crate::resources::{category, customer, order, product, Context};
use crate::types::{ExecutionItem, JsonValue, Operation, Resource};

/// One input item's work, with its parameters already typed
#[derive(Debug, Clone)]
pub enum Command {
    CreateCustomer(customer::CreateCustomerParams),
    UpdateCustomer(customer::UpdateCustomerParams),
    CreateProduct(product::CreateProductParams),
    UpdateProduct(product::UpdateProductParams),
    CreateOrder(order::CreateOrderParams),
    UpdateOrder(order::UpdateOrderParams),
    CreateCategory(category::CreateCategoryParams),
    UpdateCategory(category::UpdateCategoryParams),
    Get(Resource, GetParams),
    GetMany(Resource, GetManyParams),
    Delete(Resource, DeleteParams),
}

impl Command {
    /// Build a command from the host's resource and operation names and one item
    pub fn parse(resource: &str, operation: &str, params: &JsonValue) -> Result<Self> {
        let unknown = || Error::UnknownCommand {
            resource: resource.to_string(),
            operation: operation.to_string(),
        };
        let resource: Resource = resource.parse().map_err(|_| unknown())?;
        let operation: Operation = operation.parse().map_err(|_| unknown())?;

        Ok(match (resource, operation) {
            (Resource::Customer, Operation::Create) => Command::CreateCustomer(from_item(params)?),
            (Resource::Customer, Operation::Update) => Command::UpdateCustomer(from_item(params)?),
            (Resource::Product, Operation::Create) => Command::CreateProduct(from_item(params)?),
            (Resource::Product, Operation::Update) => Command::UpdateProduct(from_item(params)?),
            (Resource::Order, Operation::Create) => Command::CreateOrder(from_item(params)?),
            (Resource::Order, Operation::Update) => Command::UpdateOrder(from_item(params)?),
            (Resource::Category, Operation::Create) => Command::CreateCategory(from_item(params)?),
            (Resource::Category, Operation::Update) => Command::UpdateCategory(from_item(params)?),
            (resource, Operation::Get) => Command::Get(resource, from_item(params)?),
            (resource, Operation::GetMany) => Command::GetMany(resource, from_item(params)?),
            (resource, Operation::Delete) => Command::Delete(resource, from_item(params)?),
        })
    }

    /// Run the command, returning the records it produced
    pub async fn run(self, ctx: &Context<'_>) -> Result<Vec<JsonValue>> {
        match self {
            Command::CreateCustomer(p) => customer::create(ctx, p).await,
            Command::UpdateCustomer(p) => customer::update(ctx, p).await,
            Command::CreateProduct(p) => product::create(ctx, p).await,
            Command::UpdateProduct(p) => product::update(ctx, p).await,
            Command::CreateOrder(p) => order::create(ctx, p).await,
            Command::UpdateOrder(p) => order::update(ctx, p).await,
            Command::CreateCategory(p) => category::create(ctx, p).await,
            Command::UpdateCategory(p) => category::update(ctx, p).await,
            Command::Get(resource, p) => common::get(ctx, resource, p).await,
            Command::GetMany(resource, p) => common::get_many(ctx, resource, p).await,
            Command::Delete(resource, p) => Ok(vec![common::delete(ctx, resource, p).await?]),
        }
    }
}

/// The Shopware node bound to one shop
pub struct ShopwareNode<T: Transport> {
    transport: T,
    continue_on_fail: bool,
}

impl<T: Transport> ShopwareNode<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            continue_on_fail: false,
        }
    }

    /// Emit an error row for a failing item instead of stopping the run
    #[must_use]
    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `operation` on `resource` for every input item, in order.
    ///
    /// Without continue-on-fail the first failing item aborts the run with an
    /// error carrying its index.
    pub async fn execute(
        &self,
        resource: &str,
        operation: &str,
        items: &[JsonValue],
    ) -> Result<Vec<ExecutionItem>> {
        let ctx = Context::new(&self.transport);
        let mut rows = Vec::new();

        for (index, item) in items.iter().enumerate() {
            let outcome = match Command::parse(resource, operation, item) {
                Ok(command) => command.run(&ctx).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(records) => {
                    debug!(index, records = records.len(), "Item done");
                    rows.extend(records.into_iter().map(|r| ExecutionItem::new(r, index)));
                }
                Err(e) if self.continue_on_fail => {
                    let e = e.into_api(index);
                    warn!(index, error = %e, "Item failed, continuing");
                    rows.push(ExecutionItem::error(e.to_string(), index));
                }
                Err(e) => return Err(e.into_api(index)),
            }
        }

        info!(resource, operation, items = items.len(), rows = rows.len(), "Execution complete");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use crate::types::Method;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_known_commands() {
        let command = Command::parse("customer", "get", &json!({ "id": "c1" })).unwrap();
        assert!(matches!(command, Command::Get(Resource::Customer, _)));

        let command = Command::parse("order", "deleteOrder", &json!({ "id": "o1" })).unwrap();
        assert!(matches!(command, Command::Delete(Resource::Order, _)));
    }

    #[test]
    fn test_parse_unknown_pair() {
        let err = Command::parse("invoice", "create", &json!({})).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));

        let err = Command::parse("customer", "archive", &json!({})).unwrap_err();
        assert!(err.is_operation());
    }

    #[test]
    fn test_parse_bad_parameters_is_operation_error() {
        let err = Command::parse("category", "create", &json!({ "parent": "yes" })).unwrap_err();
        assert!(err.is_operation());
        assert_eq!(err.to_string(), "Invalid parameters");
    }

    #[tokio::test]
    async fn test_execute_pairs_rows_with_items() {
        let transport = FakeTransport::new()
            .on(Method::DELETE, "/category/c1", JsonValue::Null)
            .on(Method::DELETE, "/category/c2", JsonValue::Null);
        let node = ShopwareNode::new(transport);

        let rows = node
            .execute("category", "delete", &[json!({ "id": "c1" }), json!({ "id": "c2" })])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].paired_item.item, 1);
        assert_eq!(rows[1].json["message"], "Category c2 deleted successfully");
    }

    #[tokio::test]
    async fn test_execute_stops_on_first_failure() {
        let transport = FakeTransport::new()
            .fail(Method::DELETE, "/product/p1", 404, r#"{"errors":[{"detail":"Not found"}]}"#)
            .on(Method::DELETE, "/product/p2", JsonValue::Null);
        let node = ShopwareNode::new(transport);

        let err = node
            .execute("product", "delete", &[json!({ "id": "p1" }), json!({ "id": "p2" })])
            .await
            .unwrap_err();

        match err {
            Error::Api { status, item_index, .. } => {
                assert_eq!(status, Some(404));
                assert_eq!(item_index, Some(0));
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert_eq!(node.transport().count(Method::DELETE, "/product/p2"), 0);
    }

    #[tokio::test]
    async fn test_execute_continue_on_fail_emits_error_rows() {
        let transport = FakeTransport::new().on(Method::DELETE, "/product/p2", JsonValue::Null);
        let node = ShopwareNode::new(transport).with_continue_on_fail(true);

        let rows = node
            .execute("product", "delete", &[json!({ "id": "" }), json!({ "id": "p2" })])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_error());
        assert_eq!(rows[0].json["error"], "The 'id' parameter is required");
        assert_eq!(rows[0].paired_item.item, 0);
        assert!(!rows[1].is_error());
    }
}
