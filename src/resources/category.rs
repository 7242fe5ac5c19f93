//! Category create / update

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::common::{new_id, prune, require_by_id, require_id};
use super::fields::CATEGORY_FIELDS;
use super::params::{empty_as_none, CategoryOption, FixedCollection};
use super::Context;
use crate::error::{Error, Result};
use crate::search::{search, SearchBody};
use crate::types::{JsonValue, Method, Resource};

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildCategory {
    pub category_name: String,
    pub category_description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryParams {
    /// Top-level category
    #[serde(default = "yes")]
    pub parent: bool,
    /// For a child: create its parent inline instead of referencing one
    #[serde(default = "yes")]
    pub create_parent: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub parent_category_name: String,
    #[serde(default)]
    pub parent_category_description: String,
    pub category_name: String,
    #[serde(default)]
    pub category_description: String,
    #[serde(default)]
    pub children: FixedCollection<ChildCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryUpdateFields {
    pub active: Option<bool>,
    #[serde(deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryParams {
    pub id: String,
    #[serde(default)]
    pub update_fields: CategoryUpdateFields,
}

fn parent_reference(value: Option<&str>) -> Result<String> {
    let value = value.ok_or_else(|| {
        Error::operation_with_description(
            "Missing parent category",
            "Select the parent category or create a new one",
        )
    })?;
    Ok(value.parse::<CategoryOption>()?.id)
}

async fn fetch_category(ctx: &Context<'_>, id: &str) -> Result<Vec<JsonValue>> {
    let body = SearchBody::new(Resource::Category.entity(), CATEGORY_FIELDS).equals("id", id);
    search(ctx.transport, Resource::Category.entity(), &body).await
}

pub async fn create(ctx: &Context<'_>, params: CreateCategoryParams) -> Result<Vec<JsonValue>> {
    let (parent_id, parent) = match (params.parent, params.create_parent) {
        (true, _) => (None, JsonValue::Null),
        (false, true) => (
            None,
            json!({
                "name": params.parent_category_name,
                "description": params.parent_category_description,
            }),
        ),
        (false, false) => (Some(parent_reference(params.parent_id.as_deref())?), JsonValue::Null),
    };

    let children: Vec<JsonValue> = params
        .children
        .iter()
        .map(|c| json!({ "name": c.category_name, "description": c.category_description }))
        .collect();

    let id = new_id();
    let mut body = json!({
        "id": id,
        "name": params.category_name,
        "description": params.category_description,
        "parentId": parent_id,
        "parent": parent,
        "children": children,
    });
    prune(&mut body);

    ctx.transport
        .api_request(Method::POST, "/category", body, &[])
        .await?;
    info!(id, "Created category");

    fetch_category(ctx, &id).await
}

pub async fn update(ctx: &Context<'_>, params: UpdateCategoryParams) -> Result<Vec<JsonValue>> {
    let id = require_id(&params.id)?;
    let fields = params.update_fields;
    let parent_id = fields
        .parent_id
        .as_deref()
        .map(|p| parent_reference(Some(p)))
        .transpose()?;

    require_by_id(ctx, Resource::Category, &["id"], id).await?;

    let mut body = json!({
        "active": fields.active,
        "description": fields.description,
        "name": fields.name,
        "parentId": parent_id,
    });
    prune(&mut body);

    if body.as_object().is_some_and(|m| m.is_empty()) {
        debug!(id, "No category fields to update");
    } else {
        ctx.transport
            .api_request(Method::PATCH, &format!("/category/{id}"), body, &[])
            .await?;
        info!(id, "Updated category");
    }

    fetch_category(ctx, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use pretty_assertions::assert_eq;

    fn transport() -> FakeTransport {
        FakeTransport::new()
            .on(Method::POST, "/category", JsonValue::Null)
            .on(
                Method::POST,
                "/search/category",
                json!({ "data": [{ "id": "cat", "name": "Mugs" }] }),
            )
    }

    fn params(value: JsonValue) -> CreateCategoryParams {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_top_level_with_children() {
        let transport = transport();
        let ctx = Context::new(&transport);

        create(
            &ctx,
            params(json!({
                "categoryName": "Mugs",
                "categoryDescription": "",
                "children": { "category": [
                    { "categoryName": "Big", "categoryDescription": "Large mugs" }
                ] }
            })),
        )
        .await
        .unwrap();

        let body = &transport.bodies(Method::POST, "/category")[0];
        assert_eq!(body["name"], "Mugs");
        assert!(body.get("description").is_none());
        assert!(body.get("parentId").is_none());
        assert!(body.get("parent").is_none());
        assert_eq!(
            body["children"],
            json!([{ "name": "Big", "description": "Large mugs" }])
        );

        let search = &transport.bodies(Method::POST, "/search/category")[0];
        assert_eq!(search["filter"][0]["value"], body["id"]);
    }

    #[tokio::test]
    async fn test_create_child_of_existing_parent() {
        let transport = transport();
        let ctx = Context::new(&transport);

        create(
            &ctx,
            params(json!({
                "parent": false,
                "createParent": false,
                "parentId": "p1-Kitchen",
                "categoryName": "Mugs"
            })),
        )
        .await
        .unwrap();

        let body = &transport.bodies(Method::POST, "/category")[0];
        assert_eq!(body["parentId"], "p1");
        assert!(body.get("children").is_none());
    }

    #[tokio::test]
    async fn test_create_child_with_new_parent() {
        let transport = transport();
        let ctx = Context::new(&transport);

        create(
            &ctx,
            params(json!({
                "parent": false,
                "parentCategoryName": "Kitchen",
                "categoryName": "Mugs"
            })),
        )
        .await
        .unwrap();

        let body = &transport.bodies(Method::POST, "/category")[0];
        assert_eq!(body["parent"], json!({ "name": "Kitchen" }));
    }

    #[tokio::test]
    async fn test_create_child_requires_parent_reference() {
        let transport = transport();
        let ctx = Context::new(&transport);

        let err = create(
            &ctx,
            params(json!({ "parent": false, "createParent": false, "categoryName": "Mugs" })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Missing parent category");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let transport = FakeTransport::new()
            .on(Method::POST, "/search/category", json!({ "data": [{ "id": "c1" }] }))
            .on(Method::PATCH, "/category/c1", JsonValue::Null);
        let ctx = Context::new(&transport);
        let params: UpdateCategoryParams = serde_json::from_value(json!({
            "id": "c1",
            "updateFields": { "active": false, "name": "", "parentId": "p2-Garden" }
        }))
        .unwrap();

        update(&ctx, params).await.unwrap();

        assert_eq!(
            transport.bodies(Method::PATCH, "/category/c1")[0],
            json!({ "active": false, "parentId": "p2" })
        );
    }

    #[tokio::test]
    async fn test_update_without_fields_skips_patch() {
        let transport = FakeTransport::new()
            .on(Method::POST, "/search/category", json!({ "data": [{ "id": "c1" }] }))
            .on(Method::PATCH, "/category/c1", JsonValue::Null);
        let ctx = Context::new(&transport);
        let params: UpdateCategoryParams =
            serde_json::from_value(json!({ "id": "c1", "updateFields": { "name": "" } })).unwrap();

        let records = update(&ctx, params).await.unwrap();

        assert_eq!(records, vec![json!({ "id": "c1" })]);
        assert_eq!(transport.count(Method::PATCH, "/category/c1"), 0);
    }
}
