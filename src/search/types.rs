//! Search criteria types
//!
//! Serialize to the Admin API criteria format accepted by `POST /search/{entity}`.

use crate::error::Result;
use crate::pagination::PageRequest;
use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bounds of a range filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<JsonValue>,
}

/// One criteria filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchFilter {
    Equals {
        field: String,
        value: JsonValue,
    },
    EqualsAny {
        field: String,
        value: Vec<JsonValue>,
    },
    Range {
        field: String,
        parameters: RangeParameters,
    },
}

impl SearchFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn equals_any<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Self::EqualsAny {
            field: field.into(),
            value: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::range(
            field,
            RangeParameters {
                gte: Some(value.into()),
                ..RangeParameters::default()
            },
        )
    }

    pub fn lte(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::range(
            field,
            RangeParameters {
                lte: Some(value.into()),
                ..RangeParameters::default()
            },
        )
    }

    pub fn lt(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::range(
            field,
            RangeParameters {
                lt: Some(value.into()),
                ..RangeParameters::default()
            },
        )
    }

    pub fn range(field: impl Into<String>, parameters: RangeParameters) -> Self {
        Self::Range {
            field: field.into(),
            parameters,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::EqualsAny { field, .. } | Self::Range { field, .. } => {
                field
            }
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One sort criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// `POST /search/{entity}` request body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub includes: BTreeMap<String, Vec<String>>,

    /// `None` omits the key; `Some(vec![])` sends an explicit empty list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<SearchFilter>>,

    #[serde(skip_serializing_if = "JsonObject::is_empty")]
    pub associations: JsonObject,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
}

impl SearchBody {
    /// Body selecting `fields` of `entity`, listed both as `fields` and `includes`
    pub fn new<S: AsRef<str>>(entity: &str, fields: &[S]) -> Self {
        let fields: Vec<String> = fields.iter().map(|f| f.as_ref().to_string()).collect();
        let mut includes = BTreeMap::new();
        if !fields.is_empty() {
            includes.insert(entity.to_string(), fields.clone());
        }
        Self {
            fields,
            includes,
            ..Self::default()
        }
    }

    /// Additionally restrict the fields of an associated entity
    #[must_use]
    pub fn include<S: AsRef<str>>(mut self, entity: &str, fields: &[S]) -> Self {
        self.includes.insert(
            entity.to_string(),
            fields.iter().map(|f| f.as_ref().to_string()).collect(),
        );
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: SearchFilter) -> Self {
        self.filter.get_or_insert_with(Vec::new).push(filter);
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: Vec<SearchFilter>) -> Self {
        self.filter.get_or_insert_with(Vec::new).extend(filters);
        self
    }

    /// Shorthand for an `equals` filter
    #[must_use]
    pub fn equals(self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filter(SearchFilter::equals(field, value))
    }

    #[must_use]
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = Some(page.page);
        self.limit = Some(page.limit);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Load an association, with an optional nested criteria object
    #[must_use]
    pub fn association(mut self, name: impl Into<String>, criteria: JsonValue) -> Self {
        let criteria = if criteria.is_null() {
            JsonValue::Object(JsonObject::new())
        } else {
            criteria
        };
        self.associations.insert(name.into(), criteria);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            order,
        });
        self
    }

    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}
