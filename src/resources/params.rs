//! Parameter shapes shared by the operations
//!
//! The host resolves node parameters into JSON. Optional text parameters arrive
//! as `""` when unset, repeated groups arrive wrapped in an object keyed by the
//! group name, and dropdown values may pack several fields into one string.

use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::pricing::Rounding;
use crate::types::JsonValue;

// ============================================================================
// Repeated Groups
// ============================================================================

/// A repeated parameter group.
///
/// Accepts `{ "<group>": [...] }`, a bare array, `{}` and `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedCollection<T>(pub Vec<T>);

impl<T> Default for FixedCollection<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for FixedCollection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> IntoIterator for FixedCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for FixedCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => return Ok(Self::default()),
            list @ JsonValue::Array(_) => vec![list],
            JsonValue::Object(groups) => groups.into_iter().map(|(_, v)| v).collect(),
            other => {
                return Err(de::Error::custom(format!(
                    "expected a list of entries, got {other}"
                )))
            }
        };

        let mut items = Vec::new();
        for entry in entries {
            match entry {
                JsonValue::Null => {}
                JsonValue::Array(_) => {
                    items.extend(serde_json::from_value::<Vec<T>>(entry).map_err(de::Error::custom)?)
                }
                single => items.push(serde_json::from_value(single).map_err(de::Error::custom)?),
            }
        }
        Ok(Self(items))
    }
}

// ============================================================================
// Lenient Scalars
// ============================================================================

/// `""` and `null` are unset; numbers are read as their text
pub fn empty_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.trim().is_empty() => None,
        Some(JsonValue::String(s)) => Some(s.trim().to_string()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(de::Error::custom(format!("expected text, got {other}")));
        }
    })
}

/// Amount given as a number or numeric text; `""` and `null` are unset
pub fn lenient_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Decimal>, D::Error> {
    let text = match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(other) => return Err(de::Error::custom(format!("expected a number, got {other}"))),
    };
    parse_decimal(&text).map(Some).map_err(de::Error::custom)
}

/// Parse a decimal, accepting exponent notation
pub fn parse_decimal(text: &str) -> std::result::Result<Decimal, String> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("'{text}' is not a number"))
}

/// Email addresses must at least contain an `@`
pub fn validate_email(email: &str) -> Result<()> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(Error::operation_with_description(
            "Invalid email address",
            format!("The email address '{email}' in the 'email' field isn't valid"),
        ))
    }
}

/// Deserialize typed parameters from one input item
pub fn from_item<T: DeserializeOwned>(item: &JsonValue) -> Result<T> {
    serde_json::from_value(item.clone()).map_err(|e| {
        Error::operation_with_description("Invalid parameters", e.to_string())
    })
}

// ============================================================================
// Composite Dropdown Values
// ============================================================================

/// Order currency option: `id-isoCode-factor-{itemRounding}-{totalRounding}`
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyOption {
    pub id: String,
    pub iso_code: String,
    pub factor: Decimal,
    pub item_rounding: Rounding,
    pub total_rounding: Rounding,
}

impl FromStr for CurrencyOption {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || {
            Error::operation_with_description(
                "Invalid currency",
                format!("'{value}' is not a value from the currency list"),
            )
        };

        let mut parts = value.splitn(4, '-');
        let (Some(id), Some(iso_code), Some(factor), Some(roundings)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let (item, total) = roundings.split_once("}-{").ok_or_else(invalid)?;

        let item_rounding: Rounding =
            serde_json::from_str(&format!("{item}}}")).map_err(|_| invalid())?;
        let total_rounding: Rounding =
            serde_json::from_str(&format!("{{{total}")).map_err(|_| invalid())?;

        Ok(Self {
            id: id.to_string(),
            iso_code: iso_code.to_string(),
            factor: parse_decimal(factor).map_err(|_| invalid())?,
            item_rounding,
            total_rounding,
        })
    }
}

/// Tax option: `id-name-rate`
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRateOption {
    pub id: String,
    pub rate: Decimal,
}

impl FromStr for TaxRateOption {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || {
            Error::operation_with_description(
                "Invalid tax rate",
                format!("'{value}' is not a value from the tax rate list"),
            )
        };

        let (id, rest) = value.split_once('-').ok_or_else(invalid)?;
        let rate = rest.rsplit('-').next().ok_or_else(invalid)?;
        let rate = parse_decimal(rate).map_err(|_| invalid())?;
        if id.is_empty() || rate.is_sign_negative() {
            return Err(invalid());
        }
        Ok(Self {
            id: id.to_string(),
            rate,
        })
    }
}

/// Category option: `id-name`
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

impl FromStr for CategoryOption {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.split_once('-') {
            Some((id, name)) if !id.is_empty() => Ok(Self {
                id: id.to_string(),
                name: name.to_string(),
            }),
            None if !value.is_empty() => Ok(Self {
                id: value.to_string(),
                name: String::new(),
            }),
            _ => Err(Error::operation_with_description(
                "Invalid category",
                format!("'{value}' is not a value from the category list"),
            )),
        }
    }
}
