//! Field lists requested from the Admin API
//!
//! Used both as `fields` and as `includes` in search bodies.

use crate::types::Resource;

pub const CUSTOMER_FIELDS: &[&str] = &[
    "id",
    "customerNumber",
    "firstName",
    "lastName",
    "email",
    "company",
    "active",
    "guest",
    "birthday",
    "createdAt",
    "updatedAt",
    "groupId",
    "salesChannelId",
    "languageId",
    "defaultBillingAddressId",
    "defaultShippingAddressId",
    "defaultPaymentMethodId",
    "lastLogin",
    "orderCount",
    "orderTotalAmount",
];

pub const PRODUCT_FIELDS: &[&str] = &[
    "id",
    "parentId",
    "manufacturerId",
    "active",
    "displayGroup",
    "ratingAverage",
    "weight",
    "width",
    "height",
    "length",
    "productNumber",
    "name",
    "description",
    "available",
    "availableStock",
    "stock",
    "price",
    "categoryIds",
    "ean",
    "createdAt",
    "updatedAt",
];

pub const CATEGORY_FIELDS: &[&str] = &[
    "id",
    "parentId",
    "afterCategoryId",
    "name",
    "description",
    "active",
    "visible",
    "childCount",
    "level",
    "path",
    "type",
    "createdAt",
    "updatedAt",
];

pub const ORDER_FIELDS: &[&str] = &[
    "id",
    "orderNumber",
    "orderDateTime",
    "billingAddressId",
    "salesChannelId",
    "languageId",
    "stateId",
    "amountTotal",
    "amountNet",
    "shippingTotal",
    "taxStatus",
    "currencyId",
    "currencyFactor",
    "createdAt",
    "updatedAt",
    "customerComment",
    "affiliateCode",
    "campaignCode",
];

pub const CURRENCY_FIELDS: &[&str] = &["id", "name", "factor", "isoCode"];

/// Customer fields needed to place an order on their behalf
pub const ORDER_CUSTOMER_FIELDS: &[&str] = &[
    "id",
    "firstName",
    "lastName",
    "email",
    "salutationId",
    "salesChannelId",
    "languageId",
    "defaultBillingAddressId",
    "defaultShippingAddressId",
];

pub const ORDER_ADDRESS_FIELDS: &[&str] =
    &["id", "countryId", "firstName", "lastName", "street", "city"];

pub const LINE_ITEM_FIELDS: &[&str] = &["id", "name", "states", "price", "taxId"];

// ============================================================================
// Dropdown Option Fields
// ============================================================================

/// First field is the option value, second its label
pub const GENERIC_OPTION_FIELDS: &[&str] = &["id", "name"];

pub const CURRENCY_OPTION_FIELDS: &[&str] = &["id", "isoCode"];

/// Order currencies carry everything an order needs, joined into the value
pub const ORDER_CURRENCY_OPTION_FIELDS: &[&str] =
    &["id", "isoCode", "factor", "itemRounding", "totalRounding"];

pub const TAX_OPTION_FIELDS: &[&str] = &["id", "name", "taxRate"];

pub const SALUTATION_OPTION_FIELDS: &[&str] = &["id", "displayName", "salutationKey"];

/// Fields returned for a resource when no subset is requested
pub fn default_fields(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Customer => CUSTOMER_FIELDS,
        Resource::Product => PRODUCT_FIELDS,
        Resource::Order => ORDER_FIELDS,
        Resource::Category => CATEGORY_FIELDS,
    }
}
