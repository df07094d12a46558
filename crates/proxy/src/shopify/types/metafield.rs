//! Metafield domain types.

use serde::Serialize;

/// Metafield value types this proxy writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetafieldType {
    /// JSON document (list and matrix stock fields).
    Json,
    /// Integer stored as a decimal string (flat stock fields).
    NumberInteger,
    /// `"true"` / `"false"`.
    Boolean,
}

impl MetafieldType {
    /// Shopify's type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::NumberInteger => "number_integer",
            Self::Boolean => "boolean",
        }
    }
}

/// One metafield to write with `metafieldsSet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetafieldWrite {
    /// GID of the product or variant.
    pub owner_id: String,
    pub namespace: String,
    pub key: String,
    pub kind: MetafieldType,
    /// Value already encoded as Shopify expects it.
    pub value: String,
}

impl MetafieldWrite {
    /// A `json` metafield.
    #[must_use]
    pub fn json(owner_id: &str, namespace: &str, key: &str, value: String) -> Self {
        Self::new(owner_id, namespace, key, MetafieldType::Json, value)
    }

    /// A `number_integer` metafield.
    #[must_use]
    pub fn integer(owner_id: &str, namespace: &str, key: &str, value: u64) -> Self {
        Self::new(
            owner_id,
            namespace,
            key,
            MetafieldType::NumberInteger,
            value.to_string(),
        )
    }

    /// A `boolean` metafield.
    #[must_use]
    pub fn boolean(owner_id: &str, namespace: &str, key: &str, value: bool) -> Self {
        Self::new(
            owner_id,
            namespace,
            key,
            MetafieldType::Boolean,
            value.to_string(),
        )
    }

    fn new(owner_id: &str, namespace: &str, key: &str, kind: MetafieldType, value: String) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
            kind,
            value,
        }
    }
}

/// A metafield read back from Shopify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetafieldEntry {
    pub key: String,
    pub value: String,
}

/// A product with its matrix-shaped stock metafield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStockDocument {
    pub id: String,
    pub handle: String,
    pub title: String,
    /// Raw metafield value, `None` when the metafield is not set.
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_is_decimal_string() {
        let write = MetafieldWrite::integer("gid://shopify/Product/1", "custom", "suc_toluca", 12);
        assert_eq!(write.value, "12");
        assert_eq!(write.kind.as_str(), "number_integer");
    }

    #[test]
    fn test_boolean_encoding() {
        let write = MetafieldWrite::boolean("gid://shopify/Product/1", "custom", "buen_fin", true);
        assert_eq!(write.value, "true");
        assert_eq!(write.kind.as_str(), "boolean");
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(MetafieldType::Json.as_str(), "json");
    }
}
