//! GraphQL operation definitions for Shopify Admin API.
//!
//! Each operation is a unit struct implementing `graphql_client::GraphQLQuery`,
//! with its query text, `Variables` and `ResponseData` in a module of the same
//! name in snake case (the layout `#[derive(GraphQLQuery)]` generates). The
//! response types only declare the fields this proxy reads.

use graphql_client::{GraphQLQuery, QueryBody};

/// Implement `GraphQLQuery` for an operation struct backed by its module.
macro_rules! graphql_operation {
    ($name:ident, $module:ident) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Shared response fragments
// =============================================================================

pub mod fragments {
    use serde::Deserialize;

    /// `{ id handle title }` on Product.
    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductSummary {
        pub id: String,
        pub handle: String,
        pub title: String,
    }

    /// `{ id sku product { id handle title } }` on `ProductVariant`.
    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantSummary {
        pub id: String,
        pub sku: Option<String>,
        pub product: ProductSummary,
    }

    /// `{ value }` on Metafield.
    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldValue {
        pub value: String,
    }
}

// =============================================================================
// Identity queries
// =============================================================================

graphql_operation!(ProductByHandle, product_by_handle);

pub mod product_by_handle {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::ProductSummary;

    pub const OPERATION_NAME: &str = "ProductByHandle";
    pub const QUERY: &str = r"
        query ProductByHandle($handle: String!) {
            productByIdentifier(identifier: { handle: $handle }) {
                id
                handle
                title
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_by_identifier: Option<ProductSummary>,
    }
}

graphql_operation!(ProductById, product_by_id);

pub mod product_by_id {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::ProductSummary;

    pub const OPERATION_NAME: &str = "ProductById";
    pub const QUERY: &str = r"
        query ProductById($id: ID!) {
            product(id: $id) {
                id
                handle
                title
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductSummary>,
    }
}

graphql_operation!(VariantById, variant_by_id);

pub mod variant_by_id {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::VariantSummary;

    pub const OPERATION_NAME: &str = "VariantById";
    pub const QUERY: &str = r"
        query VariantById($id: ID!) {
            productVariant(id: $id) {
                id
                sku
                product {
                    id
                    handle
                    title
                }
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variant: Option<VariantSummary>,
    }
}

graphql_operation!(VariantsBySku, variants_by_sku);

pub mod variants_by_sku {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::VariantSummary;

    pub const OPERATION_NAME: &str = "VariantsBySku";
    pub const QUERY: &str = r"
        query VariantsBySku($query: String!, $first: Int!) {
            productVariants(first: $first, query: $query) {
                nodes {
                    id
                    sku
                    product {
                        id
                        handle
                        title
                    }
                }
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub query: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_variants: VariantsBySkuProductVariants,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct VariantsBySkuProductVariants {
        pub nodes: Vec<VariantSummary>,
    }
}

// =============================================================================
// Metafield queries
// =============================================================================

graphql_operation!(OwnerMetafield, owner_metafield);

pub mod owner_metafield {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::MetafieldValue;

    pub const OPERATION_NAME: &str = "OwnerMetafield";
    pub const QUERY: &str = r"
        query OwnerMetafield($id: ID!, $namespace: String!, $key: String!) {
            node(id: $id) {
                ... on HasMetafields {
                    metafield(namespace: $namespace, key: $key) {
                        value
                    }
                }
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub node: Option<OwnerMetafieldNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OwnerMetafieldNode {
        #[serde(default)]
        pub metafield: Option<MetafieldValue>,
    }
}

graphql_operation!(OwnerMetafields, owner_metafields);

pub mod owner_metafields {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "OwnerMetafields";
    pub const QUERY: &str = r"
        query OwnerMetafields($id: ID!, $keys: [String!]!, $first: Int!) {
            node(id: $id) {
                ... on HasMetafields {
                    metafields(keys: $keys, first: $first) {
                        nodes {
                            key
                            value
                        }
                    }
                }
            }
        }
    ";

    /// `keys` are `namespace.key` identifiers.
    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
        pub keys: Vec<String>,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub node: Option<OwnerMetafieldsNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OwnerMetafieldsNode {
        #[serde(default)]
        pub metafields: Option<OwnerMetafieldsConnection>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OwnerMetafieldsConnection {
        pub nodes: Vec<OwnerMetafieldsEntry>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct OwnerMetafieldsEntry {
        pub key: String,
        pub value: String,
    }
}

graphql_operation!(ProductStockDocument, product_stock_document);

pub mod product_stock_document {
    use serde::{Deserialize, Serialize};

    pub use super::fragments::MetafieldValue;

    pub const OPERATION_NAME: &str = "ProductStockDocument";
    pub const QUERY: &str = r"
        query ProductStockDocument($handle: String!, $namespace: String!, $key: String!) {
            productByIdentifier(identifier: { handle: $handle }) {
                id
                handle
                title
                metafield(namespace: $namespace, key: $key) {
                    value
                }
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub product_by_identifier: Option<ProductStockDocumentProduct>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ProductStockDocumentProduct {
        pub id: String,
        pub handle: String,
        pub title: String,
        pub metafield: Option<MetafieldValue>,
    }
}

// =============================================================================
// Metafield mutations
// =============================================================================

graphql_operation!(MetafieldsSet, metafields_set);

pub mod metafields_set {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "MetafieldsSet";
    pub const QUERY: &str = r"
        mutation MetafieldsSet($metafields: [MetafieldsSetInput!]!) {
            metafieldsSet(metafields: $metafields) {
                metafields {
                    id
                }
                userErrors {
                    field
                    message
                    code
                }
            }
        }
    ";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub metafields: Vec<MetafieldsSetInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetInput {
        pub owner_id: String,
        pub namespace: String,
        pub key: String,
        #[serde(rename = "type")]
        pub type_: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafields_set: Option<MetafieldsSetMetafieldsSet>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldsSetMetafieldsSet {
        #[serde(default)]
        pub metafields: Option<Vec<MetafieldsSetMetafields>>,
        pub user_errors: Vec<MetafieldsSetUserErrors>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldsSetMetafields {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldsSetUserErrors {
        pub field: Option<Vec<String>>,
        pub message: String,
        pub code: Option<String>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_carries_operation_name() {
        let body = ProductByHandle::build_query(product_by_handle::Variables {
            handle: "cama-luton".to_string(),
        });
        assert_eq!(body.operation_name, "ProductByHandle");
        assert!(body.query.contains("productByIdentifier"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["handle"], "cama-luton");
        assert_eq!(json["operationName"], "ProductByHandle");
    }

    #[test]
    fn test_metafields_set_input_wire_names() {
        let body = MetafieldsSet::build_query(metafields_set::Variables {
            metafields: vec![metafields_set::MetafieldsSetInput {
                owner_id: "gid://shopify/Product/1".to_string(),
                namespace: "custom".to_string(),
                key: "sucursales".to_string(),
                type_: "json".to_string(),
                value: "[]".to_string(),
            }],
        });
        let json = serde_json::to_value(&body).unwrap();
        let input = &json["variables"]["metafields"][0];
        assert_eq!(input["ownerId"], "gid://shopify/Product/1");
        assert_eq!(input["type"], "json");
    }

    #[test]
    fn test_owner_metafields_requests_keys() {
        let body = OwnerMetafields::build_query(owner_metafields::Variables {
            id: "gid://shopify/Product/1".to_string(),
            keys: vec!["custom.suc_toluca".to_string()],
            first: 1,
        });
        assert!(body.query.contains("metafields(keys: $keys"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["keys"][0], "custom.suc_toluca");
    }

    #[test]
    fn test_owner_metafield_node_without_metafields_interface() {
        let data: owner_metafield::ResponseData =
            serde_json::from_str(r#"{"node": {}}"#).unwrap();
        assert!(data.node.unwrap().metafield.is_none());
    }
}
