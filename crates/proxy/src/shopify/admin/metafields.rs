//! Metafield reads and writes for the Admin API.

use tracing::{debug, instrument};

use super::{
    AdminClient, AdminShopifyError,
    conversions::{convert_metafield_entries, convert_stock_document},
    queries::{
        MetafieldsSet, OwnerMetafield, OwnerMetafields, ProductStockDocument, metafields_set,
        owner_metafield, owner_metafields, product_stock_document,
    },
};
use crate::shopify::types::{self, MetafieldEntry, MetafieldWrite};


impl AdminClient {
    /// Read one metafield value from a product or variant.
    ///
    /// Returns `Ok(None)` when the owner exists but the metafield is unset.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the owner does not exist.
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn get_metafield(
        &self,
        owner_id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, AdminShopifyError> {
        let variables = owner_metafield::Variables {
            id: owner_id.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
        };

        let response = self.execute::<OwnerMetafield>(variables).await?;

        let node = response
            .node
            .ok_or_else(|| AdminShopifyError::NotFound(format!("owner {owner_id}")))?;
        Ok(node.metafield.map(|m| m.value))
    }

    /// Read the named metafields of an owner.
    ///
    /// Unset metafields are absent from the result. Other metafields in the
    /// namespace are never fetched, so the read does not depend on how many
    /// the owner carries.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the owner does not exist.
    #[instrument(skip(self, keys), fields(owner_id = %owner_id, keys = keys.len()))]
    pub async fn get_metafields(
        &self,
        owner_id: &str,
        namespace: &str,
        keys: &[&str],
    ) -> Result<Vec<MetafieldEntry>, AdminShopifyError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let variables = owner_metafields::Variables {
            id: owner_id.to_string(),
            keys: keys.iter().map(|k| format!("{namespace}.{k}")).collect(),
            first: i64::try_from(keys.len()).unwrap_or(i64::MAX),
        };

        let response = self.execute::<OwnerMetafields>(variables).await?;

        let node = response
            .node
            .ok_or_else(|| AdminShopifyError::NotFound(format!("owner {owner_id}")))?;
        Ok(convert_metafield_entries(node.metafields))
    }

    /// Get a product by handle together with one of its metafields.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if no product has this handle.
    #[instrument(skip(self))]
    pub async fn get_product_stock_document(
        &self,
        handle: &str,
        namespace: &str,
        key: &str,
    ) -> Result<types::ProductStockDocument, AdminShopifyError> {
        let variables = product_stock_document::Variables {
            handle: handle.to_string(),
            namespace: namespace.to_string(),
            key: key.to_string(),
        };

        let response = self.execute::<ProductStockDocument>(variables).await?;

        response
            .product_by_identifier
            .map(convert_stock_document)
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product with handle '{handle}'")))
    }

    /// Write metafields in one `metafieldsSet` call.
    ///
    /// Returns the ids of the written metafields.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::UserError` with the first user error when
    /// Shopify rejects the input. Remaining user errors are logged at debug.
    #[instrument(skip(self, writes), fields(count = writes.len()))]
    pub async fn set_metafields(
        &self,
        writes: &[MetafieldWrite],
    ) -> Result<Vec<String>, AdminShopifyError> {
        let variables = metafields_set::Variables {
            metafields: writes
                .iter()
                .map(|w| metafields_set::MetafieldsSetInput {
                    owner_id: w.owner_id.clone(),
                    namespace: w.namespace.clone(),
                    key: w.key.clone(),
                    type_: w.kind.as_str().to_string(),
                    value: w.value.clone(),
                })
                .collect(),
        };

        let response = self.execute::<MetafieldsSet>(variables).await?;

        let payload = response.metafields_set.ok_or_else(|| {
            AdminShopifyError::UserError("No response from metafieldsSet".to_string())
        })?;

        let mut user_errors = payload.user_errors.into_iter();
        if let Some(first) = user_errors.next() {
            for rest in user_errors {
                debug!(field = ?rest.field, code = ?rest.code, message = %rest.message, "Dropped metafieldsSet user error");
            }
            return Err(AdminShopifyError::UserError(first.message));
        }

        Ok(payload
            .metafields
            .unwrap_or_default()
            .into_iter()
            .map(|m| m.id)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{RetryPolicy, ShopifyAdminConfig};

    fn client(server: &MockServer) -> AdminClient {
        AdminClient::new(&ShopifyAdminConfig {
            store: "mundo-in.myshopify.com".to_string(),
            base_url: server.uri(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test_token"),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                attempts: 3,
                delay: Duration::ZERO,
            },
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_metafields_surfaces_first_user_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "MetafieldsSet"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"metafieldsSet": {
                    "metafields": [],
                    "userErrors": [
                        {"field": ["metafields", "0", "value"], "message": "Value is invalid JSON", "code": "INVALID_VALUE"},
                        {"field": null, "message": "Second problem", "code": null}
                    ]
                }}
            })))
            .mount(&server)
            .await;

        let write = MetafieldWrite::json("gid://shopify/Product/1", "custom", "sucursales", "{".to_string());
        let err = client(&server).set_metafields(&[write]).await.unwrap_err();
        assert!(matches!(err, AdminShopifyError::UserError(ref m) if m == "Value is invalid JSON"));
        // user errors are never retried
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_metafields_sends_typed_inputs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"metafields": [
                {"ownerId": "gid://shopify/Product/1", "key": "suc_centro", "type": "number_integer", "value": "5"}
            ]}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"metafieldsSet": {
                    "metafields": [{"id": "gid://shopify/Metafield/9", "key": "suc_centro"}],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let write = MetafieldWrite::integer("gid://shopify/Product/1", "custom", "suc_centro", 5);
        let ids = client(&server).set_metafields(&[write]).await.unwrap();
        assert_eq!(ids, vec!["gid://shopify/Metafield/9".to_string()]);
    }

    #[tokio::test]
    async fn test_get_metafield_unset_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"node": {"id": "gid://shopify/Product/1", "metafield": null}}
            })))
            .mount(&server)
            .await;

        let value = client(&server)
            .get_metafield("gid://shopify/Product/1", "custom", "sucursales")
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_get_metafield_missing_owner_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"node": null}})))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_metafield("gid://shopify/Product/404", "custom", "sucursales")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminShopifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_metafields_asks_for_named_keys() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {
                "keys": ["custom.stock_por_sucursal", "custom.suc_centro"],
                "first": 2
            }})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"node": {"id": "gid://shopify/Product/1", "metafields": {"nodes": [
                    {"key": "stock_por_sucursal", "value": "3"},
                    {"key": "suc_centro", "value": "7"}
                ]}}}
            })))
            .mount(&server)
            .await;

        let entries = client(&server)
            .get_metafields("gid://shopify/Product/1", "custom", &["stock_por_sucursal", "suc_centro"])
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key, "suc_centro");
        assert_eq!(entries[1].value, "7");
    }

    #[tokio::test]
    async fn test_get_metafields_without_keys_skips_request() {
        let server = MockServer::start().await;

        let entries = client(&server)
            .get_metafields("gid://shopify/Product/1", "custom", &[])
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
