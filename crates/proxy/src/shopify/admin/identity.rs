//! Identity resolution: handle, SKU or id to a remote GID.

use branch_stock_core::{Lookup, MatchedBy, ProductGid, SkuMatch, VariantGid, select_by_sku};
use tracing::{debug, instrument};

use super::{
    AdminClient, AdminShopifyError,
    conversions::{convert_product, convert_variant},
    queries::{
        ProductByHandle, ProductById, VariantById, VariantsBySku, product_by_handle,
        product_by_id, variant_by_id, variants_by_sku,
    },
};
use crate::shopify::types::{ResolvedProduct, ResolvedVariant};

/// Candidates fetched per SKU search.
const SKU_SEARCH_PAGE: i64 = 10;

impl AdminClient {
    /// Resolve a lookup to the product it names.
    ///
    /// Variant ids and SKUs resolve to the variant's product.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if nothing matches, or any
    /// transport/GraphQL error from the API.
    #[instrument(skip(self), fields(lookup = %lookup))]
    pub async fn resolve_product(
        &self,
        lookup: &Lookup,
        sku_match: SkuMatch,
    ) -> Result<ResolvedProduct, AdminShopifyError> {
        match lookup {
            Lookup::Handle(handle) => self.product_by_handle(handle).await,
            Lookup::Product(id) => self.product_by_id(id).await,
            Lookup::Variant(id) => Ok(self.variant_by_id(id).await?.product),
            Lookup::Sku(sku) => Ok(self.variant_by_sku(sku, sku_match).await?.product),
        }
    }

    /// Get a product by handle.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if no product has this handle.
    #[instrument(skip(self))]
    pub async fn product_by_handle(&self, handle: &str) -> Result<ResolvedProduct, AdminShopifyError> {
        let variables = product_by_handle::Variables {
            handle: handle.to_string(),
        };

        let response = self.execute::<ProductByHandle>(variables).await?;

        response
            .product_by_identifier
            .map(|p| convert_product(p, MatchedBy::Handle))
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product with handle '{handle}'")))
    }

    /// Get a product by GID.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_by_id(&self, id: &ProductGid) -> Result<ResolvedProduct, AdminShopifyError> {
        let variables = product_by_id::Variables {
            id: id.to_string(),
        };

        let response = self.execute::<ProductById>(variables).await?;

        response
            .product
            .map(|p| convert_product(p, MatchedBy::Id))
            .ok_or_else(|| AdminShopifyError::NotFound(format!("product {id}")))
    }

    /// Get a variant (and its product) by GID.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if the variant does not exist.
    #[instrument(skip(self), fields(variant_id = %id))]
    pub async fn variant_by_id(&self, id: &VariantGid) -> Result<ResolvedVariant, AdminShopifyError> {
        let variables = variant_by_id::Variables {
            id: id.to_string(),
        };

        let response = self.execute::<VariantById>(variables).await?;

        response
            .product_variant
            .map(|v| convert_variant(v, MatchedBy::Id))
            .ok_or_else(|| AdminShopifyError::NotFound(format!("variant {id}")))
    }

    /// Find a variant by SKU.
    ///
    /// Searches the first page of variants matching `sku:<sku>` and picks a
    /// candidate according to `sku_match`.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if no candidate is acceptable.
    #[instrument(skip(self))]
    pub async fn variant_by_sku(
        &self,
        sku: &str,
        sku_match: SkuMatch,
    ) -> Result<ResolvedVariant, AdminShopifyError> {
        let variables = variants_by_sku::Variables {
            query: sku_search_query(sku),
            first: SKU_SEARCH_PAGE,
        };

        let response = self.execute::<VariantsBySku>(variables).await?;
        let candidates = response.product_variants.nodes;

        let (chosen, matched_by) = select_by_sku(&candidates, sku, sku_match, |v| v.sku.as_deref())
            .ok_or_else(|| AdminShopifyError::NotFound(format!("variant with SKU '{sku}'")))?;

        debug!(
            candidates = candidates.len(),
            variant_id = %chosen.id,
            ?matched_by,
            "SKU resolved"
        );

        Ok(convert_variant(chosen.clone(), matched_by))
    }
}

/// Build the search syntax for an SKU, quoting it so spaces and colons
/// stay part of the value.
fn sku_search_query(sku: &str) -> String {
    let escaped = sku.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!("sku:\"{escaped}\"")
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

    async fn client(server: &MockServer) -> AdminClient {
        AdminClient::new(&ShopifyAdminConfig {
            store: "mundo-in.myshopify.com".to_string(),
            base_url: server.uri(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test_token"),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                attempts: 1,
                delay: Duration::ZERO,
            },
        })
        .unwrap()
    }

    fn variant(id: u64, sku: &str) -> serde_json::Value {
        json!({
            "id": format!("gid://shopify/ProductVariant/{id}"),
            "sku": sku,
            "product": {
                "id": format!("gid://shopify/Product/{id}0"),
                "handle": format!("product-{id}"),
                "title": format!("Product {id}")
            }
        })
    }

    async fn mount_sku_search(server: &MockServer, nodes: serde_json::Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "VariantsBySku"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"productVariants": {"nodes": nodes}}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_sku_search_query_quotes_value() {
        assert_eq!(sku_search_query(" CL-001 "), "sku:\"CL-001\"");
        assert_eq!(sku_search_query("A\"B"), "sku:\"A\\\"B\"");
    }

    #[tokio::test]
    async fn test_prefer_exact_skips_fuzzy_candidates() {
        let server = MockServer::start().await;
        mount_sku_search(&server, json!([variant(1, "CL-0010"), variant(2, "cl-001")])).await;

        let resolved = client(&server)
            .await
            .variant_by_sku("CL-001", SkuMatch::PreferExact)
            .await
            .unwrap();
        assert_eq!(resolved.id.as_str(), "gid://shopify/ProductVariant/2");
        assert_eq!(resolved.matched_by, MatchedBy::Exact);
    }

    #[tokio::test]
    async fn test_prefer_exact_falls_back_to_first_result() {
        let server = MockServer::start().await;
        mount_sku_search(&server, json!([variant(1, "CL-0010"), variant(2, "CL-0011")])).await;

        let resolved = client(&server)
            .await
            .resolve_product(&Lookup::Sku("CL-001".to_string()), SkuMatch::PreferExact)
            .await
            .unwrap();
        assert_eq!(resolved.id.as_str(), "gid://shopify/Product/10");
        assert_eq!(resolved.matched_by, MatchedBy::FirstResult);
    }

    #[tokio::test]
    async fn test_exact_mode_rejects_fuzzy_candidates() {
        let server = MockServer::start().await;
        mount_sku_search(&server, json!([variant(1, "CL-0010")])).await;

        let err = client(&server)
            .await
            .variant_by_sku("CL-001", SkuMatch::Exact)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminShopifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_handle_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"handle": "no-existe"}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"productByIdentifier": null}})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .resolve_product(&Lookup::Handle("no-existe".to_string()), SkuMatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not found: product with handle 'no-existe'");
    }

    #[tokio::test]
    async fn test_variant_id_resolves_to_its_product() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "VariantById"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"productVariant": variant(4, "CL-004")}})),
            )
            .mount(&server)
            .await;

        let product = client(&server)
            .await
            .resolve_product(
                &Lookup::Variant(VariantGid::from_numeric(4)),
                SkuMatch::default(),
            )
            .await
            .unwrap();
        assert_eq!(product.handle, "product-4");
        assert_eq!(product.matched_by, MatchedBy::Id);
    }
}
