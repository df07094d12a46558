//! List-shaped branch stock: one `json` metafield per product or variant.

use branch_stock_core::stock::wire::{decode_list, encode_list};
use branch_stock_core::{
    ChangeSet, Lookup, MergeOutcome, MergePolicy, OwnerScope, StockError, StockLevels, merge,
};
use tracing::{info, instrument, warn};

use crate::config::StockConfig;
use crate::error::{AppError, Result};
use crate::shopify::{AdminClient, MetafieldWrite, Owner};
use crate::state::AppState;

/// Reads and merges the list-shaped stock field.
pub struct BranchStockService<'a> {
    shopify: &'a AdminClient,
    stock: &'a StockConfig,
}

impl<'a> BranchStockService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            shopify: state.shopify(),
            stock: &state.config().stock,
        }
    }

    /// Resolve the entity whose field a request targets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when a variant-scoped request names a
    /// product (by handle or product id), and `AppError::NotFound` when
    /// nothing matches.
    #[instrument(skip(self), fields(lookup = %lookup))]
    pub async fn resolve_owner(&self, lookup: &Lookup, scope: OwnerScope) -> Result<Owner> {
        let sku_match = self.stock.sku_match;
        let owner = match (scope, lookup) {
            (OwnerScope::Product, _) => {
                Owner::Product(self.shopify.resolve_product(lookup, sku_match).await?)
            }
            (OwnerScope::Variant, Lookup::Variant(id)) => {
                Owner::Variant(self.shopify.variant_by_id(id).await?)
            }
            (OwnerScope::Variant, Lookup::Sku(sku)) => {
                Owner::Variant(self.shopify.variant_by_sku(sku, sku_match).await?)
            }
            (OwnerScope::Variant, Lookup::Handle(_) | Lookup::Product(_)) => {
                return Err(AppError::BadRequest(
                    "owner 'variant' requires variant_id or sku".to_string(),
                ));
            }
        };
        Ok(owner)
    }

    /// Current stock levels of `owner`.
    ///
    /// An unset or unreadable field reads as the scaffold.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` when the field holds a variant matrix, or
    /// an error if the Shopify read fails.
    #[instrument(skip(self, owner), fields(owner_id = %owner.gid()))]
    pub async fn read(&self, owner: &Owner) -> Result<StockLevels> {
        Ok(self
            .current(owner)
            .await?
            .unwrap_or_else(|| self.stock.scaffold.clone()))
    }

    /// Merge `changes` into the field of `owner` and write it back.
    ///
    /// Nothing is written when the merge changes nothing: an empty change
    /// set, or one whose branches were all ignored by the policy.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` when the field holds a variant matrix,
    /// `AppError::Validation` when Shopify rejects the value, or any Shopify
    /// transport error.
    #[instrument(skip(self, owner, changes), fields(owner_id = %owner.gid(), changes = changes.len()))]
    pub async fn apply(&self, owner: &Owner, changes: &ChangeSet) -> Result<MergeOutcome> {
        let current = self.current(owner).await?;
        let outcome = merge(current, &self.stock.scaffold, changes, self.stock.merge_policy);

        if !needs_write(&outcome, changes, self.stock.merge_policy) {
            return Ok(outcome);
        }

        let value = encode_list(&outcome.levels)?;
        let write = MetafieldWrite::json(owner.gid(), &self.stock.namespace, &self.stock.key, value);
        self.shopify.set_metafields(&[write]).await?;

        info!(
            policy = %self.stock.merge_policy,
            updated = outcome.updated.len(),
            appended = outcome.appended.len(),
            ignored = outcome.ignored.len(),
            "Stock field written"
        );
        Ok(outcome)
    }

    /// Decoded field value, `None` when unset or malformed.
    ///
    /// A variant matrix is never treated as malformed: falling back to the
    /// scaffold would overwrite it.
    async fn current(&self, owner: &Owner) -> Result<Option<StockLevels>> {
        let Some(raw) = self
            .shopify
            .get_metafield(owner.gid(), &self.stock.namespace, &self.stock.key)
            .await?
        else {
            return Ok(None);
        };

        match decode_list(&raw) {
            Ok(levels) => Ok(Some(levels)),
            Err(StockError::MatrixField) => Err(StockError::MatrixField.into()),
            Err(e) => {
                warn!(error = %e, raw = %raw, "Stored stock field is malformed, using scaffold");
                Ok(None)
            }
        }
    }
}

/// Whether a merge result differs from what is stored.
fn needs_write(outcome: &MergeOutcome, changes: &ChangeSet, policy: MergePolicy) -> bool {
    match policy {
        MergePolicy::FullReplace => !changes.is_empty(),
        MergePolicy::StrictUpdate | MergePolicy::AppendUnknown => {
            !outcome.updated.is_empty() || !outcome.appended.is_empty()
        }
    }
}
