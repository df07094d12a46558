//! Stock by branch.
//!
//! [`StockLevels`] is the single in-memory representation of a "stock by
//! branch" field: an ordered mapping of branch name to quantity. The
//! [`wire`] module converts it to and from the shapes stored in Shopify
//! metafields, and [`merge`] applies change sets to it.

pub mod merge;
pub mod quantity;
pub mod wire;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use merge::{ChangeSet, MergeOutcome, MergePolicy, merge};
pub use quantity::coerce_quantity;
pub use wire::{BranchMatrix, FlatField, FlatVocabulary, VariantStock};

/// Branch names used when a product has no stock field yet.
pub const DEFAULT_BRANCHES: &[&str] = &[
    "Web",
    "Suc. Centro",
    "Suc. Coyoacán",
    "Suc. Benito Juárez",
    "Suc. Gustavo Baz",
    "Suc. Naucalpan",
    "Suc. Toluca",
    "Suc. Querétaro",
    "Suc. Vallejo",
    "Suc. Puebla",
];

/// Errors from parsing or changing stock data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("quantity for '{branch}' is not a number: {value}")]
    NotNumeric { branch: String, value: String },

    #[error("quantity for '{branch}' must be a whole number: {value}")]
    Fractional { branch: String, value: String },

    #[error("quantity for '{branch}' cannot be negative: {value}")]
    Negative { branch: String, value: String },

    #[error("quantity for '{branch}' is out of range: {value}")]
    OutOfRange { branch: String, value: String },

    #[error("branch name cannot be empty")]
    EmptyBranchName,

    #[error("stock field holds a per-variant matrix, not a branch list")]
    MatrixField,

    #[error("malformed stock field: {0}")]
    Malformed(String),
}

/// One branch and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStock {
    pub name: String,
    pub quantity: u64,
}

/// Ordered branch → quantity mapping. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StockLevels(Vec<BranchStock>);

impl StockLevels {
    /// Create an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Every name at zero, duplicates dropped.
    #[must_use]
    pub fn scaffold<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut levels = Self::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !levels.contains(name) {
                levels.0.push(BranchStock {
                    name: name.to_string(),
                    quantity: 0,
                });
            }
        }
        levels
    }

    /// Quantity for a branch.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.iter().find(|b| b.name == name).map(|b| b.quantity)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|b| b.name == name)
    }

    /// Set a branch quantity, appending the branch if it is new.
    ///
    /// Returns `true` when the branch already existed.
    pub fn set(&mut self, name: &str, quantity: u64) -> bool {
        if let Some(branch) = self.0.iter_mut().find(|b| b.name == name) {
            branch.quantity = quantity;
            true
        } else {
            self.0.push(BranchStock {
                name: name.to_string(),
                quantity,
            });
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchStock> {
        self.0.iter()
    }

    /// Branch names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|b| b.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<BranchStock> {
        self.0
    }
}

impl FromIterator<(String, u64)> for StockLevels {
    /// Later duplicates overwrite earlier ones in place.
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut levels = Self::new();
        for (name, quantity) in iter {
            levels.set(&name, quantity);
        }
        levels
    }
}
