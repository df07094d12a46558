//! Applying change sets to stock levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{StockError, StockLevels, coerce_quantity};

/// What to do with branches in a change set that the field does not know yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Only update branches present in the field or the default scaffold.
    /// Unknown names are ignored and reported.
    StrictUpdate,
    /// Append unknown names at the end.
    #[default]
    AppendUnknown,
    /// Replace the whole field with the change set.
    FullReplace,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "strict_update" => Ok(Self::StrictUpdate),
            "append_unknown" => Ok(Self::AppendUnknown),
            "full_replace" => Ok(Self::FullReplace),
            other => Err(format!(
                "unknown merge policy '{other}' (expected strict_update, append_unknown or full_replace)"
            )),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StrictUpdate => "strict_update",
            Self::AppendUnknown => "append_unknown",
            Self::FullReplace => "full_replace",
        })
    }
}

/// A validated, ordered set of branch quantity changes.
///
/// Entries whose value means "no change" are dropped while parsing. A later
/// entry for the same branch overwrites an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(Vec<(String, u64)>);

impl ChangeSet {
    /// Parse a JSON object of `branch -> quantity`.
    ///
    /// # Errors
    ///
    /// Fails on the first empty branch name or invalid quantity; a change set
    /// is applied completely or not at all.
    pub fn from_json(changes: &Map<String, Value>) -> Result<Self, StockError> {
        let mut set = Self::default();
        for (branch, value) in changes {
            set.push(branch, value)?;
        }
        Ok(set)
    }

    /// A change set for one branch.
    ///
    /// # Errors
    ///
    /// Fails on an empty branch name or an invalid quantity.
    pub fn single(branch: &str, value: &Value) -> Result<Self, StockError> {
        let mut set = Self::default();
        set.push(branch, value)?;
        Ok(set)
    }

    fn push(&mut self, branch: &str, value: &Value) -> Result<(), StockError> {
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(StockError::EmptyBranchName);
        }
        let Some(quantity) = coerce_quantity(branch, value)? else {
            return Ok(());
        };
        if let Some(entry) = self.0.iter_mut().find(|(name, _)| name == branch) {
            entry.1 = quantity;
        } else {
            self.0.push((branch.to_string(), quantity));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, q)| (name.as_str(), *q))
    }
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// The new field value.
    pub levels: StockLevels,
    /// Branches that existed and were set.
    pub updated: Vec<String>,
    /// Branches created by this merge.
    pub appended: Vec<String>,
    /// Branches left out by the policy.
    pub ignored: Vec<String>,
}

/// Apply `changes` to `current`.
///
/// A missing `current` is replaced by `scaffold`. Branches not named in
/// `changes` keep their quantity unless the policy is
/// [`MergePolicy::FullReplace`].
#[must_use]
pub fn merge(
    current: Option<StockLevels>,
    scaffold: &StockLevels,
    changes: &ChangeSet,
    policy: MergePolicy,
) -> MergeOutcome {
    let base = current.unwrap_or_else(|| scaffold.clone());
    let mut outcome = MergeOutcome {
        levels: base,
        updated: Vec::new(),
        appended: Vec::new(),
        ignored: Vec::new(),
    };

    if policy == MergePolicy::FullReplace {
        let mut levels = StockLevels::new();
        for (name, quantity) in changes.iter() {
            if outcome.levels.contains(name) {
                outcome.updated.push(name.to_string());
            } else {
                outcome.appended.push(name.to_string());
            }
            levels.set(name, quantity);
        }
        outcome.levels = levels;
        return outcome;
    }

    for (name, quantity) in changes.iter() {
        let known = outcome.levels.contains(name);
        let allowed = known
            || policy == MergePolicy::AppendUnknown
            || scaffold.contains(name);
        if !allowed {
            outcome.ignored.push(name.to_string());
            continue;
        }
        if outcome.levels.set(name, quantity) {
            outcome.updated.push(name.to_string());
        } else {
            outcome.appended.push(name.to_string());
        }
    }
    outcome
}
