//! Identity lookups: how a client names the product or variant it wants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{IdError, ProductGid, VariantGid};

/// Errors building a [`Lookup`] from request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No discriminator was supplied.
    #[error("one of handle, sku, product_id or variant_id is required")]
    Missing,

    /// An id parameter could not be parsed.
    #[error(transparent)]
    InvalidId(#[from] IdError),
}

/// A numeric id as it arrives in JSON (`123`) or a query string (`"123"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Number(u64),
    Text(String),
}

impl IdParam {
    fn as_text(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Identity parameters shared by every handler.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupParams {
    pub handle: Option<String>,
    pub sku: Option<String>,
    pub product_id: Option<IdParam>,
    pub variant_id: Option<IdParam>,
}

/// Which entity a handler should operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Product handle, already trimmed and lower-cased.
    Handle(String),
    /// Variant SKU, trimmed.
    Sku(String),
    /// Product by id.
    Product(ProductGid),
    /// Variant by id.
    Variant(VariantGid),
}

impl LookupParams {
    /// Pick the discriminator to use.
    ///
    /// Explicit ids win over handles, and handles win over SKUs.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Missing` when nothing usable was supplied and
    /// `LookupError::InvalidId` when an id does not parse.
    pub fn into_lookup(self) -> Result<Lookup, LookupError> {
        if let Some(id) = self.variant_id.as_ref().and_then(IdParam::as_text) {
            return Ok(Lookup::Variant(VariantGid::parse(&id)?));
        }
        if let Some(id) = self.product_id.as_ref().and_then(IdParam::as_text) {
            return Ok(Lookup::Product(ProductGid::parse(&id)?));
        }
        if let Some(handle) = non_empty(self.handle.as_deref()) {
            return Ok(Lookup::Handle(normalize_handle(handle)));
        }
        if let Some(sku) = non_empty(self.sku.as_deref()) {
            return Ok(Lookup::Sku(sku.to_string()));
        }
        Err(LookupError::Missing)
    }
}

impl Lookup {
    /// Whether this lookup names a variant directly.
    #[must_use]
    pub const fn is_variant(&self) -> bool {
        matches!(self, Self::Variant(_))
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle(h) => write!(f, "handle '{h}'"),
            Self::Sku(s) => write!(f, "SKU '{s}'"),
            Self::Product(id) => write!(f, "product {id}"),
            Self::Variant(id) => write!(f, "variant {id}"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalize a product handle for lookup.
#[must_use]
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().to_lowercase()
}

/// Which entity owns the stock field a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerScope {
    Product,
    Variant,
}

impl OwnerScope {
    /// Default scope for a lookup: variant ids target the variant, everything
    /// else targets the product.
    #[must_use]
    pub const fn default_for(lookup: &Lookup) -> Self {
        if lookup.is_variant() {
            Self::Variant
        } else {
            Self::Product
        }
    }
}

/// How SKU searches pick among the platform's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkuMatch {
    /// First case-insensitive exact match, otherwise the first candidate.
    #[default]
    PreferExact,
    /// Only a case-insensitive exact match is accepted.
    Exact,
}

impl FromStr for SkuMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "prefer_exact" => Ok(Self::PreferExact),
            "exact" => Ok(Self::Exact),
            other => Err(format!(
                "unknown SKU match mode '{other}' (expected prefer_exact or exact)"
            )),
        }
    }
}

/// How an entity was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Handle,
    Id,
    /// SKU search, candidate's SKU equals the requested one.
    Exact,
    /// SKU search, no exact match so the first candidate was used.
    FirstResult,
}

/// Choose a candidate from a SKU search.
///
/// `sku_of` extracts the candidate's SKU. Returns the chosen candidate and
/// whether it matched exactly.
pub fn select_by_sku<'a, T>(
    candidates: &'a [T],
    sku: &str,
    mode: SkuMatch,
    sku_of: impl Fn(&T) -> Option<&str>,
) -> Option<(&'a T, MatchedBy)> {
    let wanted = sku.trim();
    let exact = candidates
        .iter()
        .find(|c| sku_of(c).is_some_and(|s| s.trim().eq_ignore_ascii_case(wanted)));

    match (exact, mode) {
        (Some(candidate), _) => Some((candidate, MatchedBy::Exact)),
        (None, SkuMatch::PreferExact) => candidates.first().map(|c| (c, MatchedBy::FirstResult)),
        (None, SkuMatch::Exact) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(handle: Option<&str>, sku: Option<&str>) -> LookupParams {
        LookupParams {
            handle: handle.map(String::from),
            sku: sku.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_handle_is_normalized() {
        let lookup = params(Some("  Cama-Luton "), None).into_lookup().unwrap();
        assert_eq!(lookup, Lookup::Handle("cama-luton".to_string()));
    }

    #[test]
    fn test_handle_wins_over_sku() {
        let lookup = params(Some("cama-luton"), Some("CL-001")).into_lookup().unwrap();
        assert_eq!(lookup, Lookup::Handle("cama-luton".to_string()));
    }

    #[test]
    fn test_empty_handle_falls_back_to_sku() {
        let lookup = params(Some("   "), Some(" CL-001 ")).into_lookup().unwrap();
        assert_eq!(lookup, Lookup::Sku("CL-001".to_string()));
    }

    #[test]
    fn test_ids_win_over_handle() {
        let lookup = LookupParams {
            handle: Some("cama-luton".to_string()),
            product_id: Some(IdParam::Number(12)),
            ..Default::default()
        }
        .into_lookup()
        .unwrap();
        assert_eq!(lookup, Lookup::Product(ProductGid::from_numeric(12)));

        let lookup = LookupParams {
            product_id: Some(IdParam::Number(12)),
            variant_id: Some(IdParam::Text("34".to_string())),
            ..Default::default()
        }
        .into_lookup()
        .unwrap();
        assert_eq!(lookup, Lookup::Variant(VariantGid::from_numeric(34)));
    }

    #[test]
    fn test_missing_discriminator() {
        assert_eq!(
            LookupParams::default().into_lookup(),
            Err(LookupError::Missing)
        );
    }

    #[test]
    fn test_invalid_id_is_reported() {
        let err = LookupParams {
            product_id: Some(IdParam::Text("cama".to_string())),
            ..Default::default()
        }
        .into_lookup()
        .unwrap_err();
        assert!(matches!(err, LookupError::InvalidId(IdError::Invalid(_))));
    }

    #[test]
    fn test_id_param_from_json_number_or_string() {
        let p: LookupParams =
            serde_json::from_str(r#"{"product_id": 5, "variant_id": "6"}"#).unwrap();
        assert_eq!(p.product_id, Some(IdParam::Number(5)));
        assert_eq!(p.variant_id, Some(IdParam::Text("6".to_string())));
    }

    #[test]
    fn test_owner_scope_default() {
        assert_eq!(
            OwnerScope::default_for(&Lookup::Variant(VariantGid::from_numeric(1))),
            OwnerScope::Variant
        );
        assert_eq!(
            OwnerScope::default_for(&Lookup::Sku("A".to_string())),
            OwnerScope::Product
        );
    }

    #[test]
    fn test_select_prefers_exact_case_insensitive() {
        let candidates = vec![Some("CL-0011"), Some("cl-001"), None];
        let (chosen, how) =
            select_by_sku(&candidates, "CL-001", SkuMatch::PreferExact, |c| *c).unwrap();
        assert_eq!(*chosen, Some("cl-001"));
        assert_eq!(how, MatchedBy::Exact);
    }

    #[test]
    fn test_select_falls_back_to_first_result() {
        let candidates = vec![Some("CL-0011"), Some("CL-0012")];
        let (chosen, how) =
            select_by_sku(&candidates, "CL-001", SkuMatch::PreferExact, |c| *c).unwrap();
        assert_eq!(*chosen, Some("CL-0011"));
        assert_eq!(how, MatchedBy::FirstResult);
    }

    #[test]
    fn test_select_exact_mode_rejects_fuzzy() {
        let candidates = vec![Some("CL-0011")];
        assert!(select_by_sku(&candidates, "CL-001", SkuMatch::Exact, |c| *c).is_none());
    }

    #[test]
    fn test_select_empty_candidates() {
        let candidates: Vec<Option<&str>> = vec![];
        assert!(select_by_sku(&candidates, "X", SkuMatch::PreferExact, |c| *c).is_none());
    }

    #[test]
    fn test_sku_match_from_str() {
        assert_eq!("prefer-exact".parse::<SkuMatch>(), Ok(SkuMatch::PreferExact));
        assert_eq!("EXACT".parse::<SkuMatch>(), Ok(SkuMatch::Exact));
        assert!("fuzzy".parse::<SkuMatch>().is_err());
    }
}
