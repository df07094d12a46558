//! Newtype global IDs for type-safe Shopify entity references.
//!
//! Use the `define_gid!` macro to create wrappers that prevent accidentally
//! passing a variant GID where a product GID is expected.

use thiserror::Error;

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors produced while parsing an id supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The value is neither a positive integer nor a Shopify GID.
    #[error("invalid id '{0}': expected a numeric id or a Shopify GID")]
    Invalid(String),

    /// The value is a GID for a different resource type.
    #[error("id '{id}' is not a {expected} id")]
    WrongResource {
        /// The rejected input.
        id: String,
        /// Resource type the caller asked for.
        expected: &'static str,
    },
}

/// Macro to define a type-safe Shopify GID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` accepting a bare numeric id or a full GID of the right type
/// - `from_numeric()`, `from_remote()`, `as_str()` and `numeric_id()`
///
/// # Example
///
/// ```rust
/// # use branch_stock_core::define_gid;
/// define_gid!(CollectionGid, "Collection");
///
/// let id = CollectionGid::parse("42").unwrap();
/// assert_eq!(id.as_str(), "gid://shopify/Collection/42");
/// assert!(CollectionGid::parse("gid://shopify/Product/42").is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type encoded in the GID.
            pub const RESOURCE: &'static str = $resource;

            /// Build a GID from a numeric legacy id.
            #[must_use]
            pub fn from_numeric(id: u64) -> Self {
                Self(format!("{}{}/{id}", $crate::types::id::GID_PREFIX, $resource))
            }

            /// Wrap a GID returned by the Shopify API without re-validating it.
            #[must_use]
            pub const fn from_remote(gid: String) -> Self {
                Self(gid)
            }

            /// Parse a client-supplied id.
            ///
            /// Accepts a bare positive integer (`"123"`) or a full GID of this
            /// resource type (`"gid://shopify/Product/123"`). Surrounding
            /// whitespace is ignored.
            ///
            /// # Errors
            ///
            /// Returns `IdError::WrongResource` for a GID of another type and
            /// `IdError::Invalid` for anything else that is not an id.
            pub fn parse(input: &str) -> Result<Self, $crate::types::id::IdError> {
                let trimmed = input.trim();
                match $crate::types::id::split_gid(trimmed) {
                    Some((resource, numeric)) if resource == $resource && numeric > 0 => {
                        Ok(Self::from_numeric(numeric))
                    }
                    Some((resource, _)) if resource == $resource => {
                        Err($crate::types::id::IdError::Invalid(trimmed.to_string()))
                    }
                    Some(_) => Err($crate::types::id::IdError::WrongResource {
                        id: trimmed.to_string(),
                        expected: $resource,
                    }),
                    None => trimmed
                        .parse::<u64>()
                        .ok()
                        .filter(|id| *id > 0)
                        .map(Self::from_numeric)
                        .ok_or_else(|| {
                            $crate::types::id::IdError::Invalid(trimmed.to_string())
                        }),
                }
            }

            /// Get the GID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the numeric legacy id, if the GID carries one.
            #[must_use]
            pub fn numeric_id(&self) -> Option<u64> {
                $crate::types::id::split_gid(&self.0).map(|(_, id)| id)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Split `gid://shopify/<Resource>/<id>[?params]` into its resource and id.
#[must_use]
pub fn split_gid(gid: &str) -> Option<(&str, u64)> {
    let rest = gid.strip_prefix(GID_PREFIX)?;
    let (resource, tail) = rest.split_once('/')?;
    let numeric = tail.split('?').next()?.parse().ok()?;
    Some((resource, numeric))
}

define_gid!(ProductGid, "Product");
define_gid!(VariantGid, "ProductVariant");
