//! Metafield wire shapes for stock data.
//!
//! Three shapes are stored in Shopify for the same concept:
//!
//! - **List** - one `json` metafield holding `[{"name": .., "quantity": ..}]`.
//!   Older writers used Spanish keys (`nombre`/`cantidad`), numeric strings,
//!   or wrapped the list as `{"sucursales": [..]}`; all are accepted on read.
//! - **Flat** - one `number_integer` metafield per branch key, named by a
//!   fixed vocabulary ([`FlatVocabulary`]).
//! - **Matrix** - one `json` metafield with a branch list and per-variant
//!   quantity rows ([`BranchMatrix`]), read-only here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{StockError, StockLevels, coerce_quantity};

#[derive(Debug, Deserialize)]
struct BranchRecordWire {
    #[serde(alias = "nombre", alias = "sucursal", alias = "branch")]
    name: String,
    #[serde(default, alias = "cantidad", alias = "stock")]
    quantity: Value,
}

/// Decode a list-shaped metafield value.
///
/// # Errors
///
/// Returns `StockError::MatrixField` when the value is a matrix document
/// (it has `variantes`), and `StockError::Malformed` when the value is not
/// JSON, has no recognisable list, or a record carries an invalid quantity.
/// The `{"sucursales": [..]}` wrapper is only accepted as the sole key.
pub fn decode_list(raw: &str) -> Result<StockLevels, StockError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| StockError::Malformed(format!("invalid JSON: {e}")))?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(map) if map.contains_key("variantes") => return Err(StockError::MatrixField),
        Value::Object(mut map) if map.len() == 1 => {
            match map.remove("sucursales").or_else(|| map.remove("branches")) {
                Some(Value::Array(items)) => items,
                _ => return Err(not_a_list()),
            }
        }
        _ => return Err(not_a_list()),
    };

    let mut levels = StockLevels::new();
    for record in records {
        let record: BranchRecordWire = serde_json::from_value(record)
            .map_err(|e| StockError::Malformed(format!("invalid branch record: {e}")))?;
        let name = record.name.trim();
        if name.is_empty() {
            return Err(StockError::Malformed("branch record without a name".to_string()));
        }
        let quantity = coerce_quantity(name, &record.quantity)
            .map_err(|e| StockError::Malformed(e.to_string()))?
            .unwrap_or(0);
        levels.set(name, quantity);
    }
    Ok(levels)
}

fn not_a_list() -> StockError {
    StockError::Malformed("expected a list of branches".to_string())
}

/// Encode stock levels as a list-shaped metafield value.
///
/// # Errors
///
/// Returns `StockError::Malformed` if serialization fails.
pub fn encode_list(levels: &StockLevels) -> Result<String, StockError> {
    serde_json::to_string(levels).map_err(|e| StockError::Malformed(e.to_string()))
}

/// One entry of the flat vocabulary: a client-facing key and the metafield
/// that stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatField {
    pub key: String,
    pub metafield_key: String,
}

/// The fixed set of branch keys stored as individual integer metafields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatVocabulary(Vec<FlatField>);

impl Default for FlatVocabulary {
    fn default() -> Self {
        Self(
            [
                ("web", "stock_por_sucursal"),
                ("stock_centro", "stock_centro"),
                ("suc_coyoacan", "suc_coyoacan"),
                ("suc_benito_juarez", "suc_benito_juarez"),
                ("suc_gustavo_baz", "suc_gustavo_baz"),
                ("suc_naucalpan", "suc_naucalpan"),
                ("suc_toluca", "suc_toluca"),
                ("suc_queretaro", "suc_queretaro"),
                ("suc_vallejo", "suc_vallejo"),
                ("suc_puebla", "suc_puebla"),
            ]
            .into_iter()
            .map(|(key, metafield_key)| FlatField {
                key: key.to_string(),
                metafield_key: metafield_key.to_string(),
            })
            .collect(),
        )
    }
}

impl FlatVocabulary {
    /// Parse `key=metafield_key` pairs separated by commas. A bare `key`
    /// maps to a metafield of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error message for empty entries or duplicate keys.
    pub fn parse(pairs: &str) -> Result<Self, String> {
        let mut fields: Vec<FlatField> = Vec::new();
        for entry in pairs.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, metafield_key) = entry
                .split_once('=')
                .map_or((entry, entry), |(k, m)| (k.trim(), m.trim()));
            if key.is_empty() || metafield_key.is_empty() {
                return Err(format!("invalid flat field entry '{entry}'"));
            }
            if fields.iter().any(|f| f.key == key) {
                return Err(format!("duplicate flat field key '{key}'"));
            }
            fields.push(FlatField {
                key: key.to_string(),
                metafield_key: metafield_key.to_string(),
            });
        }
        if fields.is_empty() {
            return Err("flat vocabulary cannot be empty".to_string());
        }
        Ok(Self(fields))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatField> {
        self.0.iter()
    }

    /// Look up a client-facing key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FlatField> {
        self.0.iter().find(|f| f.key == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode one flat metafield value. Missing or unreadable values count as 0.
#[must_use]
pub fn decode_flat_value(raw: Option<&str>) -> u64 {
    raw.and_then(|v| coerce_quantity("", &Value::String(v.to_string())).ok().flatten())
        .unwrap_or(0)
}

/// Branch list plus per-variant quantity rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchMatrix {
    pub branches: Vec<String>,
    pub variants: Vec<VariantStock>,
}

/// One variant row of a [`BranchMatrix`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantStock {
    pub sku: Option<String>,
    /// Option name → option value.
    pub options: Map<String, Value>,
    /// Quantities in the same order as [`BranchMatrix::branches`].
    pub quantities: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct MatrixWire {
    sucursales: Value,
    variantes: Value,
}

#[derive(Debug, Deserialize)]
struct MatrixBranchWire {
    nombre: String,
}

#[derive(Debug, Deserialize)]
struct MatrixVariantWire {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    opciones: Value,
    #[serde(default)]
    cantidades: Value,
}

#[derive(Debug, Deserialize)]
struct MatrixOptionWire {
    nombre: String,
    valor: Value,
}

/// Decode a matrix-shaped metafield value.
///
/// # Errors
///
/// Returns `StockError::Malformed` with `"invalid JSON"` when the value does
/// not parse, and a structure message when `sucursales`/`variantes` are not
/// arrays or their entries are unreadable.
pub fn decode_matrix(raw: &str) -> Result<BranchMatrix, StockError> {
    let wire: Value = serde_json::from_str(raw)
        .map_err(|e| StockError::Malformed(format!("invalid JSON: {e}")))?;
    let wire: MatrixWire = serde_json::from_value(wire).map_err(|_| invalid_structure())?;

    let (Value::Array(branches), Value::Array(variants)) = (wire.sucursales, wire.variantes) else {
        return Err(invalid_structure());
    };

    let branches = branches
        .into_iter()
        .map(|b| {
            serde_json::from_value::<MatrixBranchWire>(b)
                .map(|b| b.nombre)
                .map_err(|_| invalid_structure())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let variants = variants
        .into_iter()
        .map(|v| {
            let v: MatrixVariantWire =
                serde_json::from_value(v).map_err(|_| invalid_structure())?;
            decode_matrix_row(v)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BranchMatrix { branches, variants })
}

fn decode_matrix_row(row: MatrixVariantWire) -> Result<VariantStock, StockError> {
    let mut options = Map::new();
    if let Value::Array(items) = row.opciones {
        for item in items {
            if let Ok(option) = serde_json::from_value::<MatrixOptionWire>(item) {
                options.insert(option.nombre, option.valor);
            }
        }
    }

    let quantities = match row.cantidades {
        Value::Array(items) => items
            .iter()
            .map(|q| {
                coerce_quantity(row.sku.as_deref().unwrap_or("variant"), q)
                    .map(Option::unwrap_or_default)
                    .map_err(|e| StockError::Malformed(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(VariantStock {
        sku: row.sku,
        options,
        quantities,
    })
}

fn invalid_structure() -> StockError {
    StockError::Malformed("expected 'sucursales' and 'variantes' arrays".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list_canonical() {
        let levels = decode_list(r#"[{"name":"Web","quantity":3},{"name":"Suc. Centro","quantity":0}]"#)
            .unwrap();
        assert_eq!(levels.get("Web"), Some(3));
        assert_eq!(levels.get("Suc. Centro"), Some(0));
    }

    #[test]
    fn test_decode_list_spanish_keys_and_wrapper() {
        let levels = decode_list(
            r#"{"sucursales":[{"nombre":"Suc. Toluca","cantidad":"4"},{"nombre":"Web"}]}"#,
        )
        .unwrap();
        let names: Vec<&str> = levels.names().collect();
        assert_eq!(names, vec!["Suc. Toluca", "Web"]);
        assert_eq!(levels.get("Suc. Toluca"), Some(4));
        assert_eq!(levels.get("Web"), Some(0));
    }

    #[test]
    fn test_decode_list_refuses_matrix_documents() {
        let matrix = r#"{"sucursales":[{"nombre":"Web"}],"variantes":[{"sku":"CL-001","cantidades":[3]}]}"#;
        assert_eq!(decode_list(matrix), Err(StockError::MatrixField));
        assert_eq!(
            decode_list(r#"{"sucursales":[],"variantes":[]}"#),
            Err(StockError::MatrixField)
        );
    }

    #[test]
    fn test_decode_list_wrapper_must_be_sole_key() {
        assert!(matches!(
            decode_list(r#"{"sucursales":[{"nombre":"Web"}],"extra":1}"#),
            Err(StockError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_list_rejects_garbage() {
        assert!(matches!(decode_list("not json"), Err(StockError::Malformed(_))));
        assert!(matches!(decode_list(r#"{"foo": 1}"#), Err(StockError::Malformed(_))));
        assert!(matches!(decode_list("42"), Err(StockError::Malformed(_))));
        assert!(matches!(
            decode_list(r#"[{"name":"Web","quantity":"many"}]"#),
            Err(StockError::Malformed(_))
        ));
    }

    #[test]
    fn test_encode_then_decode_keeps_order() {
        let levels: StockLevels = [("B".to_string(), 2), ("A".to_string(), 1)]
            .into_iter()
            .collect();
        let raw = encode_list(&levels).unwrap();
        assert_eq!(raw, r#"[{"name":"B","quantity":2},{"name":"A","quantity":1}]"#);
        assert_eq!(decode_list(&raw).unwrap(), levels);
    }

    #[test]
    fn test_default_vocabulary_maps_web() {
        let vocabulary = FlatVocabulary::default();
        assert_eq!(vocabulary.len(), 10);
        assert_eq!(
            vocabulary.get("web").map(|f| f.metafield_key.as_str()),
            Some("stock_por_sucursal")
        );
        assert!(vocabulary.get("suc_inexistente").is_none());
    }

    #[test]
    fn test_parse_vocabulary() {
        let vocabulary = FlatVocabulary::parse("web=stock_por_sucursal, suc_toluca").unwrap();
        let fields: Vec<&FlatField> = vocabulary.iter().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].metafield_key, "suc_toluca");
        assert!(FlatVocabulary::parse("web,web").is_err());
        assert!(FlatVocabulary::parse(" , ").is_err());
        assert!(FlatVocabulary::parse("web=").is_err());
    }

    #[test]
    fn test_decode_flat_value() {
        assert_eq!(decode_flat_value(Some("12")), 12);
        assert_eq!(decode_flat_value(Some("")), 0);
        assert_eq!(decode_flat_value(Some("x")), 0);
        assert_eq!(decode_flat_value(None), 0);
    }

    #[test]
    fn test_decode_matrix() {
        let matrix = decode_matrix(
            r#"{
                "sucursales": [{"nombre": "Web"}, {"nombre": "Suc. Centro"}],
                "variantes": [
                    {"sku": "CL-001", "opciones": [{"nombre": "Tamaño", "valor": "King"}], "cantidades": [3, "2"]},
                    {"sku": "CL-002"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(matrix.branches, vec!["Web", "Suc. Centro"]);
        assert_eq!(matrix.variants.len(), 2);
        assert_eq!(matrix.variants[0].quantities, vec![3, 2]);
        assert_eq!(
            matrix.variants[0].options.get("Tamaño"),
            Some(&Value::String("King".to_string()))
        );
        assert!(matrix.variants[1].quantities.is_empty());
    }

    #[test]
    fn test_decode_matrix_errors() {
        let err = decode_matrix("{").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));

        let err = decode_matrix(r#"{"sucursales": {}, "variantes": []}"#).unwrap_err();
        assert!(err.to_string().contains("'sucursales' and 'variantes'"));

        let err = decode_matrix(r#"{"variantes": []}"#).unwrap_err();
        assert!(err.to_string().contains("'sucursales' and 'variantes'"));
    }
}
