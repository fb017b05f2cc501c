//! Versioned JSON/TOML configuration documents.
//!
//! Both the language-hint lists and the retrieval profiles are plain documents
//! carrying a `schema_version`. They are accepted as JSON first, then TOML, and
//! checked for unknown keys before typed deserialization so operators get the
//! dotted path of every typo at once.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shape of the keys a document may contain
#[derive(Debug)]
pub enum Shape {
    /// Any scalar or opaque value
    Leaf,
    /// Object with a fixed key set
    Object(&'static [(&'static str, Shape)]),
    /// Array whose elements all have the given shape
    Array(&'static Shape),
}

/// Parse `bytes` as JSON, falling back to TOML
pub fn parse_value(bytes: &[u8]) -> Result<Value> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Document is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML document to JSON: {err}"))
        }
    }
}

/// Dotted paths of keys in `value` that `shape` does not allow
#[must_use]
pub fn unknown_keys(value: &Value, shape: &Shape) -> Vec<String> {
    let mut unknown = Vec::new();
    walk(value, shape, "", &mut unknown);
    unknown
}

fn walk(value: &Value, shape: &Shape, base: &str, unknown: &mut Vec<String>) {
    match (shape, value) {
        (Shape::Object(allowed), Value::Object(obj)) => {
            for (key, child) in obj {
                let path = if base.is_empty() {
                    key.clone()
                } else {
                    format!("{base}.{key}")
                };
                match allowed.iter().find(|(name, _)| name == key) {
                    Some((_, child_shape)) => walk(child, child_shape, &path, unknown),
                    None => unknown.push(path),
                }
            }
        }
        (Shape::Array(item), Value::Array(items)) => {
            for (idx, child) in items.iter().enumerate() {
                walk(child, item, &format!("{base}[{idx}]"), unknown);
            }
        }
        _ => {}
    }
}

/// Reject unsupported `schema_version` values (absent means current)
pub fn check_schema_version(value: &Value, field: &str, expected: u64) -> Result<()> {
    match value.get("schema_version") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Number(n)) if n.as_u64() == Some(expected) => Ok(()),
        Some(other) => Err(anyhow!(
            "{field}.schema_version {other} is not supported (expected {expected})"
        )),
    }
}

/// Parse, validate keys and schema version, then deserialize
pub fn parse_document<T: DeserializeOwned>(
    bytes: &[u8],
    shape: &Shape,
    field: &str,
    schema_version: u64,
) -> Result<T> {
    let value = parse_value(bytes)?;
    check_schema_version(&value, field, schema_version)?;

    let unknown = unknown_keys(&value, shape);
    if !unknown.is_empty() {
        return Err(anyhow!(
            "{field} config has unknown fields: {}",
            unknown.join(", ")
        ));
    }

    serde_json::from_value(value).map_err(|err| anyhow!("{field} parse error: {err}"))
}
