//! # Configuration Document
//!
//! The operator's configuration, parsed once and never mutated. Field order
//! is preserved exactly as written, which keeps diagnostics in document
//! order.
//!
//! The textual syntax belongs to whoever produced the document. This module
//! accepts a `serde_json::Value` directly, or parses JSON/YAML text. YAML is
//! converted to the JSON value model; only the JSON-compatible subset is
//! meaningful.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::DocumentError;

/// An immutable, insertion-ordered mapping from field name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    fields: Map<String, Value>,
}

impl ConfigDocument {
    /// Wrap a parsed value. The root must be a mapping.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DocumentError::NotAMapping {
                found: json_type_name(&other),
            }),
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        let value = yaml_to_json_value(&yaml).map_err(DocumentError::Conversion)?;
        Self::from_value(value)
    }

    /// Load a document from disk.
    ///
    /// `.json` files are parsed as JSON; anything else is parsed as YAML
    /// (YAML is a superset of JSON, so this also accepts JSON content).
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Load {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed = match ext {
            "json" => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        };

        parsed.map_err(|e| match e {
            DocumentError::Load { .. } => e,
            other => DocumentError::Load {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether a top-level field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// All top-level fields in document order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document as a JSON value, for schema engines that need one.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// JSON type name of a value, as used in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped and the inner value converted. Scalar mapping keys are
/// stringified; sequence or mapping keys are rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
