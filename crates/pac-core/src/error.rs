//! # Error Types — Structured Error Hierarchy
//!
//! Every failure the compiler can report belongs to one [`ErrorClass`].
//! Crate-specific error enums (`SchemaValidationError`, `CompositionError`,
//! ...) map themselves onto a class so that tooling can sort diagnostics
//! without matching on every variant.
//!
//! ## Design
//!
//! - Configuration errors are never retried. They describe something the
//!   operator must fix.
//! - Composition errors signal a defect in the compiler itself rather than
//!   bad input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four diagnostic classes of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Unknown or missing variant, unknown field, wrong value type.
    Schema,
    /// A cross-field rule or a numeric bound was violated.
    Invariant,
    /// A cross-reference to an existing entity could not be resolved.
    Reference,
    /// The object graph could not be assembled consistently.
    Composition,
}

impl ErrorClass {
    /// Returns the snake_case identifier for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Invariant => "invariant",
            Self::Reference => "reference",
            Self::Composition => "composition",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing core primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier did not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid identifier {0:?}: must start with a letter or '_' and contain only letters, digits and '_'")]
    InvalidIdentifier(String),

    /// A discriminant did not name a declared variant.
    #[error("unknown variant {0:?}: expected one of wlan, cnt")]
    UnknownVariant(String),

    /// An entity kind string was not recognised.
    #[error("unknown entity kind {0:?}")]
    UnknownEntityKind(String),
}

/// Errors raised while loading a configuration document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document file could not be read.
    #[error("document load error for '{path}': {reason}")]
    Load {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The document parsed, but its root is not a mapping.
    #[error("configuration root must be a mapping, found {found}")]
    NotAMapping {
        /// JSON type name of the root value.
        found: &'static str,
    },

    /// JSON parse failure.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse failure.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML content that has no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_class_display() {
        assert_eq!(ErrorClass::Schema.to_string(), "schema");
        assert_eq!(ErrorClass::Invariant.to_string(), "invariant");
        assert_eq!(ErrorClass::Reference.to_string(), "reference");
        assert_eq!(ErrorClass::Composition.to_string(), "composition");
    }

    #[test]
    fn test_error_class_serde_matches_as_str() {
        for class in [
            ErrorClass::Schema,
            ErrorClass::Invariant,
            ErrorClass::Reference,
            ErrorClass::Composition,
        ] {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.as_str()));
        }
    }

    #[test]
    fn test_not_a_mapping_message() {
        let err = DocumentError::NotAMapping { found: "array" };
        assert!(err.to_string().contains("array"));
    }
}
