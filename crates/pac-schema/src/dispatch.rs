//! # Variant Dispatch
//!
//! Reads the `variant` discriminant of a document and selects the merged
//! schema that applies to it. Nothing else in the document is looked at
//! until dispatch has succeeded.

use serde_json::Value;

use pac_core::{document::json_type_name, ConfigDocument, Variant, DISCRIMINANT_FIELD};

use crate::registry::{MergedSchema, SchemaRegistry};
use crate::validate::{
    validate, Rule, SchemaValidationError, ValidatedConfig, ValidationViolations, Violation,
};

/// Select the merged schema for `document`.
///
/// # Errors
///
/// Returns `ValidationFailed` carrying a single `missing_variant` or
/// `unknown_variant` violation when the discriminant is absent, is not a
/// string, or names no declared variant.
pub fn dispatch(
    document: &ConfigDocument,
    registry: &SchemaRegistry,
) -> Result<MergedSchema, SchemaValidationError> {
    let Some(raw) = document.get(DISCRIMINANT_FIELD) else {
        return Err(rejected(
            String::new(),
            Rule::MissingVariant,
            format!("'{DISCRIMINANT_FIELD}' is required; {}", expected_variants()),
        ));
    };

    let Value::String(discriminant) = raw else {
        return Err(rejected(
            DISCRIMINANT_FIELD.to_string(),
            Rule::UnknownVariant,
            format!(
                "expected a variant name, found {}; {}",
                json_type_name(raw),
                expected_variants()
            ),
        ));
    };

    match registry.lookup_variant_schema(discriminant) {
        Some(schema) => {
            tracing::debug!(variant = %schema.variant(), "dispatched configuration");
            Ok(schema)
        }
        None => Err(rejected(
            DISCRIMINANT_FIELD.to_string(),
            Rule::UnknownVariant,
            format!("unknown variant '{discriminant}'; {}", expected_variants()),
        )),
    }
}

/// Dispatch and validate in one step.
pub fn validate_document(
    document: &ConfigDocument,
    registry: &SchemaRegistry,
) -> Result<ValidatedConfig, SchemaValidationError> {
    let schema = dispatch(document, registry)?;
    validate(document, &schema)
}

fn expected_variants() -> String {
    let names: Vec<&str> = Variant::all().iter().map(Variant::as_str).collect();
    format!("expected one of: {}", names.join(", "))
}

fn rejected(field: String, rule: Rule, message: String) -> SchemaValidationError {
    SchemaValidationError::ValidationFailed {
        variant: None,
        violations: ValidationViolations::new(vec![Violation {
            field,
            schema_path: String::new(),
            rule,
            message,
        }]),
    }
}
