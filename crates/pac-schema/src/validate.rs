//! # Cross-Field Validation
//!
//! Checks a configuration document against the merged schema of its
//! variant and returns every violation at once.
//!
//! ## Passes
//!
//! 1. **Structural.** The merged schema is rendered to JSON Schema and
//!    compiled with the `jsonschema` crate. This catches unknown fields
//!    (every object is closed), wrong value types, malformed identifiers
//!    and icons, and offsets outside their inclusive bound.
//! 2. **Cross-field.** For every capability-style feature,
//!    `supported: true` requires the companion sub-configuration. A
//!    companion given while `supported` is false or absent is still
//!    type-checked by pass 1, and otherwise has no effect.
//!
//! A document that passes both yields a [`ValidatedConfig`]. That type can
//! only be built here, so the composer never sees unchecked input.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use pac_core::{ConfigDocument, ErrorClass, Variant, DISCRIMINANT_FIELD};

use crate::registry::MergedSchema;

// ─── Violations ──────────────────────────────────────────────────────

/// The rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The `variant` discriminant is absent.
    MissingVariant,
    /// The `variant` discriminant names no declared variant.
    UnknownVariant,
    /// A field is not declared for the active variant.
    UnknownField,
    /// A value has the wrong JSON type.
    TypeMismatch,
    /// A required field is absent.
    MissingRequired,
    /// A value fails a pattern or enumeration.
    InvalidValue,
    /// A number lies outside its inclusive bound.
    OutOfRange,
    /// `supported: true` without its companion sub-configuration.
    MissingCompanion,
}

impl Rule {
    /// Returns the snake_case rule name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingVariant => "missing_variant",
            Self::UnknownVariant => "unknown_variant",
            Self::UnknownField => "unknown_field",
            Self::TypeMismatch => "type_mismatch",
            Self::MissingRequired => "missing_required",
            Self::InvalidValue => "invalid_value",
            Self::OutOfRange => "out_of_range",
            Self::MissingCompanion => "missing_companion",
        }
    }

    /// The diagnostic class this rule belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::OutOfRange | Self::MissingCompanion => ErrorClass::Invariant,
            Self::MissingVariant
            | Self::UnknownVariant
            | Self::UnknownField
            | Self::TypeMismatch
            | Self::MissingRequired
            | Self::InvalidValue => ErrorClass::Schema,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path to the violating field (`horizontal_swing_select.selector`).
    /// Empty for the document root.
    pub field: String,
    /// JSON Pointer into the rendered schema that fired; empty for
    /// cross-field rules.
    pub schema_path: String,
    /// The rule that was broken.
    pub rule: Rule,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn cross_field(field: String, rule: Rule, message: String) -> Self {
        Self {
            field,
            schema_path: String::new(),
            rule,
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.field.is_empty() { "(root)" } else { &self.field };
        write!(f, "  {field}: {} [{}]", self.message, self.rule)
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// Whether any violation broke `rule`.
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }

    /// Violations reported against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// The overall class: schema errors take precedence over invariant
    /// errors.
    pub fn class(&self) -> ErrorClass {
        if self
            .violations
            .iter()
            .any(|v| v.rule.class() == ErrorClass::Schema)
        {
            ErrorClass::Schema
        } else {
            ErrorClass::Invariant
        }
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Error during dispatch or validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to its schema.
    #[error(
        "configuration rejected{}:\n{violations}",
        .variant.map(|v| format!(" for variant '{v}'")).unwrap_or_default()
    )]
    ValidationFailed {
        /// The dispatched variant, if dispatch succeeded.
        variant: Option<Variant>,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The rendered schema could not be compiled.
    #[error("validator build error for variant '{variant}': {reason}")]
    ValidatorBuildError {
        /// Variant whose schema failed to compile.
        variant: Variant,
        /// Reason reported by the schema engine.
        reason: String,
    },
}

impl SchemaValidationError {
    /// The diagnostic class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ValidationFailed { violations, .. } => violations.class(),
            Self::ValidatorBuildError { .. } => ErrorClass::Composition,
        }
    }

    /// The violations carried by this error, if any.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            Self::ValidatorBuildError { .. } => None,
        }
    }
}

// ─── Validated Configuration ─────────────────────────────────────────

/// A document that passed validation against its merged schema.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    document: ConfigDocument,
    schema: MergedSchema,
}

impl ValidatedConfig {
    /// The validated document.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// The merged schema the document was validated against.
    pub fn schema(&self) -> &MergedSchema {
        &self.schema
    }

    /// The active variant.
    pub fn variant(&self) -> Variant {
        self.schema.variant()
    }
}

// ─── Validation ──────────────────────────────────────────────────────

/// Validate `document` against `schema`, collecting every violation.
///
/// # Errors
///
/// Returns `SchemaValidationError::ValidationFailed` with all violations
/// if the document is invalid, or `ValidatorBuildError` if the rendered
/// schema does not compile.
pub fn validate(
    document: &ConfigDocument,
    schema: &MergedSchema,
) -> Result<ValidatedConfig, SchemaValidationError> {
    let variant = schema.variant();
    let mut violations: Vec<Violation> = discriminant_violation(document, variant)
        .into_iter()
        .collect();
    violations.extend(structural_violations(document, schema)?);
    violations.extend(cross_field_violations(document, schema));

    if violations.is_empty() {
        tracing::info!(%variant, fields = document.len(), "configuration validated");
        Ok(ValidatedConfig {
            document: document.clone(),
            schema: schema.clone(),
        })
    } else {
        tracing::debug!(%variant, count = violations.len(), "configuration rejected");
        Err(SchemaValidationError::ValidationFailed {
            variant: Some(variant),
            violations: ValidationViolations::new(violations),
        })
    }
}

/// The document's own `variant` must name the schema it is checked against.
/// A missing or non-string discriminant is left to the structural pass.
fn discriminant_violation(document: &ConfigDocument, variant: Variant) -> Option<Violation> {
    let raw = document.get(DISCRIMINANT_FIELD)?.as_str()?;
    match raw.parse::<Variant>() {
        Ok(named) if named == variant => None,
        _ => Some(Violation::cross_field(
            DISCRIMINANT_FIELD.to_string(),
            Rule::UnknownVariant,
            format!("variant '{raw}' does not match the '{variant}' schema"),
        )),
    }
}

/// Pass 1: compile the rendered schema and map each engine error.
fn structural_violations(
    document: &ConfigDocument,
    schema: &MergedSchema,
) -> Result<Vec<Violation>, SchemaValidationError> {
    let rendered = schema.to_json_schema();

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    let validator = opts
        .build(&rendered)
        .map_err(|e| SchemaValidationError::ValidatorBuildError {
            variant: schema.variant(),
            reason: e.to_string(),
        })?;

    let instance = document.to_value();
    let mut violations = Vec::new();

    for error in validator.iter_errors(&instance) {
        let instance_path = error.instance_path.to_string();
        let schema_path = error.schema_path.to_string();
        let field = pointer_to_field(&instance_path);

        match &error.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                for name in unexpected {
                    let path = join_field(&field, name);
                    let message = unknown_field_message(schema, &field, name);
                    violations.push(Violation {
                        field: path,
                        schema_path: schema_path.clone(),
                        rule: Rule::UnknownField,
                        message,
                    });
                }
            }
            ValidationErrorKind::Minimum { .. } | ValidationErrorKind::Maximum { .. } => {
                let message = out_of_range_message(&rendered, &schema_path, &instance, &instance_path)
                    .unwrap_or_else(|| error.to_string());
                violations.push(Violation {
                    field,
                    schema_path,
                    rule: Rule::OutOfRange,
                    message,
                });
            }
            kind => {
                let rule = match kind {
                    ValidationErrorKind::Type { .. } => Rule::TypeMismatch,
                    ValidationErrorKind::Required { .. } => Rule::MissingRequired,
                    _ => Rule::InvalidValue,
                };
                violations.push(Violation {
                    field,
                    schema_path,
                    rule,
                    message: error.to_string(),
                });
            }
        }
    }

    Ok(violations)
}

/// Pass 2: `supported: true` implies the companion is present.
fn cross_field_violations(document: &ConfigDocument, schema: &MergedSchema) -> Vec<Violation> {
    let mut violations = Vec::new();

    for feature in schema.features() {
        let Some(companion) = feature.companion() else {
            continue;
        };
        // Non-mapping values were already reported as type mismatches.
        let Some(Value::Object(config)) = document.get(feature.name) else {
            continue;
        };

        let supported = config.get("supported").and_then(Value::as_bool).unwrap_or(false);
        let has_companion = config.contains_key(companion);

        if supported && !has_companion {
            violations.push(Violation::cross_field(
                join_field(feature.name, companion),
                Rule::MissingCompanion,
                format!("'{companion}' is required if 'supported' is set to true"),
            ));
        } else if !supported && has_companion {
            tracing::debug!(
                feature = feature.name,
                companion,
                "companion given without 'supported: true'; it will be ignored"
            );
        }
    }

    violations
}

fn unknown_field_message(schema: &MergedSchema, parent: &str, name: &str) -> String {
    if parent.is_empty() {
        let elsewhere = schema.registry().variants_declaring(name);
        if !elsewhere.is_empty() {
            let names: Vec<&str> = elsewhere.iter().map(Variant::as_str).collect();
            return format!(
                "'{name}' is not available for variant '{}' (declared for: {})",
                schema.variant(),
                names.join(", ")
            );
        }
    }
    format!("unknown field '{name}'")
}

fn out_of_range_message(
    rendered: &Value,
    schema_path: &str,
    instance: &Value,
    instance_path: &str,
) -> Option<String> {
    let (parent, _) = schema_path.rsplit_once('/')?;
    let node = rendered.pointer(parent)?;
    let value = instance.pointer(instance_path)?;
    let min = node.get("minimum");
    let max = node.get("maximum");
    match (min, max) {
        (Some(min), Some(max)) => Some(format!(
            "{value} is outside the allowed range {min}..{max}"
        )),
        (Some(min), None) => Some(format!("{value} is below the minimum of {min}")),
        (None, Some(max)) => Some(format!("{value} is above the maximum of {max}")),
        (None, None) => None,
    }
}

/// Convert a JSON Pointer (`/a/b`) to a dotted field path (`a.b`).
fn pointer_to_field(pointer: &str) -> String {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_field(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::registry::{SchemaRegistry, OFFSET_MAX, OFFSET_MIN};
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Offsets are accepted exactly inside the inclusive bound.
        #[test]
        fn offset_accepted_iff_in_bounds(offset in -50i64..50) {
            let schema = SchemaRegistry::builtin().merged_schema(Variant::Cnt);
            let document = ConfigDocument::from_value(json!({
                "variant": "cnt",
                "current_temperature_offset": offset,
            })).unwrap();
            let in_bounds = (OFFSET_MIN..=OFFSET_MAX).contains(&offset);
            prop_assert_eq!(validate(&document, &schema).is_ok(), in_bounds);
        }

        /// Any undeclared root field is rejected on every variant.
        #[test]
        fn undeclared_root_field_rejected(name in "x_[a-z]{1,12}") {
            for v in Variant::all() {
                let schema = SchemaRegistry::builtin().merged_schema(*v);
                let document = ConfigDocument::from_value(json!({
                    "variant": v.as_str(),
                    name.clone(): {},
                })).unwrap();
                let err = validate(&document, &schema).unwrap_err();
                prop_assert_eq!(err.class(), ErrorClass::Schema);
            }
        }
    }
}
