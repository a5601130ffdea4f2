//! # pac-schema — Schema Registry and Validation
//!
//! Declares which fields a Panasonic AC configuration may contain for each
//! hardware variant, and checks documents against that declaration.
//!
//! ## Flow
//!
//! ```text
//! ConfigDocument ──dispatch──▶ MergedSchema ──validate──▶ ValidatedConfig
//! ```
//!
//! - [`registry`]: const feature tables and the per-variant merge.
//! - [`dispatch`]: reads the discriminant and picks a merged schema.
//! - [`render`]: renders a merged schema to JSON Schema, plus an audit that
//!   every rendered object is closed.
//! - [`validate`]: structural checks via `jsonschema`, then cross-field
//!   rules. All violations are collected before returning.
//!
//! ## Crate Policy
//!
//! - Depends only on `pac-core` internally.
//! - Feature tables are data. Adding a feature never touches the validator.

pub mod dispatch;
pub mod field;
pub mod registry;
pub mod render;
pub mod validate;

pub use dispatch::{dispatch, validate_document};
pub use field::{FeatureDescriptor, FeatureKind, Gate, LinkSlot, ParameterSlot, Phase, SensorSpec, Target};
pub use registry::{MergedSchema, SchemaRegistry};
pub use render::{audit_closed_objects, OpenObjectFinding};
pub use validate::{
    validate, Rule, SchemaValidationError, ValidatedConfig, ValidationViolations, Violation,
};
