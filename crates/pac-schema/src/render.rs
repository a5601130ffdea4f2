//! # JSON Schema Rendering & Closed-Schema Audit
//!
//! Renders a [`MergedSchema`] as a Draft 2020-12 JSON Schema document. The
//! rendering is what the validator compiles, so the feature tables stay the
//! only place field names are declared.
//!
//! Every object in the rendering is closed (`additionalProperties: false`).
//! [`audit_closed_objects`] walks a rendered schema and reports any object
//! node that is not, so a regression in the renderer shows up as a finding
//! rather than as silently accepted unknown fields.

use serde_json::{json, Map, Value};

use crate::field::{FeatureDescriptor, FeatureKind, Gate};
use crate::registry::MergedSchema;

/// Draft identifier written into rendered schemas.
pub const JSON_SCHEMA_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Identifier grammar shared with `pac_core::EntityId`.
pub const IDENTIFIER_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

/// Icons are `<set>:<name>`, e.g. `mdi:air-filter`.
pub const ICON_PATTERN: &str = "^[A-Za-z0-9_-]+:[A-Za-z0-9_-]+$";

/// Accepted sensor state classes.
pub const STATE_CLASSES: &[&str] = &["measurement", "total", "total_increasing"];

/// Render the full document schema for one variant.
pub fn render_merged_schema(schema: &MergedSchema) -> Value {
    let mut properties = Map::new();
    properties.insert("variant".into(), json!({ "type": "string" }));
    properties.insert("id".into(), identifier_schema());
    properties.insert("name".into(), json!({ "type": "string" }));
    properties.insert("icon".into(), icon_schema());
    properties.insert("uart_id".into(), identifier_schema());

    for feature in schema.features() {
        properties.insert(feature.name.into(), feature_schema(feature));
    }

    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": format!("panasonic_ac ({})", schema.variant()),
        "description": format!(
            "Panasonic AC on the {} connector, replacing the {} adapter",
            schema.variant().connector(),
            schema.variant().adapter_model()
        ),
        "type": "object",
        "properties": properties,
        "required": ["variant"],
        "additionalProperties": false,
    })
}

/// Schema of one feature field.
pub fn feature_schema(feature: &FeatureDescriptor) -> Value {
    let value = value_schema(&feature.kind);
    match feature.gate {
        Gate::Direct => value,
        Gate::Supported { companion } => {
            let mut properties = Map::new();
            properties.insert("supported".into(), json!({ "type": "boolean" }));
            properties.insert(companion.into(), value);
            closed_object(properties)
        }
    }
}

fn value_schema(kind: &FeatureKind) -> Value {
    match kind {
        FeatureKind::Selector { .. } | FeatureKind::Switch => closed_object(entity_properties()),
        FeatureKind::Sensor(_) => {
            let mut properties = entity_properties();
            properties.insert("unit_of_measurement".into(), json!({ "type": "string" }));
            properties.insert(
                "accuracy_decimals".into(),
                json!({ "type": "integer", "minimum": 0 }),
            );
            properties.insert("device_class".into(), json!({ "type": "string" }));
            properties.insert("state_class".into(), json!({ "enum": STATE_CLASSES }));
            closed_object(properties)
        }
        FeatureKind::BinarySensor { .. } => {
            let mut properties = entity_properties();
            properties.insert("device_class".into(), json!({ "type": "string" }));
            closed_object(properties)
        }
        FeatureKind::SensorReference => identifier_schema(),
        FeatureKind::Offset { min, max } => json!({
            "type": "integer",
            "minimum": min,
            "maximum": max,
        }),
    }
}

/// Keys every inline entity accepts.
fn entity_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("id".into(), identifier_schema());
    properties.insert("name".into(), json!({ "type": "string" }));
    properties.insert("icon".into(), icon_schema());
    properties.insert("internal".into(), json!({ "type": "boolean" }));
    properties.insert("disabled_by_default".into(), json!({ "type": "boolean" }));
    properties
}

fn closed_object(properties: Map<String, Value>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

fn identifier_schema() -> Value {
    json!({ "type": "string", "pattern": IDENTIFIER_PATTERN })
}

fn icon_schema() -> Value {
    json!({ "type": "string", "pattern": ICON_PATTERN })
}

// ─── Audit ───────────────────────────────────────────────────────────

/// An object node in a rendered schema that accepts unknown properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenObjectFinding {
    /// JSON Pointer to the offending node within the schema.
    pub pointer: String,
}

impl std::fmt::Display for OpenObjectFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let at = if self.pointer.is_empty() { "(root)" } else { &self.pointer };
        write!(f, "{at}: object schema does not set additionalProperties: false")
    }
}

/// Report every `"type": "object"` node that is not closed.
pub fn audit_closed_objects(schema: &Value) -> Vec<OpenObjectFinding> {
    let mut findings = Vec::new();
    walk(schema, String::new(), &mut findings);
    findings
}

fn walk(node: &Value, pointer: String, findings: &mut Vec<OpenObjectFinding>) {
    let Value::Object(map) = node else {
        return;
    };

    if map.get("type") == Some(&Value::String("object".into()))
        && map.get("additionalProperties") != Some(&Value::Bool(false))
    {
        findings.push(OpenObjectFinding {
            pointer: pointer.clone(),
        });
    }

    if let Some(Value::Object(properties)) = map.get("properties") {
        for (name, child) in properties {
            walk(child, format!("{pointer}/properties/{name}"), findings);
        }
    }
}
