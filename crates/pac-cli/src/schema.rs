//! # Schema Subcommand
//!
//! Prints the rendered JSON Schema for one variant, or a map of all
//! variants. Each rendering is audited for open objects before printing.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use pac_core::Variant;
use pac_schema::{audit_closed_objects, SchemaRegistry};

use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for the `pac schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Only print this variant's schema (wlan or cnt).
    #[arg(long)]
    pub variant: Option<Variant>,
}

/// Execute the schema subcommand.
///
/// Returns exit code 1 if a rendered schema contains an open object.
pub fn run_schema(args: &SchemaArgs) -> Result<u8> {
    let (output, clean) = render_schemas(&SchemaRegistry::builtin(), args.variant);
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialize schema")?
    );
    Ok(if clean { EXIT_OK } else { EXIT_REJECTED })
}

/// Render the requested schemas and audit them. Returns the output value
/// and whether every rendering is closed.
pub fn render_schemas(registry: &SchemaRegistry, only: Option<Variant>) -> (Value, bool) {
    let variants: Vec<Variant> = match only {
        Some(v) => vec![v],
        None => Variant::all().to_vec(),
    };

    let mut clean = true;
    let mut rendered = Map::new();
    for variant in variants {
        let schema = registry.merged_schema(variant).to_json_schema();
        for finding in audit_closed_objects(&schema) {
            tracing::warn!(%variant, %finding, "rendered schema is not closed");
            clean = false;
        }
        rendered.insert(variant.as_str().to_string(), schema);
    }

    let output = match only {
        Some(v) => rendered.remove(v.as_str()).unwrap_or(Value::Null),
        None => Value::Object(rendered),
    };
    (output, clean)
}
