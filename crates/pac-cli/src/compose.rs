//! # Compose Subcommand
//!
//! Runs the full pipeline on one configuration file and prints the
//! controller graph as JSON or YAML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use pac_compose::{compile, Controller, EntityRegistry, PipelineError};
use pac_core::ConfigDocument;
use pac_schema::{SchemaRegistry, SchemaValidationError};

use crate::{report_rejection, EXIT_OK, EXIT_REJECTED};

/// Output encoding of the composed graph.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the `pac compose` subcommand.
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Configuration file (.yaml, .yml or .json).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// File declaring entities the host already owns, as a list of
    /// `{id, kind, name}` records.
    #[arg(long, value_name = "PATH")]
    pub entities: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Execute the compose subcommand.
///
/// Returns exit code: 0 on success, 1 if the configuration is rejected.
pub fn run_compose(args: &ComposeArgs) -> Result<u8> {
    let document = ConfigDocument::from_path(&args.path)
        .with_context(|| format!("failed to load configuration {}", args.path.display()))?;

    let entities = match &args.entities {
        Some(path) => EntityRegistry::from_path(path)
            .with_context(|| format!("failed to load entity declarations {}", path.display()))?,
        None => EntityRegistry::new(),
    };

    match compile(document, &SchemaRegistry::builtin(), &entities) {
        Ok(controller) => {
            println!("{}", render_controller(&controller, args.format)?);
            Ok(EXIT_OK)
        }
        Err(PipelineError::Validation(e @ SchemaValidationError::ValidatorBuildError { .. })) => {
            Err(e).context("schema registry is inconsistent")
        }
        Err(e) => {
            let detail = match &e {
                PipelineError::Validation(v) => v
                    .violations()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| v.to_string()),
                PipelineError::Composition(c) => format!("  {c}"),
            };
            report_rejection(&args.path.display().to_string(), e.class(), &detail);
            Ok(EXIT_REJECTED)
        }
    }
}

/// Serialize the controller graph.
pub fn render_controller(controller: &Controller, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(controller).context("failed to serialize graph as JSON")?
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(controller).context("failed to serialize graph as YAML")?
        }
    };
    Ok(text)
}
