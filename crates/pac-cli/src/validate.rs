//! # Validate Subcommand
//!
//! Loads one configuration file, dispatches on its variant, and reports
//! every violation. Nothing is composed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pac_core::ConfigDocument;
use pac_schema::{validate_document, SchemaRegistry, SchemaValidationError};

use crate::{report_rejection, EXIT_OK, EXIT_REJECTED};

/// Arguments for the `pac validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file (.yaml, .yml or .json).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    validate_path(&args.path)
}

/// Validate the configuration at `path`.
pub fn validate_path(path: &Path) -> Result<u8> {
    let document = ConfigDocument::from_path(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))?;

    match validate_document(&document, &SchemaRegistry::builtin()) {
        Ok(validated) => {
            println!(
                "OK: {} (variant {}, {} field(s))",
                path.display(),
                validated.variant(),
                document.len()
            );
            Ok(EXIT_OK)
        }
        Err(e @ SchemaValidationError::ValidatorBuildError { .. }) => {
            Err(e).context("schema registry is inconsistent")
        }
        Err(e) => {
            let detail = match e.violations() {
                Some(violations) => violations.to_string(),
                None => e.to_string(),
            };
            report_rejection(&path.display().to_string(), e.class(), &detail);
            Ok(EXIT_REJECTED)
        }
    }
}
