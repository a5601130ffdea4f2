//! # pac CLI entry point
//!
//! Parses command-line arguments, initialises logging and dispatches to the
//! subcommand handlers in the library crate.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pac_cli::compose::{run_compose, ComposeArgs};
use pac_cli::schema::{run_schema, SchemaArgs};
use pac_cli::validate::{run_validate, ValidateArgs};

/// Panasonic AC configuration compiler.
///
/// Validates air-conditioner configurations against the per-variant schema,
/// composes the controller graph, and prints the JSON Schema of each
/// variant.
#[derive(Parser, Debug)]
#[command(name = "pac", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a configuration file and report every violation.
    Validate(ValidateArgs),

    /// Validate a configuration and print the composed controller graph.
    Compose(ComposeArgs),

    /// Print the JSON Schema of one or all variants.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "pac starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Compose(args) => run_compose(&args),
        Commands::Schema(args) => run_schema(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
