//! # pac-cli — Command-Line Front End
//!
//! ## Subcommands
//!
//! - `validate` — dispatch and validate one configuration file
//! - `compose` — validate, compose, and print the controller graph
//! - `schema` — print the rendered JSON Schema per variant
//!
//! ## Exit Codes
//!
//! - `0` success
//! - `1` the configuration was rejected (validation or composition)
//! - `2` operational error (unreadable file, unparsable document)
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here return an exit code
//!   and delegate all domain logic to the library crates.
//! - Results go to stdout, logs and diagnostics to stderr.

pub mod compose;
pub mod schema;
pub mod validate;

use pac_core::ErrorClass;

/// Exit code for an accepted configuration.
pub const EXIT_OK: u8 = 0;
/// Exit code for a rejected configuration.
pub const EXIT_REJECTED: u8 = 1;

/// Print a rejection report to stderr.
pub(crate) fn report_rejection(subject: &str, class: ErrorClass, detail: &str) {
    eprintln!("FAIL: {subject} [{class}]");
    eprintln!("{detail}");
}
