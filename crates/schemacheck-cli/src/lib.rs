//! # schemacheck-cli — Command-Line Interface
//!
//! Provides the `schemacheck` binary: validate YAML and JSON documents
//! against a JSON Schema and fail the build when one does not conform.
//!
//! ```bash
//! schemacheck --schema schema.json --file values.yaml --file values.json
//! schemacheck -s schema.json -f a.yaml,b.yml --ignore-val-err
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; the pipeline lives in
//!   `schemacheck-schema`. This crate wires the two together.
//! - Only `main` ends the process. Handlers return `Result` and exit codes.

pub mod check;
pub mod logging;

/// Version reported by `--version`. Release builds set
/// `SCHEMACHECK_VERSION` to the release tag.
pub const VERSION: &str = match option_env!("SCHEMACHECK_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
