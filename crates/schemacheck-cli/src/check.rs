//! # Check Command
//!
//! Loads the schema once and runs every `--file` through the pipeline in
//! the order given. The first fatal condition stops the run and is returned
//! to `main`, which logs it and picks the exit code.
//!
//! With `--ignore-val-err`, a document that fails validation is logged as a
//! warning and the run moves on to the next file; any other failure is
//! still fatal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use schemacheck_schema::{LoadedSchema, SchemaCheckError, TargetFile};

/// Arguments selecting the schema, the documents and the failure policy.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// A valid JSON schema file to use for validation.
    #[arg(
        short,
        long,
        value_name = "SCHEMA",
        required_unless_present = "version"
    )]
    pub schema: Option<PathBuf>,

    /// A YAML or JSON file to check against the schema. Repeat the flag or
    /// pass a comma-separated list to check several.
    #[arg(
        short,
        long = "file",
        value_name = "FILE",
        value_delimiter = ',',
        required_unless_present = "version"
    )]
    pub files: Vec<String>,

    /// Log documents that fail validation as a warning instead of failing.
    #[arg(long = "ignore-val-err")]
    pub ignore_validation_errors: bool,
}

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Documents that went through validation.
    pub checked: usize,
    /// Documents that conformed to the schema.
    pub valid: usize,
    /// Invalid documents let through by `--ignore-val-err`.
    pub ignored: usize,
}

/// Validates documents against one loaded schema.
#[derive(Debug)]
pub struct Checker {
    schema: LoadedSchema,
    ignore_validation_errors: bool,
}

impl Checker {
    pub fn new(schema: LoadedSchema, ignore_validation_errors: bool) -> Self {
        Self {
            schema,
            ignore_validation_errors,
        }
    }

    /// Check one document: resolve its type, normalize, validate, and log
    /// the outcome with one line per violation.
    pub fn check_file(&self, file: &str) -> Result<(), SchemaCheckError> {
        let target = TargetFile::resolve(file)?;
        let report = self.schema.validate_target(&target)?;

        if report.is_valid() {
            tracing::info!("{file} is a valid document.");
        } else {
            tracing::info!("{file} is not a valid document...");
            for violation in report.violations() {
                tracing::error!("--- {violation}");
            }
        }
        report.into_result(file)
    }

    /// Check `files` in order, stopping at the first fatal condition.
    pub fn run<S: AsRef<str>>(&self, files: &[S]) -> Result<CheckSummary, SchemaCheckError> {
        let mut summary = CheckSummary::default();
        for file in files {
            let file = file.as_ref();
            tracing::info!(
                "Validating {file} file against {} schema...",
                self.schema.source()
            );

            match self.check_file(file) {
                Ok(()) => {
                    summary.checked += 1;
                    summary.valid += 1;
                }
                Err(e) if e.is_document_invalid() && self.ignore_validation_errors => {
                    summary.checked += 1;
                    summary.ignored += 1;
                    tracing::warn!("Ignoring validation error.");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }
}

/// Execute the check command.
///
/// Returns exit code 0 when every document passed or was ignored; every
/// other outcome is an error for `main` to report.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let schema_path = args
        .schema
        .as_deref()
        .context("no schema given; pass --schema")?;
    if args.files.is_empty() {
        anyhow::bail!("no files given; pass --file");
    }

    let schema = LoadedSchema::from_path(schema_path)
        .with_context(|| format!("Could not load schema file: '{}'", schema_path.display()))?;
    let checker = Checker::new(schema, args.ignore_validation_errors);

    let summary = checker.run(&args.files)?;
    tracing::info!(
        checked = summary.checked,
        valid = summary.valid,
        ignored = summary.ignored,
        "validation complete"
    );
    Ok(0)
}
