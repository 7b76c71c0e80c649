//! # Error Types
//!
//! Every failure the validation pipeline can report. Nothing in this crate
//! terminates the process: each stage returns a [`SchemaCheckError`] and the
//! caller decides whether the run stops.

use thiserror::Error;

use crate::validate::ValidationViolations;

/// Error raised by a stage of the validation pipeline.
#[derive(Error, Debug)]
pub enum SchemaCheckError {
    /// The target path has no `.` to split a type tag from.
    #[error("file separator not found in '{path}'")]
    MissingSeparator {
        /// Path as supplied on the command line.
        path: String,
    },

    /// The type tag does not end in one of the supported types.
    #[error("file type not supported: '{path}' (extension '{extension}')")]
    UnsupportedType {
        /// Path as supplied on the command line.
        path: String,
        /// Type tag resolved from the path.
        extension: String,
    },

    /// The schema or a target document could not be read.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// Path that failed to open or read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// YAML content could not be converted to JSON.
    #[error("failed to convert yaml to json in '{path}': {reason}")]
    FormatConversion {
        /// Path of the YAML document.
        path: String,
        /// Parser or conversion message.
        reason: String,
    },

    /// The validation engine could not run: unparsable JSON, an invalid
    /// schema, or an unresolvable `$ref`.
    #[error("there was a problem validating '{path}': {reason}")]
    Engine {
        /// Schema or document path the engine was working on.
        path: String,
        /// Engine message.
        reason: String,
    },

    /// The document was checked and does not conform to the schema.
    #[error("document not valid: '{path}' ({} violation(s))", .violations.len())]
    DocumentInvalid {
        /// Path of the invalid document.
        path: String,
        /// Violations in engine order.
        violations: ValidationViolations,
    },
}

impl SchemaCheckError {
    /// True when the error only says the document failed validation, as
    /// opposed to the pipeline being unable to check it.
    pub fn is_document_invalid(&self) -> bool {
        matches!(self, Self::DocumentInvalid { .. })
    }
}
