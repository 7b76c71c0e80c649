//! # schemacheck-schema — Document Validation Pipeline
//!
//! Checks YAML and JSON documents against a JSON Schema. A check runs four
//! stages, each a plain fallible function so it can be exercised alone:
//!
//! 1. [`extension::file_extension`] — type tag after the first `.`.
//! 2. [`extension::check_supported`] — suffix match against `yaml`, `yml`
//!    and `json`.
//! 3. [`normalize::read_normalized`] — read the file, convert YAML to JSON.
//! 4. [`LoadedSchema::validate_bytes`] — structural validation, producing a
//!    [`ValidationReport`].
//!
//! ## Crate Policy
//!
//! - Nothing here exits the process. Every failure is a [`SchemaCheckError`]
//!   and the caller decides what stops the run.
//! - JSON Schema semantics come from the `jsonschema` crate; this crate only
//!   orchestrates.
//! - A [`LoadedSchema`] is immutable once built and may be shared freely.

pub mod error;
pub mod extension;
pub mod normalize;
pub mod validate;

pub use error::SchemaCheckError;
pub use extension::{check_supported, file_extension, DocumentFormat, TargetFile, SUPPORTED_TYPES};
pub use normalize::{normalize, read_normalized};
pub use validate::{LoadedSchema, ValidationReport, ValidationViolations, Violation};
