//! # Schema Validation
//!
//! Loads a JSON Schema once, compiles it with the `jsonschema` crate and
//! validates normalized target documents against it.
//!
//! ## Schema Resolution
//!
//! Cross-file `$ref`s are resolved against the directory holding the schema
//! file. A reference is taken relative to the root schema's base URI (its
//! `$id` directory, or the engine default when there is none) and that
//! relative path, subdirectories included, is looked up under the schema
//! directory: `"$ref": "common/defs.json"` loads `<dir>/common/defs.json`.
//! References outside the base URI or climbing out with `..` are rejected.
//! Nothing is fetched over the network; a reference that does not name a
//! readable local file fails the schema load.

use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::error::SchemaCheckError;
use crate::extension::TargetFile;
use crate::normalize;

/// Base URI the engine assigns to a root schema without `$id`.
const DEFAULT_BASE_URI: &str = "json-schema:///";

/// Resolves `$ref` URIs to schema files under the root schema's directory.
struct SiblingSchemaRetriever {
    base_dir: Option<PathBuf>,
    /// Root schema's base URI, up to and including the last `/`.
    base_uri: String,
}

impl SiblingSchemaRetriever {
    fn new(base_dir: Option<&Path>, schema: &Value) -> Self {
        let base_uri = schema
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| id.split('#').next())
            .and_then(|id| id.rfind('/').map(|i| id[..=i].to_string()))
            .unwrap_or_else(|| DEFAULT_BASE_URI.to_string());
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
            base_uri,
        }
    }

    /// Map a reference URI to a file below `base_dir`.
    fn local_path(&self, uri: &str) -> Result<PathBuf, String> {
        let base_dir = self
            .base_dir
            .as_ref()
            .ok_or_else(|| format!("cannot resolve $ref '{uri}': schema has no base directory"))?;
        let without_fragment = uri.split('#').next().unwrap_or(uri);
        let relative = without_fragment
            .strip_prefix(self.base_uri.as_str())
            .or_else(|| without_fragment.strip_prefix(DEFAULT_BASE_URI))
            .ok_or_else(|| format!("cannot resolve $ref '{uri}': outside the schema directory"))?;

        let mut path = base_dir.clone();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(format!(
                        "cannot resolve $ref '{uri}': escapes the schema directory"
                    ))
                }
                name => path.push(name),
            }
        }
        if path == *base_dir {
            return Err(format!("cannot resolve $ref '{uri}': names no file"));
        }
        Ok(path)
    }
}

impl Retrieve for SiblingSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let path = self.local_path(uri_str)?;
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot resolve $ref '{uri_str}' ({}): {e}", path.display()))?;
        let value = serde_json::from_str(&content)
            .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
        Ok(value)
    }
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Violations for one document, in the order the engine reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Number of violations reported for the document.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True when the document conformed.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in engine order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    violations: ValidationViolations,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &ValidationViolations {
        &self.violations
    }

    /// Turn an invalid report into `SchemaCheckError::DocumentInvalid`.
    pub fn into_result(self, path: &str) -> Result<(), SchemaCheckError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SchemaCheckError::DocumentInvalid {
                path: path.to_string(),
                violations: self.violations,
            })
        }
    }
}

/// A parsed and compiled JSON Schema.
///
/// Built once per run and shared read-only by every document check;
/// validation never mutates it.
pub struct LoadedSchema {
    source: String,
    validator: Validator,
}

impl fmt::Debug for LoadedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl LoadedSchema {
    /// Read, parse and compile the schema file at `path`.
    ///
    /// # Errors
    ///
    /// `FileRead` if the file cannot be read; `Engine` if it is not JSON,
    /// is not a valid schema, or has an unresolvable `$ref`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaCheckError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let bytes = normalize::read_file(path)?;
        let schema: Value =
            serde_json::from_slice(&bytes).map_err(|e| SchemaCheckError::Engine {
                path: source.clone(),
                reason: format!("invalid JSON schema: {e}"),
            })?;

        let base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::from_value(source, schema, Some(&base_dir))
    }

    /// Compile an already-parsed schema. `base_dir` is where cross-file
    /// `$ref`s are looked up; with `None` they fail to resolve.
    pub fn from_value(
        source: impl Into<String>,
        schema: Value,
        base_dir: Option<&Path>,
    ) -> Result<Self, SchemaCheckError> {
        let source = source.into();
        let mut opts = jsonschema::options();
        opts.with_retriever(SiblingSchemaRetriever::new(base_dir, &schema));

        let validator = opts.build(&schema).map_err(|e| SchemaCheckError::Engine {
            path: source.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(schema = %source, "compiled schema");
        Ok(Self { source, validator })
    }

    /// Where the schema came from (its path for file-loaded schemas).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Validate a parsed document.
    pub fn validate_value(&self, instance: &Value) -> ValidationReport {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        ValidationReport {
            violations: violations.into(),
        }
    }

    /// Validate normalized JSON bytes. `path` names the document in errors.
    ///
    /// # Errors
    ///
    /// `Engine` if `json` does not parse as JSON.
    pub fn validate_bytes(
        &self,
        path: &str,
        json: &[u8],
    ) -> Result<ValidationReport, SchemaCheckError> {
        let instance: Value =
            serde_json::from_slice(json).map_err(|e| SchemaCheckError::Engine {
                path: path.to_string(),
                reason: format!("invalid JSON document: {e}"),
            })?;
        Ok(self.validate_value(&instance))
    }

    /// Read, normalize and validate a resolved target file.
    pub fn validate_target(
        &self,
        target: &TargetFile,
    ) -> Result<ValidationReport, SchemaCheckError> {
        let json = normalize::read_normalized(target)?;
        self.validate_bytes(target.path(), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name_schema() -> LoadedSchema {
        LoadedSchema::from_value(
            "inline",
            json!({
                "type": "object",
                "required": ["name"],
                "properties": { "name": { "type": "string" } }
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn valid_document_has_no_violations() {
        let report = name_schema().validate_value(&json!({"name": "Frank"}));
        assert!(report.is_valid());
        assert!(report.violations().is_empty());
        assert!(report.into_result("values.json").is_ok());
    }

    #[test]
    fn missing_required_property_is_reported() {
        let report = name_schema().validate_value(&json!({}));
        assert!(!report.is_valid());
        assert_eq!(report.violations().len(), 1);
        let violation = &report.violations().violations()[0];
        assert!(violation.instance_path.is_empty());
        assert!(
            violation.message.contains("name"),
            "Expected violation mentioning 'name', got: {}",
            violation.message
        );
    }

    #[test]
    fn wrong_type_points_at_instance() {
        let report = name_schema().validate_value(&json!({"name": 42}));
        let violation = &report.violations().violations()[0];
        assert_eq!(violation.instance_path, "/name");
        assert!(violation.to_string().starts_with("/name: "));
    }

    #[test]
    fn invalid_report_converts_to_document_invalid() {
        let err = name_schema()
            .validate_value(&json!({}))
            .into_result("invalid.json")
            .unwrap_err();
        match err {
            SchemaCheckError::DocumentInvalid { path, violations } => {
                assert_eq!(path, "invalid.json");
                assert_eq!(violations.len(), 1);
            }
            other => panic!("Expected DocumentInvalid, got: {other}"),
        }
    }

    #[test]
    fn validation_is_repeatable() {
        let schema = name_schema();
        let doc = json!({"name": 7, "extra": true});
        let first = schema.validate_value(&doc);
        let second = schema.validate_value(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn unparsable_bytes_are_an_engine_error() {
        let err = name_schema()
            .validate_bytes("broken.json", b"{\"name\": ")
            .unwrap_err();
        assert!(
            matches!(err, SchemaCheckError::Engine { .. }),
            "Expected Engine, got: {err}"
        );
    }

    #[test]
    fn invalid_schema_is_an_engine_error() {
        let err = LoadedSchema::from_value("bad", json!({"type": 12}), None).unwrap_err();
        assert!(
            matches!(err, SchemaCheckError::Engine { .. }),
            "Expected Engine, got: {err}"
        );
    }

    #[test]
    fn refs_keep_subdirectories() {
        let retriever = SiblingSchemaRetriever::new(Some(Path::new("/schemas")), &json!({}));
        assert_eq!(
            retriever.local_path("json-schema:///common/defs.json#/x").unwrap(),
            PathBuf::from("/schemas/common/defs.json")
        );
    }

    #[test]
    fn refs_resolve_under_root_id() {
        let schema = json!({"$id": "https://example.com/schemas/root.json"});
        let retriever = SiblingSchemaRetriever::new(Some(Path::new("/schemas")), &schema);
        assert_eq!(
            retriever
                .local_path("https://example.com/schemas/common/defs.json")
                .unwrap(),
            PathBuf::from("/schemas/common/defs.json")
        );
        assert!(retriever
            .local_path("https://elsewhere.example.com/defs.json")
            .is_err());
    }

    #[test]
    fn refs_cannot_escape_schema_directory() {
        let retriever = SiblingSchemaRetriever::new(Some(Path::new("/schemas")), &json!({}));
        let err = retriever
            .local_path("json-schema:///common/../../etc/passwd")
            .unwrap_err();
        assert!(err.contains("escapes"), "got: {err}");
        assert!(retriever.local_path("json-schema:///").is_err());
    }

    #[test]
    fn refs_without_base_dir_fail() {
        let retriever = SiblingSchemaRetriever::new(None, &json!({}));
        assert!(retriever.local_path("json-schema:///defs.json").is_err());
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""name" is a required property"#.to_string(),
        };
        assert_eq!(v.to_string(), r#"(root): "name" is a required property"#);
    }

    #[test]
    fn violations_display_one_per_line() {
        let violations = ValidationViolations::from(vec![
            Violation {
                instance_path: "/a".to_string(),
                schema_path: "/properties/a/type".to_string(),
                message: "first".to_string(),
            },
            Violation {
                instance_path: "/b".to_string(),
                schema_path: "/properties/b/type".to_string(),
                message: "second".to_string(),
            },
        ]);
        assert_eq!(violations.to_string(), "/a: first\n/b: second");
    }
}
