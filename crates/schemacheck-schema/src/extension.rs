//! # Extension Resolution and Type Gate
//!
//! A target path is split at its first `.`; everything after it is the
//! type tag (`values.yaml` → `yaml`, `a.b.c` → `b.c`). The tag is then
//! checked by suffix against the supported types, so tags that still carry
//! path fragments (`./values.yaml` → `/values.yaml`) are accepted.

use crate::error::SchemaCheckError;

/// Types accepted by [`check_supported`], in match order.
pub const SUPPORTED_TYPES: [&str; 3] = ["yaml", "yml", "json"];

/// Encoding of a target document, derived from its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.yaml` or `.yml`; converted to JSON before validation.
    Yaml,
    /// `.json`; validated as-is.
    Json,
}

impl DocumentFormat {
    fn from_type(ty: &str) -> Option<Self> {
        match ty {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Return the type tag of `path`: the substring after the first `.`.
///
/// # Errors
///
/// `SchemaCheckError::MissingSeparator` if `path` contains no `.`.
pub fn file_extension(path: &str) -> Result<&str, SchemaCheckError> {
    path.split_once('.')
        .map(|(_, ext)| ext)
        .ok_or_else(|| SchemaCheckError::MissingSeparator {
            path: path.to_string(),
        })
}

/// Check that `extension` (the tag resolved from `path`) ends in a supported
/// type and return the matching document format.
///
/// A type matches when the tag equals it or ends in `.<type>`.
///
/// # Errors
///
/// `SchemaCheckError::UnsupportedType` when no supported type matches.
pub fn check_supported(path: &str, extension: &str) -> Result<DocumentFormat, SchemaCheckError> {
    let mut matched = None;
    for ty in SUPPORTED_TYPES {
        if tag_has_type(extension, ty) {
            tracing::info!("File: \"{path}\" has valid file extension: \"{ty}\"");
            matched = DocumentFormat::from_type(ty);
        }
    }

    matched.ok_or_else(|| SchemaCheckError::UnsupportedType {
        path: path.to_string(),
        extension: extension.to_string(),
    })
}

fn tag_has_type(tag: &str, ty: &str) -> bool {
    match tag.strip_suffix(ty) {
        Some("") => true,
        Some(rest) => rest.ends_with('.'),
        None => false,
    }
}

/// A target document path together with what was derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    path: String,
    extension: String,
    format: DocumentFormat,
}

impl TargetFile {
    /// Resolve the type tag of `path` and run it through the type gate.
    pub fn resolve(path: impl Into<String>) -> Result<Self, SchemaCheckError> {
        let path = path.into();
        let extension = file_extension(&path)?.to_string();
        let format = check_supported(&path, &extension)?;
        Ok(Self {
            path,
            extension,
            format,
        })
    }

    /// Path as supplied.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type tag (everything after the first `.`).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_of_common_types() {
        assert_eq!(file_extension("test_data/values.yaml").unwrap(), "yaml");
        assert_eq!(file_extension("test_data/values.yml").unwrap(), "yml");
        assert_eq!(file_extension("test_data/values.json").unwrap(), "json");
    }

    #[test]
    fn extension_splits_on_first_separator_only() {
        assert_eq!(file_extension("a.b.c").unwrap(), "b.c");
    }

    #[test]
    fn extension_keeps_leading_path_fragment() {
        assert_eq!(file_extension("./values.yaml").unwrap(), "/values.yaml");
    }

    #[test]
    fn extension_missing_separator() {
        let err = file_extension("test_data/noseparator").unwrap_err();
        assert!(
            matches!(err, SchemaCheckError::MissingSeparator { .. }),
            "Expected MissingSeparator, got: {err}"
        );
    }

    #[test]
    fn supported_types_pass_the_gate() {
        assert_eq!(
            check_supported("test_data/values.yaml", "yaml").unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            check_supported("test_data/values.yml", "yml").unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            check_supported("test_data/values.json", "json").unwrap(),
            DocumentFormat::Json
        );
    }

    #[test]
    fn txt_is_rejected() {
        let err = check_supported("test_data/values.txt", "txt").unwrap_err();
        match err {
            SchemaCheckError::UnsupportedType { path, extension } => {
                assert_eq!(path, "test_data/values.txt");
                assert_eq!(extension, "txt");
            }
            other => panic!("Expected UnsupportedType, got: {other}"),
        }
    }

    #[test]
    fn gate_matches_by_suffix() {
        assert_eq!(
            check_supported("./values.yaml", "/values.yaml").unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            check_supported("config.prod.json", "prod.json").unwrap(),
            DocumentFormat::Json
        );
    }

    #[test]
    fn gate_requires_a_separator_before_the_type() {
        assert!(check_supported("values.notjson", "notjson").is_err());
        assert!(check_supported("values.json.bak", "json.bak").is_err());
    }

    #[test]
    fn target_file_resolves_path() {
        let target = TargetFile::resolve("fixtures/values.v2.yml").unwrap();
        assert_eq!(target.path(), "fixtures/values.v2.yml");
        assert_eq!(target.extension(), "v2.yml");
        assert_eq!(target.format(), DocumentFormat::Yaml);
    }

    #[test]
    fn target_file_propagates_gate_errors() {
        assert!(matches!(
            TargetFile::resolve("README"),
            Err(SchemaCheckError::MissingSeparator { .. })
        ));
        assert!(matches!(
            TargetFile::resolve("notes.txt"),
            Err(SchemaCheckError::UnsupportedType { .. })
        ));
    }
}
