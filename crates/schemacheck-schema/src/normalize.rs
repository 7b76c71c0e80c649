//! # Normalization
//!
//! Reads a target document and produces the JSON bytes handed to the
//! validator. JSON documents pass through untouched; YAML documents are
//! parsed and re-encoded as compact JSON. Only the first document of a
//! multi-document YAML stream is kept, and `<<` merge keys are expanded.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::SchemaCheckError;
use crate::extension::{DocumentFormat, TargetFile};

/// Read `target` from disk and normalize it to JSON bytes.
///
/// # Errors
///
/// `FileRead` if the file cannot be read, `FormatConversion` if YAML
/// content cannot be converted.
pub fn read_normalized(target: &TargetFile) -> Result<Vec<u8>, SchemaCheckError> {
    let data = read_file(Path::new(target.path()))?;
    normalize(target.path(), &data, target.format())
}

/// Read a file's raw bytes, mapping failures to `FileRead`.
pub fn read_file(path: &Path) -> Result<Vec<u8>, SchemaCheckError> {
    std::fs::read(path).map_err(|source| SchemaCheckError::FileRead {
        path: path.display().to_string(),
        source,
    })
}

/// Normalize raw document bytes to JSON. `path` is only used for errors.
pub fn normalize(
    path: &str,
    data: &[u8],
    format: DocumentFormat,
) -> Result<Vec<u8>, SchemaCheckError> {
    match format {
        DocumentFormat::Json => Ok(data.to_vec()),
        DocumentFormat::Yaml => yaml_to_json(data).map_err(|reason| {
            SchemaCheckError::FormatConversion {
                path: path.to_string(),
                reason,
            }
        }),
    }
}

/// Convert YAML bytes to an equivalent JSON encoding.
pub fn yaml_to_json(data: &[u8]) -> Result<Vec<u8>, String> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(b"null".to_vec());
    }
    let mut yaml = match serde_yaml::Deserializer::from_slice(data).next() {
        Some(document) => {
            serde_yaml::Value::deserialize(document).map_err(|e| format!("invalid YAML: {e}"))?
        }
        None => serde_yaml::Value::Null,
    };
    yaml.apply_merge()
        .map_err(|e| format!("invalid YAML merge key: {e}"))?;
    let json = yaml_to_json_value(&yaml)?;
    serde_json::to_vec(&json).map_err(|e| format!("JSON encoding failed: {e}"))
}

/// Convert a `serde_yaml::Value` tree into the equivalent `serde_json::Value`.
///
/// Scalar mapping keys are stringified the way they print. Tags are dropped
/// and the tagged value is kept.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                object.insert(mapping_key(k)?, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

fn mapping_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => mapping_key(&tagged.value),
        other => Err(format!("unsupported YAML map key type: {other:?}")),
    }
}
