//! Canonical JSON/YAML helpers and stable content hashing.

use std::collections::BTreeMap;
use std::fs;
use std::iter::FromIterator;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, MlsimError};

fn serde_error(code: &str, err: impl ToString) -> MlsimError {
    MlsimError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, MlsimError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}

/// Computes a stable hexadecimal SHA-256 over the canonical JSON form of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, MlsimError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// Loads a YAML document from disk.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, MlsimError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        MlsimError::Serde(
            ErrorInfo::new("yaml-read", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    serde_yaml::from_str(&contents).map_err(|err| {
        MlsimError::Serde(
            ErrorInfo::new("yaml-parse", err.to_string())
                .with_context("path", path.display()),
        )
    })
}

/// Writes `value` as pretty JSON, creating parent directories as needed.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), MlsimError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                MlsimError::Serde(
                    ErrorInfo::new("json-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| serde_error("json-serialize", err))?;
    fs::write(path, json).map_err(|err| {
        MlsimError::Serde(
            ErrorInfo::new("json-write", err.to_string()).with_context("path", path.display()),
        )
    })
}
