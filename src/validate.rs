//! Strict-mode validation: detect unknown keys in config files.
//!
//! Uses `serde_ignored` to deserialize the merged document into `C` and
//! capture any keys that `C` doesn't consume.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FieldfigError;
use crate::file::FileFormat;

/// Validate that `doc` contains no keys unknown to config type `C`.
///
/// Each unknown key is reported with its dotted path and the file it came from.
pub fn validate_unknown_keys<C: DeserializeOwned>(
    doc: &Value,
    path: &Path,
    format: FileFormat,
) -> Result<(), FieldfigError> {
    let mut unknown_keys: Vec<String> = Vec::new();

    let _checked: C = serde_ignored::deserialize(doc.clone(), |ignored_path| {
        unknown_keys.push(ignored_path.to_string());
    })
    .map_err(|e| FieldfigError::Decode {
        path: path.to_path_buf(),
        format,
        source: Box::new(e),
    })?;

    if unknown_keys.is_empty() {
        return Ok(());
    }

    let errors: Vec<FieldfigError> = unknown_keys
        .into_iter()
        .map(|key| FieldfigError::UnknownKey {
            key,
            path: path.to_path_buf(),
        })
        .collect();

    Err(FieldfigError::UnknownKeys(errors))
}
