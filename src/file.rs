//! Config files as a source.
//!
//! The format is chosen by extension: `.toml`, `.yaml` / `.yml`, `.json`.
//! Files are decoded by serde rather than the field setter, so they can carry
//! nested tables, lists and explicit zeros.
//!
//! # Merging
//!
//! A file overrides the record key by key, not wholesale. The current record is
//! serialized to a JSON object, the decoded file is deep-merged on top of it
//! (see [`deep_merge`](crate::merge::deep_merge)), and the result is
//! deserialized back into the record. Keys the file doesn't mention keep their
//! current value; a `null` keeps it too.
//!
//! Fields marked `#[serde(skip)]` cannot survive the round trip and are reset
//! to their `Default`, private ones included.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{BoxError, FieldfigError};
use crate::merge::deep_merge;
use crate::types::{Opt, Options};
use crate::validate::validate_unknown_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Format for a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(FileFormat::Toml),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    /// The option that enables this format.
    pub fn opt(self) -> Opt {
        match self {
            FileFormat::Toml => Opt::Toml,
            FileFormat::Yaml => Opt::Yaml,
            FileFormat::Json => Opt::Json,
        }
    }

    /// Decode a document into a JSON object. An empty document is an empty object.
    pub fn decode(self, content: &str) -> Result<Map<String, Value>, BoxError> {
        let value = match self {
            FileFormat::Toml => Value::Object(toml_table_to_json(toml::from_str(content)?)),
            _ if content.trim().is_empty() => Value::Null,
            FileFormat::Yaml => serde_yaml::from_str::<Value>(content)?,
            FileFormat::Json => serde_json::from_str::<Value>(content)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(format!("expected a table at the top level, found {}", kind(&other)).into()),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Toml => "TOML",
            FileFormat::Yaml => "YAML",
            FileFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

/// TOML dates and times become strings; everything else maps one to one.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(toml_table_to_json(table)),
    }
}

fn toml_table_to_json(table: toml::Table) -> Map<String, Value> {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

/// Read the file at `path` and merge it into `cfg`.
///
/// Fields the file doesn't mention keep their values, except fields marked
/// `#[serde(skip)]`: those (public or private) are reset to `Default`, since
/// the merge goes through serde.
pub fn load_file<C>(
    path: &Path,
    options: &Options,
    strict: bool,
    cfg: &mut C,
) -> Result<(), FieldfigError>
where
    C: Serialize + DeserializeOwned,
{
    let format = FileFormat::from_path(path).ok_or_else(|| FieldfigError::UnknownFileType {
        path: path.to_path_buf(),
    })?;
    if !options.is_enabled(format.opt()) {
        return Err(FieldfigError::FormatDisabled {
            path: path.to_path_buf(),
            format,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| FieldfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let overlay = format
        .decode(&content)
        .map_err(|source| FieldfigError::Decode {
            path: path.to_path_buf(),
            format,
            source,
        })?;

    merge_document(path, format, overlay, strict, cfg)?;
    tracing::debug!(path = %path.display(), %format, "applied config file");
    Ok(())
}

/// Deep-merge a decoded document into `cfg`.
pub(crate) fn merge_document<C>(
    path: &Path,
    format: FileFormat,
    overlay: Map<String, Value>,
    strict: bool,
    cfg: &mut C,
) -> Result<(), FieldfigError>
where
    C: Serialize + DeserializeOwned,
{
    let base = match serde_json::to_value(&*cfg) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(FieldfigError::Encode {
                format: "json",
                reason: format!("config serialized to {}, expected a table", kind(&other)),
            });
        }
        Err(e) => {
            return Err(FieldfigError::Encode {
                format: "json",
                reason: e.to_string(),
            });
        }
    };

    let merged = Value::Object(deep_merge(base, overlay));
    if strict {
        validate_unknown_keys::<C>(&merged, path, format)?;
    }
    *cfg = serde_json::from_value(merged).map_err(|e| FieldfigError::Decode {
        path: path.to_path_buf(),
        format,
        source: Box::new(e),
    })?;
    Ok(())
}
