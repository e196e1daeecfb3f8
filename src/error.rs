use std::path::PathBuf;

use thiserror::Error;

use crate::duration::DurationError;
use crate::file::FileFormat;
use crate::timestamp::TimestampError;

/// Boxed error used by user hooks (`FromStr` impls, validation).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A string could not be converted into a field's type.
#[derive(Debug, Error)]
pub enum SetError {
    #[error("cannot assign '{0}' to bool type")]
    AmbiguousBool(String),

    #[error("invalid integer '{value}': {source}")]
    Int {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid float '{value}': {source}")]
    Float {
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("cannot set array of different lengths got {got} want {want}")]
    LengthMismatch { got: usize, want: usize },

    #[error("invalid value '{value}': {source}")]
    Text { value: String, source: BoxError },

    #[error("unsupported type '{0}'")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum FieldfigError {
    #[error("'{value}' from '{key}' cannot be set to {field} ({ty}): {source}")]
    Field {
        key: String,
        value: String,
        field: &'static str,
        ty: &'static str,
        source: SetError,
    },

    #[error("'omit_prefix' cannot be used on non-struct field '{field}'")]
    OmitPrefixOnLeaf { field: &'static str },

    #[error("Flag '--{0}' is defined more than once")]
    DuplicateFlag(String),

    #[error("Unknown file type '{path}'")]
    UnknownFileType { path: PathBuf },

    #[error("{format} config files are disabled: {path}")]
    FormatDisabled { path: PathBuf, format: FileFormat },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file {path}: {source}")]
    Decode {
        path: PathBuf,
        format: FileFormat,
        source: BoxError,
    },

    #[error("Unknown key '{key}' in {path}")]
    UnknownKey { key: String, path: PathBuf },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<FieldfigError>),

    #[error(transparent)]
    Flags(#[from] clap::Error),

    #[error("Failed to encode config as {format}: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("Validation failed: {0}")]
    Validation(#[source] BoxError),
}

impl FieldfigError {
    /// Attach the external name, raw value and destination field to a setter failure.
    pub(crate) fn field(
        key: &str,
        value: &str,
        info: &crate::walk::FieldInfo,
        source: SetError,
    ) -> Self {
        FieldfigError::Field {
            key: key.to_string(),
            value: value.to_string(),
            field: info.name,
            ty: info.type_name,
            source,
        }
    }
}
