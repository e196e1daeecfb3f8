//! Struct-driven layered configuration. Define a struct, derive
//! [`Config`], and fill it from environment variables, a config file and
//! command-line flags, field by field.
//!
//! ```ignore
//! #[derive(fieldfig::Config, serde::Serialize, serde::Deserialize, Debug)]
//! #[serde(default)]
//! struct AppConfig {
//!     /// Port to listen on.
//!     pub port: u16,
//!     #[config(env = "DATABASE_URL")]
//!     pub database_url: String,
//! }
//!
//! let mut cfg = AppConfig { port: 8080, ..Default::default() };
//! fieldfig::Fieldfig::builder()
//!     .app_name("myapp")
//!     .env_prefix("MYAPP")
//!     .load_or_exit(&mut cfg);
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Struct values          whatever the struct held before loading
//!        ↑ overridden by
//! Environment vars       MYAPP_PORT
//!        ↑ overridden by
//! Config file            -c app.toml (TOML, YAML or JSON)
//!        ↑ overridden by
//! Flags                  --port=9000
//! ```
//!
//! Every layer is sparse. A source only writes the fields it supplies a
//! non-empty value for; everything else falls through to the layer below.
//! The literal `"0"` on a numeric field counts as "not supplied" for env vars
//! and flags, so they cannot reset a number to zero. Config files can.
//!
//! Loading stops at the first error. Fields written before it keep their new
//! values.
//!
//! # Naming
//!
//! Every public field is a config field unless marked `#[config(ignore)]`.
//! Private fields are never touched.
//!
//! | Field path | Env var | Flag |
//! |------------|---------|------|
//! | `port` | `PORT` | `--port` |
//! | `server.host` | `SERVER_HOST` | `--server_host` |
//! | `database_url` with `env = "DATABASE_URL"` | `DATABASE_URL` | `--database_url` |
//!
//! The env prefix (if any) is joined with `_`. Per source, a field can be
//! renamed (`env = "NAME"`, `flag = "name"`), skipped (`env(skip)`) or, on a
//! `#[config(nested)]` struct, contribute no segment of its own
//! (`env(omit_prefix)`).
//!
//! # Values
//!
//! Strings and paths are taken as-is. Booleans accept `true`/`false` in any
//! case. Durations use unit suffixes (`1h30m`, `250ms`) or plain nanoseconds.
//! Timestamps parse with the layout given by `#[config(format = "...")]`:
//! a symbolic name (`RFC3339`, `Kitchen`, `StampMilli`, ...), a strftime
//! pattern, or a reference-time layout such as `2006-01-02`. Sequences and
//! fixed arrays split on commas. `Option<T>` allocates on first write.
//! Implement [`Value`] (or use [`text_value!`]) for anything else.
//!
//! # Side commands
//!
//! The flag parser also understands `--help`, `-v/--version` (when a version
//! is set), `-c/--config <PATH>`, `-g/--gen <FORMAT>` and `--show`.
//! [`FieldfigBuilder::load`] reports those as a [`LoadOutcome`] instead of
//! printing; [`FieldfigBuilder::load_or_exit`] prints and exits.
//!
//! # Validation
//!
//! `#[config(validate = path)]` on the struct names a
//! `fn(&Self) -> Result<(), E>` that runs after all sources are merged.

extern crate self as fieldfig;

mod builder;
pub mod cli;
pub mod duration;
pub mod env;
pub mod error;
pub mod file;
pub(crate) mod merge;
pub mod ops;
pub mod setter;
pub mod timestamp;
pub mod types;
mod validate;
pub mod value;
pub mod walk;

#[cfg(test)]
mod fixtures;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use builder::{Fieldfig, FieldfigBuilder};
pub use duration::DurationError;
pub use env::EnvSource;
pub use error::{BoxError, FieldfigError, SetError};
pub use fieldfig_derive::Config;
pub use file::FileFormat;
pub use ops::{GenFormat, LoadOutcome};
pub use setter::{set_field, set_value};
pub use timestamp::{Timestamp, TimestampError, set_time};
pub use types::{Opt, Options};
pub use value::{PointerSlot, Scalar, Sequence, Slot, TextValue, Value};
pub use walk::{Config, FieldInfo, NameTag, Section, SourceKind, Visitor};

/// Load `cfg` with a default [`FieldfigBuilder`]: process env, argv, every
/// option on.
pub fn load<C>(cfg: &mut C) -> Result<LoadOutcome, FieldfigError>
where
    C: Config + Serialize + DeserializeOwned + std::fmt::Debug,
{
    Fieldfig::builder().load(cfg)
}

/// Apply only the process environment (no prefix). Returns the number of
/// fields written.
pub fn load_env<C: Config + ?Sized>(cfg: &mut C) -> Result<usize, FieldfigError> {
    EnvSource::from_process().apply(None, cfg)
}

/// Apply only the config file at `path`, format chosen by extension.
pub fn load_file<C>(path: impl AsRef<Path>, cfg: &mut C) -> Result<(), FieldfigError>
where
    C: Config + Serialize + DeserializeOwned,
{
    file::load_file(path.as_ref(), &Options::all(), false, cfg)
}

/// Apply only the field flags from `std::env::args_os()`. Returns the number
/// of fields written.
pub fn load_flags<C: Config + ?Sized>(cfg: &mut C) -> Result<usize, FieldfigError> {
    cli::apply_args(cfg, std::env::args_os())
}
