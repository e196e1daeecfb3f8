//! Load outcomes and the encoders behind `--gen` and `--show`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::env::render_env;
use crate::error::FieldfigError;
use crate::types::Opt;
use crate::walk::Config;

/// What a load ended with. Side commands stop the load before validation and
/// hand their output back to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Every enabled source was applied and the config validated.
    Loaded,
    /// `--help` was requested.
    Help(String),
    /// `-v/--version` was requested.
    Version(String),
    /// `--show`: the merged config, pretty-printed.
    Show(String),
    /// `-g/--gen`: the merged config encoded as a template.
    Generated { format: GenFormat, content: String },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded => Ok(()),
            LoadOutcome::Help(text) | LoadOutcome::Show(text) => write!(f, "{text}"),
            LoadOutcome::Version(v) => write!(f, "{v}"),
            LoadOutcome::Generated { content, .. } => write!(f, "{content}"),
        }
    }
}

/// Template formats for `-g/--gen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenFormat {
    Toml,
    Yaml,
    Json,
    /// `KEY=value` lines, one per environment variable.
    Env,
}

impl GenFormat {
    pub const FILES: [GenFormat; 3] = [GenFormat::Toml, GenFormat::Yaml, GenFormat::Json];

    pub fn name(self) -> &'static str {
        match self {
            GenFormat::Toml => "toml",
            GenFormat::Yaml => "yaml",
            GenFormat::Json => "json",
            GenFormat::Env => "env",
        }
    }

    /// The file-format option this template depends on.
    pub fn opt(self) -> Option<Opt> {
        match self {
            GenFormat::Toml => Some(Opt::Toml),
            GenFormat::Yaml => Some(Opt::Yaml),
            GenFormat::Json => Some(Opt::Json),
            GenFormat::Env => None,
        }
    }
}

impl fmt::Display for GenFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GenFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(GenFormat::Toml),
            "yaml" | "yml" => Ok(GenFormat::Yaml),
            "json" => Ok(GenFormat::Json),
            "env" => Ok(GenFormat::Env),
            other => Err(format!("unknown config format '{other}'")),
        }
    }
}

/// Encode `cfg` in `format`. Env templates name variables under `env_prefix`.
pub fn encode<C>(cfg: &mut C, format: GenFormat, env_prefix: Option<&str>) -> Result<String, FieldfigError>
where
    C: Config + Serialize + ?Sized,
{
    let encode_err = |reason: String| FieldfigError::Encode {
        format: format.name(),
        reason,
    };
    match format {
        GenFormat::Toml => toml::to_string_pretty(&*cfg).map_err(|e| encode_err(e.to_string())),
        GenFormat::Yaml => serde_yaml::to_string(&*cfg).map_err(|e| encode_err(e.to_string())),
        GenFormat::Json => serde_json::to_string_pretty(&*cfg)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| encode_err(e.to_string())),
        GenFormat::Env => render_env(env_prefix, cfg),
    }
}

/// Pretty debug dump of the loaded config.
pub fn show<C: fmt::Debug + ?Sized>(cfg: &C) -> String {
    format!("{cfg:#?}\n")
}
