use std::ffi::OsString;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::{self, Builtins, Parsed};
use crate::env::EnvSource;
use crate::error::FieldfigError;
use crate::file;
use crate::ops::{self, LoadOutcome};
use crate::types::{Opt, Options};
use crate::walk::Config;

/// Entry point for building a fieldfig loader.
pub struct Fieldfig;

impl Fieldfig {
    pub fn builder() -> FieldfigBuilder {
        FieldfigBuilder::new()
    }
}

/// Builder for loading a config from env vars, a config file and flags.
///
/// Sources are applied in priority order, each overriding the previous one
/// field by field: the struct's own values, then environment variables, then
/// the file given with `-c/--config`, then flags.
#[derive(Debug, Clone)]
pub struct FieldfigBuilder {
    app_name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    options: Options,
    env_prefix: Option<String>,
    env: Option<EnvSource>,
    args: Option<Vec<OsString>>,
    strict: bool,
}

impl Default for FieldfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldfigBuilder {
    fn new() -> Self {
        Self {
            app_name: None,
            description: None,
            version: None,
            options: Options::default(),
            env_prefix: None,
            env: None,
            args: None,
            strict: false,
        }
    }

    /// Application name shown in `--help` (default: `"app"`).
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Description printed at the top of `--help`.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// App version. Enables the `-v/--version` flag.
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Replace the enabled options entirely.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Switch one option off. Everything is on by default.
    pub fn disable(mut self, opt: Opt) -> Self {
        self.options = self.options.disable(opt);
        self
    }

    pub fn enable(mut self, opt: Opt) -> Self {
        self.options = self.options.enable(opt);
        self
    }

    /// Prefix for every environment variable name, joined with `_`
    /// (`APP` reads `APP_PORT`). No prefix by default.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Read these variables instead of the process environment.
    pub fn env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = Some(EnvSource::new(vars));
        self
    }

    /// Parse these arguments instead of `std::env::args_os()`. The first one
    /// is the binary name.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, unknown keys in config files produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn effective_app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or("app")
    }

    fn effective_args(&self) -> Vec<OsString> {
        match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().collect(),
        }
    }

    /// Load `cfg` through every enabled source, then validate it.
    ///
    /// Side commands (`--help`, `--version`, `--gen`, `--show`) return early
    /// with their output instead of [`LoadOutcome::Loaded`]; `--help` and
    /// `--version` before any source is read, `--gen` and `--show` after all
    /// sources but before validation.
    pub fn load<C>(&self, cfg: &mut C) -> Result<LoadOutcome, FieldfigError>
    where
        C: Config + Serialize + DeserializeOwned + fmt::Debug,
    {
        let builtins = Builtins::from_options(&self.options, self.version.is_some());
        let cmd = cli::build_command(
            self.effective_app_name(),
            self.description.as_deref(),
            &builtins,
            cfg,
        )?;
        let flags = match cli::parse(cmd, self.effective_args())? {
            Parsed::Help(text) => return Ok(LoadOutcome::Help(text)),
            Parsed::Matches(flags) => flags,
        };
        if flags.version()
            && let Some(version) = &self.version
        {
            return Ok(LoadOutcome::Version(version.clone()));
        }

        if self.options.is_enabled(Opt::Env) {
            tracing::trace!("applying env");
            match &self.env {
                Some(env) => env.apply(self.env_prefix.as_deref(), cfg)?,
                None => EnvSource::from_process().apply(self.env_prefix.as_deref(), cfg)?,
            };
        }

        if self.options.any_file_format()
            && let Some(path) = flags.config_path()
        {
            tracing::trace!(path = %path.display(), "applying config file");
            file::load_file(&path, &self.options, self.strict, cfg)?;
        }

        if self.options.is_enabled(Opt::Flag) {
            tracing::trace!("applying flags");
            flags.apply(cfg)?;
        }

        if let Some(format) = flags.gen_format() {
            let content = ops::encode(cfg, format, self.env_prefix.as_deref())?;
            return Ok(LoadOutcome::Generated { format, content });
        }
        if flags.show() {
            return Ok(LoadOutcome::Show(ops::show(cfg)));
        }

        cfg.validate().map_err(FieldfigError::Validation)?;
        Ok(LoadOutcome::Loaded)
    }

    /// Like [`load`](Self::load), for `main`: prints side-command output and
    /// exits 0, prints errors to stderr and exits 1.
    pub fn load_or_exit<C>(&self, cfg: &mut C)
    where
        C: Config + Serialize + DeserializeOwned + fmt::Debug,
    {
        match self.load(cfg) {
            Ok(LoadOutcome::Loaded) => {}
            Ok(outcome) => {
                let text = outcome.to_string();
                if text.ends_with('\n') {
                    print!("{text}");
                } else {
                    println!("{text}");
                }
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}
