//! Command-line flags as a source.
//!
//! Flags are built at runtime from the config walk, one `--name` per field
//! (the field path in `snake_case`, joined with `_`), on a clap [`Command`]
//! next to the loader's own flags:
//!
//! - `--show`: print the merged config and stop.
//! - `-c, --config <PATH>`: config file to load.
//! - `-g, --gen <FORMAT>`: print a config template (`toml`, `yaml`, `json`, `env`).
//! - `-v, --version`: print the app version, offered only when one is set.
//!
//! Boolean fields accept a bare `--enable` or an explicit `--enable=false`.
//! Only values given on the command line are applied; the current field value
//! is shown as the default in `--help`.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::FieldfigError;
use crate::ops::GenFormat;
use crate::types::{Opt, Options};
use crate::value::Slot;
use crate::walk::{Config, FieldInfo, Sink, SourceKind, Walker, write_leaf};

const SHOW_ID: &str = "fieldfig.show";
const CONFIG_ID: &str = "fieldfig.config";
const GEN_ID: &str = "fieldfig.gen";
const VERSION_ID: &str = "fieldfig.version";

/// One field flag, as registered on the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub name: String,
    pub help: Option<String>,
    /// Current value of the field, rendered for display.
    pub default: String,
    /// Booleans take an optional `=value`.
    pub switch: bool,
}

/// Collect a [`FlagSpec`] for every flag-visible field.
pub fn flag_specs<C: Config + ?Sized>(cfg: &mut C) -> Result<Vec<FlagSpec>, FieldfigError> {
    let mut registry = FlagRegistry { specs: Vec::new() };
    Walker::run(&mut registry, "", cfg)?;
    Ok(registry.specs)
}

struct FlagRegistry {
    specs: Vec<FlagSpec>,
}

impl Sink for FlagRegistry {
    fn kind(&self) -> SourceKind {
        SourceKind::Flag
    }

    fn leaf(&mut self, key: &str, info: &FieldInfo, mut slot: Slot<'_>) -> Result<bool, FieldfigError> {
        self.specs.push(FlagSpec {
            name: key.to_string(),
            help: info.help.map(str::to_string),
            default: slot.render(info.format),
            switch: matches!(slot, Slot::Bool(_)),
        });
        Ok(false)
    }
}

/// The loader's own flags, derived from the enabled options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Builtins {
    pub show: bool,
    pub config: bool,
    /// Accepted `--gen` formats; empty when generation is off.
    pub gen_formats: Vec<&'static str>,
    pub version: bool,
    /// Register one flag per config field.
    pub fields: bool,
}

impl Builtins {
    pub fn from_options(options: &Options, has_version: bool) -> Self {
        let mut gen_formats = Vec::new();
        if options.is_enabled(Opt::GenConf) && options.any_file_format() {
            gen_formats.extend(
                GenFormat::FILES
                    .iter()
                    .filter(|f| f.opt().is_some_and(|opt| options.is_enabled(opt)))
                    .map(|f| f.name()),
            );
            gen_formats.push(GenFormat::Env.name());
        }
        Self {
            show: options.is_enabled(Opt::Show),
            config: options.any_file_format(),
            gen_formats,
            version: has_version,
            fields: options.is_enabled(Opt::Flag),
        }
    }
}

/// Build the command for `cfg`. Fails if two flags share a name.
pub fn build_command<C: Config + ?Sized>(
    name: &str,
    about: Option<&str>,
    builtins: &Builtins,
    cfg: &mut C,
) -> Result<Command, FieldfigError> {
    let mut cmd = Command::new(name.to_string()).disable_version_flag(true);
    if let Some(about) = about {
        cmd = cmd.about(about.to_string());
    }
    // `help` is claimed by clap.
    let mut taken: HashSet<String> = HashSet::from(["help".to_string()]);

    if builtins.fields {
        for spec in flag_specs(cfg)? {
            if !taken.insert(spec.name.clone()) {
                return Err(FieldfigError::DuplicateFlag(spec.name));
            }
            cmd = cmd.arg(field_arg(spec));
        }
    }

    let mut claim = |long: &str| {
        if taken.insert(long.to_string()) {
            Ok(())
        } else {
            Err(FieldfigError::DuplicateFlag(long.to_string()))
        }
    };
    if builtins.show {
        claim("show")?;
        cmd = cmd.arg(
            Arg::new(SHOW_ID)
                .long("show")
                .action(ArgAction::SetTrue)
                .help("Print the loaded config and exit"),
        );
    }
    if builtins.config {
        claim("config")?;
        cmd = cmd.arg(
            Arg::new(CONFIG_ID)
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path of the config file to load"),
        );
    }
    if !builtins.gen_formats.is_empty() {
        claim("gen")?;
        cmd = cmd.arg(
            Arg::new(GEN_ID)
                .short('g')
                .long("gen")
                .value_name("FORMAT")
                .value_parser(builtins.gen_formats.clone())
                .help("Print a config template in FORMAT and exit"),
        );
    }
    if builtins.version {
        claim("version")?;
        cmd = cmd.arg(
            Arg::new(VERSION_ID)
                .short('v')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version and exit"),
        );
    }
    Ok(cmd)
}

fn field_arg(spec: FlagSpec) -> Arg {
    let help = match (&spec.help, spec.default.is_empty()) {
        (Some(help), false) => format!("{help} [default: {}]", spec.default),
        (Some(help), true) => help.clone(),
        (None, false) => format!("[default: {}]", spec.default),
        (None, true) => String::new(),
    };
    let arg = Arg::new(spec.name.clone())
        .long(spec.name)
        .action(ArgAction::Set)
        .help(help);
    if spec.switch {
        arg.num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_name("BOOL")
    } else {
        arg.value_name("VALUE")
    }
}

/// Outcome of parsing the command line.
#[derive(Debug)]
pub enum Parsed {
    /// `--help` was requested; the rendered help text.
    Help(String),
    Matches(FlagMatches),
}

pub fn parse<I, T>(cmd: Command, args: I) -> Result<Parsed, FieldfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match cmd.try_get_matches_from(args) {
        Ok(matches) => Ok(Parsed::Matches(FlagMatches { matches })),
        Err(e) if e.kind() == ErrorKind::DisplayHelp => Ok(Parsed::Help(e.render().to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Parse `args` against the field flags alone and apply them to `cfg`.
/// `--help` comes back as a clap error of kind `DisplayHelp`.
pub fn apply_args<C, I, T>(cfg: &mut C, args: I) -> Result<usize, FieldfigError>
where
    C: Config + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let builtins = Builtins {
        fields: true,
        ..Builtins::default()
    };
    let matches = build_command("app", None, &builtins, cfg)?.try_get_matches_from(args)?;
    FlagMatches { matches }.apply(cfg)
}

/// Parsed command line.
#[derive(Debug)]
pub struct FlagMatches {
    matches: ArgMatches,
}

impl FlagMatches {
    fn switch(&self, id: &str) -> bool {
        matches!(self.matches.try_get_one::<bool>(id), Ok(Some(true)))
    }

    pub fn show(&self) -> bool {
        self.switch(SHOW_ID)
    }

    pub fn version(&self) -> bool {
        self.switch(VERSION_ID)
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.matches.try_get_one::<PathBuf>(CONFIG_ID).ok().flatten().cloned()
    }

    pub fn gen_format(&self) -> Option<GenFormat> {
        let name = self.matches.try_get_one::<String>(GEN_ID).ok().flatten()?;
        name.parse().ok()
    }

    /// Write every field given on the command line. Returns the number written.
    pub fn apply<C: Config + ?Sized>(&self, cfg: &mut C) -> Result<usize, FieldfigError> {
        let mut sink = FlagValues {
            matches: &self.matches,
        };
        let written = Walker::run(&mut sink, "", cfg)?;
        tracing::trace!(written, "flag stage done");
        Ok(written)
    }
}

struct FlagValues<'m> {
    matches: &'m ArgMatches,
}

impl Sink for FlagValues<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Flag
    }

    fn leaf(&mut self, key: &str, info: &FieldInfo, slot: Slot<'_>) -> Result<bool, FieldfigError> {
        if self.matches.value_source(key) != Some(ValueSource::CommandLine) {
            return Ok(false);
        }
        match self.matches.try_get_one::<String>(key) {
            Ok(Some(raw)) => write_leaf(SourceKind::Flag, key, raw, info, slot),
            _ => Ok(false),
        }
    }
}
