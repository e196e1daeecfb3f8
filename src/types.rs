use std::collections::BTreeSet;
use std::fmt;

/// A loader feature that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opt {
    /// Read environment variables.
    Env,
    /// Accept `.toml` config files.
    Toml,
    /// Accept `.yaml` / `.yml` config files.
    Yaml,
    /// Accept `.json` config files.
    Json,
    /// Parse command-line flags.
    Flag,
    /// Offer `-g/--gen` to print a config template.
    GenConf,
    /// Offer `--show` to print the merged config.
    Show,
}

impl Opt {
    pub const ALL: [Opt; 7] = [
        Opt::Env,
        Opt::Toml,
        Opt::Yaml,
        Opt::Json,
        Opt::Flag,
        Opt::GenConf,
        Opt::Show,
    ];

    pub const FILES: [Opt; 3] = [Opt::Toml, Opt::Yaml, Opt::Json];
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opt::Env => "env",
            Opt::Toml => "toml",
            Opt::Yaml => "yaml",
            Opt::Json => "json",
            Opt::Flag => "flag",
            Opt::GenConf => "gen",
            Opt::Show => "show",
        };
        f.write_str(name)
    }
}

/// The set of enabled [`Opt`]s. Everything is enabled by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    enabled: BTreeSet<Opt>,
}

impl Default for Options {
    fn default() -> Self {
        Self::all()
    }
}

impl Options {
    pub fn all() -> Self {
        Self {
            enabled: Opt::ALL.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    pub fn enable(mut self, opt: Opt) -> Self {
        self.enabled.insert(opt);
        self
    }

    /// Disabling twice is the same as disabling once.
    pub fn disable(mut self, opt: Opt) -> Self {
        self.enabled.remove(&opt);
        self
    }

    pub fn is_enabled(&self, opt: Opt) -> bool {
        self.enabled.contains(&opt)
    }

    pub fn any_file_format(&self) -> bool {
        Opt::FILES.iter().any(|opt| self.is_enabled(*opt))
    }

    pub fn iter(&self) -> impl Iterator<Item = Opt> + '_ {
        self.enabled.iter().copied()
    }
}

impl FromIterator<Opt> for Options {
    fn from_iter<I: IntoIterator<Item = Opt>>(iter: I) -> Self {
        Self {
            enabled: iter.into_iter().collect(),
        }
    }
}
