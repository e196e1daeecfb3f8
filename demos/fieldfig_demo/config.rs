//! Configuration structs for the fieldfig demo application.
//!
//! [`DemoConfig`] nests two sections. `server` keeps its own prefix, so its
//! fields read `FIELDFIG_DEMO_SERVER_*` and `--server_*`; `display` uses
//! `omit_prefix` and reads `FIELDFIG_DEMO_COLOR`, `--color` and so on.
//!
//! | Env var                               | Flag                       |
//! |---------------------------------------|----------------------------|
//! | `FIELDFIG_DEMO_NAME`                  | `--name`                   |
//! | `FIELDFIG_DEMO_VERBOSE`               | `--verbose`                |
//! | `FIELDFIG_DEMO_SERVER_HOST`           | `--server_host`            |
//! | `FIELDFIG_DEMO_SERVER_PORT`           | `--server_port`            |
//! | `FIELDFIG_DEMO_SERVER_TIMEOUT`        | `--server_timeout`         |
//! | `FIELDFIG_DEMO_COLOR`                 | `--color`                  |
//! | `FIELDFIG_DEMO_FORMAT`                | `--format`                 |
//! | `DEMO_STARTS_AT`                      | `--starts_at`              |

use std::time::Duration;

use chrono::{DateTime, Utc};
use fieldfig::Config;
use serde::{Deserialize, Serialize};

/// Root configuration for the demo application.
#[derive(Config, Serialize, Deserialize, Debug)]
#[config(validate = check)]
#[serde(default)]
pub struct DemoConfig {
    /// Application name shown in the echo banner.
    pub name: String,

    /// Enable verbose output.
    pub verbose: bool,

    /// When the demo event starts.
    #[config(env = "DEMO_STARTS_AT", format = "2006-01-02 15:04")]
    #[serde(with = "fieldfig::timestamp::serde")]
    pub starts_at: DateTime<Utc>,

    /// Extra labels, comma separated.
    pub labels: Vec<String>,

    #[config(nested)]
    pub server: ServerConfig,

    #[config(nested, env(omit_prefix), flag(omit_prefix))]
    pub display: DisplayConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            name: "fieldfig-demo".into(),
            verbose: false,
            starts_at: DateTime::default(),
            labels: Vec::new(),
            server: ServerConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

#[derive(Config, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname to bind to.
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Request timeout.
    #[serde(with = "fieldfig::duration::serde")]
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Config, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct DisplayConfig {
    /// Terminal color for the echo output (red, green, yellow, blue).
    pub color: String,

    /// Output format (pretty or plain).
    pub format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: "yellow".into(),
            format: "pretty".into(),
        }
    }
}

fn check(cfg: &DemoConfig) -> Result<(), String> {
    match cfg.display.format.as_str() {
        "pretty" | "plain" => Ok(()),
        other => Err(format!("unknown display format '{other}'")),
    }
}
