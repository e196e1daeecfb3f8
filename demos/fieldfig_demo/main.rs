//! # fieldfig demo application
//!
//! A sample CLI tool that loads [`config::DemoConfig`] from env vars, a
//! config file and flags, then prints the result. It exists to demonstrate
//! and manually verify fieldfig's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example fieldfig_demo
//! cargo run --example fieldfig_demo -- --help
//! ```
//!
//! | Feature              | How to exercise it                                                     |
//! |----------------------|------------------------------------------------------------------------|
//! | Struct defaults      | `cargo run --example fieldfig_demo`                                    |
//! | Env var              | `FIELDFIG_DEMO_SERVER_PORT=9999 cargo run --example fieldfig_demo`     |
//! | Renamed env var      | `DEMO_STARTS_AT="2024-05-06 09:30" cargo run --example fieldfig_demo`  |
//! | Config file          | `cargo run --example fieldfig_demo -- -c demo.toml`                    |
//! | Flag                 | `cargo run --example fieldfig_demo -- --color=blue --verbose`          |
//! | Template             | `cargo run --example fieldfig_demo -- --gen toml`                      |
//! | Show merged config   | `cargo run --example fieldfig_demo -- --show`                          |
//! | Version              | `cargo run --example fieldfig_demo -- -v`                              |
//! | Validation error     | `cargo run --example fieldfig_demo -- --format=fancy`                  |
//! | Debug logging        | `RUST_LOG=fieldfig=debug cargo run --example fieldfig_demo`            |

mod config;

use fieldfig::Fieldfig;
use tracing_subscriber::EnvFilter;

use config::DemoConfig;

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn echo_all(config: &DemoConfig) {
    let color = ansi_color_code(&config.display.color);

    if config.verbose {
        println!("{color}[verbose] Loaded configuration for {:?}{RESET}", config.name);
        println!();
    }

    let entries = [
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("starts_at", config.starts_at.format("%Y-%m-%d %H:%M").to_string()),
        ("labels", config.labels.join(",")),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        (
            "server.timeout",
            fieldfig::duration::format_duration(config.server.timeout),
        ),
        ("display.color", config.display.color.clone()),
        ("display.format", config.display.format.clone()),
    ];

    if config.display.format == "plain" {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = DemoConfig::default();
    Fieldfig::builder()
        .app_name("fieldfig-demo")
        .description("A sample CLI app for showcasing fieldfig.")
        .version(env!("CARGO_PKG_VERSION"))
        .env_prefix("FIELDFIG_DEMO")
        .load_or_exit(&mut config);

    echo_all(&config);
}
