use std::collections::HashMap;

use crate::error::FieldfigError;
use crate::value::Slot;
use crate::walk::{Config, FieldInfo, Sink, SourceKind, Walker, write_leaf};

/// Environment variables as a source.
///
/// Built from an iterator so tests can pass synthetic data instead of
/// `std::env::vars()`.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    pub fn new(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Snapshot of the process environment.
    pub fn from_process() -> Self {
        Self::new(std::env::vars())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Write every field whose variable is set and non-empty. Variable names
    /// are the field path in `SCREAMING_SNAKE_CASE`, under `prefix` if given.
    ///
    /// Returns the number of fields written.
    pub fn apply<C: Config + ?Sized>(
        &self,
        prefix: Option<&str>,
        cfg: &mut C,
    ) -> Result<usize, FieldfigError> {
        let mut sink = EnvSink { source: self };
        let written = Walker::run(&mut sink, prefix.unwrap_or_default(), cfg)?;
        tracing::trace!(written, "env stage done");
        Ok(written)
    }
}

struct EnvSink<'a> {
    source: &'a EnvSource,
}

impl Sink for EnvSink<'_> {
    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }

    fn leaf(&mut self, key: &str, info: &FieldInfo, slot: Slot<'_>) -> Result<bool, FieldfigError> {
        match self.source.get(key) {
            Some(raw) => write_leaf(SourceKind::Env, key, raw, info, slot),
            None => Ok(false),
        }
    }
}

/// `KEY=value` lines for every env-visible field, with its current value.
pub fn render_env<C: Config + ?Sized>(
    prefix: Option<&str>,
    cfg: &mut C,
) -> Result<String, FieldfigError> {
    let mut sink = EnvTemplate { lines: Vec::new() };
    Walker::run(&mut sink, prefix.unwrap_or_default(), cfg)?;
    let mut out = sink.lines.join("\n");
    out.push('\n');
    Ok(out)
}

struct EnvTemplate {
    lines: Vec<String>,
}

impl Sink for EnvTemplate {
    fn kind(&self) -> SourceKind {
        SourceKind::Env
    }

    fn leaf(&mut self, key: &str, info: &FieldInfo, mut slot: Slot<'_>) -> Result<bool, FieldfigError> {
        self.lines.push(format!("{key}={}", slot.render(info.format)));
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{ChildConfig, TestConfig};
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    #[test]
    fn simple_values() {
        let mut cfg = TestConfig::default();
        let env = vars(&[("VALUE", "8"), ("FLOAT64", "11.11"), ("DURA", "12s")]);
        let written = env.apply(None, &mut cfg).unwrap();
        assert_eq!(written, 3);
        assert_eq!(cfg.value, 8);
        assert_eq!(cfg.float64, 11.11);
        assert_eq!(cfg.dura, Duration::from_secs(12));
    }

    #[test]
    fn time_uses_format_tag() {
        let mut cfg = TestConfig::default();
        vars(&[("TIME", "2019-05-06")]).apply(None, &mut cfg).unwrap();
        assert_eq!(cfg.time.to_rfc3339(), "2019-05-06T00:00:00+00:00");
    }

    #[test]
    fn prefix_applies_to_every_name() {
        let mut cfg = TestConfig::default();
        let env = vars(&[("APP_NAME", "svc"), ("NAME", "ignored")]);
        env.apply(Some("APP"), &mut cfg).unwrap();
        assert_eq!(cfg.name, "svc");
    }

    #[test]
    fn nested_option_created_on_value() {
        let mut cfg = TestConfig::default();
        vars(&[("POINTER_COUNT", "4")]).apply(None, &mut cfg).unwrap();
        assert_eq!(
            cfg.pointer,
            Some(ChildConfig {
                count: Some(4),
                amount: None
            })
        );
    }

    #[test]
    fn nested_option_left_none_without_values() {
        let mut cfg = TestConfig::default();
        vars(&[("POINTER_COUNT", "0")]).apply(None, &mut cfg).unwrap();
        assert!(cfg.pointer.is_none());
    }

    #[test]
    fn empty_and_zero_values_keep_defaults() {
        let mut cfg = TestConfig {
            name: "default".into(),
            value: 1,
            ..Default::default()
        };
        vars(&[("NAME", ""), ("VALUE", "0")])
            .apply(None, &mut cfg)
            .unwrap();
        assert_eq!(cfg.name, "default");
        assert_eq!(cfg.value, 1);
    }

    #[test]
    fn bad_value_names_the_variable() {
        let mut cfg = TestConfig::default();
        let err = vars(&[("ENABLE", "yes")]).apply(None, &mut cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'yes' from 'ENABLE'"), "{msg}");
        assert!(msg.contains("enable (bool)"), "{msg}");
    }

    #[test]
    fn render_lists_every_variable() {
        let mut cfg = TestConfig {
            name: "svc".into(),
            dura: Duration::from_secs(10),
            ..Default::default()
        };
        let out = render_env(Some("APP"), &mut cfg).unwrap();
        assert!(out.contains("APP_NAME=svc\n"));
        assert!(out.contains("APP_DURA=10s\n"));
        assert!(out.contains("APP_TIME=1970-01-01\n"));
        assert!(out.contains("APP_POINTER_COUNT=\n"));
        assert!(cfg.pointer.is_none());
    }
}
