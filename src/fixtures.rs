#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    use crate::Config;

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    #[serde(default)]
    pub struct TestConfig {
        /// Service name.
        pub name: String,

        /// A plain integer.
        pub value: i32,

        pub uint: u32,

        /// How long to wait.
        #[serde(with = "crate::duration::serde")]
        pub dura: Duration,

        #[config(format = "2006-01-02")]
        #[serde(with = "crate::timestamp::serde")]
        pub time: DateTime<Utc>,

        /// Turn the feature on.
        pub enable: bool,

        pub float32: f32,

        pub float64: f64,

        #[config(nested)]
        pub pointer: Option<ChildConfig>,
    }

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    #[serde(default)]
    pub struct ChildConfig {
        pub count: Option<i32>,
        pub amount: Option<f64>,
    }

    /// Defaults every layered-load test starts from.
    pub fn defaults() -> TestConfig {
        TestConfig {
            name: "default".into(),
            value: 1,
            dura: Duration::from_secs(1),
            enable: true,
            float32: 1.5,
            ..Default::default()
        }
    }

    // -- Fixture for skip / rename / omit_prefix tags ----------------------------

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    #[serde(default)]
    pub struct TaggedConfig {
        #[config(env = "DATABASE_URL", flag = "db")]
        pub database_url: String,

        #[config(env(skip))]
        pub flag_only: u16,

        #[config(flag(skip))]
        pub env_only: u16,

        #[config(nested, env(omit_prefix), flag(omit_prefix))]
        pub server: ServerConfig,

        #[config(ignore)]
        #[serde(skip)]
        pub ignored: std::collections::HashMap<String, String>,

        pub tags: Vec<String>,

        #[serde(skip)]
        hidden: u8,
    }

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    #[serde(default)]
    pub struct ServerConfig {
        /// Listen port.
        pub port: u16,
        pub host: String,
    }

    impl TaggedConfig {
        pub fn hidden(&self) -> u8 {
            self.hidden
        }
    }

    // -- Fixture for the validation hook -----------------------------------------

    #[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
    #[config(validate = check_range)]
    #[serde(default)]
    pub struct RangeConfig {
        pub min: i64,
        pub max: i64,
    }

    fn check_range(cfg: &RangeConfig) -> Result<(), String> {
        if cfg.min > cfg.max {
            return Err(format!("min {} is greater than max {}", cfg.min, cfg.max));
        }
        Ok(())
    }

    #[test]
    fn derive_reports_public_fields_only() {
        use crate::{FieldInfo, Slot, Visitor};

        struct Names(Vec<&'static str>);
        impl Visitor for Names {
            fn leaf(&mut self, info: &FieldInfo, _: Slot<'_>) -> Result<(), crate::FieldfigError> {
                self.0.push(info.name);
                Ok(())
            }
            fn nested(
                &mut self,
                info: &FieldInfo,
                section: &mut dyn crate::Section,
            ) -> Result<(), crate::FieldfigError> {
                self.0.push(info.name);
                section.enter(self)
            }
            fn applied(&self) -> usize {
                0
            }
        }

        let mut names = Names(Vec::new());
        TaggedConfig::default().walk(&mut names).unwrap();
        assert_eq!(
            names.0,
            vec![
                "database_url",
                "flag_only",
                "env_only",
                "server",
                "port",
                "host",
                "tags"
            ]
        );
    }

    #[test]
    fn derive_collects_doc_help_and_format() {
        use crate::{FieldInfo, Slot, Visitor};

        #[derive(Default)]
        struct Infos(Vec<FieldInfo>);
        impl Visitor for Infos {
            fn leaf(&mut self, info: &FieldInfo, _: Slot<'_>) -> Result<(), crate::FieldfigError> {
                self.0.push(*info);
                Ok(())
            }
            fn nested(
                &mut self,
                info: &FieldInfo,
                _: &mut dyn crate::Section,
            ) -> Result<(), crate::FieldfigError> {
                self.0.push(*info);
                Ok(())
            }
            fn applied(&self) -> usize {
                0
            }
        }

        let mut infos = Infos::default();
        TestConfig::default().walk(&mut infos).unwrap();
        let dura = infos.0.iter().find(|i| i.name == "dura").unwrap();
        assert_eq!(dura.help, Some("How long to wait."));
        assert_eq!(dura.type_name, "Duration");
        let time = infos.0.iter().find(|i| i.name == "time").unwrap();
        assert_eq!(time.format, Some("2006-01-02"));
        assert_eq!(time.type_name, "DateTime<Utc>");
        let pointer = infos.0.iter().find(|i| i.name == "pointer").unwrap();
        assert_eq!(pointer.type_name, "Option<ChildConfig>");
    }

    #[test]
    fn derive_wires_validate() {
        let ok = RangeConfig { min: 1, max: 2 };
        assert!(ok.validate().is_ok());
        let bad = RangeConfig { min: 3, max: 2 };
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("greater than max"));
    }

    #[test]
    fn default_validate_is_a_no_op() {
        assert!(TestConfig::default().validate().is_ok());
    }

    #[test]
    fn hidden_field_untouched_by_env() {
        let mut cfg = TaggedConfig::default();
        let env = crate::env::EnvSource::new([("HIDDEN".to_string(), "9".to_string())]);
        env.apply(None, &mut cfg).unwrap();
        assert_eq!(cfg.hidden(), 0);
    }
}
