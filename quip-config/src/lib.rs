//! Loader for Quip configuration with YAML + environment overlays.
//!
//! Sources are layered in the order they are added, then `QUIP_`-prefixed
//! environment variables win (`QUIP_API__BASE_URL` sets `api.base_url`).
//! String values may reference other variables as `${VAR}`; expansion is
//! applied after merging. Every field has a default, so an empty source set
//! yields a usable [`QuipConfig`].
use config::{Config, ConfigError, Environment, File};
use quip_common::LogFormat;
pub use quip_common::DEFAULT_BASE_URL;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuipConfig {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub connectivity: ConnectivityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Whole-request timeout enforced by the transport.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: 15_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Wait before each request; 0 disables the wait.
    pub delay_ms: u64,
}

impl FetchConfig {
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityMode {
    /// Trust a host-maintained flag (online unless told otherwise).
    #[default]
    Flag,
    /// Probe `probe_addr` over TCP when a fetch fails.
    Probe,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    pub mode: ConnectivityMode,
    pub probe_addr: String,
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            mode: ConnectivityMode::Flag,
            probe_addr: "1.1.1.1:53".into(),
            probe_timeout_ms: 1_500,
        }
    }
}

impl ConnectivityConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct QuipConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    with_env: bool,
}

impl Default for QuipConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl QuipConfigLoader {
    /// Start with defaults plus `QUIP_` env overrides.
    ///
    /// ```
    /// use quip_config::QuipConfigLoader;
    ///
    /// let config = QuipConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str("fetch:\n  delay_ms: 250")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.fetch.delay_ms, 250);
    /// assert_eq!(config.api.base_url, "https://api.chucknorris.io/");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            with_env: true,
        }
    }

    /// Skip the environment layer (tests, sandboxed runs).
    pub fn without_env(mut self) -> Self {
        self.with_env = false;
        self
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when the file
    /// does not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use quip_config::{ConnectivityMode, QuipConfigLoader};
    ///
    /// temp_env::with_var("MIRROR_HOST", Some("jokes.internal"), || {
    ///     let config = QuipConfigLoader::new()
    ///         .without_env()
    ///         .with_yaml_str(r#"
    /// api:
    ///   base_url: "http://${MIRROR_HOST}/"
    /// connectivity:
    ///   mode: probe
    /// "#)
    ///         .load()
    ///         .expect("valid configuration");
    ///
    ///     assert_eq!(config.api.base_url, "http://jokes.internal/");
    ///     assert_eq!(config.connectivity.mode, ConnectivityMode::Probe);
    ///     assert_eq!(config.connectivity.probe_addr, "1.1.1.1:53");
    /// });
    /// ```
    pub fn load(self) -> Result<QuipConfig, ConfigError> {
        let mut builder = self.builder;
        if self.with_env {
            builder = builder.add_source(
                Environment::with_prefix("QUIP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let cfg = builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: QuipConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        validate(&typed)?;
        Ok(typed)
    }
}

fn validate(cfg: &QuipConfig) -> Result<(), ConfigError> {
    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Message("api.base_url must not be empty".into()));
    }
    if cfg.api.timeout_ms == 0 {
        return Err(ConfigError::Message("api.timeout_ms must be positive".into()));
    }
    if cfg.connectivity.mode == ConnectivityMode::Probe && cfg.connectivity.probe_addr.is_empty()
    {
        return Err(ConfigError::Message(
            "connectivity.probe_addr is required in probe mode".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("jokes.test")), ("PORT", Some("8080"))], || {
            let mut v = json!([
                "http://$HOST",
                { "probe_addr": "${HOST}:${PORT}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["http://jokes.test", { "probe_addr": "jokes.test:8080" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn empty_sources_give_defaults() {
        let cfg = QuipConfigLoader::new().without_env().load().unwrap();
        assert_eq!(cfg, QuipConfig::default());
        assert_eq!(cfg.fetch.delay(), None);
        assert_eq!(cfg.api.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = QuipConfigLoader::new()
            .without_env()
            .with_yaml_str("api:\n  timeout_ms: 0")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn logging_section_parses() {
        let cfg = QuipConfigLoader::new()
            .without_env()
            .with_yaml_str("logging:\n  format: json\n  stderr: true\n  filter: debug")
            .load()
            .unwrap();
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert!(cfg.logging.stderr);
        assert_eq!(cfg.logging.filter, "debug");
    }
}
