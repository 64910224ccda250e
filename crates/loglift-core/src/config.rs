//! Configuration types for loglift.
//!
//! [`Config::load`] layers, in order: the embedded defaults, an optional TOML
//! file (explicit path, or `~/.config/loglift/config.toml`), and environment
//! variables prefixed with `LOGLIFT__` (e.g. `LOGLIFT__SOURCE__PATH`).
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem or the environment (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[source]
path             = "./access.log"
poll_interval_ms = 500

[parser]
timezone     = "Asia/Shanghai"
field_policy = "lenient"

[pipeline]
channel_capacity = 0

[sink]
kind        = "stdout"
measurement = "nginx_log"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

/// `[source]` section: the followed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `[parser]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// IANA timezone name the log's wall-clock timestamps are read in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub field_policy: FieldPolicy,
}

/// What to do with a line whose timestamp or numeric fields are unparsable.
///
/// Grammar, request-line and target failures always drop the line; this
/// setting only decides the softer fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Emit the event with a zero timestamp / zero numeric value.
    #[default]
    Lenient,
    /// Drop the line with `TimestampInvalid` / `NumericInvalid`.
    Strict,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Queue depth of both inter-stage channels. `0` is a synchronous
    /// rendezvous; larger values buffer. A full queue always blocks the sender.
    #[serde(default)]
    pub channel_capacity: usize,
}

/// `[sink]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    /// Output file for the line-protocol sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Stdout,
    LineProtocol,
}

fn default_poll_interval_ms() -> u64 { 500 }
fn default_timezone() -> String { "Asia/Shanghai".to_string() }
fn default_measurement() -> String { "nginx_log".to_string() }

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            field_policy: FieldPolicy::default(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            path: None,
            measurement: default_measurement(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration. An explicit `path` must exist; the
    /// per-user file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::from(user_config_path().as_path()).required(false),
        };

        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("LOGLIFT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Reject settings no stage could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("source.path must not be empty".into()));
        }
        if self.source.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "source.poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.parser.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::UnknownTimezone(self.parser.timezone.clone()));
        }
        if self.sink.kind == SinkKind::LineProtocol && self.sink.path.is_none() {
            return Err(ConfigError::Invalid(
                "sink.path is required for the line_protocol sink".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn user_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("loglift")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
