//! Configuration loading
//!
//! Bootstrap configuration comes from an optional TOML file. Settings are
//! resolved in priority order:
//! 1. Command-line argument (highest priority, handled by each binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing default config file is not an error: the services start with
//! compiled defaults and log a notice.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the generative model credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "CHARTSPEAK_CONFIG";

/// Default port of the analysis adapter (chartspeak-ai)
pub const DEFAULT_AI_PORT: u16 = 5780;

/// Default port of the chart player control API (chartspeak-ap)
pub const DEFAULT_AP_PORT: u16 = 5781;

/// Default hosted model
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Default Gemini REST base URL
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub player: PlayerConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Analysis adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model credential (prefer the GEMINI_API_KEY environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_ai_port")]
    pub port: u16,

    /// Upstream request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            bind_address: default_bind_address(),
            port: default_ai_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Chart player control API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_ap_port")]
    pub port: u16,

    /// Initial tone volume (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Time between data points during autoplay
    #[serde(default = "default_autoplay_interval_ms")]
    pub autoplay_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_ap_port(),
            volume: default_volume(),
            autoplay_interval_ms: default_autoplay_interval_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_ai_port() -> u16 {
    DEFAULT_AI_PORT
}

fn default_ap_port() -> u16 {
    DEFAULT_AP_PORT
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_volume() -> u8 {
    80
}

fn default_autoplay_interval_ms() -> u64 {
    800
}

/// Default config file location: `<config_dir>/chartspeak/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chartspeak").join("config.toml"))
}

/// Where the bootstrap configuration came from
///
/// Loading happens before tracing is installed, so binaries call
/// [`ConfigSource::log`] once the subscriber is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file at this path; compiled defaults
    Missing(PathBuf),
    /// No platform config directory; compiled defaults
    NoConfigDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => {
                info!("No config file at {}, using defaults", path.display())
            }
            ConfigSource::NoConfigDir => {
                warn!("Could not determine config directory, using defaults")
            }
        }
    }
}

/// Load the bootstrap configuration
///
/// `explicit_path` (from the command line) must exist. Otherwise the path
/// from `CHARTSPEAK_CONFIG` or the platform default is tried, and a missing
/// file falls back to compiled defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    if let Some(path) = explicit_path {
        let config = read_toml_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    let candidate = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(default_config_path);

    match candidate {
        Some(path) if path.exists() => {
            let config = read_toml_config(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        Some(path) => Ok((TomlConfig::default(), ConfigSource::Missing(path))),
        None => Ok((TomlConfig::default(), ConfigSource::NoConfigDir)),
    }
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolve the model credential
///
/// **Priority:** ENV (`GEMINI_API_KEY`) → TOML (`ai.api_key`)
///
/// Returns `None` when no valid key is configured; the adapter then answers
/// analysis requests with a configuration error instead of refusing to start.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .ai
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Model API key found in environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Model API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Model API key loaded from TOML config");
        return Some(key);
    }

    warn!("Model API key not configured; analysis requests will fail until {} is set", API_KEY_ENV);
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_directives` is used
/// (e.g. `"chartspeak_ai=info,tower_http=info"`).
pub fn init_tracing(default_directives: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives.into());

    // A second initialization (tests, embedding) is not an error worth failing over.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Default log directives for a crate at the configured level
pub fn log_directives(crate_target: &str, logging: &LoggingConfig) -> String {
    format!("{crate_target}={level},chartspeak_common={level},tower_http={level}", level = logging.level)
}
