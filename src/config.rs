//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`GROQCHAT_*`)
//! 2. Config file (`~/.groqchat/config.toml`)
//! 3. Defaults
//!
//! This covers how the program runs. What the user tunes while chatting
//! (model, temperature, ...) lives in [`crate::core::Settings`].

use crate::error::{Error, Result};
use crate::storage::get_home;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Completion endpoint configuration.
    pub api: ApiConfig,

    /// Logging configuration.
    pub log: LogConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding settings, key, and history.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: get_home() }
    }
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Chat completions URL.
    pub endpoint: String,

    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,

    /// Connection timeout in seconds.
    pub connect_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 120,
            connect_timeout_seconds: 10,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// The matching `tracing` level.
    #[must_use]
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level written to stderr.
    pub level: LogLevel,
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = parse_config(&contents)?;
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Parse a TOML config document.
///
/// # Errors
///
/// Returns `Error::Config` if the document is invalid.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("GROQCHAT_CONFIG") {
        return PathBuf::from(path);
    }
    get_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = env::var("GROQCHAT_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Ok(home) = env::var("GROQCHAT_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Ok(endpoint) = env::var("GROQCHAT_ENDPOINT") {
        if !endpoint.trim().is_empty() {
            config.api.endpoint = endpoint;
        }
    }

    if let Ok(val) = env::var("GROQCHAT_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.api.timeout_seconds = secs;
        }
    }

    if let Ok(val) = env::var("GROQCHAT_LOG") {
        if let Some(level) = LogLevel::parse(&val) {
            config.log.level = level;
        }
    }
}
