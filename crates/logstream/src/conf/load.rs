//! Load — config loading from file and environment variables.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use super::model::LogStreamConfig;
use crate::parser::FormatKind;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/logstream/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl LogStreamConfig {
    /// Load configuration from file, then apply environment overrides.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("LOGSTREAM_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            info!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Overlay `LOGSTREAM_*` settings resolved through `lookup`.
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(size) = parse_var(&lookup, "LOGSTREAM_CHUNK_SIZE") {
            self.chunk_size = size;
        }
        if let Some(limit) = parse_var(&lookup, "LOGSTREAM_DEFAULT_LIMIT") {
            self.default_limit = Some(limit);
        }
        if let Some(reads) = parse_var(&lookup, "LOGSTREAM_MAX_READS") {
            self.max_concurrent_reads = reads;
        }
        if let Some(strip) = parse_var(&lookup, "LOGSTREAM_STRIP_ANSI") {
            self.strip_ansi = strip;
        }
    }

    /// Check that configuration values are sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be > 0".to_string()));
        }
        if self.max_concurrent_reads == 0 {
            return Err(ConfigError::Invalid("max_concurrent_reads must be > 0".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &self.format_precedence {
            let kind: FormatKind = name
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("format_precedence: {}", e)))?;
            if kind == FormatKind::Plain {
                return Err(ConfigError::Invalid(
                    "format_precedence: plain is always the fallback and cannot be listed".to_string(),
                ));
            }
            if !seen.insert(kind) {
                return Err(ConfigError::Invalid(format!(
                    "format_precedence: {} listed more than once",
                    kind
                )));
            }
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}
