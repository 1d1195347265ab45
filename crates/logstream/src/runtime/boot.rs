//! Boot — logging init and config load.

use std::path::Path;

use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{ConfigError, LogStreamConfig};

/// Initialise the tracing / logging subsystem.
///
/// Diagnostics go to stderr so stdout carries only log entries.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logstream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate configuration. An explicit `config_path` replaces the
/// `LOGSTREAM_CONFIG_FILE` lookup; environment overrides apply either way.
pub fn boot(config_path: Option<&Path>) -> Result<LogStreamConfig, ConfigError> {
    debug!("Starting logstream v{}", env!("CARGO_PKG_VERSION"));

    let config = match config_path {
        Some(path) => {
            debug!("Loading configuration from: {}", path.display());
            let mut config = LogStreamConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => LogStreamConfig::load()?,
    };
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    debug!(
        "Loaded configuration: chunk_size={}, max_concurrent_reads={}, strip_ansi={}",
        config.chunk_size, config.max_concurrent_reads, config.strip_ansi
    );
    debug!("Format precedence: {}", config.format_precedence.join(", "));

    Ok(config)
}
