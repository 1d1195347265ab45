//! Conf module — configuration model and loading.

pub mod model;
pub mod load;

pub use model::LogStreamConfig;
pub use load::{ConfigError, DEFAULT_CONFIG_PATH};
