//! Service — async access to log queries for tokio callers.

pub mod logs;

pub use logs::{LogService, ServiceError};
