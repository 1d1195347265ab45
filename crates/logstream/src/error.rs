//! Error — failures that propagate out of a log query.
//!
//! Parser anomalies never show up here; they are absorbed into degraded
//! entries by the format registry.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read log file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        LogError::NotFound { path: path.as_ref().to_path_buf() }
    }

    pub fn read(path: impl AsRef<Path>, source: io::Error) -> Self {
        LogError::Read { path: path.as_ref().to_path_buf(), source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LogError::NotFound { .. })
    }

    /// Path the failing query was reading.
    pub fn path(&self) -> &Path {
        match self {
            LogError::NotFound { path } | LogError::Read { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_message() {
        let err = LogError::not_found("/var/log/missing.log");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "log file not found: /var/log/missing.log");
    }

    #[test]
    fn test_read_error_wraps_source() {
        let err = LogError::read(
            "/var/log/app.log",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
        assert_eq!(err.path(), Path::new("/var/log/app.log"));
        assert!(err.to_string().contains("denied"));
        assert!(err.source().is_some());
    }
}
