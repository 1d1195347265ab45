pub use super::model::{Context, FormatKind, LogEntry, ParseError};

/// A named line shape: a detector used during auto-detection plus the
/// transform that turns a matching line into a [`LogEntry`].
pub trait LineFormat: Send + Sync {
    fn kind(&self) -> FormatKind;

    /// Structural check, specific enough not to claim other formats' lines.
    fn detect(&self, line: &str) -> bool;

    /// Pure transform. May be called on lines `detect` rejected (forced
    /// format); the registry degrades any error into a plain entry.
    fn parse(&self, line: &str) -> Result<LogEntry, ParseError>;
}
