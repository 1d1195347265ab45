use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::level;

/// Loosely typed per-format attributes (client IP, PID, program name, ...).
pub type Context = Map<String, Value>;

/// Built-in line formats, in no particular order. Detection precedence lives
/// in the registry, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// One JSON object per line
    Json,
    /// Apache/Nginx common and combined access logs
    Apache,
    /// Nginx error log (`2025/03/14 03:43:47 [error] 12#0: ...`)
    NginxError,
    /// journalctl `short-iso` output
    Journal,
    /// Python `logging` default layouts
    Python,
    /// `[date] channel.LEVEL: message` application logs
    Bracketed,
    /// BSD syslog (RFC 3164), with or without a `<PRI>` prefix
    Syslog,
    /// `key=value` pairs (`level=info msg="..."`)
    Logfmt,
    /// Structureless fallback
    Plain,
}

impl FormatKind {
    pub const ALL: [FormatKind; 9] = [
        FormatKind::Json,
        FormatKind::Apache,
        FormatKind::NginxError,
        FormatKind::Journal,
        FormatKind::Python,
        FormatKind::Bracketed,
        FormatKind::Syslog,
        FormatKind::Logfmt,
        FormatKind::Plain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Json => "json",
            FormatKind::Apache => "apache",
            FormatKind::NginxError => "nginx_error",
            FormatKind::Journal => "journal",
            FormatKind::Python => "python",
            FormatKind::Bracketed => "bracketed",
            FormatKind::Syslog => "syslog",
            FormatKind::Logfmt => "logfmt",
            FormatKind::Plain => "plain",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatKind {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(FormatKind::Json),
            "apache" | "nginx" | "access" | "http_log" | "combined" => Ok(FormatKind::Apache),
            "nginx_error" | "nginxerror" | "nginx-error" => Ok(FormatKind::NginxError),
            "journal" | "journald" | "systemd" => Ok(FormatKind::Journal),
            "python" | "py" => Ok(FormatKind::Python),
            "bracketed" | "laravel" | "monolog" => Ok(FormatKind::Bracketed),
            "syslog" => Ok(FormatKind::Syslog),
            "logfmt" | "kv" => Ok(FormatKind::Logfmt),
            "plain" | "plaintext" | "plain_text" | "text" => Ok(FormatKind::Plain),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Why a transform could not build an entry. Never leaves the registry.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Empty message")]
    EmptyMessage,
}

/// Part of a rendered line that callers may ask to omit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Date,
    Level,
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Segment::Date),
            "level" => Ok(Segment::Level),
            other => Err(format!("unknown segment '{}', expected date or level", other)),
        }
    }
}

const RENDER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A classified log line.
///
/// Entries are immutable once built; the query engine only filters them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Source timestamp. Absent when the line carries no recognisable date.
    #[serde(rename = "date")]
    timestamp: Option<DateTime<Utc>>,

    level: String,

    message: String,

    #[serde(default)]
    context: Context,
}

impl LogEntry {
    /// Build an entry. The level is normalised to the canonical vocabulary.
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        level: &str,
        message: impl Into<String>,
        context: Context,
    ) -> Self {
        Self {
            timestamp,
            level: level::normalize(level),
            message: message.into(),
            context,
        }
    }

    /// The structureless entry used when no format applies.
    pub fn unstructured(line: &str) -> Self {
        Self {
            timestamp: None,
            level: level::UNKNOWN.to_string(),
            message: line.trim().to_string(),
            context: Context::new(),
        }
    }

    /// Best-effort entry for a line a format's transform rejected.
    pub fn degraded(line: &str, format: FormatKind, error: &ParseError) -> Self {
        let mut context = Context::new();
        context.insert("format".to_string(), Value::from(format.as_str()));
        context.insert("parse_error".to_string(), Value::from(error.to_string()));
        Self {
            timestamp: None,
            level: level::UNKNOWN.to_string(),
            message: line.trim().to_string(),
            context,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Convenience lookup for string-valued context attributes.
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }

    /// Rebuild a human-readable line: `<date> [<level>] <message>`.
    pub fn render(&self, hide: &[Segment]) -> String {
        let mut out = String::with_capacity(self.message.len() + 32);

        if !hide.contains(&Segment::Date) {
            if let Some(ts) = self.timestamp {
                out.push_str(&ts.format(RENDER_DATE_FORMAT).to_string());
                out.push(' ');
            }
        }
        if !hide.contains(&Segment::Level) {
            out.push('[');
            out.push_str(&self.level);
            out.push_str("] ");
        }
        out.push_str(&self.message);
        out
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> LogEntry {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 3, 43, 47).unwrap();
        let mut context = Context::new();
        context.insert("pid".to_string(), Value::from(42));
        LogEntry::new(Some(ts), "ERROR", "disk full", context)
    }

    #[test]
    fn test_level_is_normalized() {
        assert_eq!(sample().level(), "error");
        assert_eq!(LogEntry::new(None, "WARN", "x", Context::new()).level(), "warning");
    }

    #[test]
    fn test_render_full() {
        assert_eq!(sample().to_string(), "2025-03-14 03:43:47 [error] disk full");
    }

    #[test]
    fn test_render_hide_segments() {
        let entry = sample();
        assert_eq!(entry.render(&[Segment::Date]), "[error] disk full");
        assert_eq!(entry.render(&[Segment::Level]), "2025-03-14 03:43:47 disk full");
        assert_eq!(entry.render(&[Segment::Date, Segment::Level]), "disk full");
    }

    #[test]
    fn test_render_without_timestamp_omits_date() {
        let entry = LogEntry::unstructured("  something happened  ");
        assert_eq!(entry.to_string(), "[unknown] something happened");
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2025-03-14T03:43:47Z");
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "disk full");
        assert_eq!(json["context"]["pid"], 42);

        let back: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_degraded_entry_context() {
        let entry = LogEntry::degraded(" raw line ", FormatKind::Syslog, &ParseError::EmptyMessage);
        assert_eq!(entry.message(), "raw line");
        assert_eq!(entry.level(), "unknown");
        assert_eq!(entry.context_str("format"), Some("syslog"));
        assert_eq!(entry.context_str("parse_error"), Some("Empty message"));
    }

    #[test]
    fn test_format_kind_from_str() {
        assert_eq!("JSON".parse::<FormatKind>(), Ok(FormatKind::Json));
        assert_eq!("nginx".parse::<FormatKind>(), Ok(FormatKind::Apache));
        assert_eq!("systemd".parse::<FormatKind>(), Ok(FormatKind::Journal));
        assert!("windows_event".parse::<FormatKind>().is_err());
        for kind in FormatKind::ALL {
            assert_eq!(kind.as_str().parse::<FormatKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_segment_from_str() {
        assert_eq!("Date".parse::<Segment>(), Ok(Segment::Date));
        assert!("message".parse::<Segment>().is_err());
    }
}
