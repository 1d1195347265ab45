use crate::parser::traits::*;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{insert_capture, parse_datetime};

const PY_DATE: &str = r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:,\d{3})?";
const PY_LEVEL: &str = r"DEBUG|INFO|WARNING|WARN|ERROR|CRITICAL|FATAL";

/// `%(asctime)s:%(levelname)s:%(name)s:%(message)s`
static COLON_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<date>{PY_DATE}):(?P<level>{PY_LEVEL}):(?P<logger>[^:]*):(?P<msg>.*)$"
    ))
    .unwrap_or_else(|_| unreachable!())
});

/// `%(asctime)s - %(name)s - %(levelname)s - %(message)s`
static DASH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?P<date>{PY_DATE}) - (?P<logger>\S+) - (?P<level>{PY_LEVEL}) - (?P<msg>.*)$"
    ))
    .unwrap_or_else(|_| unreachable!())
});

/// `logging.basicConfig()` default: `%(levelname)s:%(name)s:%(message)s`
static BASIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?P<level>{PY_LEVEL}):(?P<logger>[\w.]+):(?P<msg>.*)$"))
        .unwrap_or_else(|_| unreachable!())
});

/// Python `logging` output in its common layouts.
///
/// Context: `logger`.
pub struct PythonFormat;

impl PythonFormat {
    fn captures<'l>(line: &'l str) -> Option<Captures<'l>> {
        COLON_LINE
            .captures(line)
            .or_else(|| DASH_LINE.captures(line))
            .or_else(|| BASIC_LINE.captures(line))
    }
}

impl LineFormat for PythonFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Python
    }

    fn detect(&self, line: &str) -> bool {
        let line = line.trim();
        COLON_LINE.is_match(line) || DASH_LINE.is_match(line) || BASIC_LINE.is_match(line)
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let caps = Self::captures(line.trim())
            .ok_or_else(|| ParseError::InvalidFormat("not a python logging line".into()))?;

        let message = caps["msg"].trim();
        if message.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        let timestamp = caps.name("date").and_then(|m| parse_datetime(m.as_str()));

        let mut context = Context::new();
        insert_capture(&mut context, &caps, "logger", "logger");

        Ok(LogEntry::new(timestamp, &caps["level"], message, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    #[test]
    fn test_colon_layout() {
        let line = "2025-03-14 03:43:47,987:ERROR:mod:boom";
        assert!(PythonFormat.detect(line));
        let entry = PythonFormat.parse(line).unwrap();
        assert_eq!(entry.level(), "error");
        assert_eq!(entry.message(), "boom");
        assert_eq!(entry.context_str("logger"), Some("mod"));
        let ts = entry.timestamp().unwrap();
        assert_eq!(ts.with_nanosecond(0), Some(Utc.with_ymd_and_hms(2025, 3, 14, 3, 43, 47).unwrap()));
        assert_eq!(ts.timestamp_subsec_millis(), 987);
    }

    #[test]
    fn test_colon_layout_keeps_colons_in_message() {
        let entry = PythonFormat
            .parse("2025-03-14 03:43:47,987:WARNING:panel.backup:retrying in 5s: timeout")
            .unwrap();
        assert_eq!(entry.level(), "warning");
        assert_eq!(entry.message(), "retrying in 5s: timeout");
        assert_eq!(entry.context_str("logger"), Some("panel.backup"));
    }

    #[test]
    fn test_dash_layout() {
        let line = "2025-03-14 03:43:47,001 - celery.worker - INFO - Task succeeded";
        assert!(PythonFormat.detect(line));
        let entry = PythonFormat.parse(line).unwrap();
        assert_eq!(entry.level(), "info");
        assert_eq!(entry.message(), "Task succeeded");
        assert_eq!(entry.context_str("logger"), Some("celery.worker"));
    }

    #[test]
    fn test_basic_config_layout() {
        let entry = PythonFormat.parse("CRITICAL:root:database unreachable").unwrap();
        assert_eq!(entry.level(), "critical");
        assert_eq!(entry.message(), "database unreachable");
        assert!(entry.timestamp().is_none());
    }

    #[test]
    fn test_no_match() {
        assert!(!PythonFormat.detect("not a known format at all"));
        assert!(!PythonFormat.detect("2025-03-14T03:43:47Z host prog: x"));
        assert!(PythonFormat.parse("nothing").is_err());
    }
}
