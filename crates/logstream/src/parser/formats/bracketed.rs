use crate::parser::traits::*;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{insert_capture, parse_datetime};

static BRACKETED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(?P<date>\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\] (?:(?P<channel>[\w-]+)\.(?P<level>[A-Za-z]+): |\[(?P<tag>[A-Za-z]+)\] )(?P<msg>.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Application logs with a bracketed date:
/// `[2025-03-14 03:43:47] production.ERROR: message` (Monolog/Laravel) or
/// `[2025-03-14 03:43:47] [error] message`.
///
/// Context: `channel` (Monolog layout only).
pub struct BracketedFormat;

impl LineFormat for BracketedFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Bracketed
    }

    fn detect(&self, line: &str) -> bool {
        BRACKETED_LINE.is_match(line.trim())
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let caps = BRACKETED_LINE
            .captures(line.trim())
            .ok_or_else(|| ParseError::InvalidFormat("not a bracketed log line".into()))?;

        let message = caps["msg"].trim();
        if message.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        let level = caps
            .name("level")
            .or_else(|| caps.name("tag"))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let mut context = Context::new();
        insert_capture(&mut context, &caps, "channel", "channel");

        Ok(LogEntry::new(parse_datetime(&caps["date"]), level, message, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_detect() {
        assert!(BracketedFormat.detect("[2025-03-14 03:43:47] production.ERROR: SQLSTATE[HY000] [2002] Connection refused"));
        assert!(BracketedFormat.detect("[2025-03-14T03:43:47.123+00:00] app.INFO: started"));
        assert!(BracketedFormat.detect("[2025-03-14 03:43:47] [warning] low disk"));
        assert!(!BracketedFormat.detect("[Fri Mar 14 03:43:47 2025] [error] old apache"));
        assert!(!BracketedFormat.detect("plain line"));
    }

    #[test]
    fn test_parse_monolog_layout() {
        let entry = BracketedFormat
            .parse("[2025-03-14 03:43:47] production.ERROR: SQLSTATE[HY000] [2002] Connection refused")
            .unwrap();
        assert_eq!(entry.level(), "error");
        assert_eq!(entry.message(), "SQLSTATE[HY000] [2002] Connection refused");
        assert_eq!(entry.context_str("channel"), Some("production"));
        assert_eq!(entry.timestamp(), Some(Utc.with_ymd_and_hms(2025, 3, 14, 3, 43, 47).unwrap()));
    }

    #[test]
    fn test_parse_tag_layout() {
        let entry = BracketedFormat.parse("[2025-03-14 03:43:47] [warning] low disk").unwrap();
        assert_eq!(entry.level(), "warning");
        assert_eq!(entry.message(), "low disk");
        assert!(entry.context().get("channel").is_none());
    }
}
