use crate::parser::level;
use crate::parser::traits::*;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{insert_capture, insert_number, parse_datetime};

/// `journalctl -o short-iso` layout.
static JOURNAL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<date>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})) (?P<host>\S+) (?P<prog>[^\s\[:]+)(?:\[(?P<pid>\d+)\])?: (?P<msg>.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// systemd journal export: `2025-03-14T03:43:47+0000 host unit[pid]: message`.
///
/// The journal text export carries no priority, so the level comes from
/// message keywords.
///
/// Context: `host`, `program`, `pid`.
pub struct JournalFormat;

impl LineFormat for JournalFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Journal
    }

    fn detect(&self, line: &str) -> bool {
        JOURNAL_LINE.is_match(line.trim())
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let caps = JOURNAL_LINE
            .captures(line.trim())
            .ok_or_else(|| ParseError::InvalidFormat("not a journal line".into()))?;

        let message = caps["msg"].trim();
        if message.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        let mut context = Context::new();
        insert_capture(&mut context, &caps, "host", "host");
        insert_capture(&mut context, &caps, "prog", "program");
        insert_number(&mut context, &caps, "pid", "pid");

        Ok(LogEntry::new(
            parse_datetime(&caps["date"]),
            level::from_keywords(message),
            message,
            context,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    #[test]
    fn test_detect() {
        assert!(JournalFormat.detect("2025-03-14T03:43:47+0000 web01 sshd[812]: Accepted publickey for deploy"));
        assert!(JournalFormat.detect("2025-03-14T03:43:47.123456+01:00 web01 kernel: eth0: link up"));
        assert!(!JournalFormat.detect("2025-03-14 03:43:47,987:ERROR:mod:boom"));
        assert!(!JournalFormat.detect("Mar 14 03:43:47 web01 sshd[812]: hello"));
    }

    #[test]
    fn test_parse() {
        let entry = JournalFormat
            .parse("2025-03-14T03:43:47+0100 web01 systemd[1]: Failed to start nginx.service.")
            .unwrap();
        assert_eq!(entry.level(), "error");
        assert_eq!(entry.message(), "Failed to start nginx.service.");
        assert_eq!(entry.timestamp(), Some(Utc.with_ymd_and_hms(2025, 3, 14, 2, 43, 47).unwrap()));
        assert_eq!(entry.context_str("host"), Some("web01"));
        assert_eq!(entry.context_str("program"), Some("systemd"));
        assert_eq!(entry.context().get("pid"), Some(&Value::from(1)));
    }

    #[test]
    fn test_parse_without_pid() {
        let entry = JournalFormat
            .parse("2025-03-14T03:43:47Z web01 kernel: eth0: link up")
            .unwrap();
        assert_eq!(entry.level(), "info");
        assert_eq!(entry.context_str("program"), Some("kernel"));
        assert!(entry.context().get("pid").is_none());
    }
}
