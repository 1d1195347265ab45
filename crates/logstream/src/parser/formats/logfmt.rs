use crate::parser::level;
use crate::parser::traits::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::parse_datetime;

static LEADING_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][\w.\-]*=").unwrap_or_else(|_| unreachable!())
});

/// `key=value` structured lines as written by logfmt/go-kit/logrus style
/// loggers: `ts=... level=info msg="request served" status=200`.
///
/// The line must open with a pair and carry at least two. Level comes from
/// `level`/`lvl`/`severity` (default `info`), message from
/// `msg`/`message`/`text` (default: the whole line).
///
/// Context: every other pair, values as strings.
pub struct LogfmtFormat;

impl LineFormat for LogfmtFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Logfmt
    }

    fn detect(&self, line: &str) -> bool {
        let line = line.trim();
        LEADING_PAIR.is_match(line) && pairs(line).nth(1).is_some()
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let line = line.trim();

        let mut level = None;
        let mut message = None;
        let mut timestamp = None;
        let mut context = Context::new();

        for (key, value) in pairs(line) {
            match key.as_str() {
                "level" | "lvl" | "severity" if level.is_none() => level = Some(value),
                "msg" | "message" | "text" if message.is_none() => message = Some(value),
                "ts" | "time" | "timestamp" if timestamp.is_none() => timestamp = parse_time(&value),
                _ => {
                    context.insert(key, Value::from(value));
                }
            }
        }

        if level.is_none() && message.is_none() && context.is_empty() {
            return Err(ParseError::InvalidFormat("no key=value pairs".into()));
        }

        let message = match message {
            Some(m) if m.trim().is_empty() => return Err(ParseError::EmptyMessage),
            Some(m) => m,
            None => line.to_string(),
        };

        Ok(LogEntry::new(
            timestamp,
            level.as_deref().unwrap_or(level::INFO),
            message,
            context,
        ))
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    parse_datetime(value).or_else(|| {
        let n = value.parse::<i64>().ok()?;
        if n > 1_000_000_000_000 {
            DateTime::from_timestamp_millis(n)
        } else {
            DateTime::from_timestamp(n, 0)
        }
    })
}

/// Iterate `key=value` pairs. Values may be double-quoted with `\` escapes;
/// bare words without `=` are skipped.
fn pairs(text: &str) -> impl Iterator<Item = (String, String)> + '_ {
    let mut chars = text.chars().peekable();

    std::iter::from_fn(move || loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        chars.peek()?;

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') || key.is_empty() {
            // bare word or stray '='
            while chars.peek().is_some_and(|c| !c.is_whitespace()) {
                chars.next();
            }
            continue;
        }
        chars.next();

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut escaped = false;
            for c in chars.by_ref() {
                if escaped {
                    value.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    break;
                } else {
                    value.push(c);
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        return Some((key, value));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_detect() {
        for sample in [
            "level=info msg=hello ts=2026-01-29",
            r#"severity=error message="something failed" component=api"#,
            r#"lvl=debug text="processing request" duration=150"#,
        ] {
            assert!(LogfmtFormat.detect(sample), "{}", sample);
        }
    }

    #[test]
    fn test_detect_rejects_prose() {
        for sample in [
            "no equals signs here",
            "only=one",
            "if a == b then x=1",
            "=broken pair=1",
            "",
        ] {
            assert!(!LogfmtFormat.detect(sample), "{}", sample);
        }
    }

    #[test]
    fn test_parse() {
        let entry = LogfmtFormat
            .parse(r#"ts=2025-03-14T03:43:47Z level=warn msg="cache miss" key=user:42 logger=app.cache"#)
            .unwrap();
        assert_eq!(entry.level(), "warning");
        assert_eq!(entry.message(), "cache miss");
        assert_eq!(entry.timestamp(), Some(Utc.with_ymd_and_hms(2025, 3, 14, 3, 43, 47).unwrap()));
        assert_eq!(entry.context_str("key"), Some("user:42"));
        assert_eq!(entry.context_str("logger"), Some("app.cache"));
        assert!(entry.context().get("msg").is_none());
    }

    #[test]
    fn test_quoted_values_and_escapes() {
        let entry = LogfmtFormat
            .parse(r#"msg="with \"quotes\" inside" path="/api/users" empty="""#)
            .unwrap();
        assert_eq!(entry.message(), r#"with "quotes" inside"#);
        assert_eq!(entry.context_str("path"), Some("/api/users"));
        assert_eq!(entry.context_str("empty"), Some(""));
    }

    #[test]
    fn test_bare_words_are_skipped() {
        let entry = LogfmtFormat.parse("key1=value1 garbage key2=value2").unwrap();
        assert_eq!(entry.context_str("key1"), Some("value1"));
        assert_eq!(entry.context_str("key2"), Some("value2"));
        assert!(entry.context().get("garbage").is_none());
    }

    #[test]
    fn test_without_message_key_uses_line() {
        let entry = LogfmtFormat.parse("  method=GET status=200  ").unwrap();
        assert_eq!(entry.message(), "method=GET status=200");
        assert_eq!(entry.level(), "info");
    }

    #[test]
    fn test_unix_timestamp() {
        let entry = LogfmtFormat.parse("ts=1741923827 msg=tick").unwrap();
        assert_eq!(entry.timestamp(), Some(Utc.with_ymd_and_hms(2025, 3, 14, 3, 43, 47).unwrap()));
    }

    #[test]
    fn test_rejects_lines_without_pairs() {
        assert!(matches!(LogfmtFormat.parse("just words"), Err(ParseError::InvalidFormat(_))));
        assert!(matches!(LogfmtFormat.parse(r#"msg="" level=info"#), Err(ParseError::EmptyMessage)));
    }
}
