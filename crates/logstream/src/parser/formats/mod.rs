/// Individual log format detectors and transforms

pub mod json;
pub mod http_log;
pub mod nginx_error;
pub mod journal;
pub mod python;
pub mod bracketed;
pub mod syslog;
pub mod logfmt;
pub mod plain;

pub use json::JsonFormat;
pub use http_log::ApacheFormat;
pub use nginx_error::NginxErrorFormat;
pub use journal::JournalFormat;
pub use python::PythonFormat;
pub use bracketed::BracketedFormat;
pub use syslog::SyslogFormat;
pub use logfmt::LogfmtFormat;
pub use plain::PlainFormat;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Captures;
use serde_json::Value;

use super::model::Context;

/// Parse the ISO-8601 style timestamps most formats share. Offsets are
/// honoured; naive times are taken as UTC.
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Python writes milliseconds after a comma
    let s = s.replace(',', ".");
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Copy a named capture into the context, skipping absent groups and `-`.
pub(crate) fn insert_capture(context: &mut Context, caps: &Captures<'_>, group: &str, key: &str) {
    if let Some(m) = caps.name(group) {
        let v = m.as_str();
        if !v.is_empty() && v != "-" {
            context.insert(key.to_string(), Value::from(v));
        }
    }
}

/// Like [`insert_capture`] but stores digits as a JSON number.
pub(crate) fn insert_number(context: &mut Context, caps: &Captures<'_>, group: &str, key: &str) {
    if let Some(n) = caps.name(group).and_then(|m| m.as_str().parse::<u64>().ok()) {
        context.insert(key.to_string(), Value::from(n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_datetime("2025-03-14T00:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_offset_without_colon() {
        let dt = parse_datetime("2025-03-14T03:43:47+0100").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 14, 2, 43, 47).unwrap());
    }

    #[test]
    fn test_parse_python_millis() {
        let dt = parse_datetime("2025-03-14 03:43:47,987").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 987);
    }

    #[test]
    fn test_parse_slash_date() {
        assert!(parse_datetime("2025/03/14 03:43:47").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_datetime("yesterday at noon").is_none());
    }
}
