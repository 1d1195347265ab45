use crate::parser::level;
use crate::parser::traits::*;
use serde_json::{Map, Value};

const LEVEL_FIELDS: [&str; 5] = ["level", "severity", "lvl", "loglevel", "levelname"];
const MESSAGE_FIELDS: [&str; 4] = ["message", "msg", "text", "log"];
const TIME_FIELDS: [&str; 6] = ["timestamp", "time", "ts", "@timestamp", "datetime", "date"];

/// One JSON object per line (structured application logs).
///
/// Context: every key not consumed as level/message/timestamp, with its raw
/// JSON value. A line that looks like an object but does not parse becomes a
/// `message = "Invalid JSON"` entry carrying the line under `raw`.
pub struct JsonFormat;

impl LineFormat for JsonFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    fn detect(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('{') && trimmed.ends_with('}')
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let trimmed = line.trim();

        let mut obj = match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(obj)) => obj,
            _ => return Ok(invalid_json(trimmed)),
        };

        let level = take_string_field(&mut obj, &LEVEL_FIELDS)
            .map(|l| level::normalize(&l))
            .unwrap_or_else(|| level::INFO.to_string());

        let message = take_string_field(&mut obj, &MESSAGE_FIELDS)
            .unwrap_or_else(|| trimmed.to_string());

        let timestamp = take_timestamp(&mut obj);

        Ok(LogEntry::new(timestamp, &level, message, obj))
    }
}

fn invalid_json(raw: &str) -> LogEntry {
    let mut context = Context::new();
    context.insert("raw".to_string(), Value::from(raw));
    LogEntry::new(None, level::ERROR, "Invalid JSON", context)
}

/// Remove and return the first of `field_names` holding a scalar.
fn take_string_field(obj: &mut Map<String, Value>, field_names: &[&str]) -> Option<String> {
    for field in field_names {
        let result = match obj.get(*field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        };

        if result.is_some() {
            obj.remove(*field);
            return result;
        }
    }
    None
}

fn take_timestamp(obj: &mut Map<String, Value>) -> Option<chrono::DateTime<chrono::Utc>> {
    for field in TIME_FIELDS {
        let result = match obj.get(field) {
            Some(Value::Number(n)) => n.as_i64().and_then(from_unix),
            Some(Value::String(s)) => super::parse_datetime(s)
                .or_else(|| s.parse::<i64>().ok().and_then(from_unix)),
            _ => None,
        };

        if result.is_some() {
            obj.remove(field);
            return result;
        }
    }
    None
}

/// Unix timestamp in seconds or milliseconds.
fn from_unix(ts: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    if ts > 1_000_000_000_000 {
        chrono::DateTime::from_timestamp_millis(ts)
    } else {
        chrono::DateTime::from_timestamp(ts, 0)
    }
}
