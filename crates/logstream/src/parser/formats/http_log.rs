use crate::parser::level;
use crate::parser::traits::*;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{insert_capture, insert_number};

/// host ident authuser [date] "request" status bytes ["referer" "user-agent"]
static ACCESS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<ip>\S+) (?P<ident>\S+) (?P<user>\S+) \[(?P<date>[^\]]+)\] "(?P<request>(?:[^"\\]|\\.)*)" (?P<status>\d{3}) (?P<size>\d+|-)(?: "(?P<referer>(?:[^"\\]|\\.)*)" "(?P<ua>(?:[^"\\]|\\.)*)")?"#,
    )
    .unwrap_or_else(|_| unreachable!())
});

const CLF_DATE_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Apache/Nginx access logs (Common and Combined Log Format).
///
/// Message: `<request line> <status>`. Level: 5xx `error`, 4xx `warning`,
/// anything else `access`.
///
/// Context: `ip`, `user`, `method`, `path`, `protocol`, `status`, `size`,
/// `referer`, `user_agent` (absent or `-` fields are omitted).
pub struct ApacheFormat;

impl LineFormat for ApacheFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Apache
    }

    fn detect(&self, line: &str) -> bool {
        ACCESS_LINE.is_match(line.trim())
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let caps = ACCESS_LINE
            .captures(line.trim())
            .ok_or_else(|| ParseError::InvalidFormat("not an access log line".into()))?;

        let status: u16 = caps["status"]
            .parse()
            .map_err(|_| ParseError::InvalidFormat("invalid status code".into()))?;

        let timestamp = DateTime::parse_from_str(&caps["date"], CLF_DATE_FORMAT)
            .ok()
            .map(|dt| dt.with_timezone(&Utc));

        let request = &caps["request"];
        let mut context = Context::new();
        insert_capture(&mut context, &caps, "ip", "ip");
        insert_capture(&mut context, &caps, "user", "user");

        let mut parts = request.splitn(3, ' ');
        if let (Some(method), Some(path)) = (parts.next(), parts.next()) {
            context.insert("method".to_string(), Value::from(method));
            context.insert("path".to_string(), Value::from(path));
            if let Some(protocol) = parts.next() {
                context.insert("protocol".to_string(), Value::from(protocol));
            }
        }

        context.insert("status".to_string(), Value::from(status));
        insert_number(&mut context, &caps, "size", "size");
        insert_capture(&mut context, &caps, "referer", "referer");
        insert_capture(&mut context, &caps, "ua", "user_agent");

        let message = format!("{} {}", request, status);

        Ok(LogEntry::new(timestamp, level::from_http_status(status), message, context))
    }
}
