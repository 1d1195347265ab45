use crate::parser::level;
use crate::parser::traits::*;
use chrono::{Datelike, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use super::{insert_capture, insert_number, parse_datetime};

/// RFC 3164: optional `<PRI>`, then `Mon DD HH:MM:SS host program[pid]: message`
static BSD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:<(?P<pri>\d{1,3})>)?(?P<date>[A-Z][a-z]{2} [ \d]?\d \d{2}:\d{2}:\d{2}) (?P<host>\S+) (?P<prog>[^\s\[:]+)(?:\[(?P<pid>\d+)\])?:(?P<msg>.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// RFC 5424: `<PRI>1 timestamp host app procid msgid [sd] message`
static RFC5424_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^<(?P<pri>\d{1,3})>1 (?P<date>\S+) (?P<host>\S+) (?P<prog>\S+) (?P<pid>\S+) (?P<msgid>\S+) (?P<rest>.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Syslog severity levels (RFC 5424 §6.2.1)
const SYSLOG_SEVERITIES: [&str; 8] = [
    "emergency", "alert", "critical", "error",
    "warning", "notice", "info", "debug",
];

/// Syslog facility names (RFC 5424 §6.2.1)
const SYSLOG_FACILITIES: [&str; 24] = [
    "kern", "user", "mail", "daemon", "auth", "syslog", "lpr", "news",
    "uucp", "cron", "authpriv", "ftp", "ntp", "audit", "alert2", "clock",
    "local0", "local1", "local2", "local3", "local4", "local5", "local6", "local7",
];

/// Programs whose lines are security audit records.
const AUDIT_PROGRAMS: [&str; 3] = ["audit", "auditd", "audispd"];

/// BSD and RFC 5424 syslog lines as written by rsyslog/syslog-ng to
/// `/var/log/syslog`, `/var/log/mail.log`, `/var/log/auth.log` and friends.
///
/// Level comes from the `<PRI>` severity when present, otherwise from the
/// program (audit daemons) or message keywords. BSD timestamps carry no year;
/// the current year is assumed.
///
/// Context: `host`, `program`, `pid`, and `facility` / `priority` when a
/// `<PRI>` prefix exists (`msgid` for RFC 5424).
pub struct SyslogFormat;

impl LineFormat for SyslogFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Syslog
    }

    fn detect(&self, line: &str) -> bool {
        let line = line.trim();
        BSD_LINE.is_match(line) || RFC5424_LINE.is_match(line)
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let line = line.trim();
        if let Some(caps) = RFC5424_LINE.captures(line) {
            return parse_rfc5424(&caps);
        }
        let caps = BSD_LINE
            .captures(line)
            .ok_or_else(|| ParseError::InvalidFormat("not a syslog line".into()))?;
        parse_rfc3164(&caps)
    }
}

fn parse_rfc3164(caps: &Captures<'_>) -> Result<LogEntry, ParseError> {
    let message = caps["msg"].trim();
    if message.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let mut context = Context::new();
    insert_capture(&mut context, caps, "host", "host");
    insert_capture(&mut context, caps, "prog", "program");
    insert_number(&mut context, caps, "pid", "pid");

    let severity = apply_priority(&mut context, caps);
    let level = severity.unwrap_or_else(|| {
        if AUDIT_PROGRAMS.contains(&caps["prog"].to_lowercase().as_str()) {
            level::AUDIT
        } else {
            level::from_keywords(message)
        }
    });

    Ok(LogEntry::new(parse_bsd_date(&caps["date"]), level, message, context))
}

fn parse_rfc5424(caps: &Captures<'_>) -> Result<LogEntry, ParseError> {
    let message = strip_structured_data(&caps["rest"]);
    if message.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let mut context = Context::new();
    insert_capture(&mut context, caps, "host", "host");
    insert_capture(&mut context, caps, "prog", "program");
    insert_number(&mut context, caps, "pid", "pid");
    insert_capture(&mut context, caps, "msgid", "msgid");

    let level = apply_priority(&mut context, caps).unwrap_or(level::UNKNOWN);
    let timestamp = Some(&caps["date"])
        .filter(|d| *d != "-")
        .and_then(parse_datetime);

    Ok(LogEntry::new(timestamp, level, message, context))
}

/// Record facility/priority and return the severity name, if `<PRI>` exists.
fn apply_priority(context: &mut Context, caps: &Captures<'_>) -> Option<&'static str> {
    let pri: usize = caps.name("pri")?.as_str().parse().ok()?;
    if let Some(facility) = SYSLOG_FACILITIES.get(pri >> 3) {
        context.insert("facility".to_string(), Value::from(*facility));
    }
    context.insert("priority".to_string(), Value::from(pri));
    SYSLOG_SEVERITIES.get(pri & 0x07).copied()
}

/// Drop RFC 5424 structured data (`-` or `[id k="v"]...`) before the message.
fn strip_structured_data(rest: &str) -> &str {
    let rest = rest.trim();
    if let Some(msg) = rest.strip_prefix('-') {
        return msg.trim();
    }
    if !rest.starts_with('[') {
        return rest;
    }

    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => depth += 1,
            ']' if !in_quotes => {
                depth = depth.saturating_sub(1);
                let next = rest[i + 1..].chars().next();
                if depth == 0 && next != Some('[') {
                    return rest[i + 1..].trim();
                }
            }
            _ => {}
        }
    }
    rest
}

/// `Mar 14 03:43:47` in the current year, read as UTC.
fn parse_bsd_date(date: &str) -> Option<chrono::DateTime<Utc>> {
    let normalized = date.split_whitespace().collect::<Vec<_>>().join(" ");
    let with_year = format!("{} {}", Utc::now().year(), normalized);
    NaiveDateTime::parse_from_str(&with_year, "%Y %b %d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
