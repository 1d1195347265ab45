use crate::parser::traits::*;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{insert_number, parse_datetime};

static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<date>\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) \[(?P<level>[a-z]+)\] (?P<pid>\d+)#(?P<tid>\d+): (?:\*(?P<cid>\d+) )?(?P<msg>.*)$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Nginx error log: `2025/03/14 03:43:47 [error] 1234#0: *5 message`.
///
/// Context: `pid`, `tid`, `connection` (the `*N` counter, when present).
pub struct NginxErrorFormat;

impl LineFormat for NginxErrorFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::NginxError
    }

    fn detect(&self, line: &str) -> bool {
        ERROR_LINE.is_match(line.trim())
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        let caps = ERROR_LINE
            .captures(line.trim())
            .ok_or_else(|| ParseError::InvalidFormat("not an nginx error line".into()))?;

        let message = caps["msg"].trim();
        if message.is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        let mut context = Context::new();
        insert_number(&mut context, &caps, "pid", "pid");
        insert_number(&mut context, &caps, "tid", "tid");
        insert_number(&mut context, &caps, "cid", "connection");

        Ok(LogEntry::new(parse_datetime(&caps["date"]), &caps["level"], message, context))
    }
}
