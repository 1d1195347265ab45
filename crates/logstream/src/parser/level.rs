//! Level vocabulary shared by all formats.

pub const INFO: &str = "info";
pub const NOTICE: &str = "notice";
pub const WARNING: &str = "warning";
pub const ERROR: &str = "error";
pub const CRITICAL: &str = "critical";
pub const DEBUG: &str = "debug";
pub const AUDIT: &str = "audit";
pub const ACCESS: &str = "access";
pub const UNKNOWN: &str = "unknown";

/// Map level tags from the wild onto the canonical names.
///
/// Unrecognised tags are lowercased and kept as-is; the vocabulary is open.
pub fn normalize(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "" => UNKNOWN,
        "warn" | "warning" => WARNING,
        "err" | "error" | "eror" => ERROR,
        "fatal" | "crit" | "critical" | "emerg" | "emergency" | "alert" | "panic" => CRITICAL,
        "trace" | "debug" | "dbug" | "verbose" => DEBUG,
        "info" | "information" | "informational" => INFO,
        "notice" => NOTICE,
        _ => return lower,
    };
    canonical.to_string()
}

/// Guess a level from message keywords, for formats without a level tag.
pub fn from_keywords(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if ["error", "failed", "failure", "fatal"].iter().any(|k| lower.contains(k)) {
        ERROR
    } else if lower.contains("warn") {
        WARNING
    } else if lower.contains("debug") {
        DEBUG
    } else if lower.contains("audit") {
        AUDIT
    } else {
        INFO
    }
}

/// Level of an HTTP access line by response status.
pub fn from_http_status(status: u16) -> &'static str {
    match status {
        500.. => ERROR,
        400..=499 => WARNING,
        _ => ACCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize("WARN"), "warning");
        assert_eq!(normalize("Err"), "error");
        assert_eq!(normalize("FATAL"), "critical");
        assert_eq!(normalize("trace"), "debug");
        assert_eq!(normalize(" info "), "info");
        assert_eq!(normalize(""), "unknown");
    }

    #[test]
    fn test_normalize_keeps_unknown_tags() {
        assert_eq!(normalize("AUDIT"), "audit");
        assert_eq!(normalize("Success"), "success");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(from_keywords("Connection FAILED to upstream"), ERROR);
        assert_eq!(from_keywords("warning: disk at 91%"), WARNING);
        assert_eq!(from_keywords("debug dump follows"), DEBUG);
        assert_eq!(from_keywords("audit record written"), AUDIT);
        assert_eq!(from_keywords("Started session 4"), INFO);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(from_http_status(200), ACCESS);
        assert_eq!(from_http_status(304), ACCESS);
        assert_eq!(from_http_status(404), WARNING);
        assert_eq!(from_http_status(502), ERROR);
    }
}
