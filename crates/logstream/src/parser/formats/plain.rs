use crate::parser::traits::*;

/// Structureless fallback: always matches, message is the trimmed line,
/// level `unknown`, no timestamp, empty context.
pub struct PlainFormat;

impl LineFormat for PlainFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Plain
    }

    fn detect(&self, _line: &str) -> bool {
        true
    }

    fn parse(&self, line: &str) -> Result<LogEntry, ParseError> {
        Ok(LogEntry::unstructured(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_always_detects() {
        for sample in ["Just some plain text", "", "{\"json\":1}"] {
            assert!(PlainFormat.detect(sample));
        }
    }

    #[test]
    fn test_plain_parse() {
        let entry = PlainFormat.parse("  This is a plain text log line \t").unwrap();
        assert_eq!(entry.message(), "This is a plain text log line");
        assert_eq!(entry.level(), "unknown");
        assert!(entry.timestamp().is_none());
        assert!(entry.context().is_empty());
    }
}
