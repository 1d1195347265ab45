use std::borrow::Cow;

use once_cell::sync::Lazy;
use tracing::{trace, warn};

use super::ansi::strip_ansi_codes;
use super::formats::*;
use super::traits::*;

/// Built-in detection order. Earlier entries win when a line matches more
/// than one detector.
pub const DEFAULT_PRECEDENCE: [FormatKind; 8] = [
    FormatKind::Json,
    FormatKind::Apache,
    FormatKind::NginxError,
    FormatKind::Journal,
    FormatKind::Python,
    FormatKind::Bracketed,
    FormatKind::Syslog,
    FormatKind::Logfmt,
];

static BUILTIN: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::new);

/// Ordered list of line formats plus the structureless fallback.
///
/// Built once and only read afterwards, so one registry can be shared by any
/// number of concurrent queries.
pub struct FormatRegistry {
    formats: Vec<Box<dyn LineFormat>>,
    fallback: PlainFormat,
    strip_ansi: bool,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::with_precedence(&DEFAULT_PRECEDENCE)
    }

    /// Process-wide registry with the default precedence.
    pub fn builtin() -> &'static FormatRegistry {
        &BUILTIN
    }

    /// Registry holding the built-in formats named in `order`, in that order.
    /// Duplicates and `plain` (always the fallback) are ignored.
    pub fn with_precedence(order: &[FormatKind]) -> Self {
        let mut formats: Vec<Box<dyn LineFormat>> = Vec::with_capacity(order.len());
        for kind in order {
            if formats.iter().any(|f| f.kind() == *kind) {
                continue;
            }
            if let Some(format) = builtin_format(*kind) {
                formats.push(format);
            }
        }
        Self::from_formats(formats)
    }

    /// Registry over caller-supplied formats, evaluated in the given order.
    pub fn from_formats(formats: Vec<Box<dyn LineFormat>>) -> Self {
        Self {
            formats,
            fallback: PlainFormat,
            strip_ansi: true,
        }
    }

    /// Whether ANSI escape codes are removed before detection (default on).
    pub fn with_ansi_stripping(mut self, enabled: bool) -> Self {
        self.strip_ansi = enabled;
        self
    }

    /// The detection order, fallback excluded.
    pub fn precedence(&self) -> Vec<FormatKind> {
        self.formats.iter().map(|f| f.kind()).collect()
    }

    pub fn get(&self, kind: FormatKind) -> Option<&dyn LineFormat> {
        if kind == FormatKind::Plain {
            return Some(&self.fallback);
        }
        self.formats.iter().find(|f| f.kind() == kind).map(|f| f.as_ref())
    }

    /// Map a user-supplied format name onto a registered format. Unknown or
    /// unregistered names fall back to auto-detection.
    pub fn resolve_forced(&self, name: Option<&str>) -> Option<FormatKind> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;
        match name.parse::<FormatKind>() {
            Ok(kind) if self.get(kind).is_some() => Some(kind),
            Ok(kind) => {
                warn!(format = %kind, "forced format is not registered, auto-detecting");
                None
            }
            Err(e) => {
                warn!(error = %e, "ignoring forced format, auto-detecting");
                None
            }
        }
    }

    /// Which format auto-detection picks for `line`.
    pub fn detect(&self, line: &str) -> FormatKind {
        let clean = self.prepare(line);
        self.select(&clean).map(|(kind, _)| kind).unwrap_or(FormatKind::Plain)
    }

    /// Classify one raw line.
    ///
    /// A forced format is applied without consulting its detector. Otherwise
    /// the first format whose detector matches and whose transform succeeds
    /// wins; with no such format the fallback applies.
    pub fn detect_and_parse(&self, line: &str, forced: Option<FormatKind>) -> LogEntry {
        self.classify(line, forced)
            .unwrap_or_else(|| LogEntry::unstructured(line))
    }

    /// Like [`detect_and_parse`](Self::detect_and_parse), but `None` for a
    /// line that is blank once escape codes are removed.
    ///
    /// Escape codes are removed for detection and transforms only; fallback
    /// and degraded entries keep the line as read.
    pub fn classify(&self, line: &str, forced: Option<FormatKind>) -> Option<LogEntry> {
        let clean = self.prepare(line);
        if clean.trim().is_empty() {
            return None;
        }

        if let Some(format) = forced.and_then(|kind| self.get(kind)) {
            if format.kind() == FormatKind::Plain {
                return Some(LogEntry::unstructured(line));
            }
            let entry = format.parse(&clean).unwrap_or_else(|err| {
                trace!(format = %format.kind(), error = %err, "degrading unparseable line");
                LogEntry::degraded(line, format.kind(), &err)
            });
            return Some(entry);
        }

        let entry = match self.select(&clean) {
            Some((_, entry)) => entry,
            None => LogEntry::unstructured(line),
        };
        Some(entry)
    }

    /// First format that both claims and successfully transforms `line`.
    fn select(&self, line: &str) -> Option<(FormatKind, LogEntry)> {
        self.formats.iter().filter(|f| f.detect(line)).find_map(|format| {
            match format.parse(line) {
                Ok(entry) => Some((format.kind(), entry)),
                Err(err) => {
                    trace!(format = %format.kind(), error = %err, "detected format rejected line");
                    None
                }
            }
        })
    }

    fn prepare<'l>(&self, line: &'l str) -> Cow<'l, str> {
        if self.strip_ansi {
            strip_ansi_codes(line)
        } else {
            Cow::Borrowed(line)
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_format(kind: FormatKind) -> Option<Box<dyn LineFormat>> {
    let format: Box<dyn LineFormat> = match kind {
        FormatKind::Json => Box::new(JsonFormat),
        FormatKind::Apache => Box::new(ApacheFormat),
        FormatKind::NginxError => Box::new(NginxErrorFormat),
        FormatKind::Journal => Box::new(JournalFormat),
        FormatKind::Python => Box::new(PythonFormat),
        FormatKind::Bracketed => Box::new(BracketedFormat),
        FormatKind::Syslog => Box::new(SyslogFormat),
        FormatKind::Logfmt => Box::new(LogfmtFormat),
        FormatKind::Plain => return None,
    };
    Some(format)
}
