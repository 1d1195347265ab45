//! Model — LogStreamConfig and its defaults.

use serde::{Deserialize, Serialize};

use crate::parser::{FormatKind, FormatRegistry, DEFAULT_PRECEDENCE};
use crate::query::QueryOptions;
use crate::reader::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogStreamConfig {
    /// Bytes per read call; affects I/O granularity only, never results.
    pub chunk_size: usize,
    /// Limit applied when a query does not set its own.
    pub default_limit: Option<usize>,
    /// Upper bound on reads running at once through `LogService`.
    pub max_concurrent_reads: usize,
    pub strip_ansi: bool,
    /// Detection order by format name. `plain` is always the fallback and
    /// must not be listed.
    pub format_precedence: Vec<String>,
}

impl Default for LogStreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_limit: None,
            max_concurrent_reads: 16,
            strip_ansi: true,
            format_precedence: DEFAULT_PRECEDENCE.iter().map(|k| k.as_str().to_string()).collect(),
        }
    }
}

impl LogStreamConfig {
    /// Detection order as format kinds. Names are checked by `validate`;
    /// anything unparseable is skipped here.
    pub fn precedence(&self) -> Vec<FormatKind> {
        self.format_precedence
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }

    /// Registry honouring the configured precedence and ANSI handling.
    pub fn registry(&self) -> FormatRegistry {
        FormatRegistry::with_precedence(&self.precedence()).with_ansi_stripping(self.strip_ansi)
    }

    /// Baseline query options (chunk size and default limit).
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.default_limit,
            chunk_size: self.chunk_size,
            ..QueryOptions::default()
        }
    }
}
