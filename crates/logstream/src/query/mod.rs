//! Query — ordered, filtered, limited retrieval of log entries from a file.
//!
//! Pulls lines lazily from a [`LineReader`] in the direction matching the
//! requested order, classifies each with the format registry, applies the
//! search filter and stops as soon as `limit` entries are collected. With
//! `Order::Desc` the work done is proportional to the result size, not the
//! file size.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LogError;
use crate::filter::SearchFilter;
use crate::parser::{FormatRegistry, LogEntry};
use crate::reader::{Direction, LineReader, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Oldest first (file order)
    #[default]
    Asc,
    /// Newest first (tail first)
    Desc,
}

impl Order {
    pub fn direction(self) -> Direction {
        match self {
            Order::Asc => Direction::Forward,
            Order::Desc => Direction::Backward,
        }
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(format!("invalid order '{}', expected asc or desc", other)),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        })
    }
}

/// Options for one query. `Default` is: ascending, unbounded, no search,
/// auto-detected format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub order: Order,
    pub limit: Option<usize>,
    /// Case-insensitive substring matched against the parsed message.
    pub search: Option<String>,
    /// Forced format name; unknown names mean auto-detection.
    pub format: Option<String>,
    pub chunk_size: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            order: Order::Asc,
            limit: None,
            search: None,
            format: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn format(mut self, name: impl Into<String>) -> Self {
        self.format = Some(name.into());
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Work done by one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Non-blank lines pulled from the reader
    pub lines_scanned: u64,
    /// Entries that passed the search filter
    pub entries_matched: u64,
    /// Bytes read from disk
    pub bytes_read: u64,
}

/// Query engine bound to a format registry.
pub struct LogQuery<'r> {
    registry: &'r FormatRegistry,
}

impl LogQuery<'static> {
    /// Engine over the process-wide built-in registry.
    pub fn builtin() -> Self {
        Self::new(FormatRegistry::builtin())
    }
}

impl<'r> LogQuery<'r> {
    pub fn new(registry: &'r FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        path: impl AsRef<Path>,
        options: &QueryOptions,
    ) -> Result<Vec<LogEntry>, LogError> {
        self.execute_with_stats(path, options).map(|(entries, _)| entries)
    }

    /// Run the query, returning the entries in the requested order.
    ///
    /// Either every matching entry up to `limit` is returned or the call
    /// fails; entries gathered before a read error are discarded.
    pub fn execute_with_stats(
        &self,
        path: impl AsRef<Path>,
        options: &QueryOptions,
    ) -> Result<(Vec<LogEntry>, ScanStats), LogError> {
        let path = path.as_ref();
        let mut reader = LineReader::open(path, options.order.direction(), options.chunk_size)?;
        let mut stats = ScanStats::default();

        if options.limit == Some(0) {
            return Ok((Vec::new(), stats));
        }

        let entries = self.collect(reader.by_ref(), options, &mut stats)?;
        stats.entries_matched = entries.len() as u64;
        stats.bytes_read = reader.bytes_read();

        debug!(
            path = %path.display(),
            order = %options.order,
            lines_scanned = stats.lines_scanned,
            entries = stats.entries_matched,
            bytes_read = stats.bytes_read,
            "log query complete"
        );

        Ok((entries, stats))
    }

    /// Classify, filter and limit `lines`. The first error aborts the query
    /// and drops everything gathered so far.
    fn collect<I>(
        &self,
        lines: I,
        options: &QueryOptions,
        stats: &mut ScanStats,
    ) -> Result<Vec<LogEntry>, LogError>
    where
        I: Iterator<Item = Result<String, LogError>>,
    {
        let forced = self.registry.resolve_forced(options.format.as_deref());
        let filter = match SearchFilter::new(options.search.as_deref().unwrap_or_default()) {
            Ok(filter) => filter,
            Err(e) => {
                // Escaped literals always compile; treat a failure as "no filter".
                warn!(error = %e, "search filter disabled");
                None
            }
        };

        let mut entries = Vec::with_capacity(options.limit.unwrap_or(0).min(1024));

        for line in lines {
            let line = line?;
            stats.lines_scanned += 1;

            // Lines holding nothing but escape codes are blank
            let Some(entry) = self.registry.classify(&line, forced) else {
                continue;
            };
            if let Some(filter) = &filter {
                if !filter.matches(entry.message()) {
                    continue;
                }
            }

            entries.push(entry);
            if options.limit.is_some_and(|limit| entries.len() >= limit) {
                break;
            }
        }

        Ok(entries)
    }
}

/// Read entries from `path` using the built-in formats.
pub fn get_entries(path: impl AsRef<Path>, options: &QueryOptions) -> Result<Vec<LogEntry>, LogError> {
    LogQuery::builtin().execute(path, options)
}
