// Module structure for logstream: read a log file in either direction,
// classify each line, and return ordered, filtered entries.

// Core infrastructure
pub mod error;
pub mod reader;
pub mod parser;
pub mod filter;

// Query surface
pub mod query;
pub mod service;

// Process setup
pub mod conf;
pub mod runtime;

pub use error::LogError;
pub use parser::{FormatKind, FormatRegistry, LogEntry, Segment};
pub use query::{get_entries, LogQuery, Order, QueryOptions, ScanStats};
