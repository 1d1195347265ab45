//! Reader — chunked, bidirectional line iteration over log files.

pub mod chunked;

pub use chunked::{Direction, LineReader, DEFAULT_CHUNK_SIZE};
