/// Log line classification
///
/// Turns one raw text line into a structured [`LogEntry`] using the first
/// matching built-in format, a caller-forced format, or the structureless
/// fallback.
///
/// # Architecture
///
/// - `traits.rs`: the `LineFormat` seam (name, detector, transform)
/// - `registry.rs`: ordered format list with explicit precedence
/// - `formats/`: individual format implementations
/// - `model.rs`: `LogEntry` and format identifiers
/// - `level.rs`: level vocabulary and heuristics
///
/// # Guarantees
///
/// - Detection is deterministic: registration order decides ambiguous lines
/// - Transforms are pure and never fail a query; bad lines degrade
/// - The message is always present

pub mod traits;
pub mod registry;
pub mod formats;
pub mod model;
pub mod level;
mod ansi;

// Re-export commonly used types
pub use traits::LineFormat;
pub use registry::{FormatRegistry, DEFAULT_PRECEDENCE};
pub use model::{Context, FormatKind, LogEntry, ParseError, Segment, UnknownFormat};
pub use ansi::strip_ansi_codes;
