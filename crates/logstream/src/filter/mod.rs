//! Filter — message search for log queries.

pub mod engine;

pub use engine::{FilterError, SearchFilter};
