//! Runtime module — process setup for the `logstream` binary.

pub mod boot;
