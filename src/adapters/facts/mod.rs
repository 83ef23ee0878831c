//! Fact provider adapters
//!
//! The call graph builder never parses source text itself. A provider hands it
//! per-file class facts produced by an external parser.

pub mod json;

pub use json::JsonFactProvider;
