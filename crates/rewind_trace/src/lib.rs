//! VCD trace store and temporal query engine.
//!
//! Parses IEEE 1364 Value Change Dump files into per-symbol event
//! timelines and answers the three time queries the debugger is built on:
//! `value_at`, `next_change`, and `prev_change`, each `O(log N)` in the
//! number of events on the symbol.
//!
//! Traces compressed with xz or gzip are decoded transparently, and a
//! parsed trace can be persisted to a sibling `<INPUT>.cached` file so
//! later sessions skip the parse entirely.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod parser;
pub mod reader;
pub mod store;
pub mod timescale;

pub use cache::load_or_parse;
pub use error::TraceError;
pub use store::{SymbolId, TraceStore};
pub use timescale::{TimeUnit, Timescale};
