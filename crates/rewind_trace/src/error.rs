//! Error types for trace loading and querying.

/// Errors that can occur while loading or querying a trace.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// An I/O error occurred while reading the trace or writing the cache.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A syntax error at a specific line of the VCD file.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// The 1-based line number where the error occurred.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// Requested signals were not found in the trace.
    #[error("signals missing from trace: {}", names.join(", "))]
    SignalsMissing {
        /// The hierarchical names that could not be resolved.
        names: Vec<String>,
    },

    /// The `$timescale` block used an unsupported unit.
    #[error("unknown timescale unit: {unit}")]
    UnknownTimescale {
        /// The unit text as it appeared in the file.
        unit: String,
    },
}
