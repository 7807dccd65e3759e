//! Error types for binary and DWARF resolution.

/// Errors from loading a binary or resolving addresses through its DWARF
/// information.
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    /// A source-level command ran without a configured binary.
    #[error("need to run with --binary to use source-level commands")]
    BinaryRequired,

    /// The binary could not be opened or parsed.
    #[error("cannot load binary: {reason}")]
    Load {
        /// Description of the failure.
        reason: String,
    },

    /// The address has no line-table entry.
    #[error("no source location for address {addr:#x}")]
    Unresolved {
        /// The unresolvable address.
        addr: u64,
    },

    /// The resolved source file could not be read.
    #[error("cannot read source file {path}: {reason}")]
    SourceUnavailable {
        /// The source path DWARF pointed at.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// The address lies outside the binary's text section.
    #[error("address {addr:#x} is outside the text section")]
    OutsideText {
        /// The out-of-range address.
        addr: u64,
    },
}
