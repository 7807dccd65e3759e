//! Error types for model construction and time motion.

/// Errors raised while building or driving a hardware model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A named model is not a built-in and not a readable spec file.
    #[error("unknown model '{name}'")]
    UnknownModel {
        /// The model name as given on the command line.
        name: String,
    },

    /// Two modules in one model share a name.
    #[error("duplicate module name '{name}'")]
    DuplicateModule {
        /// The offending module name.
        name: String,
    },

    /// A declared signal is absent from the trace.
    #[error("signal '{name}' not found in trace")]
    UnknownSignal {
        /// The hierarchical signal name.
        name: String,
    },

    /// An enabled memory write landed above the configured size.
    #[error("memory '{module}': write at address {addr:#x} out of bounds (size {size:#x})")]
    OutOfBounds {
        /// The memory module that faulted.
        module: String,
        /// The faulting address.
        addr: u64,
        /// The configured size bound.
        size: u64,
    },

    /// A model spec file could not be understood.
    #[error("invalid model spec: {reason}")]
    BadSpec {
        /// Description of the problem.
        reason: String,
    },

    /// An I/O error while reading a model spec file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
