//! Error types for the command layer.

use rewind_dwarf::BinaryError;
use rewind_expr::ExprError;
use rewind_model::ModelError;

/// Errors surfaced by command execution.
///
/// All of these render in the output pane as `ERROR: …`; none of them
/// alter `sim_time` or the breakpoint table.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A malformed command or bad argument.
    #[error("{message}")]
    Input {
        /// Human-readable description.
        message: String,
    },

    /// A binary/DWARF failure from a source-level command.
    #[error(transparent)]
    Binary(#[from] BinaryError),

    /// A model failure (missing signal, memory fault).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A predicate failure (bad breakpoint condition, unknown id).
    #[error(transparent)]
    Expr(#[from] ExprError),
}

impl SessionError {
    /// Shorthand for an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_display() {
        assert_eq!(
            SessionError::input("Invalid Command!").to_string(),
            "Invalid Command!"
        );
    }

    #[test]
    fn wrapped_errors_display_transparently() {
        let e: SessionError = BinaryError::BinaryRequired.into();
        assert!(e.to_string().contains("--binary"));
        let e: SessionError = ExprError::NotBoolean.into();
        assert!(e.to_string().contains("not boolean"));
    }
}
