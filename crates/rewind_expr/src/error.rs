//! Error types for predicate compilation and breakpoint management.

/// Errors from compiling or managing breakpoint predicates.
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// An unrecognized character in the predicate text.
    #[error("invalid character at position {pos}: {message}")]
    Lex {
        /// Byte offset of the offending character.
        pos: usize,
        /// Description of the problem.
        message: String,
    },

    /// The token stream did not form a valid expression.
    #[error("syntax error: {message}")]
    Parse {
        /// Description of the problem.
        message: String,
    },

    /// The expression references a module or signal the model does not
    /// have.
    #[error("unknown name '{name}'")]
    UnknownName {
        /// The dotted reference as written.
        name: String,
    },

    /// The expression is well-formed but not boolean.
    #[error("breakpoint condition is not boolean")]
    NotBoolean,

    /// Operand types do not fit the operator.
    #[error("type error: {message}")]
    Type {
        /// Description of the mismatch.
        message: String,
    },

    /// A breakpoint id that is not in the table.
    #[error("breakpoint {id} not found")]
    UnknownBreakpoint {
        /// The requested id.
        id: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(
            ExprError::UnknownName {
                name: "mem.nope".into()
            }
            .to_string(),
            "unknown name 'mem.nope'"
        );
        assert_eq!(
            ExprError::UnknownBreakpoint { id: 3 }.to_string(),
            "breakpoint 3 not found"
        );
        assert_eq!(
            ExprError::NotBoolean.to_string(),
            "breakpoint condition is not boolean"
        );
    }
}
