//! The breakpoint predicate language.
//!
//! Predicates are boolean expressions over the model's live signal
//! dictionary, written as `module.signal` references combined with
//! comparisons, arithmetic, bitwise, and logical operators. `&&`, `||`,
//! and `!` are accepted as aliases for `and`, `or`, and `not`.
//!
//! Expressions are compiled once at breakpoint creation — names are
//! resolved and the expression must be boolean-typed — and evaluated many
//! times against a snapshot environment. Fully defined signals enter the
//! environment as integers; a signal carrying `x` bits enters as its raw
//! four-state value, and equality against it uses the masked comparators
//! (`x` is a wildcard — a binary literal compares bit strings, a hex
//! literal compares hex projections, a decimal integer compares as
//! minimal-width binary). Anything the defined bits cannot decide —
//! ordering, arithmetic — evaluates as *unknown*, unknown propagates,
//! and an unknown predicate counts as not hit.

#![warn(missing_docs)]

pub mod ast;
pub mod breakpoints;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

use std::collections::HashMap;

pub use ast::{BinaryOp, Expr, LiteralForm, UnaryOp};
pub use breakpoints::{Breakpoint, BreakpointSet};
pub use error::ExprError;
pub use eval::{eval, Val};
pub use rewind_common::SigValue;

/// The evaluation environment: module name to signal short name to the
/// signal's comparison projection (integer when fully defined, raw
/// four-state bits otherwise).
pub type Env = HashMap<String, HashMap<String, SigValue>>;

/// A compiled predicate: the original source plus its validated AST.
#[derive(Clone, Debug)]
pub struct Compiled {
    /// The source text as entered by the user.
    pub source: String,
    /// The parsed expression.
    pub expr: Expr,
}

/// Compiles a predicate against the current environment.
///
/// Fails when the expression does not lex/parse, references a name absent
/// from the environment, or is not boolean-typed. A trial evaluation runs
/// once so obviously broken predicates fail at `break` time, not later.
pub fn compile(source: &str, env: &Env) -> Result<Compiled, ExprError> {
    let tokens = lexer::lex(source)?;
    let expr = parser::parse(&tokens)?;
    expr.validate_names(env)?;
    if expr.ty()? != ast::Ty::Bool {
        return Err(ExprError::NotBoolean);
    }
    eval::eval(&expr, env)?;
    Ok(Compiled {
        source: source.to_string(),
        expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_common::Value;

    fn env() -> Env {
        let mut mem = HashMap::new();
        mem.insert("addr".to_string(), SigValue::Int(5));
        mem.insert(
            "wdata".to_string(),
            SigValue::Bits(Value::unknown(8)),
        );
        let mut outer = HashMap::new();
        outer.insert("mem".to_string(), mem);
        outer
    }

    #[test]
    fn compile_simple_comparison() {
        let c = compile("mem.addr == 5", &env()).unwrap();
        assert_eq!(c.source, "mem.addr == 5");
        assert_eq!(eval(&c.expr, &env()).unwrap(), Val::Bool(true));
    }

    #[test]
    fn compile_rejects_unknown_names() {
        assert!(matches!(
            compile("mem.nope == 1", &env()),
            Err(ExprError::UnknownName { .. })
        ));
        assert!(matches!(
            compile("cpu.addr == 1", &env()),
            Err(ExprError::UnknownName { .. })
        ));
    }

    #[test]
    fn compile_rejects_non_boolean() {
        assert!(matches!(
            compile("mem.addr + 1", &env()),
            Err(ExprError::NotBoolean)
        ));
        assert!(matches!(compile("42", &env()), Err(ExprError::NotBoolean)));
    }

    #[test]
    fn compile_accepts_bits_valued_signals() {
        // wdata is all-x at compile time; the predicate still compiles
        // and its trial evaluation masked-matches.
        let c = compile("mem.wdata == 0xff", &env()).unwrap();
        assert_eq!(eval(&c.expr, &env()).unwrap(), Val::Bool(true));
    }

    #[test]
    fn aliases_match_keywords() {
        let a = compile("mem.addr == 5 && !(mem.addr == 6)", &env()).unwrap();
        let b = compile("mem.addr == 5 and not (mem.addr == 6)", &env()).unwrap();
        assert_eq!(eval(&a.expr, &env()).unwrap(), Val::Bool(true));
        assert_eq!(eval(&b.expr, &env()).unwrap(), Val::Bool(true));
    }
}
