//! Predicate AST, name validation, and type inference.

use crate::error::ExprError;
use crate::Env;

/// The notation an integer literal was written in.
///
/// Equality against a partially defined signal picks its comparison rule
/// from the notation: binary literals compare bit strings, hex literals
/// compare hex projections (an `x` nibble wildcards the whole digit),
/// and decimal literals compare as minimal-width binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralForm {
    /// Plain decimal.
    Dec,
    /// `0b…` binary.
    Bin,
    /// `0x…` hexadecimal.
    Hex,
}

/// A unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`not` / `!`); operands are taken by truthiness.
    Not,
    /// Arithmetic negation (`-`).
    Neg,
    /// Bitwise complement (`~`).
    BitNot,
}

/// A binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `and` / `&&`
    And,
    /// `or` / `||`
    Or,
}

/// Static type of a predicate expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ty {
    /// An integer-valued expression.
    Int,
    /// A boolean-valued expression.
    Bool,
}

/// A predicate expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// An integer literal.
    Int {
        /// The numeric value.
        value: i64,
        /// The notation it was written in.
        form: LiteralForm,
    },
    /// A `module.field` signal reference.
    Signal {
        /// The module name.
        module: String,
        /// The signal short name.
        field: String,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        expr: Box<Expr>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Checks that every `module.field` reference exists in the
    /// environment.
    pub fn validate_names(&self, env: &Env) -> Result<(), ExprError> {
        match self {
            Expr::Int { .. } => Ok(()),
            Expr::Signal { module, field } => {
                let known = env
                    .get(module)
                    .is_some_and(|fields| fields.contains_key(field));
                if known {
                    Ok(())
                } else {
                    Err(ExprError::UnknownName {
                        name: format!("{module}.{field}"),
                    })
                }
            }
            Expr::Unary { expr, .. } => expr.validate_names(env),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.validate_names(env)?;
                rhs.validate_names(env)
            }
        }
    }

    /// Infers the static type of the expression.
    ///
    /// Comparisons and logical operators yield `Bool`; everything else
    /// yields `Int`. Arithmetic over booleans is a type error; logical
    /// operators accept integers by truthiness.
    pub fn ty(&self) -> Result<Ty, ExprError> {
        match self {
            Expr::Int { .. } | Expr::Signal { .. } => Ok(Ty::Int),
            Expr::Unary { op, expr } => {
                let inner = expr.ty()?;
                match op {
                    UnaryOp::Not => Ok(Ty::Bool),
                    UnaryOp::Neg | UnaryOp::BitNot => {
                        if inner == Ty::Int {
                            Ok(Ty::Int)
                        } else {
                            Err(ExprError::Type {
                                message: "arithmetic on a boolean operand".into(),
                            })
                        }
                    }
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.ty()?, rhs.ty()?);
                match op {
                    BinaryOp::And | BinaryOp::Or => Ok(Ty::Bool),
                    BinaryOp::Eq
                    | BinaryOp::Ne
                    | BinaryOp::Lt
                    | BinaryOp::Le
                    | BinaryOp::Gt
                    | BinaryOp::Ge => {
                        if l == Ty::Int && r == Ty::Int {
                            Ok(Ty::Bool)
                        } else {
                            Err(ExprError::Type {
                                message: "comparison needs integer operands".into(),
                            })
                        }
                    }
                    _ => {
                        if l == Ty::Int && r == Ty::Int {
                            Ok(Ty::Int)
                        } else {
                            Err(ExprError::Type {
                                message: "arithmetic on a boolean operand".into(),
                            })
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_common::SigValue;
    use std::collections::HashMap;

    fn sig(module: &str, field: &str) -> Expr {
        Expr::Signal {
            module: module.into(),
            field: field.into(),
        }
    }

    fn int(value: i64) -> Expr {
        Expr::Int {
            value,
            form: LiteralForm::Dec,
        }
    }

    fn env() -> Env {
        let mut fields = HashMap::new();
        fields.insert("addr".to_string(), SigValue::Int(1));
        let mut env = HashMap::new();
        env.insert("mem".to_string(), fields);
        env
    }

    #[test]
    fn validate_known_name() {
        assert!(sig("mem", "addr").validate_names(&env()).is_ok());
    }

    #[test]
    fn validate_unknown_field_and_module() {
        assert!(sig("mem", "nope").validate_names(&env()).is_err());
        assert!(sig("cpu", "addr").validate_names(&env()).is_err());
    }

    #[test]
    fn comparison_is_bool() {
        let e = Expr::Binary {
            op: BinaryOp::Eq,
            lhs: Box::new(sig("mem", "addr")),
            rhs: Box::new(int(5)),
        };
        assert_eq!(e.ty().unwrap(), Ty::Bool);
    }

    #[test]
    fn arithmetic_is_int() {
        let e = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(int(1)),
            rhs: Box::new(int(2)),
        };
        assert_eq!(e.ty().unwrap(), Ty::Int);
    }

    #[test]
    fn comparison_of_booleans_is_type_error() {
        let cmp = Expr::Binary {
            op: BinaryOp::Eq,
            lhs: Box::new(int(1)),
            rhs: Box::new(int(2)),
        };
        let nested = Expr::Binary {
            op: BinaryOp::Lt,
            lhs: Box::new(cmp),
            rhs: Box::new(int(1)),
        };
        assert!(matches!(nested.ty(), Err(ExprError::Type { .. })));
    }

    #[test]
    fn arithmetic_on_boolean_is_type_error() {
        let cmp = Expr::Binary {
            op: BinaryOp::Eq,
            lhs: Box::new(int(1)),
            rhs: Box::new(int(1)),
        };
        let bad = Expr::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(cmp),
        };
        assert!(matches!(bad.ty(), Err(ExprError::Type { .. })));
    }

    #[test]
    fn not_accepts_any_operand() {
        let e = Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(sig("mem", "addr")),
        };
        assert_eq!(e.ty().unwrap(), Ty::Bool);
    }
}
