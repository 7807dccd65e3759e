//! Evaluation of compiled predicates over the live signal environment.

use rewind_common::{Logic, SigValue, Value};

use crate::ast::{BinaryOp, Expr, LiteralForm, UnaryOp};
use crate::error::ExprError;
use crate::Env;

/// A runtime predicate value.
///
/// A fully defined signal evaluates to `Int`; a partially defined one
/// keeps its four-state `Bits`, so equality can fall back to the masked
/// comparators where `x` is a wildcard. `Unknown` is the result of
/// anything the bits cannot decide (ordering, arithmetic, division by
/// zero); it propagates through every operator, and an unknown predicate
/// never counts as a hit.
#[derive(Clone, Debug, PartialEq)]
pub enum Val {
    /// An integer result.
    Int(i64),
    /// A boolean result.
    Bool(bool),
    /// A partially defined signal value, carried for masked comparison.
    Bits(Value),
    /// The result cannot be decided from the defined bits.
    Unknown,
}

impl Val {
    fn truthy(&self) -> Option<bool> {
        match self {
            Val::Int(i) => Some(*i != 0),
            Val::Bool(b) => Some(*b),
            // A driven 1 anywhere makes the value nonzero no matter what
            // the x bits resolve to.
            Val::Bits(v) => {
                if (0..v.width()).any(|i| v.get(i) == Logic::One) {
                    Some(true)
                } else {
                    None
                }
            }
            Val::Unknown => None,
        }
    }

    fn int(&self) -> Option<i64> {
        match self {
            Val::Int(i) => Some(*i),
            Val::Bool(_) | Val::Bits(_) | Val::Unknown => None,
        }
    }

    /// True exactly for `Bool(true)`; unknown does not count as a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Val::Bool(true))
    }
}

/// Evaluates an expression against a signal environment.
///
/// Fails only on names missing from the environment; everything value-
/// dependent (undecidable comparisons, division by zero, shift overflow)
/// degrades to [`Val::Unknown`].
pub fn eval(expr: &Expr, env: &Env) -> Result<Val, ExprError> {
    match expr {
        Expr::Int { value, .. } => Ok(Val::Int(*value)),
        Expr::Signal { module, field } => {
            let value = env
                .get(module)
                .and_then(|fields| fields.get(field))
                .ok_or_else(|| ExprError::UnknownName {
                    name: format!("{module}.{field}"),
                })?;
            Ok(match value {
                SigValue::Int(i) => Val::Int(*i),
                SigValue::Bits(bits) => Val::Bits(bits.clone()),
            })
        }
        Expr::Unary { op, expr } => {
            let inner = eval(expr, env)?;
            Ok(match op {
                UnaryOp::Not => match inner.truthy() {
                    Some(b) => Val::Bool(!b),
                    None => Val::Unknown,
                },
                UnaryOp::Neg => match inner.int() {
                    Some(i) => Val::Int(i.wrapping_neg()),
                    None => Val::Unknown,
                },
                UnaryOp::BitNot => match inner.int() {
                    Some(i) => Val::Int(!i),
                    None => Val::Unknown,
                },
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, env)?;
            // Short-circuit so `a.x == 0 || a.y == 1` need not decide an
            // unknown right side when the left already answers.
            match op {
                BinaryOp::And => {
                    if l.truthy() == Some(false) {
                        return Ok(Val::Bool(false));
                    }
                    let r = eval(rhs, env)?;
                    return Ok(match (l.truthy(), r.truthy()) {
                        (_, Some(false)) => Val::Bool(false),
                        (Some(true), Some(true)) => Val::Bool(true),
                        _ => Val::Unknown,
                    });
                }
                BinaryOp::Or => {
                    if l.truthy() == Some(true) {
                        return Ok(Val::Bool(true));
                    }
                    let r = eval(rhs, env)?;
                    return Ok(match (l.truthy(), r.truthy()) {
                        (_, Some(true)) => Val::Bool(true),
                        (Some(false), Some(false)) => Val::Bool(false),
                        _ => Val::Unknown,
                    });
                }
                BinaryOp::Eq | BinaryOp::Ne => {
                    let r = eval(rhs, env)?;
                    let equal = masked_eq(&l, &r, literal_form(lhs), literal_form(rhs));
                    return Ok(match equal {
                        Some(equal) => {
                            Val::Bool(if *op == BinaryOp::Eq { equal } else { !equal })
                        }
                        None => Val::Unknown,
                    });
                }
                _ => {}
            }
            let r = eval(rhs, env)?;
            let (Some(a), Some(b)) = (l.int(), r.int()) else {
                return Ok(Val::Unknown);
            };
            Ok(apply_binop(*op, a, b))
        }
    }
}

/// Equality across the value domain: plain for two integers, masked when
/// either side carries undefined bits.
///
/// When a bits value is compared against an integer, the *other* side's
/// literal notation selects the rule: binary literals compare bit
/// strings, hex literals compare hex projections, and everything else
/// (decimal literals, computed integers) compares as minimal-width
/// binary.
fn masked_eq(
    l: &Val,
    r: &Val,
    lhs_form: Option<LiteralForm>,
    rhs_form: Option<LiteralForm>,
) -> Option<bool> {
    match (l, r) {
        (Val::Int(a), Val::Int(b)) => Some(a == b),
        (Val::Bits(v), Val::Int(n)) => Some(bits_eq_int(v, *n, rhs_form)),
        (Val::Int(n), Val::Bits(v)) => Some(bits_eq_int(v, *n, lhs_form)),
        (Val::Bits(a), Val::Bits(b)) => Some(a.masked_eq(b)),
        _ => None,
    }
}

fn bits_eq_int(bits: &Value, n: i64, form: Option<LiteralForm>) -> bool {
    // A four-state vector is unsigned; it never equals a negative.
    if n < 0 {
        return false;
    }
    let n = n as u64;
    match form {
        Some(LiteralForm::Bin) => bits.matches_bin_literal(&format!("{n:b}")),
        Some(LiteralForm::Hex) => bits.matches_hex_literal(&format!("{n:x}")),
        _ => bits.matches_int(n),
    }
}

fn literal_form(expr: &Expr) -> Option<LiteralForm> {
    match expr {
        Expr::Int { form, .. } => Some(*form),
        _ => None,
    }
}

fn apply_binop(op: BinaryOp, a: i64, b: i64) -> Val {
    use BinaryOp::*;
    match op {
        Add => Val::Int(a.wrapping_add(b)),
        Sub => Val::Int(a.wrapping_sub(b)),
        Mul => Val::Int(a.wrapping_mul(b)),
        Div => {
            if b == 0 {
                Val::Unknown
            } else {
                Val::Int(a.wrapping_div(b))
            }
        }
        Rem => {
            if b == 0 {
                Val::Unknown
            } else {
                Val::Int(a.wrapping_rem(b))
            }
        }
        BitAnd => Val::Int(a & b),
        BitOr => Val::Int(a | b),
        BitXor => Val::Int(a ^ b),
        Shl => match u32::try_from(b) {
            Ok(s) if s < 64 => Val::Int(a.wrapping_shl(s)),
            _ => Val::Unknown,
        },
        Shr => match u32::try_from(b) {
            Ok(s) if s < 64 => Val::Int(a.wrapping_shr(s)),
            _ => Val::Unknown,
        },
        Lt => Val::Bool(a < b),
        Le => Val::Bool(a <= b),
        Gt => Val::Bool(a > b),
        Ge => Val::Bool(a >= b),
        Eq | Ne | And | Or => unreachable!("handled before integer coercion"),
    }
}
