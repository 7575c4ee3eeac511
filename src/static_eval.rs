//! Static numeric evaluator
//!
//! Evaluates constant arithmetic with the subject language's semantics: booleans act as
//! integers except under bitwise operators, floor division and modulo round toward
//! negative infinity, and integers are unbounded. Anything that would raise at runtime
//! evaluates to `None`.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::tree::{Literal, NodeId, NodeKind, Operator, SyntaxTree, UnaryOperator};

/// Largest shift count the evaluator will perform.
const MAX_SHIFT: u64 = 1024;

#[derive(Debug, Clone, PartialEq)]
enum Number {
    Bool(bool),
    Int(BigInt),
    Float(f64),
}

impl Number {
    fn from_literal(literal: &Literal) -> Option<Number> {
        match literal {
            Literal::Bool(b) => Some(Number::Bool(*b)),
            Literal::Int(i) => Some(Number::Int(i.clone())),
            Literal::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    fn into_literal(self) -> Literal {
        match self {
            Number::Bool(b) => Literal::Bool(b),
            Number::Int(i) => Literal::Int(i),
            Number::Float(f) => Literal::Float(f),
        }
    }

    fn as_int(&self) -> Option<BigInt> {
        match self {
            Number::Bool(b) => Some(BigInt::from(*b as u8)),
            Number::Int(i) => Some(i.clone()),
            Number::Float(_) => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Number::Float(f) => Some(*f),
            // int to float conversion overflows past the float range
            other => other.as_int()?.to_f64().filter(|f| f.is_finite()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FLOAT HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Quotient and remainder of float floor division.
fn float_divmod(x: f64, y: f64) -> Option<(f64, f64)> {
    if y == 0.0 {
        return None;
    }
    let mut modulo = x % y;
    let mut div = (x - modulo) / y;
    if modulo != 0.0 {
        if (y < 0.0) != (modulo < 0.0) {
            modulo += y;
            div -= 1.0;
        }
    } else {
        modulo = 0.0f64.copysign(y);
    }
    let floordiv = if div != 0.0 {
        let mut floordiv = div.floor();
        if div - floordiv > 0.5 {
            floordiv += 1.0;
        }
        floordiv
    } else {
        0.0f64.copysign(x / y)
    };
    Some((floordiv, modulo))
}

fn int_floor_div(x: &BigInt, y: &BigInt) -> Option<BigInt> {
    if y.is_zero() {
        return None;
    }
    let (q, r) = (x / y, x % y);
    if !r.is_zero() && (r.is_negative() != y.is_negative()) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn int_mod(x: &BigInt, y: &BigInt) -> Option<BigInt> {
    if y.is_zero() {
        return None;
    }
    let r = x % y;
    if !r.is_zero() && (r.is_negative() != y.is_negative()) {
        Some(r + y)
    } else {
        Some(r)
    }
}

fn shift_count(count: &BigInt) -> Option<usize> {
    if count.is_negative() {
        return None;
    }
    count.to_u64().filter(|&c| c <= MAX_SHIFT).map(|c| c as usize)
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATORS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn binary(op: Operator, left: &Literal, right: &Literal) -> Option<Literal> {
    let left = Number::from_literal(left)?;
    let right = Number::from_literal(right)?;

    if let (Number::Bool(a), Number::Bool(b)) = (&left, &right) {
        match op {
            Operator::BitAnd => return Some(Literal::Bool(*a & *b)),
            Operator::BitOr => return Some(Literal::Bool(*a | *b)),
            Operator::BitXor => return Some(Literal::Bool(*a ^ *b)),
            _ => {}
        }
    }

    let is_float = matches!(left, Number::Float(_)) || matches!(right, Number::Float(_));
    let result = if is_float {
        let (x, y) = (left.as_float()?, right.as_float()?);
        let value = match op {
            Operator::Add => x + y,
            Operator::Sub => x - y,
            Operator::Mult => x * y,
            Operator::FloorDiv => float_divmod(x, y)?.0,
            Operator::Mod => float_divmod(x, y)?.1,
            _ => return None,
        };
        Number::Float(value)
    } else {
        let (x, y) = (left.as_int()?, right.as_int()?);
        let value = match op {
            Operator::Add => x + y,
            Operator::Sub => x - y,
            Operator::Mult => x * y,
            Operator::FloorDiv => int_floor_div(&x, &y)?,
            Operator::Mod => int_mod(&x, &y)?,
            Operator::LShift => x << shift_count(&y)?,
            Operator::RShift => x >> shift_count(&y)?,
            Operator::BitAnd => x & y,
            Operator::BitOr => x | y,
            Operator::BitXor => x ^ y,
            Operator::Div | Operator::Pow | Operator::MatMult => return None,
        };
        Number::Int(value)
    };

    match result {
        Number::Float(f) if f.is_nan() => None,
        other => Some(other.into_literal()),
    }
}

pub fn unary(op: UnaryOperator, operand: &Literal) -> Option<Literal> {
    let operand = Number::from_literal(operand)?;
    let result = match (op, operand) {
        (UnaryOperator::USub, Number::Float(f)) => Number::Float(-f),
        (UnaryOperator::UAdd, Number::Float(f)) => Number::Float(f),
        (UnaryOperator::USub, other) => Number::Int(-other.as_int()?),
        (UnaryOperator::UAdd, other) => Number::Int(other.as_int()?),
        (UnaryOperator::Invert, Number::Float(_)) => return None,
        (UnaryOperator::Invert, other) => Number::Int(-(other.as_int()?) - 1),
        (UnaryOperator::Not, _) => return None,
    };
    Some(result.into_literal())
}

/// Evaluate a constant arithmetic subtree, or `None` if any part is not foldable.
pub fn evaluate(tree: &SyntaxTree, id: NodeId) -> Option<Literal> {
    match tree.kind(id) {
        NodeKind::Constant { value } => match value {
            Literal::Bool(_) | Literal::Int(_) | Literal::Float(_) => Some(value.clone()),
            _ => None,
        },
        NodeKind::UnaryOp { op, operand } => unary(*op, &evaluate(tree, *operand)?),
        NodeKind::BinOp { left, op, right } => {
            if matches!(op, Operator::Div | Operator::Pow | Operator::MatMult) {
                return None;
            }
            binary(*op, &evaluate(tree, *left)?, &evaluate(tree, *right)?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Literal {
        Literal::Int(BigInt::from(v))
    }

    #[test]
    fn test_floor_division_rounds_down() {
        assert_eq!(binary(Operator::FloorDiv, &int(-7), &int(2)), Some(int(-4)));
        assert_eq!(binary(Operator::FloorDiv, &int(7), &int(-2)), Some(int(-4)));
        assert_eq!(binary(Operator::FloorDiv, &int(7), &int(0)), None);
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        assert_eq!(binary(Operator::Mod, &int(-7), &int(3)), Some(int(2)));
        assert_eq!(binary(Operator::Mod, &int(7), &int(-3)), Some(int(-2)));
        assert_eq!(
            binary(Operator::Mod, &Literal::Float(-7.0), &Literal::Float(3.0)),
            Some(Literal::Float(2.0))
        );
    }

    #[test]
    fn test_bool_arithmetic() {
        let t = Literal::Bool(true);
        assert_eq!(binary(Operator::Add, &t, &t), Some(int(2)));
        assert_eq!(
            binary(Operator::BitAnd, &t, &Literal::Bool(false)),
            Some(Literal::Bool(false))
        );
        assert_eq!(binary(Operator::LShift, &t, &int(3)), Some(int(8)));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(binary(Operator::RShift, &int(-9), &int(1)), Some(int(-5)));
        assert_eq!(binary(Operator::LShift, &int(1), &int(-1)), None);
        assert_eq!(binary(Operator::LShift, &int(1), &int(100_000)), None);
    }

    #[test]
    fn test_excluded_operators() {
        assert_eq!(binary(Operator::Div, &int(4), &int(2)), None);
        assert_eq!(binary(Operator::Pow, &int(4), &int(2)), None);
    }

    #[test]
    fn test_float_mixing() {
        assert_eq!(
            binary(Operator::Add, &int(1), &Literal::Float(0.5)),
            Some(Literal::Float(1.5))
        );
        assert_eq!(
            binary(Operator::BitOr, &int(1), &Literal::Float(0.5)),
            None
        );
    }

    #[test]
    fn test_nan_is_rejected() {
        let inf = Literal::Float(f64::INFINITY);
        assert_eq!(binary(Operator::Sub, &inf, &inf), None);
    }

    #[test]
    fn test_invert() {
        assert_eq!(unary(UnaryOperator::Invert, &int(5)), Some(int(-6)));
        assert_eq!(unary(UnaryOperator::Invert, &Literal::Bool(true)), Some(int(-2)));
    }
}
