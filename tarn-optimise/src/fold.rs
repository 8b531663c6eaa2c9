//! Evaluating operators on literal operands.
//!
//! Integer arithmetic wraps and shift amounts are masked to the width of the
//! shifted value. Integer division or modulus by zero never produces a value,
//! so it folds to [`Lattice::Unassigned`]. Operands of the wrong type fold to
//! [`Lattice::NonConstant`].


use crate::lattice::Lattice;
use tarn_syntax::{BinaryOp, Literal, UnaryOp};

fn mismatched_unary(op: UnaryOp, operand: &Literal) -> Lattice {
    log::debug!(
        "not folding {}{}: mismatched operand type",
        op.render(),
        operand.render()
    );
    Lattice::NonConstant
}

fn mismatched_binary(left: &Literal, op: BinaryOp, right: &Literal) -> Lattice {
    log::debug!(
        "not folding {} {} {}: mismatched operand types",
        left.render(),
        op.render(),
        right.render()
    );
    Lattice::NonConstant
}

pub fn fold_unary(op: UnaryOp, operand: &Literal) -> Lattice {
    let value = match (op, operand) {
        (UnaryOp::Negate, Literal::Int(value)) => Literal::Int(value.wrapping_neg()),
        (UnaryOp::Negate, Literal::Long(value)) => Literal::Long(value.wrapping_neg()),
        (UnaryOp::Negate, Literal::Float(value)) => Literal::Float(-value),
        (UnaryOp::Negate, Literal::Double(value)) => Literal::Double(-value),
        (UnaryOp::BooleanNot, Literal::Boolean(value)) => Literal::Boolean(!value),
        (UnaryOp::BitwiseNot, Literal::Int(value)) => Literal::Int(!value),
        (UnaryOp::BitwiseNot, Literal::Long(value)) => Literal::Long(!value),
        _ => return mismatched_unary(op, operand),
    };
    Lattice::Constant(value)
}

/// `None` when the operation has no result, e.g. division by zero.
struct Arithmetic {
    int: fn(i32, i32) -> Option<i32>,
    long: fn(i64, i64) -> Option<i64>,
    float: fn(f32, f32) -> f32,
    double: fn(f64, f64) -> f64,
}

fn arithmetic(left: &Literal, op: BinaryOp, right: &Literal, ops: Arithmetic) -> Lattice {
    let value = match (left, right) {
        (Literal::Int(l), Literal::Int(r)) => (ops.int)(*l, *r).map(Literal::Int),
        (Literal::Long(l), Literal::Long(r)) => (ops.long)(*l, *r).map(Literal::Long),
        (Literal::Float(l), Literal::Float(r)) => Some(Literal::Float((ops.float)(*l, *r))),
        (Literal::Double(l), Literal::Double(r)) => Some(Literal::Double((ops.double)(*l, *r))),
        _ => return mismatched_binary(left, op, right),
    };
    match value {
        Some(value) => Lattice::Constant(value),
        None => {
            log::debug!(
                "{} {} {} has no value",
                left.render(),
                op.render(),
                right.render()
            );
            Lattice::Unassigned
        }
    }
}

/// The shifted value may be an `Int` or a `Long`; the shift amount is always an `Int`.
fn shift(
    left: &Literal,
    op: BinaryOp,
    right: &Literal,
    int: fn(i32, u32) -> i32,
    long: fn(i64, u32) -> i64,
) -> Lattice {
    match (left, right) {
        // Masking happens in the wrapping shifts, so the cast only reinterprets the bits.
        (Literal::Int(l), Literal::Int(r)) => Lattice::Constant(Literal::Int(int(*l, *r as u32))),
        (Literal::Long(l), Literal::Int(r)) => {
            Lattice::Constant(Literal::Long(long(*l, *r as u32)))
        }
        _ => mismatched_binary(left, op, right),
    }
}

fn bitwise(
    left: &Literal,
    op: BinaryOp,
    right: &Literal,
    int: fn(i32, i32) -> i32,
    long: fn(i64, i64) -> i64,
    boolean: fn(bool, bool) -> bool,
) -> Lattice {
    let value = match (left, right) {
        (Literal::Int(l), Literal::Int(r)) => Literal::Int(int(*l, *r)),
        (Literal::Long(l), Literal::Long(r)) => Literal::Long(long(*l, *r)),
        (Literal::Boolean(l), Literal::Boolean(r)) => Literal::Boolean(boolean(*l, *r)),
        _ => return mismatched_binary(left, op, right),
    };
    Lattice::Constant(value)
}

fn comparison(left: &Literal, op: BinaryOp, right: &Literal) -> Lattice {
    fn compare<T: PartialOrd>(op: BinaryOp, l: T, r: T) -> bool {
        match op {
            BinaryOp::LessThan => l < r,
            BinaryOp::LessThanEqual => l <= r,
            BinaryOp::GreaterThan => l > r,
            _ => l >= r,
        }
    }

    let result = match (left, right) {
        (Literal::Int(l), Literal::Int(r)) => compare(op, l, r),
        (Literal::Long(l), Literal::Long(r)) => compare(op, l, r),
        (Literal::Float(l), Literal::Float(r)) => compare(op, l, r),
        (Literal::Double(l), Literal::Double(r)) => compare(op, l, r),
        _ => return mismatched_binary(left, op, right),
    };
    Lattice::Constant(Literal::Boolean(result))
}

fn power(left: &Literal, op: BinaryOp, right: &Literal) -> Lattice {
    let value = match (left, right) {
        (Literal::Int(l), Literal::Int(r)) => u32::try_from(*r)
            .ok()
            .map(|exponent| Literal::Int(l.wrapping_pow(exponent))),
        (Literal::Long(l), Literal::Long(r)) => u32::try_from(*r)
            .ok()
            .map(|exponent| Literal::Long(l.wrapping_pow(exponent))),
        (Literal::Float(l), Literal::Float(r)) => Some(Literal::Float(l.powf(*r))),
        (Literal::Double(l), Literal::Double(r)) => Some(Literal::Double(l.powf(*r))),
        _ => return mismatched_binary(left, op, right),
    };
    match value {
        Some(value) => Lattice::Constant(value),
        None => {
            log::debug!(
                "not folding {} {} {}: exponent out of range",
                left.render(),
                op.render(),
                right.render()
            );
            Lattice::NonConstant
        }
    }
}

pub fn fold_binary(left: &Literal, op: BinaryOp, right: &Literal) -> Lattice {
    match op {
        BinaryOp::Power => power(left, op, right),
        BinaryOp::Multiply => arithmetic(
            left,
            op,
            right,
            Arithmetic {
                int: |l, r| Some(l.wrapping_mul(r)),
                long: |l, r| Some(l.wrapping_mul(r)),
                float: |l, r| l * r,
                double: |l, r| l * r,
            },
        ),
        BinaryOp::Divide => arithmetic(
            left,
            op,
            right,
            Arithmetic {
                int: |l, r| (r != 0).then(|| l.wrapping_div(r)),
                long: |l, r| (r != 0).then(|| l.wrapping_div(r)),
                float: |l, r| l / r,
                double: |l, r| l / r,
            },
        ),
        BinaryOp::Modulus => arithmetic(
            left,
            op,
            right,
            Arithmetic {
                int: |l, r| (r != 0).then(|| l.wrapping_rem(r)),
                long: |l, r| (r != 0).then(|| l.wrapping_rem(r)),
                float: |l, r| l % r,
                double: |l, r| l % r,
            },
        ),
        BinaryOp::Add => arithmetic(
            left,
            op,
            right,
            Arithmetic {
                int: |l, r| Some(l.wrapping_add(r)),
                long: |l, r| Some(l.wrapping_add(r)),
                float: |l, r| l + r,
                double: |l, r| l + r,
            },
        ),
        BinaryOp::Subtract => arithmetic(
            left,
            op,
            right,
            Arithmetic {
                int: |l, r| Some(l.wrapping_sub(r)),
                long: |l, r| Some(l.wrapping_sub(r)),
                float: |l, r| l - r,
                double: |l, r| l - r,
            },
        ),
        BinaryOp::ShiftLeft => shift(left, op, right, i32::wrapping_shl, i64::wrapping_shl),
        BinaryOp::ShiftRight => shift(left, op, right, i32::wrapping_shr, i64::wrapping_shr),
        BinaryOp::UnsignedShiftRight => shift(
            left,
            op,
            right,
            |l, r| (l as u32).wrapping_shr(r) as i32,
            |l, r| (l as u64).wrapping_shr(r) as i64,
        ),
        BinaryOp::BitwiseAnd => bitwise(left, op, right, |l, r| l & r, |l, r| l & r, |l, r| l & r),
        BinaryOp::BitwiseOr => bitwise(left, op, right, |l, r| l | r, |l, r| l | r, |l, r| l | r),
        BinaryOp::BitwiseXor => bitwise(left, op, right, |l, r| l ^ r, |l, r| l ^ r, |l, r| l ^ r),
        BinaryOp::LessThan
        | BinaryOp::LessThanEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanEqual => comparison(left, op, right),
        BinaryOp::Equal => Lattice::Constant(Literal::Boolean(left == right)),
        BinaryOp::NotEqual => Lattice::Constant(Literal::Boolean(left != right)),
        BinaryOp::BooleanAnd | BinaryOp::BooleanOr => match (left, right) {
            (Literal::Boolean(l), Literal::Boolean(r)) => {
                let result = if op == BinaryOp::BooleanAnd {
                    *l && *r
                } else {
                    *l || *r
                };
                Lattice::Constant(Literal::Boolean(result))
            }
            _ => mismatched_binary(left, op, right),
        },
    }
}
