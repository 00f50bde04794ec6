//! Pure numeric evaluation of bound expressions.
//!
//! The evaluator is a plain function with no state of its own: everything
//! it needs — the point, the angle mode, the precomputed value arrays of
//! dependency functions — arrives in the call. Invalid arithmetic never
//! panics; it produces NaN, which the samplers turn into segment breaks.
//!
//! Numeric conventions:
//!
//! - division by exact zero → NaN, not infinity
//! - `sqrt` of a negative, `log`/`ln` of a non-positive → NaN
//! - comparisons and logicals produce 1.0 / 0.0
//! - truth means finite with magnitude above 1e-9
//! - equality is tolerance-based (`1e-9`)
//! - trig arguments are converted from degrees when the mode says so

use std::collections::HashMap;

use crate::bound::{BoundExpr, Builtin};
use crate::document::AngleMode;
use crate::symbols::FunctionId;
use crate::syntax::{BinaryOp, UnaryOp};

/// Tolerance used for equality comparisons and truthiness.
const EPSILON: f64 = 1e-9;

/// Precomputed value arrays of already-evaluated dependency functions.
pub type DependencyValues = HashMap<FunctionId, Vec<f64>>;

/// Evaluate a bound expression at one sample point.
///
/// `x` and `y` fill parameter slots 0 and 1; further slots yield NaN.
/// `index` selects the entry of a dependency's value array when the
/// expression calls another function; a callee that was not evaluated this
/// pass (or an out-of-range index) yields NaN.
#[must_use]
pub fn evaluate(
    expr: &BoundExpr,
    x: f64,
    y: f64,
    angle_mode: AngleMode,
    deps: &DependencyValues,
    index: usize,
) -> f64 {
    match expr {
        BoundExpr::Constant(value) => *value,
        BoundExpr::Variable(slot) => match slot {
            0 => x,
            1 => y,
            _ => f64::NAN,
        },
        BoundExpr::Unary { op, operand } => {
            let value = evaluate(operand, x, y, angle_mode, deps, index);
            match op {
                UnaryOp::Negate => -value,
                UnaryOp::Identity => value,
                UnaryOp::Not => {
                    if is_true(value) {
                        0.0
                    } else {
                        1.0
                    }
                }
            }
        }
        BoundExpr::Binary { left, op, right } => {
            let l = evaluate(left, x, y, angle_mode, deps, index);
            let r = evaluate(right, x, y, angle_mode, deps, index);
            evaluate_binary(l, *op, r)
        }
        BoundExpr::BuiltinCall { builtin, argument } => {
            let arg = evaluate(argument, x, y, angle_mode, deps, index);
            evaluate_builtin(*builtin, arg, angle_mode)
        }
        BoundExpr::FunctionCall { target, .. } => deps
            .get(target)
            .and_then(|values| values.get(index))
            .copied()
            .unwrap_or(f64::NAN),
        BoundExpr::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            let cond = evaluate(condition, x, y, angle_mode, deps, index);
            if is_true(cond) {
                evaluate(when_true, x, y, angle_mode, deps, index)
            } else {
                evaluate(when_false, x, y, angle_mode, deps, index)
            }
        }
    }
}

fn evaluate_binary(left: f64, op: BinaryOp, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Subtract => left - right,
        BinaryOp::Multiply => left * right,
        BinaryOp::Divide => {
            if right == 0.0 {
                f64::NAN
            } else {
                left / right
            }
        }
        BinaryOp::Power => left.powf(right),
        BinaryOp::Less => bool_value(left < right),
        BinaryOp::LessEquals => bool_value(left <= right),
        BinaryOp::Greater => bool_value(left > right),
        BinaryOp::GreaterEquals => bool_value(left >= right),
        BinaryOp::Equals => bool_value((left - right).abs() < EPSILON),
        BinaryOp::NotEquals => bool_value((left - right).abs() >= EPSILON),
        BinaryOp::And => bool_value(is_true(left) && is_true(right)),
        BinaryOp::Or => bool_value(is_true(left) || is_true(right)),
    }
}

fn evaluate_builtin(builtin: Builtin, arg: f64, angle_mode: AngleMode) -> f64 {
    let angle = match angle_mode {
        AngleMode::Degrees => arg.to_radians(),
        AngleMode::Radians => arg,
    };
    match builtin {
        Builtin::Sin => angle.sin(),
        Builtin::Cos => angle.cos(),
        Builtin::Tan => angle.tan(),
        Builtin::Log => {
            if arg <= 0.0 {
                f64::NAN
            } else {
                arg.log10()
            }
        }
        Builtin::Ln => {
            if arg <= 0.0 {
                f64::NAN
            } else {
                arg.ln()
            }
        }
        Builtin::Exp => arg.exp(),
        Builtin::Sqrt => {
            if arg < 0.0 {
                f64::NAN
            } else {
                arg.sqrt()
            }
        }
        Builtin::Abs => arg.abs(),
    }
}

/// Truthiness: finite with magnitude above the tolerance.
fn is_true(value: f64) -> bool {
    !value.is_nan() && value.abs() > EPSILON
}

const fn bool_value(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
