//! Sampler that offloads an overflow-prone closed form to scaled
//! arithmetic.
//!
//! `exp(x^2) / exp(x^2 - 1)` equals `e` everywhere, but both terms overflow
//! an f64 once `x^2` passes about 709, so the generic evaluator produces
//! NaN there. This sampler recognizes that exact shape in the bound tree
//! and evaluates it through [`ExpReal`](crate::expreal::ExpReal), which
//! keeps the exponents symbolic until the division has cancelled them.
//! Everything else falls through to the managed sampler unchanged.

use tracing::debug;

use crate::bound::{BoundExpr, BoundFunction, Builtin};
use crate::document::FunctionRenderCache;
use crate::error::{CancellationToken, Cancelled};
use crate::expreal::ExpReal;
use crate::sampler::{EvaluationContext, ExpressionSampler, ManagedSampler, SegmentBuilder};
use crate::syntax::BinaryOp;

/// Closed forms the offload path can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffloadKind {
    /// `exp(x^2) / exp(x^2 - 1)`.
    ExpCancel,
}

/// [`ManagedSampler`] with an escape hatch for recognized closed forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffloadSampler {
    fallback: ManagedSampler,
}

impl ExpressionSampler for OffloadSampler {
    fn sample(
        &self,
        function: &BoundFunction,
        context: &EvaluationContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<FunctionRenderCache, Cancelled> {
        let Some(kind) = recognize(&function.expression) else {
            return self.fallback.sample(function, context, cancel);
        };
        debug!(name = %function.name, ?kind, "offloading closed form");

        let viewport = context.viewport;
        let count = viewport.samples.max(2);
        let x0 = viewport.x_min();
        let span = viewport.x_max() - x0;
        let y_limit = (viewport.scale_y * 5.0).max(1.0);

        let mut builder = SegmentBuilder::with_capacity(count);
        for i in 0..count {
            cancel.check()?;
            let x = x0 + span * (i as f64 / (count - 1) as f64);
            if !function.in_domain(x) {
                builder.push_invalid();
                continue;
            }
            let y = evaluate_offload(kind, x);
            if y.is_nan() || !y.is_within(y_limit) {
                builder.push_invalid();
            } else {
                builder.push(x, y.to_f64());
            }
        }
        Ok(builder.finish())
    }
}

fn evaluate_offload(kind: OffloadKind, x: f64) -> ExpReal {
    match kind {
        OffloadKind::ExpCancel => {
            let x_squared = ExpReal::powf(ExpReal::from_f64(x), 2.0);
            let numerator = ExpReal::exp(x_squared.to_f64());
            let minus_one = ExpReal::sub(x_squared, ExpReal::from_f64(1.0));
            let denominator = ExpReal::exp(minus_one.to_f64());
            ExpReal::div(numerator, denominator)
        }
    }
}

// ---------------------------------------------------------------------------
// Shape recognition
// ---------------------------------------------------------------------------

fn recognize(expression: &BoundExpr) -> Option<OffloadKind> {
    is_exp_cancel(expression).then_some(OffloadKind::ExpCancel)
}

/// `exp(x^2) / exp(x^2 - 1)`, structurally.
fn is_exp_cancel(expression: &BoundExpr) -> bool {
    let BoundExpr::Binary {
        left,
        op: BinaryOp::Divide,
        right,
    } = expression
    else {
        return false;
    };
    is_exp_of(left, is_x_squared) && is_exp_of(right, is_x_squared_minus_one)
}

fn is_exp_of(expression: &BoundExpr, shape: fn(&BoundExpr) -> bool) -> bool {
    matches!(
        expression,
        BoundExpr::BuiltinCall {
            builtin: Builtin::Exp,
            argument,
        } if shape(argument)
    )
}

fn is_x_squared(expression: &BoundExpr) -> bool {
    matches!(
        expression,
        BoundExpr::Binary {
            left,
            op: BinaryOp::Power,
            right,
        } if is_x(left) && is_number(right, 2.0)
    )
}

fn is_x_squared_minus_one(expression: &BoundExpr) -> bool {
    matches!(
        expression,
        BoundExpr::Binary {
            left,
            op: BinaryOp::Subtract,
            right,
        } if is_x_squared(left) && is_number(right, 1.0)
    )
}

fn is_x(expression: &BoundExpr) -> bool {
    matches!(expression, BoundExpr::Variable(0))
}

fn is_number(expression: &BoundExpr, value: f64) -> bool {
    matches!(expression, BoundExpr::Constant(c) if (c - value).abs() < 1e-9)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
