//! Bound expression trees.
//!
//! A bound expression is a syntax tree after identifier resolution:
//! parameters become slot indices, constants are folded in, builtin calls
//! carry a [`Builtin`] selector, and user-function calls carry the target's
//! stable [`FunctionId`] rather than its current name. The tree is
//! immutable and shared read-only by the evaluator and the dependency
//! resolver.

use std::collections::HashSet;

use crate::syntax::{BinaryOp, UnaryOp};
use crate::symbols::FunctionId;

// ---------------------------------------------------------------------------
// Builtins
// ---------------------------------------------------------------------------

/// Builtin unary math functions. All take exactly one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    /// Base-10 logarithm.
    Log,
    /// Natural logarithm.
    Ln,
    Exp,
    Sqrt,
    Abs,
}

impl Builtin {
    /// Resolve a builtin by (case-insensitive) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "log" => Some(Self::Log),
            "ln" => Some(Self::Ln),
            "exp" => Some(Self::Exp),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    /// Whether this builtin interprets its argument as an angle.
    #[must_use]
    pub const fn takes_angle(self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan)
    }
}

// ---------------------------------------------------------------------------
// Bound expression
// ---------------------------------------------------------------------------

/// A node in a bound expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    /// A numeric constant.
    Constant(f64),
    /// A reference to a declared parameter, by slot index
    /// (slot 0 is the first parameter, slot 1 the second).
    Variable(usize),
    /// A unary operation.
    Unary { op: UnaryOp, operand: Box<BoundExpr> },
    /// A binary operation.
    Binary {
        left: Box<BoundExpr>,
        op: BinaryOp,
        right: Box<BoundExpr>,
    },
    /// A call to a builtin math function.
    BuiltinCall {
        builtin: Builtin,
        argument: Box<BoundExpr>,
    },
    /// A call to another user-defined function, by stable identifier.
    ///
    /// At evaluation time the callee's value is read from its precomputed
    /// value array at the current sample index; the argument expression is
    /// bound for diagnostics but not re-evaluated per call.
    FunctionCall {
        target: FunctionId,
        argument: Box<BoundExpr>,
    },
    /// A conditional `cond ? a : b`.
    Conditional {
        condition: Box<BoundExpr>,
        when_true: Box<BoundExpr>,
        when_false: Box<BoundExpr>,
    },
}

impl BoundExpr {
    /// The set of external functions this expression depends on.
    #[must_use]
    pub fn dependencies(&self) -> HashSet<FunctionId> {
        let mut out = HashSet::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies(&self, out: &mut HashSet<FunctionId>) {
        match self {
            Self::Constant(_) | Self::Variable(_) => {}
            Self::Unary { operand, .. } => operand.collect_dependencies(out),
            Self::Binary { left, right, .. } => {
                left.collect_dependencies(out);
                right.collect_dependencies(out);
            }
            Self::BuiltinCall { argument, .. } => argument.collect_dependencies(out),
            Self::FunctionCall { target, argument } => {
                out.insert(*target);
                argument.collect_dependencies(out);
            }
            Self::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                condition.collect_dependencies(out);
                when_true.collect_dependencies(out);
                when_false.collect_dependencies(out);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bound function
// ---------------------------------------------------------------------------

/// A function after binding, ready for sampling.
#[derive(Debug, Clone)]
pub struct BoundFunction {
    /// Stable identifier.
    pub id: FunctionId,
    /// Name at bind time (informational; references use the id).
    pub name: String,
    /// The bound body.
    pub expression: BoundExpr,
    /// Optional domain clamp on the first parameter.
    pub x_min: Option<f64>,
    /// Optional domain clamp on the first parameter.
    pub x_max: Option<f64>,
    /// Display-style index, carried through for the rendering layer.
    pub style_index: usize,
}

impl BoundFunction {
    /// Whether `x` lies inside the function's domain clamp.
    #[must_use]
    pub fn in_domain(&self, x: f64) -> bool {
        if let Some(min) = self.x_min {
            if x < min {
                return false;
            }
        }
        if let Some(max) = self.x_max {
            if x > max {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
