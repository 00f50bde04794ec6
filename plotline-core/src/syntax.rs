//! Syntax tree produced by the parser.
//!
//! Nodes are immutable and tree-shaped with no back-references; the
//! parser's [`ExpressionInput`](crate::syntax::ExpressionInput) is the sole
//! owner. Identifier meaning is resolved later by the binder.

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-a`
    Negate,
    /// `+a`
    Identity,
    /// `!a`
    Not,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `a ^ b`
    Power,
    /// `a < b`
    Less,
    /// `a <= b`
    LessEquals,
    /// `a > b`
    Greater,
    /// `a >= b`
    GreaterEquals,
    /// `a == b`
    Equals,
    /// `a != b`
    NotEquals,
    /// `a && b`
    And,
    /// `a || b`
    Or,
}

// ---------------------------------------------------------------------------
// Syntax nodes
// ---------------------------------------------------------------------------

/// A node in the expression syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    /// A numeric constant.
    Number(f64),
    /// An identifier reference.
    Identifier(String),
    /// A unary operation.
    Unary {
        op: UnaryOp,
        operand: Box<SyntaxNode>,
    },
    /// A binary operation.
    Binary {
        left: Box<SyntaxNode>,
        op: BinaryOp,
        right: Box<SyntaxNode>,
    },
    /// A call `name(arg, ...)`. Any arity is syntactically legal; the
    /// binder validates it.
    Call {
        name: String,
        arguments: Vec<SyntaxNode>,
    },
    /// A conditional `cond ? a : b`.
    Conditional {
        condition: Box<SyntaxNode>,
        when_true: Box<SyntaxNode>,
        when_false: Box<SyntaxNode>,
    },
}

impl SyntaxNode {
    /// The default recovery node: a zero constant.
    #[must_use]
    pub const fn zero() -> Self {
        Self::Number(0.0)
    }
}

// ---------------------------------------------------------------------------
// Expression input
// ---------------------------------------------------------------------------

/// The result of parsing one expression's text.
///
/// `defined_name` and `parameters` are present only when the text matched
/// the function-header form `name(param, ...) = body`. A bare expression
/// leaves both empty; the pipeline supplies the implicit parameter `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionInput {
    /// The name declared in the function header, if any.
    pub defined_name: Option<String>,
    /// The declared parameter names, in order.
    pub parameters: Vec<String>,
    /// The body expression.
    pub body: SyntaxNode,
}
