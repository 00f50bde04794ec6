//! Token types for the expression lexer.
//!
//! The lexer produces three kinds of payload:
//! - **Numbers**: decimal constants with at most one `.`
//! - **Identifiers**: `[A-Za-z_][A-Za-z0-9_]*`
//! - **Operators and punctuation**: each its own [`TokenKind`] variant
//!
//! Meaning (whether an identifier is a parameter, a constant, a builtin, or
//! a user function) is determined later by the binder, not at the lexer
//! level.

// ---------------------------------------------------------------------------
// Token kind
// ---------------------------------------------------------------------------

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. Also produced for any character the lexer does not
    /// recognize: the token stream simply ends early and the parser
    /// degrades to a default node.
    End,
    /// A decimal numeric constant.
    Number,
    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Identifier,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `=`
    Equals,
    /// `==`
    EqualsEquals,
    /// `!=`
    BangEquals,
    /// `<`
    Less,
    /// `<=`
    LessEquals,
    /// `>`
    Greater,
    /// `>=`
    GreaterEquals,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
}

impl TokenKind {
    /// Returns `true` if this is end-of-input.
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::End)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The literal text of the token.
    pub text: String,
    /// The numeric value, present only for [`TokenKind::Number`].
    pub value: Option<f64>,
}

impl Token {
    /// Create a token without a numeric value.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
        }
    }

    /// Create a numeric token.
    #[must_use]
    pub fn number(text: impl Into<String>, value: f64) -> Self {
        Self {
            kind: TokenKind::Number,
            text: text.into(),
            value: Some(value),
        }
    }

    /// The end-of-input token.
    #[must_use]
    pub fn end() -> Self {
        Self::new(TokenKind::End, "")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
