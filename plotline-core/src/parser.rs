//! Recursive-descent parser for expression text.
//!
//! The parser first tries to recognize the function-header prefix
//! `name ( param (, param)* ) =`. On any mismatch it rewinds to the start
//! and parses the whole input as a bare expression. Malformed input never
//! raises: every recovery substitutes a zero-constant node and the binder
//! layers semantic diagnostics on top.
//!
//! Precedence, lowest to highest:
//!
//! 1. conditional `cond ? a : b` (right-associative between branches)
//! 2. logical or `||`
//! 3. logical and `&&`
//! 4. equality `==` `!=`
//! 5. relational `<` `<=` `>` `>=`
//! 6. additive `+` `-`
//! 7. multiplicative `*` `/`
//! 8. unary `-` `+` `!`
//! 9. power `^` (right-associative)
//! 10. primary: number, identifier, call, parenthesized group

use crate::lexer::Lexer;
use crate::syntax::{BinaryOp, ExpressionInput, SyntaxNode, UnaryOp};
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parser over one expression's token stream.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Create a parser for the given expression text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            tokens: Lexer::new(text).lex(),
            index: 0,
        }
    }

    /// Parse the full token stream into exactly one [`ExpressionInput`].
    pub fn parse_expression_input(&mut self) -> ExpressionInput {
        if let Some((name, parameters)) = self.try_parse_header() {
            let body = self.parse_expression();
            return ExpressionInput {
                defined_name: Some(name),
                parameters,
                body,
            };
        }

        ExpressionInput {
            defined_name: None,
            parameters: Vec::new(),
            body: self.parse_expression(),
        }
    }

    /// Attempt to consume a function header `name ( p (, p)* ) =`.
    ///
    /// Rewinds to the saved position and returns `None` on any mismatch,
    /// leaving the stream ready for a bare-expression parse.
    fn try_parse_header(&mut self) -> Option<(String, Vec<String>)> {
        let saved = self.index;

        let header = self.parse_header_inner();
        if header.is_none() {
            self.index = saved;
        }
        header
    }

    fn parse_header_inner(&mut self) -> Option<(String, Vec<String>)> {
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let name = self.advance().text.clone();

        if !self.consume(TokenKind::LParen) {
            return None;
        }

        let mut parameters = Vec::new();
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        parameters.push(self.advance().text.clone());

        while self.consume(TokenKind::Comma) {
            if !self.check(TokenKind::Identifier) {
                return None;
            }
            parameters.push(self.advance().text.clone());
        }

        if !self.consume(TokenKind::RParen) {
            return None;
        }
        if !self.consume(TokenKind::Equals) {
            return None;
        }

        Some((name, parameters))
    }

    // -- precedence chain --

    fn parse_expression(&mut self) -> SyntaxNode {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> SyntaxNode {
        let condition = self.parse_logical_or();
        if self.consume(TokenKind::Question) {
            let when_true = self.parse_expression();
            let _ = self.consume(TokenKind::Colon);
            let when_false = self.parse_expression();
            return SyntaxNode::Conditional {
                condition: Box::new(condition),
                when_true: Box::new(when_true),
                when_false: Box::new(when_false),
            };
        }
        condition
    }

    fn parse_logical_or(&mut self) -> SyntaxNode {
        let mut left = self.parse_logical_and();
        while self.consume(TokenKind::PipePipe) {
            let right = self.parse_logical_and();
            left = binary(left, BinaryOp::Or, right);
        }
        left
    }

    fn parse_logical_and(&mut self) -> SyntaxNode {
        let mut left = self.parse_equality();
        while self.consume(TokenKind::AmpAmp) {
            let right = self.parse_equality();
            left = binary(left, BinaryOp::And, right);
        }
        left
    }

    fn parse_equality(&mut self) -> SyntaxNode {
        let mut left = self.parse_relational();
        loop {
            let op = if self.consume(TokenKind::EqualsEquals) {
                BinaryOp::Equals
            } else if self.consume(TokenKind::BangEquals) {
                BinaryOp::NotEquals
            } else {
                return left;
            };
            let right = self.parse_relational();
            left = binary(left, op, right);
        }
    }

    fn parse_relational(&mut self) -> SyntaxNode {
        let mut left = self.parse_additive();
        loop {
            let op = if self.consume(TokenKind::Less) {
                BinaryOp::Less
            } else if self.consume(TokenKind::LessEquals) {
                BinaryOp::LessEquals
            } else if self.consume(TokenKind::Greater) {
                BinaryOp::Greater
            } else if self.consume(TokenKind::GreaterEquals) {
                BinaryOp::GreaterEquals
            } else {
                return left;
            };
            let right = self.parse_additive();
            left = binary(left, op, right);
        }
    }

    fn parse_additive(&mut self) -> SyntaxNode {
        let mut left = self.parse_multiplicative();
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Subtract
            } else {
                return left;
            };
            let right = self.parse_multiplicative();
            left = binary(left, op, right);
        }
    }

    fn parse_multiplicative(&mut self) -> SyntaxNode {
        let mut left = self.parse_unary();
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Multiply
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Divide
            } else {
                return left;
            };
            let right = self.parse_unary();
            left = binary(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> SyntaxNode {
        let op = if self.consume(TokenKind::Minus) {
            UnaryOp::Negate
        } else if self.consume(TokenKind::Plus) {
            UnaryOp::Identity
        } else if self.consume(TokenKind::Bang) {
            UnaryOp::Not
        } else {
            return self.parse_power();
        };
        let operand = self.parse_unary();
        SyntaxNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    fn parse_power(&mut self) -> SyntaxNode {
        let left = self.parse_primary();
        if self.consume(TokenKind::Caret) {
            // Right-associative: re-enter at the unary level so `2^-x` works.
            let right = self.parse_unary();
            return binary(left, BinaryOp::Power, right);
        }
        left
    }

    fn parse_primary(&mut self) -> SyntaxNode {
        if self.check(TokenKind::Number) {
            let tok = self.advance();
            return SyntaxNode::Number(tok.value.unwrap_or(0.0));
        }

        if self.check(TokenKind::Identifier) {
            let name = self.advance().text.clone();
            if self.consume(TokenKind::LParen) {
                let mut arguments = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        arguments.push(self.parse_expression());
                        if !self.consume(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let _ = self.consume(TokenKind::RParen);
                return SyntaxNode::Call { name, arguments };
            }
            return SyntaxNode::Identifier(name);
        }

        if self.consume(TokenKind::LParen) {
            let expr = self.parse_expression();
            let _ = self.consume(TokenKind::RParen);
            return expr;
        }

        // Recovery: anything else degrades to a zero constant.
        SyntaxNode::zero()
    }

    // -- token stream helpers --

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.index += 1;
            return true;
        }
        false
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.index.min(self.tokens.len() - 1)];
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        tok
    }

    fn peek(&self) -> &Token {
        // The stream always ends with an end token, so clamping to the last
        // token yields `End` at exhaustion.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }
}

fn binary(left: SyntaxNode, op: BinaryOp, right: SyntaxNode) -> SyntaxNode {
    SyntaxNode::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ExpressionInput {
        Parser::new(text).parse_expression_input()
    }

    // -- headers --

    #[test]
    fn bare_expression_has_no_header() {
        let input = parse("x + 1");
        assert_eq!(input.defined_name, None);
        assert!(input.parameters.is_empty());
    }

    #[test]
    fn single_parameter_header() {
        let input = parse("f(x) = x * 2");
        assert_eq!(input.defined_name.as_deref(), Some("f"));
        assert_eq!(input.parameters, vec!["x"]);
    }

    #[test]
    fn multi_parameter_header() {
        let input = parse("h(u, v) = u + v");
        assert_eq!(input.defined_name.as_deref(), Some("h"));
        assert_eq!(input.parameters, vec!["u", "v"]);
    }

    #[test]
    fn header_mismatch_rewinds_to_bare_expression() {
        // Looks like a header until the missing `=`; must parse as a call.
        let input = parse("f(x)");
        assert_eq!(input.defined_name, None);
        assert_eq!(
            input.body,
            SyntaxNode::Call {
                name: "f".into(),
                arguments: vec![SyntaxNode::Identifier("x".into())],
            }
        );
    }

    #[test]
    fn call_with_constant_argument_is_not_a_header() {
        let input = parse("sin(3) = 1");
        assert_eq!(input.defined_name, None);
    }

    // -- precedence --

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let input = parse("1 + 2 * 3");
        assert_eq!(
            input.body,
            SyntaxNode::Binary {
                left: Box::new(SyntaxNode::Number(1.0)),
                op: BinaryOp::Add,
                right: Box::new(SyntaxNode::Binary {
                    left: Box::new(SyntaxNode::Number(2.0)),
                    op: BinaryOp::Multiply,
                    right: Box::new(SyntaxNode::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn power_is_right_associative() {
        let input = parse("2 ^ 3 ^ 2");
        let SyntaxNode::Binary { left, op, right } = input.body else {
            panic!("expected binary node");
        };
        assert_eq!(op, BinaryOp::Power);
        assert_eq!(*left, SyntaxNode::Number(2.0));
        assert!(matches!(
            *right,
            SyntaxNode::Binary {
                op: BinaryOp::Power,
                ..
            }
        ));
    }

    #[test]
    fn additive_is_left_associative() {
        let input = parse("1 - 2 - 3");
        let SyntaxNode::Binary { left, op, .. } = input.body else {
            panic!("expected binary node");
        };
        assert_eq!(op, BinaryOp::Subtract);
        assert!(matches!(
            *left,
            SyntaxNode::Binary {
                op: BinaryOp::Subtract,
                ..
            }
        ));
    }

    #[test]
    fn unary_inside_power_exponent() {
        let input = parse("2 ^ -x");
        let SyntaxNode::Binary { right, .. } = input.body else {
            panic!("expected binary node");
        };
        assert!(matches!(
            *right,
            SyntaxNode::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn conditional_parses_both_branches() {
        let input = parse("x > 0 ? x : -x");
        let SyntaxNode::Conditional {
            condition,
            when_false,
            ..
        } = input.body
        else {
            panic!("expected conditional node");
        };
        assert!(matches!(
            *condition,
            SyntaxNode::Binary {
                op: BinaryOp::Greater,
                ..
            }
        ));
        assert!(matches!(
            *when_false,
            SyntaxNode::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn comparison_and_logic() {
        let input = parse("x > 1 && x < 2 || x == 0");
        assert!(matches!(
            input.body,
            SyntaxNode::Binary {
                op: BinaryOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn parenthesized_group() {
        let input = parse("(1 + 2) * 3");
        let SyntaxNode::Binary { left, op, .. } = input.body else {
            panic!("expected binary node");
        };
        assert_eq!(op, BinaryOp::Multiply);
        assert!(matches!(
            *left,
            SyntaxNode::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
    }

    // -- calls --

    #[test]
    fn call_with_multiple_arguments_is_syntactically_legal() {
        let input = parse("max(1, 2, 3)");
        let SyntaxNode::Call { name, arguments } = input.body else {
            panic!("expected call node");
        };
        assert_eq!(name, "max");
        assert_eq!(arguments.len(), 3);
    }

    #[test]
    fn call_with_no_arguments() {
        let input = parse("f()");
        let SyntaxNode::Call { arguments, .. } = input.body else {
            panic!("expected call node");
        };
        assert!(arguments.is_empty());
    }

    // -- recovery --

    #[test]
    fn empty_input_degrades_to_zero() {
        let input = parse("");
        assert_eq!(input.body, SyntaxNode::zero());
    }

    #[test]
    fn dangling_operator_degrades_to_zero_operand() {
        let input = parse("1 +");
        assert_eq!(
            input.body,
            SyntaxNode::Binary {
                left: Box::new(SyntaxNode::Number(1.0)),
                op: BinaryOp::Add,
                right: Box::new(SyntaxNode::zero()),
            }
        );
    }

    #[test]
    fn unknown_character_truncates_input() {
        // The lexer ends the stream at `#`; the parser sees `1 +` only.
        let input = parse("1 + # 2");
        assert_eq!(
            input.body,
            SyntaxNode::Binary {
                left: Box::new(SyntaxNode::Number(1.0)),
                op: BinaryOp::Add,
                right: Box::new(SyntaxNode::zero()),
            }
        );
    }

    #[test]
    fn unclosed_parenthesis_recovers() {
        let input = parse("(1 + 2");
        assert!(matches!(
            input.body,
            SyntaxNode::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
    }
}
