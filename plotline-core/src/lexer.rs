//! Lexical analysis of expression text.
//!
//! The lexer walks the input one byte at a time and hands out tokens on
//! demand; it owns no token list, only the current scan position. Re-running
//! a lexer over the same text always yields the same finite sequence,
//! terminated by an end token.
//!
//! # Token production rules
//!
//! | Input              | Token produced                         |
//! |--------------------|----------------------------------------|
//! | `123`, `3.14`, `.5`  | `Number(value)`                          |
//! | `abc`, `x_1`         | `Identifier`                             |
//! | `+ - * / ^ ( ) , ? :`| one token each                         |
//! | `= == != < <= > >=`  | one token each (two-char forms greedy) |
//! | `&&`, `\|\|`, `!`      | one token each                         |
//! | anything else      | `End` (stream terminates silently)     |
//!
//! A lone `&` or `|` is not an operator and also terminates the stream.
//! Whitespace is insignificant. Turning an unexpectedly early end into a
//! degraded parse tree is the parser's job, not the lexer's.

use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Lexer over a single expression's text.
pub struct Lexer<'a> {
    /// Source bytes.
    src: &'a [u8],
    /// Current byte position.
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given text.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.pos >= self.src.len() {
            return Token::end();
        }

        let c = self.src[self.pos];
        if c.is_ascii_digit() || c == b'.' {
            return self.scan_number();
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            return self.scan_identifier();
        }

        self.pos += 1;
        match c {
            b'+' => Token::new(TokenKind::Plus, "+"),
            b'-' => Token::new(TokenKind::Minus, "-"),
            b'*' => Token::new(TokenKind::Star, "*"),
            b'/' => Token::new(TokenKind::Slash, "/"),
            b'^' => Token::new(TokenKind::Caret, "^"),
            b'(' => Token::new(TokenKind::LParen, "("),
            b')' => Token::new(TokenKind::RParen, ")"),
            b',' => Token::new(TokenKind::Comma, ","),
            b'?' => Token::new(TokenKind::Question, "?"),
            b':' => Token::new(TokenKind::Colon, ":"),
            b'!' => {
                if self.consume(b'=') {
                    Token::new(TokenKind::BangEquals, "!=")
                } else {
                    Token::new(TokenKind::Bang, "!")
                }
            }
            b'=' => {
                if self.consume(b'=') {
                    Token::new(TokenKind::EqualsEquals, "==")
                } else {
                    Token::new(TokenKind::Equals, "=")
                }
            }
            b'<' => {
                if self.consume(b'=') {
                    Token::new(TokenKind::LessEquals, "<=")
                } else {
                    Token::new(TokenKind::Less, "<")
                }
            }
            b'>' => {
                if self.consume(b'=') {
                    Token::new(TokenKind::GreaterEquals, ">=")
                } else {
                    Token::new(TokenKind::Greater, ">")
                }
            }
            b'&' => {
                if self.consume(b'&') {
                    Token::new(TokenKind::AmpAmp, "&&")
                } else {
                    Token::end()
                }
            }
            b'|' => {
                if self.consume(b'|') {
                    Token::new(TokenKind::PipePipe, "||")
                } else {
                    Token::end()
                }
            }
            _ => Token::end(),
        }
    }

    /// Scan all tokens up to and including the end token.
    pub fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_end = tok.kind.is_end();
            tokens.push(tok);
            if is_end {
                break;
            }
        }
        tokens
    }

    // -- internal helpers --

    fn skip_whitespace(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Consume the next byte if it equals `expected`.
    fn consume(&mut self, expected: u8) -> bool {
        if self.pos < self.src.len() && self.src[self.pos] == expected {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Scan a decimal number. At most one `.` participates; a second dot
    /// ends the token.
    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        let mut has_dot = false;
        while self.pos < self.src.len() {
            let c = self.src[self.pos];
            if c.is_ascii_digit() {
                self.pos += 1;
                continue;
            }
            if c == b'.' && !has_dot {
                has_dot = true;
                self.pos += 1;
                continue;
            }
            break;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("0");
        let value = text.parse::<f64>().unwrap_or(0.0);
        Token::number(text, value)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        while self.pos < self.src.len() {
            let c = self.src[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        Token::new(TokenKind::Identifier, text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).lex().into_iter().map(|t| t.kind).collect()
    }

    // -- whitespace --

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::End]);
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(kinds("  \t\n "), vec![TokenKind::End]);
    }

    // -- numbers --

    #[test]
    fn integer() {
        let tokens = Lexer::new("42").lex();
        assert_eq!(tokens[0], Token::number("42", 42.0));
    }

    #[test]
    fn decimal() {
        let tokens = Lexer::new("3.14").lex();
        assert_eq!(tokens[0], Token::number("3.14", 3.14));
    }

    #[test]
    fn leading_dot_number() {
        let tokens = Lexer::new(".5").lex();
        assert_eq!(tokens[0], Token::number(".5", 0.5));
    }

    #[test]
    fn second_dot_ends_number() {
        // "1.2.3" → 1.2 then .3
        let tokens = Lexer::new("1.2.3").lex();
        assert_eq!(tokens[0], Token::number("1.2", 1.2));
        assert_eq!(tokens[1], Token::number(".3", 0.3));
    }

    // -- identifiers --

    #[test]
    fn identifier_with_digits_and_underscore() {
        let tokens = Lexer::new("x_1 sin").lex();
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "x_1"));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "sin"));
    }

    // -- operators --

    #[test]
    fn arithmetic_operators() {
        assert_eq!(
            kinds("+ - * / ^"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Caret,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn comparison_operators_greedy() {
        assert_eq!(
            kinds("< <= > >= == != ="),
            vec![
                TokenKind::Less,
                TokenKind::LessEquals,
                TokenKind::Greater,
                TokenKind::GreaterEquals,
                TokenKind::EqualsEquals,
                TokenKind::BangEquals,
                TokenKind::Equals,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn logical_operators() {
        assert_eq!(
            kinds("&& || !"),
            vec![
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Bang,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds("(a, b) ? c : d"),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Question,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::End,
            ]
        );
    }

    // -- early termination --

    #[test]
    fn unknown_character_terminates_stream() {
        assert_eq!(
            kinds("1 # 2"),
            vec![TokenKind::Number, TokenKind::End]
        );
    }

    #[test]
    fn lone_ampersand_terminates_stream() {
        assert_eq!(kinds("a & b"), vec![TokenKind::Identifier, TokenKind::End]);
    }

    #[test]
    fn lone_pipe_terminates_stream() {
        assert_eq!(kinds("a | b"), vec![TokenKind::Identifier, TokenKind::End]);
    }

    // -- lazy production --

    #[test]
    fn next_token_is_restartable() {
        let mut first = Lexer::new("sin(x)");
        let mut second = Lexer::new("sin(x)");
        for _ in 0..5 {
            assert_eq!(first.next_token(), second.next_token());
        }
    }

    #[test]
    fn end_token_repeats_at_exhaustion() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().kind, TokenKind::End);
        assert_eq!(lexer.next_token().kind, TokenKind::End);
    }
}
