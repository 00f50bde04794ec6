//! Binding: resolving syntax trees against a symbol table.
//!
//! The binder never aborts. Unknown identifiers, unknown functions, and
//! arity mismatches each emit a diagnostic and substitute a zero constant,
//! so binding always completes for the rest of the tree and a function with
//! one bad subexpression still produces a drawable (if partly flat) curve.
//!
//! Identifier resolution order:
//!
//! 1. declared parameter names (positional, case-insensitive) → slot
//! 2. literal constants `pi`, `e`
//! 3. builtin function names, when called with exactly one argument
//! 4. user-defined functions in the symbol table, by stable id
//! 5. otherwise: diagnostic + zero constant

use crate::bound::{BoundExpr, Builtin};
use crate::diagnostics::{DiagnosticBag, DiagnosticCategory};
use crate::symbols::SymbolTable;
use crate::syntax::SyntaxNode;

// ---------------------------------------------------------------------------
// Bind result
// ---------------------------------------------------------------------------

/// The outcome of binding one expression.
#[derive(Debug, Clone)]
pub struct BoundResult {
    /// The bound tree. Always present: recovery substitutes constants.
    pub expression: BoundExpr,
    /// Diagnostics accumulated while binding.
    pub diagnostics: DiagnosticBag,
}

// ---------------------------------------------------------------------------
// Binder
// ---------------------------------------------------------------------------

/// Binds one expression against a symbol table and parameter list.
pub struct Binder<'a> {
    symbols: &'a SymbolTable,
    parameters: &'a [String],
    diagnostics: DiagnosticBag,
}

impl<'a> Binder<'a> {
    /// Create a binder for one function's body.
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, parameters: &'a [String]) -> Self {
        Self {
            symbols,
            parameters,
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Bind a syntax tree, consuming the binder.
    #[must_use]
    pub fn bind(mut self, node: &SyntaxNode) -> BoundResult {
        let expression = self.bind_expression(node);
        BoundResult {
            expression,
            diagnostics: self.diagnostics,
        }
    }

    fn bind_expression(&mut self, node: &SyntaxNode) -> BoundExpr {
        match node {
            SyntaxNode::Number(value) => BoundExpr::Constant(*value),
            SyntaxNode::Identifier(name) => self.bind_identifier(name),
            SyntaxNode::Unary { op, operand } => BoundExpr::Unary {
                op: *op,
                operand: Box::new(self.bind_expression(operand)),
            },
            SyntaxNode::Binary { left, op, right } => BoundExpr::Binary {
                left: Box::new(self.bind_expression(left)),
                op: *op,
                right: Box::new(self.bind_expression(right)),
            },
            SyntaxNode::Call { name, arguments } => self.bind_call(name, arguments),
            SyntaxNode::Conditional {
                condition,
                when_true,
                when_false,
            } => BoundExpr::Conditional {
                condition: Box::new(self.bind_expression(condition)),
                when_true: Box::new(self.bind_expression(when_true)),
                when_false: Box::new(self.bind_expression(when_false)),
            },
        }
    }

    fn bind_identifier(&mut self, name: &str) -> BoundExpr {
        if let Some(slot) = self
            .parameters
            .iter()
            .position(|p| p.eq_ignore_ascii_case(name))
        {
            return BoundExpr::Variable(slot);
        }
        if name.eq_ignore_ascii_case("pi") {
            return BoundExpr::Constant(std::f64::consts::PI);
        }
        if name.eq_ignore_ascii_case("e") {
            return BoundExpr::Constant(std::f64::consts::E);
        }
        self.diagnostics.add(
            DiagnosticCategory::Bind,
            format!("unknown identifier `{name}`"),
        );
        BoundExpr::Constant(0.0)
    }

    fn bind_call(&mut self, name: &str, arguments: &[SyntaxNode]) -> BoundExpr {
        if arguments.len() != 1 {
            self.diagnostics.add(
                DiagnosticCategory::Bind,
                format!("function `{name}` expects exactly one argument"),
            );
            return BoundExpr::Constant(0.0);
        }

        let argument = Box::new(self.bind_expression(&arguments[0]));

        if let Some(builtin) = Builtin::from_name(name) {
            return BoundExpr::BuiltinCall { builtin, argument };
        }

        if let Some(target) = self.symbols.get_id(name) {
            return BoundExpr::FunctionCall { target, argument };
        }

        self.diagnostics.add(
            DiagnosticCategory::Bind,
            format!("unknown function `{name}`"),
        );
        BoundExpr::Constant(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::symbols::FunctionId;

    fn bind_with(text: &str, symbols: &SymbolTable, parameters: &[String]) -> BoundResult {
        let input = Parser::new(text).parse_expression_input();
        Binder::new(symbols, parameters).bind(&input.body)
    }

    fn bind(text: &str) -> BoundResult {
        bind_with(text, &SymbolTable::new(), &["x".to_string()])
    }

    // -- identifiers --

    #[test]
    fn parameter_binds_to_slot() {
        let result = bind("x");
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.expression, BoundExpr::Variable(0));
    }

    #[test]
    fn second_parameter_binds_to_slot_one() {
        let params = vec!["u".to_string(), "v".to_string()];
        let result = bind_with("v", &SymbolTable::new(), &params);
        assert_eq!(result.expression, BoundExpr::Variable(1));
    }

    #[test]
    fn parameter_match_is_case_insensitive() {
        let result = bind("X");
        assert_eq!(result.expression, BoundExpr::Variable(0));
    }

    #[test]
    fn pi_and_e_fold_to_constants() {
        let result = bind("pi");
        assert_eq!(result.expression, BoundExpr::Constant(std::f64::consts::PI));
        let result = bind("E");
        assert_eq!(result.expression, BoundExpr::Constant(std::f64::consts::E));
    }

    #[test]
    fn unknown_identifier_emits_diagnostic_and_zero() {
        let result = bind("q + 1");
        assert_eq!(result.diagnostics.items().len(), 1);
        assert_eq!(
            result.diagnostics.items()[0].category,
            DiagnosticCategory::Bind
        );
        assert!(result.diagnostics.items()[0].message.contains('q'));
        // Binding still completed for the rest of the tree.
        assert!(matches!(result.expression, BoundExpr::Binary { .. }));
    }

    // -- calls --

    #[test]
    fn builtin_call_binds() {
        let result = bind("sin(x)");
        assert!(result.diagnostics.is_empty());
        assert_eq!(
            result.expression,
            BoundExpr::BuiltinCall {
                builtin: Builtin::Sin,
                argument: Box::new(BoundExpr::Variable(0)),
            }
        );
    }

    #[test]
    fn builtin_arity_mismatch_emits_diagnostic() {
        let result = bind("sin(x, 1)");
        assert_eq!(result.diagnostics.items().len(), 1);
        assert!(result.diagnostics.items()[0].message.contains("one argument"));
        assert_eq!(result.expression, BoundExpr::Constant(0.0));
    }

    #[test]
    fn user_function_call_binds_by_stable_id() {
        let mut symbols = SymbolTable::new();
        let id = FunctionId::new();
        symbols.set_name("g", id, false);
        let result = bind_with("g(x) + 1", &symbols, &["x".to_string()]);
        assert!(result.diagnostics.is_empty());
        let deps = result.expression.dependencies();
        assert!(deps.contains(&id));
    }

    #[test]
    fn unknown_function_emits_diagnostic_and_zero() {
        let result = bind("mystery(x)");
        assert_eq!(result.diagnostics.items().len(), 1);
        assert!(result.diagnostics.items()[0]
            .message
            .contains("unknown function"));
    }

    #[test]
    fn multiple_problems_accumulate() {
        let result = bind("q + mystery(x) + sin(1, 2)");
        assert_eq!(result.diagnostics.items().len(), 3);
    }
}
