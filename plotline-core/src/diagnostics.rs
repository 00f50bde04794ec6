//! Diagnostics attached to functions during an evaluation pass.
//!
//! Diagnostics are plain data, not errors: malformed input never aborts a
//! pass. Each function's list is cleared and fully rebuilt on every pass,
//! so diagnostics never accumulate across passes.

use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    /// Malformed syntax, recovered locally by substituting a default node.
    Parse,
    /// Unknown identifier/function, arity mismatch, or cyclic dependency.
    Bind,
    /// Wrong parameter count for the current plot mode.
    Domain,
    /// No drawable points produced in the current viewport.
    Overflow,
    /// A superseded or timed-out request.
    Timeout,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Bind => write!(f, "bind"),
            Self::Domain => write!(f, "domain"),
            Self::Overflow => write!(f, "overflow"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A single message attached to a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What kind of problem this is.
    pub category: DiagnosticCategory,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

// ---------------------------------------------------------------------------
// Diagnostic bag
// ---------------------------------------------------------------------------

/// An append-only collection of diagnostics for one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Create an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a diagnostic.
    pub fn add(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.items.push(Diagnostic::new(category, message));
    }

    /// Append all diagnostics from another bag.
    pub fn extend(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    /// The collected diagnostics.
    #[must_use]
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move the diagnostics out of the bag.
    #[must_use]
    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
