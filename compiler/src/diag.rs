// diag.rs — Typed diagnostics and the error reporter
//
// Provides the shared diagnostic types used by the scope filler and the
// analyzer, and the `Reporter` they accumulate into.
//
// The reporter is capacity-limited: once it holds too many diagnostics,
// reporting returns the distinguished `Fatal` condition instead of
// accumulating further. Handlers propagate `Fatal` with `?`; the top-level
// analysis entry point converts it into a clean failure.
//
// Preconditions: none (types only).
// Postconditions: diagnostics are kept in report order.
// Failure modes: `Fatal` on capacity exhaustion.
// Side effects: none.

use std::fmt;

use thiserror::Error;

use crate::ast::Span;

/// Default number of diagnostics a reporter accepts before going fatal.
pub const DEFAULT_CAPACITY: usize = 256;

// ── Diagnostic ───────────────────────────────────────────────────────────

/// Classification of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Type mismatches, call arity mismatches, invalid literals,
    /// version-gated instruction guards.
    Type,
    /// Unresolved names, use before declaration, duplicate switch cases,
    /// unbalanced blocks, variable/value count mismatches.
    Declaration,
    /// Low-level jump instructions in strict assembly.
    Syntax,
    /// Anything else (currently only capacity exhaustion).
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Type => "TypeError",
            ErrorKind::Declaration => "DeclarationError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Other => "Error",
        };
        write!(f, "{}", name)
    }
}

/// A single diagnostic at a source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({:?})", self.kind, self.message, self.span)
    }
}

// ── Fatal condition ──────────────────────────────────────────────────────

/// Raised when the reporter is over capacity. The analyzer aborts the walk
/// and reports overall failure; no diagnostic past the marker is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("diagnostic capacity exhausted")]
pub struct Fatal;

// ── Reporter ─────────────────────────────────────────────────────────────

/// Collects diagnostics in report order, up to a fixed capacity.
#[derive(Debug)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    capacity: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A reporter that goes fatal after `capacity` diagnostics.
    pub fn with_capacity(capacity: usize) -> Self {
        Reporter {
            diagnostics: Vec::new(),
            capacity,
        }
    }

    /// Record a diagnostic. At capacity, records a final marker diagnostic
    /// and returns `Fatal` instead.
    pub fn error(&mut self, kind: ErrorKind, span: Span, message: String) -> Result<(), Fatal> {
        if self.diagnostics.len() >= self.capacity {
            self.diagnostics.push(Diagnostic {
                kind: ErrorKind::Other,
                span,
                message: format!("There are more than {} errors. Aborting.", self.capacity),
            });
            return Err(Fatal);
        }
        self.diagnostics.push(Diagnostic {
            kind,
            span,
            message,
        });
        Ok(())
    }

    pub fn type_error(&mut self, span: Span, message: String) -> Result<(), Fatal> {
        self.error(ErrorKind::Type, span, message)
    }

    pub fn declaration_error(&mut self, span: Span, message: String) -> Result<(), Fatal> {
        self.error(ErrorKind::Declaration, span, message)
    }

    pub fn syntax_error(&mut self, span: Span, message: String) -> Result<(), Fatal> {
        self.error(ErrorKind::Syntax, span, message)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
