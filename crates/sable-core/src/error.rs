//! Error taxonomy for semantic analysis.
//!
//! Every failure the sema passes can report is one of the variants below.
//! All of them are *local*: a failure poisons the offending declaration and
//! the pass carries on with its siblings. Nothing here unwinds a pass; the
//! driver decides whether to stop by inspecting the aggregate
//! [`Diagnostics`](crate::Diagnostics) count.

use thiserror::Error;

use crate::Span;

/// A semantic-analysis error, anchored at the offending declaration.
///
/// The span names where the *primary* message points; errors that also
/// reference an earlier declaration (duplicates, cycles) carry that second
/// anchor as a [`Note`](crate::Note) on the surrounding diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemaError {
    /// A module or symbol lookup found nothing.
    #[error("no {kind} named '{name}' could be found")]
    UnresolvedReference {
        /// What was looked up: "module", "type", "generic", "symbol".
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
        /// Where the reference occurred.
        span: Span,
    },

    /// A module imported itself.
    #[error("importing the current module is not allowed")]
    IllegalSelfReference {
        /// Where the self-import occurred.
        span: Span,
    },

    /// A private module was imported without the private-import qualifier.
    #[error("module '{name}' is private and may only be used through a private import")]
    VisibilityViolation {
        /// The private module's dotted path.
        name: String,
        /// Where the import occurred.
        span: Span,
    },

    /// The same import or symbol was declared more than once.
    #[error("duplicate {kind} '{name}'")]
    DuplicateDeclaration {
        /// What was duplicated: "import", "symbol", "local".
        kind: &'static str,
        /// The duplicated name.
        name: String,
        /// Where the *later* occurrence is.
        span: Span,
    },

    /// A declaration was re-entered while its resolution was in flight.
    #[error("circular reference while resolving '{name}'")]
    ResolutionCycle {
        /// The declaration that closed the cycle.
        name: String,
        /// Where the cyclic reference occurred.
        span: Span,
    },

    /// A compile-time condition was not a valid compile-time boolean.
    #[error("invalid compile-time expression: {detail}")]
    CompileTimeEvaluationError {
        /// What the evaluator objected to.
        detail: String,
        /// Where the expression is.
        span: Span,
    },

    /// A compile-time assertion evaluated to false.
    #[error("static assertion failed: {message}")]
    AssertionFailed {
        /// The user-supplied message, or a generic description.
        message: String,
        /// Where the assertion is.
        span: Span,
    },
}

impl SemaError {
    /// Get the span this error anchors at.
    pub fn span(&self) -> Span {
        match self {
            SemaError::UnresolvedReference { span, .. } => *span,
            SemaError::IllegalSelfReference { span } => *span,
            SemaError::VisibilityViolation { span, .. } => *span,
            SemaError::DuplicateDeclaration { span, .. } => *span,
            SemaError::ResolutionCycle { span, .. } => *span,
            SemaError::CompileTimeEvaluationError { span, .. } => *span,
            SemaError::AssertionFailed { span, .. } => *span,
        }
    }
}
