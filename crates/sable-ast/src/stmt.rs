//! Statement nodes for function bodies.

use sable_core::Span;

use crate::decl::TypeRef;
use crate::expr::Expr;

/// A statement with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// What the statement is.
    pub kind: StmtKind,
    /// Where it starts.
    pub span: Span,
}

/// Statement payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A nested block, opening a new lexical scope.
    Block(Vec<Stmt>),
    /// A local variable declaration.
    Local {
        /// Variable name.
        name: String,
        /// Declared type, if annotated.
        ty: Option<TypeRef>,
        /// Initializer, if present.
        init: Option<Expr>,
    },
    /// An expression statement.
    Expr(Expr),
    /// A return, with an optional value.
    Return(Option<Expr>),
    /// A conditional; each arm opens its own scope.
    If {
        /// The condition.
        cond: Expr,
        /// Statements of the then-arm.
        then_block: Vec<Stmt>,
        /// Statements of the else-arm, if present.
        else_block: Option<Vec<Stmt>>,
    },
    /// A while loop; the body opens its own scope.
    While {
        /// The condition.
        cond: Expr,
        /// Loop body statements.
        body: Vec<Stmt>,
    },
}

impl Stmt {
    /// A local declaration.
    pub fn local(name: impl Into<String>, ty: Option<TypeRef>, init: Option<Expr>, span: Span) -> Self {
        Self {
            kind: StmtKind::Local {
                name: name.into(),
                ty,
                init,
            },
            span,
        }
    }

    /// An expression statement.
    pub fn expr(expr: Expr, span: Span) -> Self {
        Self {
            kind: StmtKind::Expr(expr),
            span,
        }
    }

    /// A return statement.
    pub fn ret(value: Option<Expr>, span: Span) -> Self {
        Self {
            kind: StmtKind::Return(value),
            span,
        }
    }
}
