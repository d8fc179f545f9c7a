//! Post-parse data model for the Sable front end.
//!
//! The parser produces these trees; semantic analysis resolves them in
//! place. Declarations carry their own [`ResolveState`] so the passes can
//! detect re-entrant resolution and poison failures without unwinding.
//!
//! - [`expr`]: expressions (also the compile-time condition subset)
//! - [`stmt`]: function-body statements
//! - [`decl`]: declarations and declaration kinds
//! - [`unit`]: one source file's worth of declarations

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod unit;

pub use decl::{
    CtBranch, Decl, DeclFlags, DeclKind, EnumVariant, Field, Param, ResolveState, Signature,
    TypeRef,
};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use stmt::{Stmt, StmtKind};
pub use unit::{CompilationUnit, DeclCategory};
