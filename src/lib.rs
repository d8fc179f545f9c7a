//! Sable: a compiled, module-structured language front end.
//!
//! This facade crate re-exports the pieces of the workspace:
//!
//! - [`sable_core`]: spans, the error taxonomy, the diagnostics sink
//! - [`sable_ast`]: the post-parse declaration trees
//! - [`sable_registry`]: the module registry arena
//! - [`sable_sema`]: the multi-pass semantic analyser
//!
//! The typical embedding parses sources into a [`ModuleRegistry`], runs
//! [`analyse`], and hands the resolved declaration graph to code
//! generation when the returned [`Diagnostics`] sink is empty.

pub use sable_ast as ast;
pub use sable_core as core;
pub use sable_registry as registry;
pub use sable_sema as sema;

pub use sable_core::{Diagnostic, Diagnostics, ModuleId, Note, SemaError, Span};
pub use sable_registry::{Module, ModulePath, ModuleRegistry};
pub use sable_sema::{BuildEnv, ConstValue, analyse};

/// Commonly used items for building and analysing a program.
pub mod prelude {
    pub use sable_ast::{
        CompilationUnit, CtBranch, Decl, DeclCategory, DeclFlags, DeclKind, EnumVariant, Expr,
        Field, Param, ResolveState, Signature, Stmt, TypeRef,
    };
    pub use sable_core::{Diagnostics, ModuleId, SemaError, Span};
    pub use sable_registry::{Module, ModuleRegistry};
    pub use sable_sema::{BuildEnv, ConstValue, SemaContext, analyse};
}
