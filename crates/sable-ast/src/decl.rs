//! Declaration nodes.
//!
//! A [`Decl`] is the unit of resolution: the sema passes drive each one
//! through [`ResolveState`], and a failure poisons the declaration instead
//! of unwinding the pass. The kind tag distinguishes every top-level
//! construct the parser can produce, including the compile-time
//! conditional chains and assertions that are expanded before declaration
//! analysis begins.

use bitflags::bitflags;
use sable_core::{ModuleId, Span};

use crate::expr::Expr;
use crate::stmt::Stmt;

bitflags! {
    /// Declaration modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeclFlags: u8 {
        /// Not visible to importing modules.
        const PRIVATE = 1 << 0;
        /// Signature only; the body lives elsewhere.
        const EXTERN = 1 << 1;
    }
}

/// A reference to a named type, resolved during declaration analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// The referenced type name.
    pub name: String,
    /// Where the reference occurs.
    pub span: Span,
}

impl TypeRef {
    /// Create a type reference.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A parameter in a callable signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
    /// Where the parameter is declared.
    pub span: Span,
}

/// A callable signature: parameters plus an optional return type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    /// Parameters in declaration order.
    pub params: Vec<Param>,
    /// Return type; `None` means no value is returned.
    pub ret: Option<TypeRef>,
}

/// One variant of an enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Explicit value, if given.
    pub value: Option<Expr>,
    /// Where the variant is declared.
    pub span: Span,
}

/// One field of a type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeRef,
    /// Where the field is declared.
    pub span: Span,
}

/// A non-leading branch of a compile-time conditional chain.
///
/// The chain is an ordered branch list with an explicit else sentinel;
/// evaluation walks it with early exit, so at most one branch ever files
/// its declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum CtBranch {
    /// `$elif cond { decls }`
    Elif {
        /// The branch condition.
        cond: Expr,
        /// Declarations filed if the condition holds.
        decls: Vec<Decl>,
        /// Where the branch starts.
        span: Span,
    },
    /// `$else { decls }`: terminal, files unconditionally when reached.
    Else {
        /// Declarations filed when reached.
        decls: Vec<Decl>,
        /// Where the branch starts.
        span: Span,
    },
}

/// Lifecycle of a declaration's resolution.
///
/// Transitions are monotonic: `NotDone` → `Running` → `Done`, with
/// `Poisoned` reachable from anywhere and terminal. Observing `Running`
/// from another in-flight resolution is a cycle and must fail, never
/// recurse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveState {
    /// Analysis has not started.
    #[default]
    NotDone,
    /// Analysis is in flight.
    Running,
    /// Analysis completed successfully.
    Done,
    /// Analysis failed; the error is already reported. Dependents skip
    /// this declaration without further diagnostics.
    Poisoned,
}

/// Declaration payload, one variant per declarable construct.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// `import path` / `import path private`
    Import {
        /// Dotted module path.
        path: String,
        /// Whether the private-import qualifier was used.
        private_import: bool,
        /// Target module, bound by import resolution.
        resolved: Option<ModuleId>,
    },
    /// An enum type.
    Enum {
        /// Variants in declaration order.
        variants: Vec<EnumVariant>,
    },
    /// A named record type.
    Type {
        /// Fields in declaration order.
        fields: Vec<Field>,
    },
    /// A macro definition.
    Macro {
        /// The macro's signature.
        signature: Signature,
    },
    /// A generic definition, parameterized over type names.
    Generic {
        /// Type parameter names; references to these are not resolved
        /// against the module scope.
        type_params: Vec<String>,
        /// The parameterized signature.
        signature: Signature,
    },
    /// A method attached to a receiver type.
    Method {
        /// The receiver type.
        receiver: TypeRef,
        /// The method signature.
        signature: Signature,
        /// Body statements; `None` for extern signatures.
        body: Option<Vec<Stmt>>,
    },
    /// A macro attached to a receiver type.
    MacroMethod {
        /// The receiver type.
        receiver: TypeRef,
        /// The macro signature.
        signature: Signature,
    },
    /// A module-level variable.
    Var {
        /// Declared type, if annotated.
        ty: Option<TypeRef>,
        /// Initializer, if present.
        init: Option<Expr>,
    },
    /// A function.
    Function {
        /// The function signature.
        signature: Signature,
        /// Body statements; `None` for extern signatures.
        body: Option<Vec<Stmt>>,
    },
    /// A top-level `$if` chain; the winning branch's declarations are
    /// spliced into the owning unit during conditional expansion.
    CtIf {
        /// The leading condition.
        cond: Expr,
        /// Declarations filed if the condition holds.
        then_decls: Vec<Decl>,
        /// Trailing `$elif`/`$else` branches in order.
        rest: Vec<CtBranch>,
    },
    /// A top-level `$assert`.
    CtAssert {
        /// The asserted condition.
        cond: Expr,
        /// Optional user message for the failure diagnostic.
        message: Option<String>,
    },
    /// An instantiation alias for a generic.
    GenericDefine {
        /// The generic being instantiated.
        target: TypeRef,
        /// Type arguments.
        args: Vec<TypeRef>,
    },
}

/// A named declaration subject to resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    /// Declared name. Imports use their dotted path here.
    pub name: String,
    /// Where the declaration starts.
    pub span: Span,
    /// Modifier flags.
    pub flags: DeclFlags,
    /// Resolution lifecycle state.
    pub resolve: ResolveState,
    /// The declaration payload.
    pub kind: DeclKind,
}

impl Decl {
    /// Create a declaration in the [`ResolveState::NotDone`] state.
    pub fn new(name: impl Into<String>, span: Span, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            span,
            flags: DeclFlags::default(),
            resolve: ResolveState::NotDone,
            kind,
        }
    }

    /// Set modifier flags, builder-style.
    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Create an import declaration for `path`.
    pub fn import(path: impl Into<String>, private_import: bool, span: Span) -> Self {
        let path = path.into();
        Self::new(
            path.clone(),
            span,
            DeclKind::Import {
                path,
                private_import,
                resolved: None,
            },
        )
    }

    /// Mark this declaration permanently unresolved. Idempotent; valid
    /// from any state.
    pub fn poison(&mut self) {
        self.resolve = ResolveState::Poisoned;
    }

    /// Whether this declaration has been poisoned.
    pub fn is_poisoned(&self) -> bool {
        self.resolve == ResolveState::Poisoned
    }

    /// Whether this declaration resolved successfully.
    pub fn is_done(&self) -> bool {
        self.resolve == ResolveState::Done
    }
}
