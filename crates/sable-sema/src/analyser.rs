//! Name-resolution engine shared by the declaration and body passes.
//!
//! Resolution drives each declaration through its resolve state:
//! `NotDone` → `Running` → `Done`, with failures poisoning the declaration
//! instead of unwinding. Resolving a reference to a declaration that is
//! still `NotDone` recurses into it on demand, which is how forward
//! references inside a category work; finding it `Running` instead means
//! the reference closed a cycle and is reported, never followed.
//!
//! Poisoning is contagious only by reference: a declaration that refers to
//! a poisoned one is itself poisoned without a fresh diagnostic, so a
//! single failure surfaces exactly once no matter how many dependents it
//! has.

use sable_ast::{
    Decl, DeclCategory, DeclFlags, DeclKind, Expr, ExprKind, ResolveState, Signature, Stmt,
    StmtKind, TypeRef,
};
use sable_core::{Diagnostic, Diagnostics, ModuleId, SemaError, Span};
use sable_registry::{GlobalSymbol, ModuleRegistry};

use crate::context::SemaContext;

/// Type names that resolve without a declaration.
pub const BUILTIN_TYPES: &[&str] = &["void", "bool", "int", "uint", "float", "double", "str"];

/// Whether `name` is a built-in type.
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Categories whose declarations can stand in type position.
fn is_type_category(category: DeclCategory) -> bool {
    matches!(
        category,
        DeclCategory::Enums
            | DeclCategory::Types
            | DeclCategory::Generics
            | DeclCategory::GenericDefines
    )
}

/// One reference a declaration needs resolved.
enum WorkItem {
    /// A type-position reference.
    Type(TypeRef),
    /// A reference that must name a generic.
    Generic(TypeRef),
    /// An expression whose names must resolve.
    Expr(Expr),
}

pub(crate) struct Analyser<'a> {
    pub registry: &'a mut ModuleRegistry,
    pub diags: &'a mut Diagnostics,
}

impl<'a> Analyser<'a> {
    pub fn new(registry: &'a mut ModuleRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags }
    }

    fn file_of(&self, module: ModuleId, unit: usize) -> String {
        self.registry
            .module(module)
            .units
            .get(unit)
            .map(|u| u.file.clone())
            .unwrap_or_default()
    }

    /// Resolve the signature-level references of one declaration.
    ///
    /// Returns whether the declaration ended up `Done`. Already-analysed
    /// declarations return their recorded outcome without re-running.
    pub fn analyse_decl(
        &mut self,
        ctx: &mut SemaContext,
        module: ModuleId,
        unit: usize,
        category: DeclCategory,
        index: usize,
    ) -> bool {
        let state = match self.registry.module(module).units[unit].decl(category, index) {
            Some(decl) => decl.resolve,
            None => return true,
        };
        match state {
            ResolveState::Done => return true,
            ResolveState::Poisoned => return false,
            // The cycle is reported at the reference that closed it.
            ResolveState::Running => return false,
            ResolveState::NotDone => {}
        }

        let work = {
            let unit_ref = &mut self.registry.module_mut(module).units[unit];
            match unit_ref.decl_mut(category, index) {
                Some(decl) => {
                    decl.resolve = ResolveState::Running;
                    collect_work(decl)
                }
                None => return true,
            }
        };

        let mut ok = true;
        for item in work {
            ok = match item {
                WorkItem::Type(ty) => self.resolve_type_ref(module, unit, &ty),
                WorkItem::Generic(ty) => self.resolve_generic_ref(module, unit, &ty),
                WorkItem::Expr(expr) => self.resolve_expr(ctx, module, unit, &expr),
            };
            if !ok {
                break;
            }
        }

        if let Some(decl) = self.registry.module_mut(module).units[unit].decl_mut(category, index) {
            if ok {
                decl.resolve = ResolveState::Done;
            } else {
                decl.poison();
            }
        }
        ok
    }

    /// Resolve a type-position reference.
    pub fn resolve_type_ref(&mut self, module: ModuleId, unit: usize, ty: &TypeRef) -> bool {
        if is_builtin_type(&ty.name) {
            return true;
        }
        let Some((target_module, symbol)) = self.find_symbol(module, unit, &ty.name) else {
            self.report_unresolved(module, unit, "type", &ty.name, ty.span);
            return false;
        };
        if !is_type_category(symbol.category) {
            self.report_unresolved(module, unit, "type", &ty.name, ty.span);
            return false;
        }
        self.resolve_target(module, unit, target_module, symbol, &ty.name, ty.span)
    }

    /// Resolve a reference that must name a generic definition.
    fn resolve_generic_ref(&mut self, module: ModuleId, unit: usize, ty: &TypeRef) -> bool {
        let Some((target_module, symbol)) = self.find_symbol(module, unit, &ty.name) else {
            self.report_unresolved(module, unit, "generic", &ty.name, ty.span);
            return false;
        };
        if symbol.category != DeclCategory::Generics {
            self.report_unresolved(module, unit, "generic", &ty.name, ty.span);
            return false;
        }
        self.resolve_target(module, unit, target_module, symbol, &ty.name, ty.span)
    }

    /// Resolve the names inside an expression. Locals are consulted
    /// first, then the module scope and the unit's imports.
    pub fn resolve_expr(
        &mut self,
        ctx: &SemaContext,
        module: ModuleId,
        unit: usize,
        expr: &Expr,
    ) -> bool {
        match &expr.kind {
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Str(_) | ExprKind::Defined(_) => true,
            ExprKind::Ident(name) => {
                if ctx.lookup_local(name).is_some() {
                    return true;
                }
                let Some((target_module, symbol)) = self.find_symbol(module, unit, name) else {
                    self.report_unresolved(module, unit, "symbol", name, expr.span);
                    return false;
                };
                self.resolve_target(module, unit, target_module, symbol, name, expr.span)
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(ctx, module, unit, operand),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(ctx, module, unit, lhs) && self.resolve_expr(ctx, module, unit, rhs)
            }
            ExprKind::Call { name, args } => {
                let callee_ok = if ctx.lookup_local(name).is_some() {
                    true
                } else {
                    match self.find_symbol(module, unit, name) {
                        Some((target_module, symbol)) => {
                            self.resolve_target(module, unit, target_module, symbol, name, expr.span)
                        }
                        None => {
                            self.report_unresolved(module, unit, "function", name, expr.span);
                            false
                        }
                    }
                };
                if !callee_ok {
                    return false;
                }
                args.iter().all(|arg| self.resolve_expr(ctx, module, unit, arg))
            }
        }
    }

    /// Follow a found symbol to its declaration, recursing into analysis
    /// when it has not started and reporting a cycle when it is in
    /// flight. A poisoned target fails silently; its error is already on
    /// record.
    fn resolve_target(
        &mut self,
        module: ModuleId,
        unit: usize,
        target_module: ModuleId,
        symbol: GlobalSymbol,
        name: &str,
        span: Span,
    ) -> bool {
        let state = match self.registry.module(target_module).decl(&symbol) {
            Some(decl) => decl.resolve,
            None => return false,
        };
        match state {
            ResolveState::Done => true,
            ResolveState::Poisoned => false,
            ResolveState::Running => {
                let file = self.file_of(module, unit);
                let target_file = self.file_of(target_module, symbol.unit);
                self.diags.report(
                    Diagnostic::new(
                        SemaError::ResolutionCycle {
                            name: name.to_string(),
                            span,
                        },
                        file,
                    )
                    .with_note("the cycle closes on this declaration", target_file, symbol.span),
                );
                false
            }
            ResolveState::NotDone => {
                let mut sub = SemaContext::new(target_module, symbol.unit);
                self.analyse_decl(&mut sub, target_module, symbol.unit, symbol.category, symbol.index)
            }
        }
    }

    /// Find `name` in the module's global namespace, then in the target
    /// modules of the unit's resolved imports (declaration order, first
    /// hit wins). Private declarations are invisible through imports.
    pub fn find_symbol(
        &self,
        module: ModuleId,
        unit: usize,
        name: &str,
    ) -> Option<(ModuleId, GlobalSymbol)> {
        let owner = self.registry.module(module);
        if let Some(symbol) = owner.symbol(name) {
            return Some((module, *symbol));
        }
        for import in &owner.units.get(unit)?.imports {
            if import.is_poisoned() {
                continue;
            }
            let DeclKind::Import {
                resolved: Some(target),
                ..
            } = &import.kind
            else {
                continue;
            };
            let target = *target;
            let target_ref = self.registry.module(target);
            if let Some(symbol) = target_ref.symbol(name) {
                let visible = target_ref
                    .decl(symbol)
                    .is_some_and(|decl| !decl.flags.contains(DeclFlags::PRIVATE));
                if visible {
                    return Some((target, *symbol));
                }
            }
        }
        None
    }

    /// Analyse a function or method body.
    ///
    /// A missing body (extern signature) is trivially satisfied. A
    /// failure inside the body poisons the declaration and stops this
    /// body's analysis; siblings are unaffected.
    pub fn analyse_function_body(
        &mut self,
        ctx: &mut SemaContext,
        module: ModuleId,
        unit: usize,
        category: DeclCategory,
        index: usize,
    ) -> bool {
        let (params, body) = {
            let Some(decl) = self.registry.module_mut(module).units[unit].decl_mut(category, index)
            else {
                return true;
            };
            if decl.is_poisoned() {
                return false;
            }
            let params: Vec<(String, Span)> = match &decl.kind {
                DeclKind::Function { signature, .. } | DeclKind::Method { signature, .. } => {
                    signature.params.iter().map(|p| (p.name.clone(), p.span)).collect()
                }
                _ => return true,
            };
            let body = match &mut decl.kind {
                DeclKind::Function { body, .. } | DeclKind::Method { body, .. } => body.take(),
                _ => None,
            };
            (params, body)
        };
        let Some(stmts) = body else {
            return true;
        };

        ctx.push_scope();
        let mut ok = true;
        for (name, span) in params {
            if let Err(previous) = ctx.declare_local(name.clone(), span) {
                let file = self.file_of(module, unit);
                self.diags.report(
                    Diagnostic::new(
                        SemaError::DuplicateDeclaration {
                            kind: "parameter",
                            name,
                            span,
                        },
                        file.clone(),
                    )
                    .with_note("previously declared here", file, previous),
                );
                ok = false;
                break;
            }
        }
        if ok {
            ok = self.analyse_block(ctx, module, unit, &stmts);
        }
        ctx.pop_scope();

        if let Some(decl) = self.registry.module_mut(module).units[unit].decl_mut(category, index) {
            match &mut decl.kind {
                DeclKind::Function { body, .. } | DeclKind::Method { body, .. } => {
                    *body = Some(stmts);
                }
                _ => {}
            }
            if !ok {
                decl.poison();
            }
        }
        ok
    }

    fn analyse_block(
        &mut self,
        ctx: &mut SemaContext,
        module: ModuleId,
        unit: usize,
        stmts: &[Stmt],
    ) -> bool {
        for stmt in stmts {
            let ok = match &stmt.kind {
                StmtKind::Block(inner) => {
                    ctx.push_scope();
                    let ok = self.analyse_block(ctx, module, unit, inner);
                    ctx.pop_scope();
                    ok
                }
                StmtKind::Local { name, ty, init } => {
                    let mut ok = match ty {
                        Some(ty) => self.resolve_type_ref(module, unit, ty),
                        None => true,
                    };
                    if ok {
                        if let Some(init) = init {
                            ok = self.resolve_expr(ctx, module, unit, init);
                        }
                    }
                    if ok {
                        if let Err(previous) = ctx.declare_local(name.clone(), stmt.span) {
                            let file = self.file_of(module, unit);
                            self.diags.report(
                                Diagnostic::new(
                                    SemaError::DuplicateDeclaration {
                                        kind: "local",
                                        name: name.clone(),
                                        span: stmt.span,
                                    },
                                    file.clone(),
                                )
                                .with_note("previously declared here", file, previous),
                            );
                            ok = false;
                        }
                    }
                    ok
                }
                StmtKind::Expr(expr) => self.resolve_expr(ctx, module, unit, expr),
                StmtKind::Return(value) => match value {
                    Some(expr) => self.resolve_expr(ctx, module, unit, expr),
                    None => true,
                },
                StmtKind::If {
                    cond,
                    then_block,
                    else_block,
                } => {
                    let mut ok = self.resolve_expr(ctx, module, unit, cond);
                    if ok {
                        ctx.push_scope();
                        ok = self.analyse_block(ctx, module, unit, then_block);
                        ctx.pop_scope();
                    }
                    if ok {
                        if let Some(else_block) = else_block {
                            ctx.push_scope();
                            ok = self.analyse_block(ctx, module, unit, else_block);
                            ctx.pop_scope();
                        }
                    }
                    ok
                }
                StmtKind::While { cond, body } => {
                    let mut ok = self.resolve_expr(ctx, module, unit, cond);
                    if ok {
                        ctx.push_scope();
                        ok = self.analyse_block(ctx, module, unit, body);
                        ctx.pop_scope();
                    }
                    ok
                }
            };
            if !ok {
                return false;
            }
        }
        true
    }

    fn report_unresolved(
        &mut self,
        module: ModuleId,
        unit: usize,
        kind: &'static str,
        name: &str,
        span: Span,
    ) {
        let file = self.file_of(module, unit);
        self.diags.report(Diagnostic::new(
            SemaError::UnresolvedReference {
                kind,
                name: name.to_string(),
                span,
            },
            file,
        ));
    }
}

/// Gather the references a declaration's signature level needs resolved.
fn collect_work(decl: &Decl) -> Vec<WorkItem> {
    let mut work = Vec::new();
    match &decl.kind {
        DeclKind::Enum { variants } => {
            for variant in variants {
                if let Some(value) = &variant.value {
                    work.push(WorkItem::Expr(value.clone()));
                }
            }
        }
        DeclKind::Type { fields } => {
            for field in fields {
                work.push(WorkItem::Type(field.ty.clone()));
            }
        }
        DeclKind::Macro { signature } => push_signature(&mut work, signature, &[]),
        DeclKind::Generic {
            type_params,
            signature,
        } => push_signature(&mut work, signature, type_params),
        DeclKind::Method {
            receiver, signature, ..
        }
        | DeclKind::MacroMethod { receiver, signature } => {
            work.push(WorkItem::Type(receiver.clone()));
            push_signature(&mut work, signature, &[]);
        }
        DeclKind::Var { ty, init } => {
            if let Some(ty) = ty {
                work.push(WorkItem::Type(ty.clone()));
            }
            if let Some(init) = init {
                work.push(WorkItem::Expr(init.clone()));
            }
        }
        DeclKind::Function { signature, .. } => push_signature(&mut work, signature, &[]),
        DeclKind::GenericDefine { target, args } => {
            work.push(WorkItem::Generic(target.clone()));
            for arg in args {
                work.push(WorkItem::Type(arg.clone()));
            }
        }
        // Imports resolve in their own pass; conditional chains and
        // assertions are consumed before declaration analysis.
        DeclKind::Import { .. } | DeclKind::CtIf { .. } | DeclKind::CtAssert { .. } => {}
    }
    work
}

/// Queue a signature's type references, skipping names bound by the
/// declaration's own type parameters.
fn push_signature(work: &mut Vec<WorkItem>, signature: &Signature, type_params: &[String]) {
    for param in &signature.params {
        if !type_params.contains(&param.ty.name) {
            work.push(WorkItem::Type(param.ty.clone()));
        }
    }
    if let Some(ret) = &signature.ret {
        if !type_params.contains(&ret.name) {
            work.push(WorkItem::Type(ret.clone()));
        }
    }
}
