//! Global registration.
//!
//! Files each unit's parsed top-level declarations into the per-category
//! collections and the module symbol table. The transient `global_decls`
//! buffer is drained here and reused as the landing zone for declarations
//! injected by conditional expansion, which routes through the same
//! filing routine.

use sable_ast::{Decl, DeclCategory, DeclKind};
use sable_core::{Diagnostic, Diagnostics, ModuleId, SemaError};
use sable_registry::{GlobalSymbol, Module, ModuleRegistry};
use tracing::debug;

/// Pass 2: register every unit's globals with the owning module.
pub struct RegisterGlobalsPass<'a> {
    registry: &'a mut ModuleRegistry,
    diags: &'a mut Diagnostics,
}

impl<'a> RegisterGlobalsPass<'a> {
    /// Create the pass over `registry`, reporting into `diags`.
    pub fn new(registry: &'a mut ModuleRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags }
    }

    /// Register the globals of every unit in `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: registering globals");

        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let owner = self.registry.module_mut(module);
            owner.units[unit_idx].module = Some(module);
            let decls = std::mem::take(&mut owner.units[unit_idx].global_decls);
            for decl in decls {
                register_global_decl(owner, unit_idx, decl, self.diags);
            }
        }

        debug!(
            module = %module_path,
            errors = self.diags.error_count(),
            "pass finished",
        );
    }
}

/// File one declaration into its category list and the module symbol
/// table. Duplicate names keep the first registration and poison the
/// newcomer.
pub(crate) fn register_global_decl(
    module: &mut Module,
    unit_idx: usize,
    mut decl: Decl,
    diags: &mut Diagnostics,
) {
    let category = match &decl.kind {
        DeclKind::Enum { .. } => DeclCategory::Enums,
        DeclKind::Type { .. } => DeclCategory::Types,
        DeclKind::Macro { .. } => DeclCategory::Macros,
        DeclKind::Generic { .. } => DeclCategory::Generics,
        DeclKind::Method { .. } => DeclCategory::Methods,
        DeclKind::MacroMethod { .. } => DeclCategory::MacroMethods,
        DeclKind::Var { .. } => DeclCategory::Vars,
        DeclKind::Function { .. } if decl.name == "main" => DeclCategory::Main,
        DeclKind::Function { .. } => DeclCategory::Functions,
        DeclKind::GenericDefine { .. } => DeclCategory::GenericDefines,
        // Conditional branches may splice these back in; they belong to
        // their dedicated lists, not the symbol namespace.
        DeclKind::Import { .. } => {
            module.units[unit_idx].imports.push(decl);
            return;
        }
        DeclKind::CtIf { .. } => {
            module.units[unit_idx].ct_ifs.push(decl);
            return;
        }
        DeclKind::CtAssert { .. } => {
            module.units[unit_idx].ct_asserts.push(decl);
            return;
        }
    };

    // Methods live under their receiver's name.
    let key = match &decl.kind {
        DeclKind::Method { receiver, .. } | DeclKind::MacroMethod { receiver, .. } => {
            format!("{}.{}", receiver.name, decl.name)
        }
        _ => decl.name.clone(),
    };
    let span = decl.span;

    if let Some(existing) = module.symbols.get(&key).copied() {
        let file = module.units[unit_idx].file.clone();
        let original_file = module
            .units
            .get(existing.unit)
            .map(|u| u.file.clone())
            .unwrap_or_default();
        diags.report(
            Diagnostic::new(
                SemaError::DuplicateDeclaration {
                    kind: "symbol",
                    name: key,
                    span,
                },
                file,
            )
            .with_note("previously declared here", original_file, existing.span),
        );
        decl.poison();
        // Still filed so later passes can skip it; the symbol entry
        // keeps pointing at the original.
        module.units[unit_idx].file_decl(category, decl);
        return;
    }

    let (category, index) = module.units[unit_idx].file_decl(category, decl);
    module.symbols.insert(
        key,
        GlobalSymbol {
            unit: unit_idx,
            category,
            index,
            span,
        },
    );
}
