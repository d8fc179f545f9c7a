//! Import resolution.
//!
//! Binds every import in every unit of a module to its target module.
//! Failures poison the individual import and the sweep continues, so one
//! run reports every bad import in the module.

use sable_ast::{DeclKind, ResolveState};
use sable_core::{Diagnostic, Diagnostics, ModuleId, SemaError};
use sable_registry::ModuleRegistry;
use tracing::debug;

/// Pass 1: bind each unit's imports to concrete modules.
pub struct ImportPass<'a> {
    registry: &'a mut ModuleRegistry,
    diags: &'a mut Diagnostics,
}

impl<'a> ImportPass<'a> {
    /// Create the pass over `registry`, reporting into `diags`.
    pub fn new(registry: &'a mut ModuleRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags }
    }

    /// Resolve all imports of `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: resolving imports");

        let mut processed = 0usize;
        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let file = self.registry.module(module).units[unit_idx].file.clone();
            let import_count = self.registry.module(module).units[unit_idx].imports.len();
            for i in 0..import_count {
                processed += 1;
                self.resolve_import(module, unit_idx, i, &file);
            }
        }

        debug!(
            module = %module_path,
            imports = processed,
            errors = self.diags.error_count(),
            "pass finished",
        );
    }

    fn resolve_import(&mut self, module: ModuleId, unit_idx: usize, i: usize, file: &str) {
        let (path, private_import, span) = {
            let import = &self.registry.module(module).units[unit_idx].imports[i];
            debug_assert_eq!(import.resolve, ResolveState::NotDone);
            match &import.kind {
                DeclKind::Import {
                    path,
                    private_import,
                    ..
                } => (path.clone(), *private_import, import.span),
                _ => return,
            }
        };
        self.registry.module_mut(module).units[unit_idx].imports[i].resolve =
            ResolveState::Running;

        // Find the target module.
        let Some(target) = self.registry.find(&path) else {
            self.diags.report(Diagnostic::new(
                SemaError::UnresolvedReference {
                    kind: "module",
                    name: path,
                    span,
                },
                file,
            ));
            self.registry.module_mut(module).units[unit_idx].imports[i].poison();
            return;
        };

        // Importing the current module is not allowed.
        if target == module {
            self.diags.report(Diagnostic::new(
                SemaError::IllegalSelfReference { span },
                file,
            ));
            self.registry.module_mut(module).units[unit_idx].imports[i].poison();
            return;
        }

        // Private modules require the private-import qualifier.
        if self.registry.module(target).is_private && !private_import {
            self.diags.report(Diagnostic::new(
                SemaError::VisibilityViolation { name: path, span },
                file,
            ));
            self.registry.module_mut(module).units[unit_idx].imports[i].poison();
            return;
        }

        // Bind the module.
        {
            let import = &mut self.registry.module_mut(module).units[unit_idx].imports[i];
            if let DeclKind::Import { resolved, .. } = &mut import.kind {
                *resolved = Some(target);
            }
            import.resolve = ResolveState::Done;
        }

        // The same module may have been imported earlier in this unit.
        // The first occurrence wins; this one is flagged against it and
        // the scan stops, one diagnostic per duplicate.
        let original = {
            let unit = &self.registry.module(module).units[unit_idx];
            (0..i).find_map(|j| {
                let earlier = &unit.imports[j];
                match &earlier.kind {
                    DeclKind::Import {
                        resolved: Some(prev),
                        ..
                    } if *prev == target => Some(earlier.span),
                    _ => None,
                }
            })
        };
        if let Some(original_span) = original {
            self.diags.report(
                Diagnostic::new(
                    SemaError::DuplicateDeclaration {
                        kind: "import",
                        name: path,
                        span,
                    },
                    file,
                )
                .with_note("previous import was here", file, original_span),
            );
            self.registry.module_mut(module).units[unit_idx].imports[i].poison();
        }
    }
}
