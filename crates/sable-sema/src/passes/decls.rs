//! Declaration analysis.
//!
//! Resolves the type/signature level of every declaration category in a
//! fixed order: enums and types before the macros, generics, and methods
//! that may name them; vars and functions after everything their declared
//! types could reference; `main` and generic defines last. Bodies are not
//! entered here; that is what lets the later body pass forward-call
//! anything.

use sable_ast::DeclCategory;
use sable_core::{Diagnostics, ModuleId};
use sable_registry::ModuleRegistry;
use tracing::debug;

use crate::analyser::Analyser;
use crate::context::SemaContext;

/// Pass 5: resolve declaration signatures, category by category.
pub struct DeclPass<'a> {
    registry: &'a mut ModuleRegistry,
    diags: &'a mut Diagnostics,
}

impl<'a> DeclPass<'a> {
    /// Create the pass over `registry`, reporting into `diags`.
    pub fn new(registry: &'a mut ModuleRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags }
    }

    /// Analyse every declaration of every unit in `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: analysing declarations");

        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let mut ctx = SemaContext::new(module, unit_idx);
            for category in DeclCategory::ANALYSIS_ORDER {
                let count = self.registry.module(module).units[unit_idx]
                    .category(category)
                    .len();
                for index in 0..count {
                    // Each declaration stands alone: a failure poisons it
                    // and the sweep moves to the next sibling.
                    Analyser::new(&mut *self.registry, &mut *self.diags)
                        .analyse_decl(&mut ctx, module, unit_idx, category, index);
                }
            }
        }

        debug!(
            module = %module_path,
            errors = self.diags.error_count(),
            "pass finished",
        );
    }
}
