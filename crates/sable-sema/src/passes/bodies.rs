//! Function-body analysis.
//!
//! The final pass. It runs only after declaration analysis has finished
//! for every module, so a body may call any function declared anywhere in
//! the program regardless of declaration or module order. Signatures
//! without bodies are trivially satisfied.

use sable_ast::DeclCategory;
use sable_core::{Diagnostics, ModuleId};
use sable_registry::ModuleRegistry;
use tracing::debug;

use crate::analyser::Analyser;
use crate::context::SemaContext;

/// The order bodies are analysed in within a unit.
const BODY_ORDER: [DeclCategory; 3] = [
    DeclCategory::Methods,
    DeclCategory::Functions,
    DeclCategory::Main,
];

/// Pass 6: analyse method, function, and `main` bodies.
pub struct FunctionPass<'a> {
    registry: &'a mut ModuleRegistry,
    diags: &'a mut Diagnostics,
}

impl<'a> FunctionPass<'a> {
    /// Create the pass over `registry`, reporting into `diags`.
    pub fn new(registry: &'a mut ModuleRegistry, diags: &'a mut Diagnostics) -> Self {
        Self { registry, diags }
    }

    /// Analyse every body in `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: analysing function bodies");

        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let mut ctx = SemaContext::new(module, unit_idx);
            for category in BODY_ORDER {
                let count = self.registry.module(module).units[unit_idx]
                    .category(category)
                    .len();
                for index in 0..count {
                    Analyser::new(&mut *self.registry, &mut *self.diags)
                        .analyse_function_body(&mut ctx, module, unit_idx, category, index);
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
