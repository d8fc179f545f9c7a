//! Compile-time assertion checking.
//!
//! Runs after conditional expansion so assertions observe the final
//! declaration set, and before declaration analysis so impossible
//! configurations are rejected before deeper work is spent on them.

use sable_ast::{DeclKind, ResolveState};
use sable_core::{Diagnostic, Diagnostics, ModuleId, SemaError};
use sable_registry::ModuleRegistry;
use tracing::debug;

use crate::context::SemaContext;
use crate::env::BuildEnv;
use crate::eval;

/// Pass 4: check every unit's `$assert` declarations.
pub struct CtAssertPass<'a> {
    registry: &'a mut ModuleRegistry,
    env: &'a BuildEnv,
    diags: &'a mut Diagnostics,
}

impl<'a> CtAssertPass<'a> {
    /// Create the pass over `registry`, evaluating against `env`.
    pub fn new(
        registry: &'a mut ModuleRegistry,
        env: &'a BuildEnv,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self {
            registry,
            env,
            diags,
        }
    }

    /// Check the assertions of every unit in `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: checking $assert declarations");

        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let ctx = SemaContext::new(module, unit_idx);
            let count = self.registry.module(module).units[unit_idx].ct_asserts.len();
            for i in 0..count {
                self.check_assert(&ctx, i);
            }
        }

        debug!(
            module = %module_path,
            errors = self.diags.error_count(),
            "pass finished",
        );
    }

    fn check_assert(&mut self, ctx: &SemaContext, index: usize) {
        let module = ctx.module;
        let unit_idx = ctx.unit;

        let (verdict, message, span) = {
            let owner = self.registry.module(module);
            let Some(decl) = owner.units[unit_idx].ct_asserts.get(index) else {
                return;
            };
            let DeclKind::CtAssert { cond, message } = &decl.kind else {
                return;
            };
            (
                eval::const_bool(self.env, owner, cond),
                message.clone(),
                decl.span,
            )
        };

        let file = self.registry.module(module).units[unit_idx].file.clone();
        match verdict {
            Err(error) => {
                self.diags.report(Diagnostic::new(
                    SemaError::CompileTimeEvaluationError {
                        detail: error.detail,
                        span: error.span,
                    },
                    file,
                ));
                self.poison(module, unit_idx, index);
            }
            Ok(false) => {
                self.diags.report(Diagnostic::new(
                    SemaError::AssertionFailed {
                        message: message
                            .unwrap_or_else(|| "condition evaluated to false".to_string()),
                        span,
                    },
                    file,
                ));
                self.poison(module, unit_idx, index);
            }
            Ok(true) => {
                if let Some(decl) =
                    self.registry.module_mut(module).units[unit_idx].ct_asserts.get_mut(index)
                {
                    decl.resolve = ResolveState::Done;
                }
            }
        }
    }

    fn poison(&mut self, module: ModuleId, unit_idx: usize, index: usize) {
        if let Some(decl) =
            self.registry.module_mut(module).units[unit_idx].ct_asserts.get_mut(index)
        {
            decl.poison();
        }
    }
}
