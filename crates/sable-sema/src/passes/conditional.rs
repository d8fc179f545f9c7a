//! Conditional compilation.
//!
//! Evaluates each unit's top-level `$if` chains and splices the winning
//! branch's declarations back into the unit through the registration
//! filing routine. At most one branch per chain ever files; an evaluation
//! error abandons the chain with no branch taken. Splicing may append new
//! chains (a `$if` nested in a branch), which this sweep picks up because
//! it re-reads the list length each iteration.

use sable_ast::{CtBranch, Decl, DeclKind, ResolveState};
use sable_core::{Diagnostic, Diagnostics, ModuleId, SemaError};
use sable_registry::ModuleRegistry;
use tracing::debug;

use crate::context::SemaContext;
use crate::env::BuildEnv;
use crate::eval::{self, EvalError};
use crate::passes::register::register_global_decl;

/// Pass 3: expand top-level compile-time conditionals.
pub struct ConditionalPass<'a> {
    registry: &'a mut ModuleRegistry,
    env: &'a BuildEnv,
    diags: &'a mut Diagnostics,
}

impl<'a> ConditionalPass<'a> {
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

    /// Expand every conditional chain in `module`.
    pub fn run(mut self, module: ModuleId) {
        let module_path = self.registry.module(module).path.to_string();
        debug!(module = %module_path, "pass: expanding top-level conditionals");

        let unit_count = self.registry.module(module).units.len();
        for unit_idx in 0..unit_count {
            let mut i = 0;
            while i < self.registry.module(module).units[unit_idx].ct_ifs.len() {
                let ctx = SemaContext::new(module, unit_idx);
                self.expand_chain(&ctx, i);
                i += 1;
            }
        }

        debug!(
            module = %module_path,
            errors = self.diags.error_count(),
            "pass finished",
        );
    }

    fn expand_chain(&mut self, ctx: &SemaContext, index: usize) {
        let module = ctx.module;
        let unit_idx = ctx.unit;

        let verdict = {
            let owner = self.registry.module(module);
            let Some(DeclKind::CtIf { cond, .. }) =
                owner.units[unit_idx].ct_ifs.get(index).map(|d| &d.kind)
            else {
                return;
            };
            eval::const_bool(self.env, owner, cond)
        };
        match verdict {
            Err(error) => {
                self.abandon_chain(module, unit_idx, index, error);
                return;
            }
            Ok(true) => {
                let decls = self.take_then_decls(module, unit_idx, index);
                self.file_decls(module, unit_idx, decls);
            }
            Ok(false) => {
                if !self.expand_branches(module, unit_idx, index) {
                    return;
                }
            }
        }
        if let Some(chain) = self.registry.module_mut(module).units[unit_idx].ct_ifs.get_mut(index)
        {
            chain.resolve = ResolveState::Done;
        }
    }

    /// Walk the `$elif`/`$else` branches after a false leading condition.
    /// Returns whether the chain completed (an error abandons it).
    fn expand_branches(&mut self, module: ModuleId, unit_idx: usize, index: usize) -> bool {
        let branch_count = {
            let owner = self.registry.module(module);
            match owner.units[unit_idx].ct_ifs.get(index).map(|d| &d.kind) {
                Some(DeclKind::CtIf { rest, .. }) => rest.len(),
                _ => 0,
            }
        };
        for branch in 0..branch_count {
            let verdict = {
                let owner = self.registry.module(module);
                let Some(DeclKind::CtIf { rest, .. }) =
                    owner.units[unit_idx].ct_ifs.get(index).map(|d| &d.kind)
                else {
                    return true;
                };
                match &rest[branch] {
                    // The else sentinel files unconditionally.
                    CtBranch::Else { .. } => Ok(true),
                    CtBranch::Elif { cond, .. } => eval::const_bool(self.env, owner, cond),
                }
            };
            match verdict {
                Err(error) => {
                    self.abandon_chain(module, unit_idx, index, error);
                    return false;
                }
                Ok(false) => continue,
                Ok(true) => {
                    let decls = self.take_branch_decls(module, unit_idx, index, branch);
                    self.file_decls(module, unit_idx, decls);
                    return true;
                }
            }
        }
        // All branches false and no else: the chain resolves to nothing.
        true
    }

    fn take_then_decls(&mut self, module: ModuleId, unit_idx: usize, index: usize) -> Vec<Decl> {
        match self.registry.module_mut(module).units[unit_idx]
            .ct_ifs
            .get_mut(index)
            .map(|d| &mut d.kind)
        {
            Some(DeclKind::CtIf { then_decls, .. }) => std::mem::take(then_decls),
            _ => Vec::new(),
        }
    }

    fn take_branch_decls(
        &mut self,
        module: ModuleId,
        unit_idx: usize,
        index: usize,
        branch: usize,
    ) -> Vec<Decl> {
        match self.registry.module_mut(module).units[unit_idx]
            .ct_ifs
            .get_mut(index)
            .map(|d| &mut d.kind)
        {
            Some(DeclKind::CtIf { rest, .. }) => match rest.get_mut(branch) {
                Some(CtBranch::Elif { decls, .. }) | Some(CtBranch::Else { decls, .. }) => {
                    std::mem::take(decls)
                }
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn file_decls(&mut self, module: ModuleId, unit_idx: usize, decls: Vec<Decl>) {
        let owner = self.registry.module_mut(module);
        for decl in decls {
            register_global_decl(owner, unit_idx, decl, self.diags);
        }
    }

    fn abandon_chain(&mut self, module: ModuleId, unit_idx: usize, index: usize, error: EvalError) {
        let file = self.registry.module(module).units[unit_idx].file.clone();
        self.diags.report(Diagnostic::new(
            SemaError::CompileTimeEvaluationError {
                detail: error.detail,
                span: error.span,
            },
            file,
        ));
        if let Some(chain) = self.registry.module_mut(module).units[unit_idx].ct_ifs.get_mut(index)
        {
            chain.poison();
        }
    }
}
