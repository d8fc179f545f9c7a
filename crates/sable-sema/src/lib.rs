//! Semantic analysis for Sable.
//!
//! Turns a parsed, module-structured program into a fully resolved
//! declaration graph. Analysis is organised as six passes over the module
//! registry; the driver applies each pass to *every* module before the
//! next pass starts, and within a pass every unit of a module is swept
//! before the next module. Those two barriers are what make forward
//! references safe: by the time bodies are analysed, every signature in
//! the program is resolvable.
//!
//! Failures never abort a pass. Each one poisons the offending
//! declaration, appends a diagnostic to the shared sink, and the sweep
//! continues, so a single run collects every error it can find. The
//! caller decides whether to continue to code generation by checking the
//! returned [`Diagnostics`].
//!
//! ```
//! use sable_ast::CompilationUnit;
//! use sable_registry::ModuleRegistry;
//! use sable_sema::{BuildEnv, analyse};
//!
//! let mut registry = ModuleRegistry::new();
//! let app = registry.get_or_create("app", false);
//! registry.module_mut(app).add_unit(CompilationUnit::new("app.sb"));
//!
//! let diagnostics = analyse(&mut registry, &BuildEnv::new());
//! assert!(!diagnostics.has_errors());
//! ```

mod analyser;
pub mod context;
pub mod env;
mod eval;
pub mod passes;

pub use analyser::{BUILTIN_TYPES, is_builtin_type};
pub use context::{DynamicScope, LocalVar, SemaContext};
pub use env::{BuildEnv, ConstValue};

use sable_core::{Diagnostics, ModuleId};
use sable_registry::ModuleRegistry;

use crate::passes::{
    ConditionalPass, CtAssertPass, DeclPass, FunctionPass, ImportPass, RegisterGlobalsPass,
};

/// Run the full analysis pipeline over every module in `registry`.
///
/// Each pass completes for all modules before the next begins. The
/// returned sink holds every diagnostic of the run; a non-empty sink
/// means code generation must not proceed, but every non-poisoned
/// declaration is still fully resolved.
pub fn analyse(registry: &mut ModuleRegistry, env: &BuildEnv) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let modules: Vec<ModuleId> = registry.ids().collect();

    for &module in &modules {
        ImportPass::new(registry, &mut diags).run(module);
    }
    for &module in &modules {
        RegisterGlobalsPass::new(registry, &mut diags).run(module);
    }
    for &module in &modules {
        ConditionalPass::new(registry, env, &mut diags).run(module);
    }
    for &module in &modules {
        CtAssertPass::new(registry, env, &mut diags).run(module);
    }
    for &module in &modules {
        DeclPass::new(registry, &mut diags).run(module);
    }
    for &module in &modules {
        FunctionPass::new(registry, &mut diags).run(module);
    }

    diags
}
