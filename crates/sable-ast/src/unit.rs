//! Compilation units.
//!
//! A [`CompilationUnit`] holds one source file's declarations, bucketed by
//! category. The parser files imports, conditional chains, and assertions
//! straight into their lists and leaves everything else in the transient
//! `global_decls` buffer; global registration drains that buffer into the
//! category collections and the owning module's symbol table. Conditional
//! expansion reuses the same filing path for the declarations a winning
//! branch injects.

use sable_core::ModuleId;

use crate::decl::Decl;

/// The per-category collections a declaration can be filed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclCategory {
    /// Enum types.
    Enums,
    /// Record types.
    Types,
    /// Macros.
    Macros,
    /// Generic definitions.
    Generics,
    /// Methods.
    Methods,
    /// Macro methods.
    MacroMethods,
    /// Module-level variables.
    Vars,
    /// Functions.
    Functions,
    /// Generic instantiation aliases.
    GenericDefines,
    /// The unit's `main` function slot.
    Main,
}

impl DeclCategory {
    /// The fixed order declaration analysis sweeps categories in. Enums
    /// and types come first so later categories can reference them;
    /// `main` and generic defines close the sweep.
    pub const ANALYSIS_ORDER: [DeclCategory; 10] = [
        DeclCategory::Enums,
        DeclCategory::Types,
        DeclCategory::Macros,
        DeclCategory::Generics,
        DeclCategory::Methods,
        DeclCategory::MacroMethods,
        DeclCategory::Vars,
        DeclCategory::Functions,
        DeclCategory::Main,
        DeclCategory::GenericDefines,
    ];
}

/// One source file's worth of declarations.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    /// Source file name, used to anchor diagnostics.
    pub file: String,
    /// Owning module, set during global registration. Lookup only; the
    /// registry owns the module.
    pub module: Option<ModuleId>,
    /// Transient landing zone for parsed top-level declarations; drained
    /// by registration and reused by conditional expansion.
    pub global_decls: Vec<Decl>,
    /// Import declarations in source order.
    pub imports: Vec<Decl>,
    /// Top-level `$if` chains.
    pub ct_ifs: Vec<Decl>,
    /// Top-level `$assert`s.
    pub ct_asserts: Vec<Decl>,
    /// Enum types.
    pub enums: Vec<Decl>,
    /// Record types.
    pub types: Vec<Decl>,
    /// Macros.
    pub macros: Vec<Decl>,
    /// Generic definitions.
    pub generics: Vec<Decl>,
    /// Methods.
    pub methods: Vec<Decl>,
    /// Macro methods.
    pub macro_methods: Vec<Decl>,
    /// Module-level variables.
    pub vars: Vec<Decl>,
    /// Functions other than `main`.
    pub functions: Vec<Decl>,
    /// Generic instantiation aliases.
    pub generic_defines: Vec<Decl>,
    /// The `main` function, if this unit declares it.
    pub main_function: Option<Decl>,
}

impl CompilationUnit {
    /// Create an empty unit for `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Queue a parsed declaration for registration.
    pub fn push_global(&mut self, decl: Decl) {
        self.global_decls.push(decl);
    }

    /// The declarations filed under `category`.
    pub fn category(&self, category: DeclCategory) -> &[Decl] {
        match category {
            DeclCategory::Enums => &self.enums,
            DeclCategory::Types => &self.types,
            DeclCategory::Macros => &self.macros,
            DeclCategory::Generics => &self.generics,
            DeclCategory::Methods => &self.methods,
            DeclCategory::MacroMethods => &self.macro_methods,
            DeclCategory::Vars => &self.vars,
            DeclCategory::Functions => &self.functions,
            DeclCategory::GenericDefines => &self.generic_defines,
            DeclCategory::Main => self.main_function.as_slice(),
        }
    }

    /// Mutable access to the declarations filed under `category`.
    pub fn category_mut(&mut self, category: DeclCategory) -> &mut [Decl] {
        match category {
            DeclCategory::Enums => &mut self.enums,
            DeclCategory::Types => &mut self.types,
            DeclCategory::Macros => &mut self.macros,
            DeclCategory::Generics => &mut self.generics,
            DeclCategory::Methods => &mut self.methods,
            DeclCategory::MacroMethods => &mut self.macro_methods,
            DeclCategory::Vars => &mut self.vars,
            DeclCategory::Functions => &mut self.functions,
            DeclCategory::GenericDefines => &mut self.generic_defines,
            DeclCategory::Main => self.main_function.as_mut_slice(),
        }
    }

    /// The declaration at `category`/`index`, if filed. `Main` ignores
    /// the index.
    pub fn decl(&self, category: DeclCategory, index: usize) -> Option<&Decl> {
        match category {
            DeclCategory::Main => self.main_function.as_ref(),
            _ => self.category(category).get(index),
        }
    }

    /// Mutable variant of [`CompilationUnit::decl`].
    pub fn decl_mut(&mut self, category: DeclCategory, index: usize) -> Option<&mut Decl> {
        match category {
            DeclCategory::Main => self.main_function.as_mut(),
            _ => self.category_mut(category).get_mut(index),
        }
    }

    /// File `decl` under `category`, returning the index it landed at.
    /// Filing into an occupied `Main` slot falls back to the function
    /// list so the declaration is never dropped.
    pub fn file_decl(&mut self, category: DeclCategory, decl: Decl) -> (DeclCategory, usize) {
        let list = match category {
            DeclCategory::Enums => &mut self.enums,
            DeclCategory::Types => &mut self.types,
            DeclCategory::Macros => &mut self.macros,
            DeclCategory::Generics => &mut self.generics,
            DeclCategory::Methods => &mut self.methods,
            DeclCategory::MacroMethods => &mut self.macro_methods,
            DeclCategory::Vars => &mut self.vars,
            DeclCategory::Functions => &mut self.functions,
            DeclCategory::GenericDefines => &mut self.generic_defines,
            DeclCategory::Main => {
                if self.main_function.is_none() {
                    self.main_function = Some(decl);
                    return (DeclCategory::Main, 0);
                }
                &mut self.functions
            }
        };
        list.push(decl);
        let category = if matches!(category, DeclCategory::Main) {
            DeclCategory::Functions
        } else {
            category
        };
        (category, list.len() - 1)
    }
}
