//! Modules and their global symbol tables.

use std::fmt;

use rustc_hash::FxHashMap;
use sable_ast::{CompilationUnit, Decl, DeclCategory};
use sable_core::Span;

/// A dotted module name path, e.g. `std.io`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    /// Create a path from its dotted form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The dotted form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Where a registered global lives inside its module.
///
/// Category lists are append-only once registration has filed into them,
/// so the (unit, category, index) triple stays valid for the rest of the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalSymbol {
    /// Index of the owning unit within the module.
    pub unit: usize,
    /// Which category list the declaration was filed into.
    pub category: DeclCategory,
    /// Index within that list.
    pub index: usize,
    /// Where the declaration is, for duplicate-reporting notes.
    pub span: Span,
}

/// A named compilation grouping: an ordered set of units plus the
/// module-wide symbol namespace registration fills in.
#[derive(Debug)]
pub struct Module {
    /// Dotted name path; the module's identity.
    pub path: ModulePath,
    /// Whether importing this module requires the private-import
    /// qualifier.
    pub is_private: bool,
    /// Units in declaration order.
    pub units: Vec<CompilationUnit>,
    /// Global symbol namespace, keyed by declared name (methods key as
    /// `Receiver.name`).
    pub symbols: FxHashMap<String, GlobalSymbol>,
}

impl Module {
    /// Create an empty module.
    pub fn new(path: impl Into<ModulePath>, is_private: bool) -> Self {
        Self {
            path: path.into(),
            is_private,
            units: Vec::new(),
            symbols: FxHashMap::default(),
        }
    }

    /// Append a unit, returning its index.
    pub fn add_unit(&mut self, unit: CompilationUnit) -> usize {
        self.units.push(unit);
        self.units.len() - 1
    }

    /// Look up a registered global by name.
    pub fn symbol(&self, name: &str) -> Option<&GlobalSymbol> {
        self.symbols.get(name)
    }

    /// The declaration a symbol entry points at.
    pub fn decl(&self, symbol: &GlobalSymbol) -> Option<&Decl> {
        self.units.get(symbol.unit)?.decl(symbol.category, symbol.index)
    }

    /// Mutable variant of [`Module::decl`].
    pub fn decl_mut(&mut self, symbol: &GlobalSymbol) -> Option<&mut Decl> {
        self.units.get_mut(symbol.unit)?.decl_mut(symbol.category, symbol.index)
    }
}

impl From<String> for ModulePath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}
