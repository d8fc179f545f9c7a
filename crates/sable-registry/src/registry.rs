//! The module registry arena.

use rustc_hash::FxHashMap;
use sable_core::ModuleId;

use crate::module::{Module, ModulePath};

/// Arena of all modules in the program, indexed by dotted path.
///
/// The registry owns every [`Module`]; the rest of the pipeline holds
/// [`ModuleId`]s. Lookups are identity-stable: a path maps to one id for
/// the registry's whole lifetime.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    by_path: FxHashMap<String, ModuleId>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the module for `path`, creating it if absent.
    ///
    /// Parsing may feed units of one module from several places; the first
    /// call fixes the module's visibility and later calls return the same
    /// id unchanged.
    pub fn get_or_create(&mut self, path: impl Into<ModulePath>, is_private: bool) -> ModuleId {
        let path = path.into();
        if let Some(&id) = self.by_path.get(path.as_str()) {
            return id;
        }
        let id = ModuleId::new(self.modules.len());
        self.by_path.insert(path.as_str().to_string(), id);
        self.modules.push(Module::new(path, is_private));
        id
    }

    /// Look up a module by dotted path.
    pub fn find(&self, path: &str) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    /// The module behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this registry.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    /// Mutable variant of [`ModuleRegistry::module`].
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.index()]
    }

    /// Ids of all modules, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ModuleId> + use<> {
        (0..self.modules.len()).map(ModuleId::new)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
