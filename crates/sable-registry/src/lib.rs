//! Module storage for the Sable front end.
//!
//! Modules live in an arena owned by [`ModuleRegistry`] and are addressed
//! by copyable [`ModuleId`]s; every cross-module reference in the
//! declaration graph is an id, never an owning pointer. Lookup by dotted
//! path is identity-stable: the same path always yields the same id.
//!
//! [`ModuleId`]: sable_core::ModuleId

pub mod module;
pub mod registry;

pub use module::{GlobalSymbol, Module, ModulePath};
pub use registry::ModuleRegistry;
