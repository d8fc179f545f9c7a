//! Build environment configuration.
//!
//! Compile-time conditions (`$if`, `$assert`) are evaluated against a set
//! of named constants supplied by the build driver, e.g. a target name or
//! a feature toggle. The environment is read-only during analysis.

use rustc_hash::FxHashMap;

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    /// A boolean constant.
    Bool(bool),
    /// An integer constant.
    Int(i64),
}

/// Named compile-time constants visible to `$if`/`$assert` conditions.
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    consts: FxHashMap<String, ConstValue>,
}

impl BuildEnv {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a constant.
    pub fn set_const(&mut self, name: impl Into<String>, value: ConstValue) {
        self.consts.insert(name.into(), value);
    }

    /// Define a constant, builder-style.
    pub fn with_const(mut self, name: impl Into<String>, value: ConstValue) -> Self {
        self.set_const(name, value);
        self
    }

    /// Look up a constant by name.
    pub fn const_value(&self, name: &str) -> Option<&ConstValue> {
        self.consts.get(name)
    }
}
