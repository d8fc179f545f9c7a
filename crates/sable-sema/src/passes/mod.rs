//! The analysis passes.
//!
//! Each pass sweeps every unit of a module before the next pass begins,
//! and the driver completes each pass for every module before starting
//! the next. That two-level barrier is what makes forward references
//! safe within and across modules.
//!
//! ```text
//! ┌───────────────────────────┐
//! │ 1. ImportPass             │  bind imports to modules
//! ├───────────────────────────┤
//! │ 2. RegisterGlobalsPass    │  file decls into categories + symbols
//! ├───────────────────────────┤
//! │ 3. ConditionalPass        │  expand top-level $if chains
//! ├───────────────────────────┤
//! │ 4. CtAssertPass           │  check top-level $assert conditions
//! ├───────────────────────────┤
//! │ 5. DeclPass               │  resolve signatures, category-ordered
//! ├───────────────────────────┤
//! │ 6. FunctionPass           │  analyse bodies; forward calls work
//! └───────────────────────────┘
//! ```

pub mod asserts;
pub mod bodies;
pub mod conditional;
pub mod decls;
pub mod imports;
pub mod register;

pub use asserts::CtAssertPass;
pub use bodies::FunctionPass;
pub use conditional::ConditionalPass;
pub use decls::DeclPass;
pub use imports::ImportPass;
pub use register::RegisterGlobalsPass;
