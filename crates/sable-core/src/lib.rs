//! Shared foundation types for the Sable front end.
//!
//! - [`span`]: source positions for diagnostics anchoring
//! - [`error`]: the semantic-analysis error taxonomy
//! - [`diagnostics`]: the batch diagnostics sink threaded through the passes
//! - [`ids`]: copyable identifiers into the module registry arena

pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod span;

pub use diagnostics::{Diagnostic, Diagnostics, Note};
pub use error::SemaError;
pub use ids::ModuleId;
pub use span::Span;
