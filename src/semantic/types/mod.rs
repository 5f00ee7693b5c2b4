//! Shared types for the semantic layer: errors, diagnostics, build options.

pub mod diagnostic;
pub mod error;
pub mod options;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{BuildError, ExpectedKind, LinkError, SemanticError};
pub use options::{BuildOptions, StdlibMode};
