//! Semantic model: elements, scopes, reference linking, metamodel building,
//! and the multi-document workspace.
//!
//! The layering inside this module mirrors the build pipeline:
//!
//! - [`element`] — the arena model and relationship graph
//! - [`scope`] — lazy visibility-filtered lookups over that graph
//! - [`linker`] — reference chains resolved through the scope engine
//! - [`builder`] — the passes and setup rules that drive both
//! - [`workspace`] — documents, the global index, incremental updates
//! - [`evaluate`] — the embedder-provided expression evaluation seam

pub mod builder;
pub mod element;
pub mod evaluate;
pub mod linker;
pub mod scope;
pub mod types;
pub mod workspace;

pub use builder::{MetamodelBuilder, SetupFn, SetupRegistry, SetupRule};
pub use element::{
    Element, ElementId, MemberDescription, Model, Relationship, RelationshipKind, SetupState,
};
pub use evaluate::{EvalError, Evaluate, Value};
pub use linker::{ChainOutcome, ElementReference, SegmentState};
pub use scope::{AliasPolicy, ScopeOptions, VisibilityPolicy};
pub use types::{
    BuildError, BuildOptions, Diagnostic, ExpectedKind, LinkError, SemanticError, Severity,
    StdlibMode,
};
pub use workspace::{BuildState, Document, Documents, GlobalIndex, Workspace};

// Visibility is declared with the raw-tree contract but is just as much a
// semantic concept; re-export it here for API symmetry.
pub use crate::syntax::Visibility;
