//! # sylink-base
//!
//! Metamodel construction and name resolution core for SysML v2 and KerML
//! language tooling.
//!
//! The crate consumes a raw syntax tree produced by an external parser and
//! builds a parallel semantic model on top of it: every syntax node gets a
//! semantic element, every qualified reference is linked to a concrete
//! target, and implicit standard-library relationships are synthesized on
//! demand. Construction is incremental (documents are reset and rebuilt in
//! place on edit) and cycle-safe (mutually recursive scopes and type graphs
//! are guarded by per-element setup states).
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! semantic  → element model, scopes, linking, builder, workspace
//!   ↓
//! syntax    → raw-tree contract: SyntaxKind, SyntaxTree, TreeBuilder
//!   ↓
//! base      → primitives (DocumentId, Position, Span)
//! ```

/// Foundation types: DocumentId, Position, Span
pub mod base;

/// Syntax: the raw-tree contract consumed from the external parser
pub mod syntax;

/// Semantic model: elements, scopes, linking, metamodel building, workspace
pub mod semantic;

// Re-export foundation types
pub use base::{DocumentId, Position, Span};

// Re-export the common entry points
pub use semantic::{
    AliasPolicy, BuildOptions, Diagnostic, Element, ElementId, LinkError, MetamodelBuilder, Model,
    Relationship, RelationshipKind, SemanticError, SetupState, Severity, StdlibMode, Visibility,
    Workspace,
};
pub use syntax::{
    ImportKind, NodeId, ReferenceRole, SyntaxKind, SyntaxNode, SyntaxTree, TreeBuilder,
};
