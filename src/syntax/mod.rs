//! Syntax layer — the raw-tree contract between the external parser and the
//! semantic core.
//!
//! The concrete text parser lives outside this crate. What the core needs
//! from it is a [`SyntaxTree`]: kind-tagged nodes in declaration order with
//! stable ids across incremental edits, literal name/visibility data, and
//! reference-chain payloads for every qualified name in the source.

mod kind;
mod tree;

pub use kind::{Direction, SyntaxKind};
pub use tree::{
    ImportKind, NodeId, Preorder, RawReference, RawSegment, ReferenceRole, SyntaxNode, SyntaxTree,
    TreeBuilder, Visibility,
};
