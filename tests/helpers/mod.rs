#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use sylink::semantic::Workspace;
use sylink::syntax::{SyntaxKind, SyntaxTree, TreeBuilder};
use tokio_util::sync::CancellationToken;

/// Build every document, panicking on cancellation (tests never cancel
/// through this path).
pub fn build(workspace: &mut Workspace) {
    workspace
        .build_all(&CancellationToken::new())
        .expect("build should not be cancelled");
}

/// A miniature standard library covering the base elements the implicit
/// synthesis table needs for parts and actions.
pub fn mini_stdlib() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let parts = b.add_named(b.root(), SyntaxKind::LibraryPackage, "Parts");
    b.add_named(parts, SyntaxKind::PartDefinition, "Part");
    b.add_named(parts, SyntaxKind::PartUsage, "parts");
    let items = b.add_named(b.root(), SyntaxKind::LibraryPackage, "Items");
    b.add_named(items, SyntaxKind::ItemDefinition, "Item");
    b.add_named(items, SyntaxKind::ItemUsage, "items");
    let actions = b.add_named(b.root(), SyntaxKind::LibraryPackage, "Actions");
    b.add_named(actions, SyntaxKind::ActionDefinition, "Action");
    b.add_named(actions, SyntaxKind::ActionUsage, "actions");
    b.finish()
}
