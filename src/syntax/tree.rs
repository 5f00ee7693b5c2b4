//! The raw syntax tree contract consumed from the external parser.
//!
//! The core does not parse text; it consumes a tree of [`SyntaxNode`]s with
//! stable [`NodeId`]s. Stability matters: on an incremental edit the parser
//! reuses node ids for unchanged subtrees, which lets the semantic layer
//! reset-and-reuse element identities instead of rebuilding the model.
//!
//! Semantic elements are never stored inside the tree; the model keeps a
//! side table keyed by node id.

use smol_str::SmolStr;

use super::kind::{Direction, SyntaxKind};
use crate::base::Span;

/// Index of a node within its document's [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declared visibility of a member.
///
/// Ordering is by strictness: `Public < Protected < Private`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// The four import kinds. They change the shape of scope construction, not
/// the matching algorithm:
///
/// - `Specific` (`import P::Q;`) brings in exactly the named target.
/// - `Wildcard` (`import P::Q::*;`) brings in the target's direct members.
/// - `Recursive` (`import P::Q::**;`) brings in the target itself plus all
///   of its members, transitively.
/// - `RecursiveExclusive` (`import P::Q::*::**;`) brings in the transitive
///   member closure but not the target itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Specific,
    Wildcard,
    Recursive,
    RecursiveExclusive,
}

/// What a reference chain is doing at its declaration site. Determines the
/// expected kind of the final target and whether the declaring element may
/// resolve to itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceRole {
    /// `:>` on a classifier — specialization/generalization.
    Specialization,
    /// `:>` on a feature — subsetting.
    Subsetting,
    /// `:>>` — redefinition.
    Redefinition,
    /// `:` — feature typing.
    Typing,
    /// `~` — conjugation.
    Conjugation,
    /// `::>` — reference subsetting (connector ends, inverse features).
    ReferenceSubsetting,
    /// Import target path.
    Import,
    /// Expose target path (view-specific import).
    Expose,
    /// Alias target path.
    Alias,
    /// Callee of an invocation expression.
    Callee,
    /// A `a.b.c` feature chain in an expression.
    FeatureChain,
    /// Wrapped reference of a feature reference expression.
    FeatureReference,
    /// Target of a metadata access expression.
    MetadataAccess,
    /// Named argument name inside an invocation.
    NamedArgument,
}

impl ReferenceRole {
    /// Whether segment 0 may resolve to the declaring element itself.
    /// Subsetting-flavored references establish relations between sibling
    /// features of one element, so self-lookup stays legal for them.
    pub fn allows_self_reference(self) -> bool {
        matches!(
            self,
            ReferenceRole::Subsetting | ReferenceRole::ReferenceSubsetting
        )
    }
}

/// Reference-chain payload of a `SyntaxKind::Reference` node.
#[derive(Clone, Debug)]
pub struct RawReference {
    pub role: ReferenceRole,
    /// Name segments in source order (`a::b::c` or `a.b.c`).
    pub segments: Vec<RawSegment>,
    /// Import shape, for `role == Import`/`Expose`.
    pub import_kind: Option<ImportKind>,
    /// Argument name, for `role == NamedArgument`.
    pub argument_name: Option<SmolStr>,
}

/// One name segment of a reference chain.
#[derive(Clone, Debug)]
pub struct RawSegment {
    pub text: SmolStr,
    pub span: Option<Span>,
}

/// A raw syntax node as produced by the parser.
///
/// Fields other than `kind`/`children` are literal data only; nothing here
/// is resolved or linked.
#[derive(Clone, Debug)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub name: Option<SmolStr>,
    pub short_name: Option<SmolStr>,
    pub visibility: Option<Visibility>,
    pub direction: Option<Direction>,
    pub is_abstract: bool,
    /// Concrete-syntax range; `None` for synthetically constructed nodes.
    pub span: Option<Span>,
    /// Present iff `kind == SyntaxKind::Reference`.
    pub reference: Option<RawReference>,
    /// Documentation body, for `Documentation`/`Comment` nodes.
    pub text: Option<SmolStr>,
}

impl SyntaxNode {
    fn new(kind: SyntaxKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            name: None,
            short_name: None,
            visibility: None,
            direction: None,
            is_abstract: false,
            span: None,
            reference: None,
            text: None,
        }
    }
}

/// An arena-allocated syntax tree for one document.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child ids of a node, in declaration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Preorder traversal of the whole tree.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Walk up the parent chain starting at `id` (exclusive).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, |&p| self.node(p).parent)
    }
}

/// Preorder iterator over node ids.
pub struct Preorder<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(id)
    }
}

/// Programmatic tree construction.
///
/// Embedders adapting a concrete parser build trees through this; tests use
/// it directly in place of parsing.
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    /// Start a tree; the implicit root namespace is node 0.
    pub fn new() -> Self {
        Self {
            nodes: vec![SyntaxNode::new(SyntaxKind::RootNamespace, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add an anonymous node under `parent`.
    pub fn add(&mut self, parent: NodeId, kind: SyntaxKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode::new(kind, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Add a named node under `parent`.
    pub fn add_named(&mut self, parent: NodeId, kind: SyntaxKind, name: &str) -> NodeId {
        let id = self.add(parent, kind);
        self.nodes[id.index()].name = Some(SmolStr::new(name));
        id
    }

    pub fn set_short_name(&mut self, id: NodeId, short_name: &str) {
        self.nodes[id.index()].short_name = Some(SmolStr::new(short_name));
    }

    pub fn set_visibility(&mut self, id: NodeId, visibility: Visibility) {
        self.nodes[id.index()].visibility = Some(visibility);
    }

    pub fn set_direction(&mut self, id: NodeId, direction: Direction) {
        self.nodes[id.index()].direction = Some(direction);
    }

    pub fn set_abstract(&mut self, id: NodeId) {
        self.nodes[id.index()].is_abstract = true;
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = Some(span);
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.index()].text = Some(SmolStr::new(text));
    }

    /// Add a reference chain node under `parent`.
    pub fn add_reference(
        &mut self,
        parent: NodeId,
        role: ReferenceRole,
        segments: &[&str],
    ) -> NodeId {
        let id = self.add(parent, SyntaxKind::Reference);
        self.nodes[id.index()].reference = Some(RawReference {
            role,
            segments: segments
                .iter()
                .map(|s| RawSegment {
                    text: SmolStr::new(s),
                    span: None,
                })
                .collect(),
            import_kind: None,
            argument_name: None,
        });
        id
    }

    /// Add an import node with its target reference under `parent`.
    pub fn add_import(
        &mut self,
        parent: NodeId,
        kind: ImportKind,
        segments: &[&str],
        visibility: Visibility,
    ) -> NodeId {
        self.add_import_like(parent, ReferenceRole::Import, kind, segments, visibility)
    }

    /// Add a view expose node; same shape as an import, different role.
    pub fn add_expose(
        &mut self,
        parent: NodeId,
        kind: ImportKind,
        segments: &[&str],
        visibility: Visibility,
    ) -> NodeId {
        self.add_import_like(parent, ReferenceRole::Expose, kind, segments, visibility)
    }

    fn add_import_like(
        &mut self,
        parent: NodeId,
        role: ReferenceRole,
        kind: ImportKind,
        segments: &[&str],
        visibility: Visibility,
    ) -> NodeId {
        let import = self.add(parent, SyntaxKind::Import);
        self.nodes[import.index()].visibility = Some(visibility);
        let reference = self.add_reference(import, role, segments);
        if let Some(raw) = self.nodes[reference.index()].reference.as_mut() {
            raw.import_kind = Some(kind);
        }
        import
    }

    /// Add an alias member `alias <name> for <target>` under `parent`.
    pub fn add_alias(&mut self, parent: NodeId, name: &str, target: &[&str]) -> NodeId {
        let alias = self.add_named(parent, SyntaxKind::Alias, name);
        self.add_reference(alias, ReferenceRole::Alias, target);
        alias
    }

    /// Set the argument name on a `NamedArgument` reference.
    pub fn set_argument_name(&mut self, reference: NodeId, name: &str) {
        if let Some(raw) = self.nodes[reference.index()].reference.as_mut() {
            raw.argument_name = Some(SmolStr::new(name));
        }
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root: NodeId(0),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_parent_child_links() {
        let mut b = TreeBuilder::new();
        let pkg = b.add_named(b.root(), SyntaxKind::Package, "P");
        let part = b.add_named(pkg, SyntaxKind::PartDefinition, "Vehicle");
        let tree = b.finish();

        assert_eq!(tree.node(part).parent, Some(pkg));
        assert_eq!(tree.children(pkg), &[part]);
        assert_eq!(tree.ancestors(part).collect::<Vec<_>>(), vec![pkg, tree.root()]);
    }

    #[test]
    fn test_preorder_declaration_order() {
        let mut b = TreeBuilder::new();
        let pkg = b.add_named(b.root(), SyntaxKind::Package, "P");
        let a = b.add_named(pkg, SyntaxKind::PartDefinition, "A");
        let c = b.add_named(a, SyntaxKind::PartUsage, "c");
        let d = b.add_named(pkg, SyntaxKind::PartDefinition, "D");
        let tree = b.finish();

        let order: Vec<_> = tree.preorder().collect();
        assert_eq!(order, vec![tree.root(), pkg, a, c, d]);
    }

    #[test]
    fn test_import_carries_kind_and_reference() {
        let mut b = TreeBuilder::new();
        let pkg = b.add_named(b.root(), SyntaxKind::Package, "P");
        let import = b.add_import(pkg, ImportKind::Wildcard, &["Q", "R"], Visibility::Private);
        let tree = b.finish();

        let reference = tree.children(import)[0];
        let raw = tree.node(reference).reference.as_ref().unwrap();
        assert_eq!(raw.import_kind, Some(ImportKind::Wildcard));
        assert_eq!(raw.segments.len(), 2);
        assert_eq!(raw.segments[1].text, "R");
    }
}
