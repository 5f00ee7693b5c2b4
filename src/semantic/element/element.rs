//! The semantic element — the long-lived "meta" twin of a syntax node.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::relationship::Relationship;
use crate::base::DocumentId;
use crate::syntax::{Direction, NodeId, SyntaxKind, Visibility};

/// Unique identifier for an element in the model arena.
///
/// Ids are assigned monotonically and never reused; elements of removed
/// documents become unreachable tombstones rather than freed slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Recursion guard state for per-element construction phases.
///
/// `Active` means the element is being set up somewhere higher in the call
/// stack; re-entering returns immediately instead of recursing forever on
/// cyclic type graphs. `Completed` makes repeated setup a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupState {
    #[default]
    None,
    Active,
    Completed,
}

/// A named entry in an element's local scope.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescription {
    pub element: ElementId,
    pub visibility: Visibility,
    /// The entry was introduced by an alias membership; `element` is the
    /// alias element itself, not its final target.
    pub is_alias: bool,
}

/// The semantic twin of a syntax node.
///
/// Construction is side-effect-free with respect to linking; literal data
/// arrives in a second initialization pass, and relationships are attached
/// throughout pre-linking. `reset` clears everything derived while keeping
/// the identity and node association, so incremental edits can reuse the
/// element instead of reallocating it.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub document: DocumentId,
    pub node: NodeId,
    pub kind: SyntaxKind,

    // Literal data (initialization pass)
    pub name: Option<SmolStr>,
    pub short_name: Option<SmolStr>,
    pub visibility: Visibility,
    pub direction: Option<Direction>,
    pub is_abstract: bool,

    // Derived/linked state (cleared by reset)
    pub owner: Option<ElementId>,
    pub children: IndexMap<SmolStr, MemberDescription>,
    pub relationships: Vec<Relationship>,
    pub docs: Vec<SmolStr>,
    pub setup_state: SetupState,
    pub import_state: SetupState,
    /// Memoized qualified name: outer `None` = not computed yet, inner
    /// `None` = computed, element has no qualified name (anonymous chain).
    pub(crate) qualified_name: Option<Option<SmolStr>>,
    /// False once the owning document has been removed.
    pub alive: bool,
}

impl Element {
    pub(crate) fn new(id: ElementId, document: DocumentId, node: NodeId, kind: SyntaxKind) -> Self {
        Self {
            id,
            document,
            node,
            kind,
            name: None,
            short_name: None,
            visibility: Visibility::default(),
            direction: None,
            is_abstract: false,
            owner: None,
            children: IndexMap::new(),
            relationships: Vec::new(),
            docs: Vec::new(),
            setup_state: SetupState::default(),
            import_state: SetupState::default(),
            qualified_name: None,
            alive: true,
        }
    }

    /// Type predicate through the kind hierarchy.
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind.is_a(kind)
    }

    /// Any-of type predicate.
    pub fn is_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.iter().any(|&k| self.kind.is_a(k))
    }

    /// The name this element is known by in its owner's scope, preferring
    /// the regular name over the short name.
    pub fn effective_name(&self) -> Option<&SmolStr> {
        self.name.as_ref().or(self.short_name.as_ref())
    }

    /// Whether this element owns a member scope.
    pub fn is_namespace(&self) -> bool {
        self.kind.is_namespace()
    }

    /// Clear all derived and linked state, preserving identity, node
    /// association, and kind. Used on document edit before rebuilding.
    pub fn reset(&mut self) {
        self.name = None;
        self.short_name = None;
        self.visibility = Visibility::default();
        self.direction = None;
        self.is_abstract = false;
        self.owner = None;
        self.children.clear();
        self.relationships.clear();
        self.docs.clear();
        self.setup_state = SetupState::None;
        self.import_state = SetupState::None;
        self.qualified_name = None;
    }

    /// Tombstone this element when its document is removed.
    pub(crate) fn bury(&mut self) {
        self.reset();
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_preserves_identity() {
        let mut el = Element::new(
            ElementId::new(7),
            DocumentId::new(1),
            NodeId(3),
            SyntaxKind::PartUsage,
        );
        el.name = Some(SmolStr::new("wheel"));
        el.setup_state = SetupState::Completed;

        el.reset();

        assert_eq!(el.id, ElementId::new(7));
        assert_eq!(el.node, NodeId(3));
        assert_eq!(el.kind, SyntaxKind::PartUsage);
        assert_eq!(el.name, None);
        assert_eq!(el.setup_state, SetupState::None);
        assert!(el.alive);
    }

    #[test]
    fn test_is_any() {
        let el = Element::new(
            ElementId::new(0),
            DocumentId::new(0),
            NodeId(0),
            SyntaxKind::StateUsage,
        );
        assert!(el.is(SyntaxKind::ActionUsage));
        assert!(el.is_any(&[SyntaxKind::Classifier, SyntaxKind::Usage]));
        assert!(!el.is_any(&[SyntaxKind::Classifier, SyntaxKind::PortUsage]));
    }
}
