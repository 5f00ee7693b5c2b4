//! The model arena — single source of truth for all semantic elements.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::element::{Element, ElementId, MemberDescription};
use super::relationship::{Relationship, RelationshipKind};
use crate::base::DocumentId;
use crate::syntax::{NodeId, SyntaxKind, Visibility};

/// Arena storage for all semantic elements across all documents, plus the
/// node-identity side table that associates raw nodes with their elements.
///
/// Elements are exclusively owned by their document; cross-document edges
/// are plain ids re-resolved through lookups, never owning pointers, so
/// removing a document cannot dangle (its elements become tombstones).
#[derive(Default)]
pub struct Model {
    arena: Vec<Element>,
    /// Side table: (document, node) → element. Kept across incremental
    /// rebuilds so unchanged nodes keep their element identity.
    by_node: FxHashMap<(DocumentId, NodeId), ElementId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the element for a raw node. Creation assigns the next
    /// monotone id and performs no linking work.
    pub fn ensure_element(
        &mut self,
        document: DocumentId,
        node: NodeId,
        kind: SyntaxKind,
    ) -> ElementId {
        if let Some(&id) = self.by_node.get(&(document, node)) {
            // Identity reuse across rebuilds; the kind may have changed
            // under an edit, in which case the element follows the node.
            self.arena[id.index()].kind = kind;
            self.arena[id.index()].alive = true;
            return id;
        }
        let id = ElementId::new(self.arena.len());
        trace!("[MODEL] new element {:?} for {:?}/{:?} ({:?})", id, document, node, kind);
        self.arena.push(Element::new(id, document, node, kind));
        self.by_node.insert((document, node), id);
        id
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.arena[id.index()]
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.arena[id.index()]
    }

    /// The element attached to a raw node, if any.
    pub fn element_for_node(&self, document: DocumentId, node: NodeId) -> Option<ElementId> {
        self.by_node.get(&(document, node)).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    // ============================================================
    // Generic element operations
    // ============================================================

    /// The owning container of an element.
    pub fn owner(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).owner
    }

    /// The nearest ancestor that owns a member scope.
    pub fn owning_namespace(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.get(id).owner;
        while let Some(owner) = current {
            if self.get(owner).is_namespace() {
                return Some(owner);
            }
            current = self.get(owner).owner;
        }
        None
    }

    /// Walk the owner chain from `id` (exclusive) to the root.
    pub fn owners(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.get(id).owner, |&o| self.get(o).owner)
    }

    /// Insert a named member description into an owner's local scope.
    /// First declaration of a name wins; duplicates are left to validation.
    pub fn add_member(
        &mut self,
        owner: ElementId,
        name: SmolStr,
        element: ElementId,
        visibility: Visibility,
        is_alias: bool,
    ) {
        let entry = MemberDescription {
            element,
            visibility,
            is_alias,
        };
        self.get_mut(owner).children.entry(name).or_insert(entry);
    }

    /// Attach a relationship to an element, enforcing the implied-edge
    /// invariants: never two implied edges of one kind to one target, and
    /// an explicit edge of a kind suppresses the implied equivalent.
    ///
    /// Returns true if the relationship was added.
    pub fn add_relationship(&mut self, owner: ElementId, relationship: Relationship) -> bool {
        if relationship.is_implied {
            let element = self.get(owner);
            let duplicate = element.relationships.iter().any(|r| {
                r.kind == relationship.kind
                    && (r.target == relationship.target || !r.is_implied)
            });
            if duplicate {
                trace!(
                    "[MODEL] suppressed implied {:?} on {:?}",
                    relationship.kind, owner
                );
                return false;
            }
        }
        self.get_mut(owner).relationships.push(relationship);
        true
    }

    /// Whether an element carries an explicit relationship of a kind.
    pub fn has_explicit(&self, id: ElementId, kind: RelationshipKind) -> bool {
        self.get(id)
            .relationships
            .iter()
            .any(|r| r.kind == kind && !r.is_implied)
    }

    /// Resolved generalization targets of an element, in declaration order
    /// (explicit edges were attached before implied ones).
    pub fn supertypes(&self, id: ElementId) -> Vec<ElementId> {
        self.get(id)
            .relationships
            .iter()
            .filter(|r| r.kind.is_generalization())
            .filter_map(|r| r.target)
            .filter(|&t| t != id)
            .collect()
    }

    /// Resolved targets of one relationship kind, in declaration order.
    pub fn targets_of(&self, id: ElementId, kind: RelationshipKind) -> Vec<ElementId> {
        self.get(id)
            .relationships
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.target)
            .collect()
    }

    /// Transitive closure of the generalization graph, self included,
    /// breadth-first, each element at most once. Cycle-safe: a type graph
    /// with `A → B → A` terminates and yields both.
    pub fn all_types(&self, id: ElementId) -> Vec<ElementId> {
        let mut visited: FxHashSet<ElementId> = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        visited.insert(id);
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for target in self.supertypes(current) {
                if visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        order
    }

    // ============================================================
    // Qualified names
    // ============================================================

    /// Lazily computed qualified name (`A::B::c`). Memoized per element;
    /// anonymous elements (and elements under anonymous owners) have none.
    pub fn qualified_name(&mut self, id: ElementId) -> Option<SmolStr> {
        if let Some(cached) = &self.get(id).qualified_name {
            return cached.clone();
        }
        let computed = self.compute_qualified_name(id);
        self.get_mut(id).qualified_name = Some(computed.clone());
        computed
    }

    /// Non-memoizing qualified name computation for read-only contexts.
    pub fn compute_qualified_name(&self, id: ElementId) -> Option<SmolStr> {
        let element = self.get(id);
        let name = element.effective_name()?;
        let mut segments = vec![name.as_str()];
        let mut current = element.owner;
        while let Some(owner_id) = current {
            let owner = self.get(owner_id);
            if owner.kind == SyntaxKind::RootNamespace {
                break;
            }
            segments.push(owner.effective_name()?.as_str());
            current = owner.owner;
        }
        segments.reverse();
        Some(SmolStr::new(segments.join("::")))
    }

    /// Qualified name or a diagnostic-friendly placeholder.
    pub fn display_name(&self, id: ElementId) -> SmolStr {
        self.compute_qualified_name(id)
            .unwrap_or_else(|| SmolStr::new(format!("<anonymous {}>", self.get(id).kind.display())))
    }

    // ============================================================
    // Document lifecycle
    // ============================================================

    /// Reset every element of a document for a rebuild. Identity and node
    /// association survive; derived state does not.
    pub fn reset_document(&mut self, document: DocumentId) {
        for element in &mut self.arena {
            if element.document == document && element.alive {
                element.reset();
            }
        }
    }

    /// Tombstone every element of a removed document and drop its node
    /// associations. Ids are never reused.
    pub fn remove_document(&mut self, document: DocumentId) {
        for element in &mut self.arena {
            if element.document == document {
                element.bury();
            }
        }
        self.by_node.retain(|&(doc, _), _| doc != document);
    }

    /// Iterate live elements of one document.
    pub fn document_elements(
        &self,
        document: DocumentId,
    ) -> impl Iterator<Item = &Element> + '_ {
        self.arena
            .iter()
            .filter(move |e| e.document == document && e.alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_chain() -> (Model, ElementId, ElementId, ElementId) {
        let mut model = Model::new();
        let doc = DocumentId::new(0);
        let root = model.ensure_element(doc, NodeId(0), SyntaxKind::RootNamespace);
        let pkg = model.ensure_element(doc, NodeId(1), SyntaxKind::Package);
        let part = model.ensure_element(doc, NodeId(2), SyntaxKind::PartDefinition);
        model.get_mut(pkg).name = Some(SmolStr::new("P"));
        model.get_mut(pkg).owner = Some(root);
        model.get_mut(part).name = Some(SmolStr::new("Vehicle"));
        model.get_mut(part).owner = Some(pkg);
        (model, root, pkg, part)
    }

    #[test]
    fn test_identity_monotone_and_reused() {
        let mut model = Model::new();
        let doc = DocumentId::new(0);
        let a = model.ensure_element(doc, NodeId(0), SyntaxKind::Package);
        let b = model.ensure_element(doc, NodeId(1), SyntaxKind::PartDefinition);
        assert!(b > a);

        // Same node gets the same element back
        let a2 = model.ensure_element(doc, NodeId(0), SyntaxKind::Package);
        assert_eq!(a, a2);

        // Reset keeps identity
        model.reset_document(doc);
        let a3 = model.ensure_element(doc, NodeId(0), SyntaxKind::Package);
        assert_eq!(a, a3);
    }

    #[test]
    fn test_qualified_name_memoized() {
        let (mut model, _root, pkg, part) = model_with_chain();
        assert_eq!(model.qualified_name(part).unwrap(), "P::Vehicle");
        assert_eq!(model.qualified_name(pkg).unwrap(), "P");
        // Cached value survives
        assert_eq!(model.get(part).qualified_name, Some(Some(SmolStr::new("P::Vehicle"))));
    }

    #[test]
    fn test_owning_namespace_skips_non_namespaces() {
        let (mut model, _root, pkg, part) = model_with_chain();
        let doc = DocumentId::new(0);
        let import = model.ensure_element(doc, NodeId(3), SyntaxKind::Import);
        let reference = model.ensure_element(doc, NodeId(4), SyntaxKind::Reference);
        model.get_mut(import).owner = Some(part);
        model.get_mut(reference).owner = Some(import);

        assert_eq!(model.owning_namespace(reference), Some(part));
        assert_eq!(model.owning_namespace(part), Some(pkg));
    }

    #[test]
    fn test_implied_duplicate_suppressed() {
        let (mut model, _root, pkg, part) = model_with_chain();
        assert!(model.add_relationship(
            part,
            Relationship::implied(RelationshipKind::Specialization, pkg)
        ));
        // Second implied edge of same kind+target is rejected
        assert!(!model.add_relationship(
            part,
            Relationship::implied(RelationshipKind::Specialization, pkg)
        ));
        assert_eq!(model.get(part).relationships.len(), 1);
    }

    #[test]
    fn test_explicit_suppresses_implied() {
        let (mut model, root, pkg, part) = model_with_chain();
        let mut explicit = Relationship::explicit(RelationshipKind::Specialization, NodeId(9));
        explicit.target = Some(root);
        model.add_relationship(part, explicit);
        assert!(!model.add_relationship(
            part,
            Relationship::implied(RelationshipKind::Specialization, pkg)
        ));
    }

    #[test]
    fn test_all_types_terminates_on_cycle() {
        let (mut model, _root, pkg, part) = model_with_chain();
        // part → pkg → part (cyclic generalization)
        model.add_relationship(
            part,
            Relationship::implied(RelationshipKind::Specialization, pkg),
        );
        model.add_relationship(
            pkg,
            Relationship::implied(RelationshipKind::Specialization, part),
        );
        let types = model.all_types(part);
        assert_eq!(types.len(), 2);
        assert_eq!(types[0], part);
    }
}
