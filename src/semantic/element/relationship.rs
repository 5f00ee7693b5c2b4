//! Relationships — directional edges from an owning element to a target.

use super::element::ElementId;
use crate::syntax::{ImportKind, NodeId, ReferenceRole};

/// The kind of a relationship edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// `:>` on classifiers — generalization edge in the type graph.
    Specialization,
    /// `:>` on features.
    Subsetting,
    /// `:>>`.
    Redefinition,
    /// `~`.
    Conjugation,
    /// `:` feature typing.
    FeatureTyping,
    /// `::>` reference subsetting.
    ReferenceSubsetting,
    /// Featuring context of a feature.
    Featuring,
    /// Namespace import.
    Import,
    /// View expose (import variant).
    Expose,
    /// Alias membership redirect.
    Alias,
}

impl RelationshipKind {
    /// Whether this edge contributes supertypes to the owner's inherited
    /// scope.
    pub fn is_generalization(self) -> bool {
        matches!(
            self,
            RelationshipKind::Specialization
                | RelationshipKind::Subsetting
                | RelationshipKind::Redefinition
                | RelationshipKind::FeatureTyping
                | RelationshipKind::ReferenceSubsetting
        )
    }

    /// The relationship kind established by a reference role, if any.
    pub fn from_role(role: ReferenceRole) -> Option<Self> {
        Some(match role {
            ReferenceRole::Specialization => RelationshipKind::Specialization,
            ReferenceRole::Subsetting => RelationshipKind::Subsetting,
            ReferenceRole::Redefinition => RelationshipKind::Redefinition,
            ReferenceRole::Typing => RelationshipKind::FeatureTyping,
            ReferenceRole::Conjugation => RelationshipKind::Conjugation,
            ReferenceRole::ReferenceSubsetting => RelationshipKind::ReferenceSubsetting,
            ReferenceRole::Import => RelationshipKind::Import,
            ReferenceRole::Expose => RelationshipKind::Expose,
            ReferenceRole::Alias => RelationshipKind::Alias,
            _ => return None,
        })
    }
}

/// A directional edge from its owning element to a target.
///
/// Explicit relationships carry the syntax reference node they were written
/// as; their `target` fills in when the linker resolves that reference.
/// Implied relationships are synthesized already-resolved and must never
/// duplicate an explicit one of the same kind and target.
#[derive(Clone, Debug)]
pub struct Relationship {
    pub kind: RelationshipKind,
    /// Synthesized by the builder rather than written by the user.
    pub is_implied: bool,
    /// The element that declared this edge on the owner's behalf (the
    /// import or alias member element), if any.
    pub via: Option<ElementId>,
    /// The reference chain node, for explicit relationships.
    pub reference: Option<NodeId>,
    /// Resolved target; `None` until linked (or if linking failed — the
    /// reference's outcome cell distinguishes the two).
    pub target: Option<ElementId>,
    /// Import shape, for `Import`/`Expose` edges.
    pub import_kind: Option<ImportKind>,
}

impl Relationship {
    /// An explicit relationship awaiting linking of its reference.
    pub fn explicit(kind: RelationshipKind, reference: NodeId) -> Self {
        Self {
            kind,
            is_implied: false,
            via: None,
            reference: Some(reference),
            target: None,
            import_kind: None,
        }
    }

    /// An implied relationship, synthesized already resolved.
    pub fn implied(kind: RelationshipKind, target: ElementId) -> Self {
        Self {
            kind,
            is_implied: true,
            via: None,
            reference: None,
            target: Some(target),
            import_kind: None,
        }
    }

    pub fn with_via(mut self, via: ElementId) -> Self {
        self.via = Some(via);
        self
    }

    pub fn with_import_kind(mut self, kind: ImportKind) -> Self {
        self.import_kind = Some(kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generalization_kinds() {
        assert!(RelationshipKind::Specialization.is_generalization());
        assert!(RelationshipKind::FeatureTyping.is_generalization());
        assert!(!RelationshipKind::Import.is_generalization());
        assert!(!RelationshipKind::Alias.is_generalization());
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(
            RelationshipKind::from_role(ReferenceRole::Typing),
            Some(RelationshipKind::FeatureTyping)
        );
        assert_eq!(RelationshipKind::from_role(ReferenceRole::Callee), None);
    }
}
