//! Implicit standard-library relationship synthesis.
//!
//! Every type implicitly specializes a standard-library base element unless
//! it already declares an explicit relationship of the same kind. The base
//! is chosen by the most specific syntax kind with an entry in the table;
//! definitions specialize, usages subset.

use tracing::trace;

use super::context::BuildCtx;
use crate::semantic::element::{ElementId, Relationship, RelationshipKind};
use crate::semantic::types::{Diagnostic, SemanticError, StdlibMode};
use crate::syntax::SyntaxKind;

/// (kind, library base) table. Order does not matter; selection walks the
/// element's kind ancestry and takes the first kind with an entry.
const BASE_TYPES: &[(SyntaxKind, &str)] = &[
    // Kernel
    (SyntaxKind::Classifier, "Base::Anything"),
    (SyntaxKind::DataType, "Base::DataValue"),
    (SyntaxKind::Class, "Occurrences::Occurrence"),
    (SyntaxKind::Structure, "Objects::Object"),
    (SyntaxKind::Association, "Links::Link"),
    (SyntaxKind::Behavior, "Performances::Performance"),
    (SyntaxKind::Function, "Performances::Evaluation"),
    (SyntaxKind::Feature, "Base::things"),
    (SyntaxKind::Step, "Performances::performances"),
    (SyntaxKind::Expression, "Performances::evaluations"),
    (SyntaxKind::Connector, "Links::links"),
    (SyntaxKind::BindingConnector, "Links::selfLinks"),
    // Definitions
    (SyntaxKind::ItemDefinition, "Items::Item"),
    (SyntaxKind::PartDefinition, "Parts::Part"),
    (SyntaxKind::AttributeDefinition, "Attributes::AttributeValue"),
    (SyntaxKind::PortDefinition, "Ports::Port"),
    (SyntaxKind::ActionDefinition, "Actions::Action"),
    (SyntaxKind::StateDefinition, "States::StateAction"),
    (SyntaxKind::ConstraintDefinition, "Constraints::ConstraintCheck"),
    (
        SyntaxKind::RequirementDefinition,
        "Requirements::RequirementCheck",
    ),
    (SyntaxKind::ConnectionDefinition, "Connections::Connection"),
    (SyntaxKind::InterfaceDefinition, "Interfaces::Interface"),
    (SyntaxKind::MetadataDefinition, "Metadata::MetadataItem"),
    // Usages
    (SyntaxKind::ItemUsage, "Items::items"),
    (SyntaxKind::PartUsage, "Parts::parts"),
    (SyntaxKind::AttributeUsage, "Attributes::attributeValues"),
    (SyntaxKind::PortUsage, "Ports::ports"),
    (SyntaxKind::ActionUsage, "Actions::actions"),
    (SyntaxKind::StateUsage, "States::stateActions"),
    (SyntaxKind::TransitionUsage, "Actions::transitionActions"),
    (SyntaxKind::ConstraintUsage, "Constraints::constraintChecks"),
    (SyntaxKind::RequirementUsage, "Requirements::requirementChecks"),
    (SyntaxKind::ConnectionUsage, "Connections::connections"),
    (SyntaxKind::InterfaceUsage, "Interfaces::interfaces"),
    (SyntaxKind::MetadataUsage, "Metadata::metadataItems"),
];

fn base_for(kind: SyntaxKind) -> Option<&'static str> {
    for ancestor in kind.ancestry() {
        if let Some((_, base)) = BASE_TYPES.iter().find(|(k, _)| *k == ancestor) {
            return Some(base);
        }
    }
    None
}

/// Whether the implied relationship for this element is a classifier-style
/// specialization or a feature-style subsetting.
fn implied_kind(kind: SyntaxKind) -> RelationshipKind {
    if kind.is_a(SyntaxKind::Feature) {
        RelationshipKind::Subsetting
    } else {
        RelationshipKind::Specialization
    }
}

/// Type rule: synthesize the implied base relationship.
pub(super) fn setup_implicit_relations(ctx: &mut BuildCtx<'_>, element: ElementId) {
    if !ctx.options.implicits_enabled() {
        return;
    }
    let document = ctx.model.get(element).document;
    let standalone = ctx
        .documents
        .get(document)
        .map(|d| d.standalone)
        .unwrap_or(true);
    if standalone {
        return;
    }

    let kind = ctx.model.get(element).kind;
    let Some(base) = base_for(kind) else {
        return;
    };
    let relationship_kind = implied_kind(kind);

    // An explicit edge of the same kind makes the implied one redundant
    if ctx.model.has_explicit(element, relationship_kind) {
        return;
    }

    let standalone_docs = ctx.documents.standalone_set();
    let Some(target) = ctx
        .index
        .find_global_element(ctx.model, base, &standalone_docs)
    else {
        if ctx.options.stdlib == StdlibMode::Full {
            let message = SemanticError::MissingLibraryElement {
                qualified_name: base.into(),
            }
            .to_string();
            if let Some(doc) = ctx.documents.get_mut(document) {
                doc.diagnostics
                    .push(Diagnostic::warning(document, None, message).with_code("stdlib-missing"));
            }
        }
        return;
    };
    if target == element {
        // The library base itself gets no self-edge
        return;
    }

    trace!(
        "[BUILD] implied {:?} {} -> {}",
        relationship_kind,
        ctx.model.display_name(element),
        base
    );
    ctx.model
        .add_relationship(element, Relationship::implied(relationship_kind, target));

    let target_doc = ctx.model.get(target).document;
    if target_doc != document {
        ctx.index.record_dependency(document, target_doc);
        ctx.documents.record_dependency(document, target_doc);
    }
}
