//! Standard setup rules.

use tracing::trace;

use super::context::BuildCtx;
use crate::semantic::element::ElementId;
use crate::semantic::linker;
use crate::semantic::types::{Diagnostic, SemanticError};
use crate::syntax::NodeId;

/// Namespace rule: make the namespace's import edges usable before anything
/// looks into it.
pub(super) fn setup_namespace_imports(ctx: &mut BuildCtx<'_>, element: ElementId) {
    super::ensure_imports_resolved(ctx, element);
}

/// Type rule: resolve the reference chain of every explicit generalization
/// edge so the inherited scope is complete.
pub(super) fn setup_type_generalizations(ctx: &mut BuildCtx<'_>, element: ElementId) {
    let document = ctx.model.get(element).document;
    let pending: Vec<NodeId> = ctx
        .model
        .get(element)
        .relationships
        .iter()
        .filter(|r| r.kind.is_generalization() && !r.is_implied && r.target.is_none())
        .filter_map(|r| r.reference)
        .collect();
    for reference in pending {
        linker::resolve_reference(ctx, document, reference);
    }
}

/// Metadata rule: hand the usage's argument expressions to the embedder's
/// evaluator, if one is plugged in. Evaluation failures degrade to
/// diagnostics; the element still builds structurally.
pub(super) fn setup_metadata_evaluation(ctx: &mut BuildCtx<'_>, element: ElementId) {
    let Some(evaluator) = ctx.evaluator else {
        return;
    };
    let document = ctx.model.get(element).document;
    let expressions: Vec<ElementId> = ctx
        .model
        .get(element)
        .children
        .values()
        .filter(|d| !d.is_alias)
        .map(|d| d.element)
        .filter(|&e| ctx.model.get(e).is(crate::syntax::SyntaxKind::Expression))
        .collect();
    for expression in expressions {
        match evaluator.evaluate(ctx.model, expression, element) {
            Ok(values) => {
                trace!(
                    "[BUILD] metadata {} evaluated to {} value(s)",
                    ctx.model.display_name(element),
                    values.len()
                );
            }
            Err(error) => {
                let span = ctx
                    .documents
                    .get(document)
                    .and_then(|d| d.tree.get(ctx.model.get(expression).node))
                    .and_then(|n| n.span);
                let message = SemanticError::MetadataEvaluation {
                    message: error.to_string(),
                }
                .to_string();
                if let Some(doc) = ctx.documents.get_mut(document) {
                    doc.diagnostics.push(
                        Diagnostic::warning(document, span, message).with_code("metadata-eval"),
                    );
                }
            }
        }
    }
}
