//! Chain resolution against the scope engine.
//!
//! Every chain runs the same state machine: `unresolved → resolving(i) →
//! resolved | error`, with the outcome cached on the chain so a second
//! attempt is a pure cache hit. Segment 0 resolves in the declaring
//! context's enclosing scopes; segments after a qualifier resolve strictly
//! inside the previous segment's local scope.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::reference::{ChainOutcome, ElementReference};
use crate::base::DocumentId;
use crate::semantic::builder::{self, BuildCtx};
use crate::semantic::element::{ElementId, RelationshipKind};
use crate::semantic::scope::{self, AliasPolicy, ScopeOptions, VisibilityPolicy};
use crate::semantic::types::{Diagnostic, ExpectedKind, LinkError};
use crate::syntax::{NodeId, ReferenceRole, SyntaxKind};

/// The element kind a role expects of its final target.
fn expected_kind(role: ReferenceRole) -> ExpectedKind {
    match role {
        ReferenceRole::Specialization | ReferenceRole::Conjugation | ReferenceRole::Typing
        | ReferenceRole::Callee => ExpectedKind::Type,
        ReferenceRole::Subsetting
        | ReferenceRole::Redefinition
        | ReferenceRole::ReferenceSubsetting
        | ReferenceRole::FeatureChain
        | ReferenceRole::FeatureReference
        | ReferenceRole::NamedArgument => ExpectedKind::Feature,
        ReferenceRole::Import
        | ReferenceRole::Expose
        | ReferenceRole::Alias
        | ReferenceRole::MetadataAccess => ExpectedKind::Element,
    }
}

fn is_generalization_role(role: ReferenceRole) -> bool {
    RelationshipKind::from_role(role)
        .map(|k| k.is_generalization())
        .unwrap_or(false)
}

/// Resolve one reference chain. Idempotent: settled chains return their
/// cached outcome without doing any work.
pub(crate) fn resolve_reference(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    node: NodeId,
) -> Option<ElementId> {
    let (role, segment_count) = {
        let doc = ctx.documents.get(document)?;
        let reference = doc.references.get(&node)?;
        match &reference.outcome {
            ChainOutcome::Resolved(target) => return Some(*target),
            ChainOutcome::Failed(_) => return None,
            ChainOutcome::Unresolved => {}
        }
        (reference.role, reference.segments.len())
    };
    if segment_count == 0 {
        return None;
    }

    let parent_node = ctx.documents.get(document)?.tree.node(node).parent?;
    let context = ctx.model.element_for_node(document, parent_node)?;

    let result = if role == ReferenceRole::NamedArgument {
        resolve_named_argument(ctx, document, node, context)
    } else {
        resolve_chain(ctx, document, node, context, role)
    };

    match result {
        Ok(target) => {
            settle(ctx, document, node, ChainOutcome::Resolved(target));
            attach_to_relationship(ctx, context, node, target);
            // Eager construction of the referenced element; the setup-state
            // guard makes this safe under cyclic references.
            builder::ensure_setup(ctx, target);
            let target_doc = ctx.model.get(target).document;
            if target_doc != document {
                ctx.index.record_dependency(document, target_doc);
                ctx.documents.record_dependency(document, target_doc);
            }
            Some(target)
        }
        Err(error) => {
            trace!("[LINK] failed {:?}/{:?}: {}", document, node, error);
            let span = ctx
                .documents
                .get(document)
                .and_then(|d| d.references.get(&node))
                .and_then(|r| r.segment_span(0));
            let message = error.to_string();
            settle(ctx, document, node, ChainOutcome::Failed(error));
            if let Some(doc) = ctx.documents.get_mut(document) {
                doc.diagnostics
                    .push(Diagnostic::error(document, span, message).with_code("link-unresolved"));
            }
            None
        }
    }
}

/// Read a chain's cached outcome without triggering resolution.
pub(crate) fn peek_reference(
    ctx: &BuildCtx<'_>,
    document: DocumentId,
    node: NodeId,
) -> Option<ElementId> {
    ctx.documents
        .get(document)?
        .references
        .get(&node)
        .and_then(ElementReference::target)
}

fn settle(ctx: &mut BuildCtx<'_>, document: DocumentId, node: NodeId, outcome: ChainOutcome) {
    if let Some(doc) = ctx.documents.get_mut(document) {
        if let Some(reference) = doc.references.get_mut(&node) {
            reference.outcome = outcome;
        }
    }
}

fn record_segment(ctx: &mut BuildCtx<'_>, document: DocumentId, node: NodeId, index: usize, target: ElementId) {
    if let Some(doc) = ctx.documents.get_mut(document) {
        if let Some(reference) = doc.references.get_mut(&node) {
            if let Some(segment) = reference.segments.get_mut(index) {
                segment.resolved = Some(target);
            }
        }
    }
}

/// Attach the resolved target to the explicit relationship declared with
/// this reference. The relationship lives on the declaring element, except
/// for imports where it lives on the importing namespace.
fn attach_to_relationship(
    ctx: &mut BuildCtx<'_>,
    context: ElementId,
    node: NodeId,
    target: ElementId,
) {
    for candidate in [Some(context), ctx.model.owner(context)].into_iter().flatten() {
        let element = ctx.model.get_mut(candidate);
        if let Some(rel) = element
            .relationships
            .iter_mut()
            .find(|r| r.reference == Some(node))
        {
            rel.target = Some(target);
            return;
        }
    }
}

/// The namespace where segment-0 lookup starts, and the element to skip.
///
/// Connector ends resolve supertype references relative to the connector's
/// owner: an end must not see its own connector's other features.
fn start_context(
    ctx: &BuildCtx<'_>,
    context: ElementId,
    role: ReferenceRole,
) -> (ElementId, Option<ElementId>) {
    let skip = if is_generalization_role(role) && !role.allows_self_reference() {
        Some(context)
    } else {
        None
    };
    if is_generalization_role(role) {
        if let Some(owner) = ctx.model.owner(context) {
            if ctx.model.get(owner).is(SyntaxKind::Connector) {
                let start = ctx.model.owner(owner).unwrap_or(owner);
                return (start, skip);
            }
        }
    }
    (context, skip)
}

fn resolve_chain(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    node: NodeId,
    context: ElementId,
    role: ReferenceRole,
) -> Result<ElementId, LinkError> {
    let segments: Vec<SmolStr> = ctx
        .documents
        .get(document)
        .and_then(|d| d.references.get(&node))
        .map(|r| r.segments.iter().map(|s| s.text.clone()).collect())
        .unwrap_or_default();

    let (start, skip) = start_context(ctx, context, role);
    let opts = ScopeOptions {
        skip,
        alias: AliasPolicy::Resolve,
    };

    let mut current: Option<ElementId> = None;
    for (index, segment) in segments.iter().enumerate() {
        let found = match current {
            None => scope::lookup_from(ctx, start, segment, opts),
            Some(previous) => {
                // After a qualifier, resolution is strictly inside that
                // qualifier's namespace.
                if !ctx.model.get(previous).is_namespace() {
                    return Err(LinkError::WrongKind {
                        found_name: ctx.model.display_name(previous).to_string(),
                        found_kind: ctx.model.get(previous).kind,
                        expected: ExpectedKind::Namespace,
                    });
                }
                let vis = if is_enclosing(ctx, context, previous) {
                    VisibilityPolicy::INSIDE
                } else {
                    VisibilityPolicy::OUTSIDE
                };
                let mut visited = FxHashSet::default();
                let suppressed = FxHashSet::default();
                scope::lookup_in(
                    ctx,
                    previous,
                    segment,
                    vis,
                    ScopeOptions {
                        skip: None,
                        alias: AliasPolicy::Resolve,
                    },
                    &mut visited,
                    &suppressed,
                )
            }
        };

        match found {
            Some(element) => {
                record_segment(ctx, document, node, index, element);
                current = Some(element);
            }
            None => {
                let partial = ctx
                    .documents
                    .get(document)
                    .and_then(|d| d.references.get(&node))
                    .map(|r| r.partial_path(index))
                    .unwrap_or_default();
                maybe_dump_scope(ctx, start, segment);
                return Err(LinkError::UnresolvedSegment {
                    segment: segment.clone(),
                    index,
                    path: partial,
                });
            }
        }
    }

    // Empty chains never reach here; the caller filtered them out
    let Some(target) = current else {
        return Err(LinkError::UnresolvedSegment {
            segment: SmolStr::default(),
            index: 0,
            path: String::new(),
        });
    };
    let expected = expected_kind(role);
    let target_kind = ctx.model.get(target).kind;
    if !expected.matches(target_kind) {
        return Err(LinkError::WrongKind {
            found_name: ctx.model.display_name(target).to_string(),
            found_kind: target_kind,
            expected,
        });
    }
    Ok(target)
}

fn is_enclosing(ctx: &BuildCtx<'_>, context: ElementId, namespace: ElementId) -> bool {
    context == namespace || ctx.model.owners(context).any(|o| o == namespace)
}

/// Named arguments resolve against the invoked type's parameter list, not
/// the lexical scope of the call site.
fn resolve_named_argument(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    node: NodeId,
    context: ElementId,
) -> Result<ElementId, LinkError> {
    let name = ctx
        .documents
        .get(document)
        .and_then(|d| d.references.get(&node))
        .and_then(|r| r.argument_name.clone())
        .ok_or_else(|| LinkError::UnresolvedSegment {
            segment: SmolStr::new(""),
            index: 0,
            path: String::new(),
        })?;

    let callee = find_callee(ctx, document, context).ok_or_else(|| {
        LinkError::UnresolvedSegment {
            segment: name.clone(),
            index: 0,
            path: String::new(),
        }
    })?;

    // Parameters of the callee and everything it inherits, in order
    for ty in ctx.model.all_types(callee) {
        let parameters: Vec<ElementId> = ctx
            .model
            .get(ty)
            .children
            .values()
            .filter(|d| !d.is_alias)
            .map(|d| d.element)
            .filter(|&e| ctx.model.get(e).direction.is_some())
            .collect();
        for parameter in parameters {
            if ctx.model.get(parameter).effective_name().map(|n| n.as_str()) == Some(name.as_str())
            {
                return Ok(parameter);
            }
        }
    }

    Err(LinkError::UnresolvedSegment {
        segment: name,
        index: 0,
        path: ctx.model.display_name(callee).to_string(),
    })
}

/// The resolved callee of the invocation expression enclosing `context`.
fn find_callee(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    context: ElementId,
) -> Option<ElementId> {
    let mut invocation = Some(context);
    while let Some(el) = invocation {
        if ctx.model.get(el).is(SyntaxKind::InvocationExpression) {
            break;
        }
        invocation = ctx.model.owner(el);
    }
    let invocation = invocation?;
    let invocation_node = ctx.model.get(invocation).node;

    let callee_ref: Option<NodeId> = {
        let doc = ctx.documents.get(document)?;
        doc.tree
            .children(invocation_node)
            .iter()
            .copied()
            .find(|&c| {
                doc.tree
                    .node(c)
                    .reference
                    .as_ref()
                    .map(|r| r.role == ReferenceRole::Callee)
                    .unwrap_or(false)
            })
    };
    resolve_reference(ctx, document, callee_ref?)
}

/// Resolve an alias member to its final non-alias target.
///
/// Recursive and cycle-guarded: the context's visiting set turns circular
/// alias chains into "no target" plus a diagnostic instead of a hang.
pub(crate) fn resolve_alias(
    ctx: &mut BuildCtx<'_>,
    alias: ElementId,
    policy: AliasPolicy,
) -> Option<ElementId> {
    if !ctx.model.get(alias).is(SyntaxKind::Alias) {
        return Some(alias);
    }
    if !ctx.alias_visiting.insert(alias) {
        let document = ctx.model.get(alias).document;
        let name = ctx.model.display_name(alias);
        let message = LinkError::CircularAlias {
            alias: name.clone(),
        }
        .to_string();
        if let Some(doc) = ctx.documents.get_mut(document) {
            doc.diagnostics
                .push(Diagnostic::error(document, None, message).with_code("link-alias-cycle"));
        }
        return None;
    }

    let result = resolve_alias_inner(ctx, alias, policy);
    ctx.alias_visiting.remove(&alias);
    result
}

fn resolve_alias_inner(
    ctx: &mut BuildCtx<'_>,
    alias: ElementId,
    policy: AliasPolicy,
) -> Option<ElementId> {
    let reference = ctx
        .model
        .get(alias)
        .relationships
        .iter()
        .find(|r| r.kind == RelationshipKind::Alias)
        .and_then(|r| r.reference)?;
    let document = ctx.model.get(alias).document;

    let target = match policy {
        AliasPolicy::Resolve => resolve_reference(ctx, document, reference),
        AliasPolicy::ReadOnly => peek_reference(ctx, document, reference),
    }?;

    if ctx.model.get(target).is(SyntaxKind::Alias) {
        resolve_alias(ctx, target, policy)
    } else {
        Some(target)
    }
}

fn maybe_dump_scope(ctx: &mut BuildCtx<'_>, start: ElementId, segment: &str) {
    if !ctx.options.dump_scope_on_error {
        return;
    }
    let visible = scope::all_visible_from(ctx, start, ScopeOptions::default());
    tracing::debug!(
        "[LINK] scope dump for '{}' from {}: {:?}",
        segment,
        ctx.model.display_name(start),
        visible.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>()
    );
}
