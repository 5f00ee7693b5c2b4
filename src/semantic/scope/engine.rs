//! Scope traversal — "what is visible from here".
//!
//! Scopes are never materialized: each query lazily walks the composition
//! of owned members, inherited scopes (through the generalization graph),
//! and imported scopes (through the four import kinds), with visibility and
//! depth filtering applied along the way. Cross-request reuse happens only
//! through the workspace's cached indices, never through scope objects.
//!
//! Traversal may trigger construction: looking into a namespace first
//! ensures its element is set up, which can recursively build elements in
//! other documents. The per-element setup states in the builder make that
//! re-entrancy safe.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use super::visibility::VisibilityPolicy;
use crate::semantic::builder::{self, BuildCtx};
use crate::semantic::element::{ElementId, Model, RelationshipKind};
use crate::semantic::linker;
use crate::syntax::{ImportKind, Visibility};

/// How alias members encountered during traversal are handled.
///
/// The linker actively resolves aliases while linking; read-only consumers
/// (hover, completion) must not trigger new linking work and only see
/// aliases whose targets are already known.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum AliasPolicy {
    #[default]
    Resolve,
    ReadOnly,
}

/// Per-query parameters.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScopeOptions {
    /// Element excluded from matching — the declaring element itself while
    /// its own specialization list is being resolved.
    pub skip: Option<ElementId>,
    pub alias: AliasPolicy,
}

/// One import edge flattened for traversal.
struct ImportEdge {
    kind: ImportKind,
    visibility: Visibility,
    target: ElementId,
}

fn import_edges(ctx: &BuildCtx<'_>, ns: ElementId) -> Vec<ImportEdge> {
    ctx.model
        .get(ns)
        .relationships
        .iter()
        .filter(|r| matches!(r.kind, RelationshipKind::Import | RelationshipKind::Expose))
        .filter_map(|r| {
            let target = r.target?;
            let visibility = r
                .via
                .map(|via| ctx.model.get(via).visibility)
                .unwrap_or(Visibility::Private);
            Some(ImportEdge {
                kind: r.import_kind.unwrap_or(ImportKind::Specific),
                visibility,
                target,
            })
        })
        .collect()
}

/// Whether `element` is nameable as `name` (regular or short name).
fn answers_to(model: &Model, element: ElementId, name: &str) -> bool {
    let el = model.get(element);
    el.name.as_deref() == Some(name) || el.short_name.as_deref() == Some(name)
}

/// Targets redefined by `ns` or by its own members; those are hidden from
/// lookups descending into inherited scopes so the redefinition wins.
fn collect_redefined(model: &Model, ns: ElementId, hidden: &mut FxHashSet<ElementId>) {
    hidden.extend(model.targets_of(ns, RelationshipKind::Redefinition));
    let members: Vec<ElementId> = ctx_members(model, ns);
    for member in members {
        hidden.extend(model.targets_of(member, RelationshipKind::Redefinition));
    }
}

fn ctx_members(model: &Model, ns: ElementId) -> Vec<ElementId> {
    model
        .get(ns)
        .children
        .values()
        .filter(|d| !d.is_alias)
        .map(|d| d.element)
        .collect()
}

/// Look up `name` in the scope of `ns`: own members first, then inherited
/// scopes, then imported scopes. First visibility-satisfying,
/// non-suppressed match wins.
///
/// `visited` guards both import cycles and cyclic generalization graphs;
/// `suppressed` carries redefinition hiding down the inheritance walk.
pub(crate) fn lookup_in(
    ctx: &mut BuildCtx<'_>,
    ns: ElementId,
    name: &str,
    vis: VisibilityPolicy,
    opts: ScopeOptions,
    visited: &mut FxHashSet<ElementId>,
    suppressed: &FxHashSet<ElementId>,
) -> Option<ElementId> {
    if !visited.insert(ns) {
        return None;
    }
    builder::ensure_setup(ctx, ns);

    // 1. Own members
    if let Some(desc) = ctx.model.get(ns).children.get(name).cloned() {
        if vis.allows(desc.visibility) {
            let resolved = if desc.is_alias {
                linker::resolve_alias(ctx, desc.element, opts.alias)
            } else {
                Some(desc.element)
            };
            if let Some(found) = resolved {
                if Some(found) != opts.skip && !suppressed.contains(&found) {
                    trace!("[SCOPE] '{}' found in {}", name, ctx.model.display_name(ns));
                    return Some(found);
                }
            }
        }
    }

    // 2. Inherited scopes
    let supertypes = ctx.model.supertypes(ns);
    if !supertypes.is_empty() {
        let inherited_vis = vis.descend(Visibility::Protected);
        let mut hidden = suppressed.clone();
        collect_redefined(ctx.model, ns, &mut hidden);
        for sup in supertypes {
            if let Some(found) = lookup_in(ctx, sup, name, inherited_vis, opts, visited, &hidden) {
                return Some(found);
            }
        }
    }

    // 3. Imported scopes
    builder::ensure_imports_resolved(ctx, ns);
    let imported_vis = vis.descend(Visibility::Public);
    for edge in import_edges(ctx, ns) {
        // The import's own visibility governs re-export to outside lookups
        if !vis.allows(edge.visibility) {
            continue;
        }
        let found = match edge.kind {
            ImportKind::Specific => (answers_to(ctx.model, edge.target, name)
                && Some(edge.target) != opts.skip
                && !suppressed.contains(&edge.target))
            .then_some(edge.target),
            ImportKind::Wildcard => {
                lookup_in(ctx, edge.target, name, imported_vis, opts, visited, suppressed)
            }
            ImportKind::Recursive => (answers_to(ctx.model, edge.target, name)
                && Some(edge.target) != opts.skip
                && !suppressed.contains(&edge.target))
            .then_some(edge.target)
            .or_else(|| {
                lookup_closure(ctx, edge.target, name, imported_vis, opts, visited, suppressed)
            }),
            ImportKind::RecursiveExclusive => {
                lookup_closure(ctx, edge.target, name, imported_vis, opts, visited, suppressed)
            }
        };
        if found.is_some() {
            return found;
        }
    }

    None
}

/// Recursive-import shape: the namespace's members, then the members of its
/// member namespaces, transitively.
fn lookup_closure(
    ctx: &mut BuildCtx<'_>,
    ns: ElementId,
    name: &str,
    vis: VisibilityPolicy,
    opts: ScopeOptions,
    visited: &mut FxHashSet<ElementId>,
    suppressed: &FxHashSet<ElementId>,
) -> Option<ElementId> {
    if let Some(found) = lookup_in(ctx, ns, name, vis, opts, visited, suppressed) {
        return Some(found);
    }
    let nested: Vec<ElementId> = ctx
        .model
        .get(ns)
        .children
        .values()
        .filter(|d| !d.is_alias && vis.allows(d.visibility))
        .map(|d| d.element)
        .filter(|&e| ctx.model.get(e).is_namespace())
        .collect();
    for child in nested {
        if let Some(found) = lookup_closure(ctx, child, name, vis, opts, visited, suppressed) {
            return Some(found);
        }
    }
    None
}

/// Look up `name` as seen from `context`: the context's own scope (if it is
/// a namespace), each enclosing scope outward, then the workspace-global
/// exports. This is the segment-0 lookup of the linker.
pub(crate) fn lookup_from(
    ctx: &mut BuildCtx<'_>,
    context: ElementId,
    name: &str,
    opts: ScopeOptions,
) -> Option<ElementId> {
    let mut chain = Vec::new();
    if ctx.model.get(context).is_namespace() {
        chain.push(context);
    }
    chain.extend(
        ctx.model
            .owners(context)
            .filter(|&o| ctx.model.get(o).is_namespace())
            .collect::<Vec<_>>(),
    );

    for ns in chain {
        let mut visited = FxHashSet::default();
        let suppressed = FxHashSet::default();
        if let Some(found) = lookup_in(
            ctx,
            ns,
            name,
            VisibilityPolicy::INSIDE,
            opts,
            &mut visited,
            &suppressed,
        ) {
            return Some(found);
        }
    }

    lookup_global(ctx, context, name, opts)
}

/// Last-resort lookup in the merged cross-document global scope.
fn lookup_global(
    ctx: &mut BuildCtx<'_>,
    context: ElementId,
    name: &str,
    opts: ScopeOptions,
) -> Option<ElementId> {
    let context_doc = ctx.model.get(context).document;
    if ctx.documents.get(context_doc)?.standalone {
        return None;
    }
    let language = ctx.documents.get(context_doc)?.language.clone();
    let standalone_docs = ctx.documents.standalone_set();
    let (provider, found) =
        ctx.index
            .find_export(name, Some(&language), &standalone_docs, Some(context_doc))?;
    ctx.index.record_dependency(context_doc, provider);
    ctx.documents.record_dependency(context_doc, provider);
    let found = linker::resolve_alias(ctx, found, opts.alias)?;
    if Some(found) == opts.skip {
        return None;
    }
    Some(found)
}

/// Enumerate every element visible inside `ns`, deduplicated by identity.
/// The same element reachable through several inheritance/import paths is
/// reported once, under the first name it was seen by.
pub(crate) fn all_visible_in(
    ctx: &mut BuildCtx<'_>,
    ns: ElementId,
    vis: VisibilityPolicy,
    opts: ScopeOptions,
) -> Vec<(SmolStr, ElementId)> {
    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    let mut visited = FxHashSet::default();
    collect_visible(ctx, ns, vis, opts, &mut visited, &mut seen, &mut out);
    out
}

fn collect_visible(
    ctx: &mut BuildCtx<'_>,
    ns: ElementId,
    vis: VisibilityPolicy,
    opts: ScopeOptions,
    visited: &mut FxHashSet<ElementId>,
    seen: &mut FxHashSet<ElementId>,
    out: &mut Vec<(SmolStr, ElementId)>,
) {
    if !visited.insert(ns) {
        return;
    }
    builder::ensure_setup(ctx, ns);

    let mut hidden = FxHashSet::default();
    collect_redefined(ctx.model, ns, &mut hidden);

    let own: Vec<(SmolStr, ElementId, Visibility, bool)> = ctx
        .model
        .get(ns)
        .children
        .iter()
        .map(|(n, d)| (n.clone(), d.element, d.visibility, d.is_alias))
        .collect();
    for (name, element, visibility, is_alias) in own {
        if !vis.allows(visibility) {
            continue;
        }
        let resolved = if is_alias {
            linker::resolve_alias(ctx, element, opts.alias)
        } else {
            Some(element)
        };
        if let Some(el) = resolved {
            if Some(el) != opts.skip && seen.insert(el) {
                out.push((name, el));
            }
        }
    }

    let inherited_vis = vis.descend(Visibility::Protected);
    for sup in ctx.model.supertypes(ns) {
        let before = out.len();
        collect_visible(ctx, sup, inherited_vis, opts, visited, seen, out);
        // Inherited members hidden by redefinitions in this scope
        out.drain(before..)
            .collect::<Vec<_>>()
            .into_iter()
            .for_each(|(name, el)| {
                if hidden.contains(&el) {
                    seen.remove(&el);
                } else {
                    out.push((name, el));
                }
            });
    }

    builder::ensure_imports_resolved(ctx, ns);
    let imported_vis = vis.descend(Visibility::Public);
    for edge in import_edges(ctx, ns) {
        if !vis.allows(edge.visibility) {
            continue;
        }
        match edge.kind {
            ImportKind::Specific => {
                push_named(ctx.model, edge.target, seen, out);
            }
            ImportKind::Wildcard => {
                collect_visible(ctx, edge.target, imported_vis, opts, visited, seen, out);
            }
            ImportKind::Recursive => {
                push_named(ctx.model, edge.target, seen, out);
                collect_closure(ctx, edge.target, imported_vis, opts, visited, seen, out);
            }
            ImportKind::RecursiveExclusive => {
                collect_closure(ctx, edge.target, imported_vis, opts, visited, seen, out);
            }
        }
    }
}

fn collect_closure(
    ctx: &mut BuildCtx<'_>,
    ns: ElementId,
    vis: VisibilityPolicy,
    opts: ScopeOptions,
    visited: &mut FxHashSet<ElementId>,
    seen: &mut FxHashSet<ElementId>,
    out: &mut Vec<(SmolStr, ElementId)>,
) {
    collect_visible(ctx, ns, vis, opts, visited, seen, out);
    let nested: Vec<ElementId> = ctx
        .model
        .get(ns)
        .children
        .values()
        .filter(|d| !d.is_alias && vis.allows(d.visibility))
        .map(|d| d.element)
        .filter(|&e| ctx.model.get(e).is_namespace())
        .collect();
    for child in nested {
        collect_closure(ctx, child, vis, opts, visited, seen, out);
    }
}

fn push_named(
    model: &Model,
    element: ElementId,
    seen: &mut FxHashSet<ElementId>,
    out: &mut Vec<(SmolStr, ElementId)>,
) {
    if let Some(name) = model.get(element).effective_name().cloned() {
        if seen.insert(element) {
            out.push((name, element));
        }
    }
}

/// Enumerate everything visible from `context`, walking the enclosing
/// scopes outward and finishing with the global exports.
pub(crate) fn all_visible_from(
    ctx: &mut BuildCtx<'_>,
    context: ElementId,
    opts: ScopeOptions,
) -> Vec<(SmolStr, ElementId)> {
    let mut chain = Vec::new();
    if ctx.model.get(context).is_namespace() {
        chain.push(context);
    }
    chain.extend(
        ctx.model
            .owners(context)
            .filter(|&o| ctx.model.get(o).is_namespace())
            .collect::<Vec<_>>(),
    );

    let mut out = Vec::new();
    let mut seen = FxHashSet::default();
    let mut visited = FxHashSet::default();
    for ns in chain {
        collect_visible(
            ctx,
            ns,
            VisibilityPolicy::INSIDE,
            opts,
            &mut visited,
            &mut seen,
            &mut out,
        );
    }

    let context_doc = ctx.model.get(context).document;
    if !ctx
        .documents
        .get(context_doc)
        .map(|d| d.standalone)
        .unwrap_or(true)
    {
        let standalone_docs = ctx.documents.standalone_set();
        for (name, element) in ctx.index.all_exports(&standalone_docs) {
            let Some(element) = linker::resolve_alias(ctx, element, opts.alias) else {
                continue;
            };
            if seen.insert(element) {
                out.push((name, element));
            }
        }
    }
    out
}
