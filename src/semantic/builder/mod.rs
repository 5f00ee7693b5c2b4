//! The metamodel builder — turns raw syntax trees into the linked element
//! model through four passes per document:
//!
//! 1. attach: every non-reference node gets (or reuses) its element
//! 2. initialize: literal data, ownership, member tables, explicit
//!    relationship stubs, export publication
//! 3. pre-link: per-element setup rules from the registry
//! 4. link: settle every reference chain
//!
//! Passes 1 and 2 run together as "indexing". Construction is demand-driven
//! underneath: any scope lookup may call [`ensure_setup`] on an element of
//! another document long before that document's own pre-link pass runs. The
//! per-element setup states make that re-entrancy idempotent, and
//! cancellation between work items leaves every document at its last
//! completed state.

mod context;
mod implicit;
mod redefine;
mod registry;
mod setup;

pub use context::BuildCtx;
pub use registry::{SetupFn, SetupRegistry, SetupRule};

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::base::DocumentId;
use crate::semantic::element::{ElementId, Relationship, RelationshipKind, SetupState};
use crate::semantic::linker::{self, ElementReference};
use crate::semantic::types::{BuildError, Diagnostic, LinkError};
use crate::semantic::workspace::{BuildState, Workspace};
use crate::syntax::{ImportKind, NodeId, SyntaxKind, Visibility};

/// Recursion depth at which setup nesting is reported. Cycles are already
/// broken by the setup states; this catches degenerate deep models.
const SETUP_DEPTH_WARN: usize = 256;

/// Drives the build passes over a workspace.
pub struct MetamodelBuilder<'a> {
    ctx: BuildCtx<'a>,
    cancel: CancellationToken,
}

impl<'a> MetamodelBuilder<'a> {
    pub fn new(workspace: &'a mut Workspace, cancel: CancellationToken) -> Self {
        Self {
            ctx: workspace.build_ctx(),
            cancel,
        }
    }

    fn checkpoint(&self) -> Result<(), BuildError> {
        if self.cancel.is_cancelled() {
            Err(BuildError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Build every document to `Linked`.
    pub fn build_all(&mut self) -> Result<(), BuildError> {
        // Index everything first so cross-document lookups see all exports
        for id in self.ctx.documents.ids() {
            self.checkpoint()?;
            ensure_document_indexed(&mut self.ctx, id);
        }
        for id in self.ctx.documents.ids() {
            self.build_document(id)?;
        }
        Ok(())
    }

    /// Build one document to `Linked`. Other documents are indexed as
    /// needed but not linked.
    pub fn build_document(&mut self, document: DocumentId) -> Result<(), BuildError> {
        self.checkpoint()?;
        for id in self.ctx.documents.ids() {
            ensure_document_indexed(&mut self.ctx, id);
        }

        // Pre-link: run setup over every element of the document
        if self
            .ctx
            .documents
            .get(document)
            .map(|d| d.state < BuildState::PreLinked)
            .unwrap_or(false)
        {
            let elements: Vec<ElementId> = self
                .ctx
                .model
                .document_elements(document)
                .map(|e| e.id)
                .collect();
            for (i, element) in elements.into_iter().enumerate() {
                if i % 64 == 0 {
                    self.checkpoint()?;
                }
                ensure_setup(&mut self.ctx, element);
            }
            if let Some(doc) = self.ctx.documents.get_mut(document) {
                doc.state = BuildState::PreLinked;
            }
        }

        // Link: settle every remaining reference chain
        if self
            .ctx
            .documents
            .get(document)
            .map(|d| d.state < BuildState::Linked)
            .unwrap_or(false)
        {
            let mut pending: Vec<NodeId> = self
                .ctx
                .documents
                .get(document)
                .map(|d| {
                    d.references
                        .iter()
                        .filter(|(_, r)| !r.is_settled())
                        .map(|(&n, _)| n)
                        .collect()
                })
                .unwrap_or_default();
            pending.sort();
            for (i, node) in pending.into_iter().enumerate() {
                if i % 64 == 0 {
                    self.checkpoint()?;
                }
                linker::resolve_reference(&mut self.ctx, document, node);
            }
            if let Some(doc) = self.ctx.documents.get_mut(document) {
                doc.state = BuildState::Linked;
            }
        }
        Ok(())
    }
}

/// Attach and initialize a document's elements (passes 1 and 2). Idempotent
/// and cheap to call for already-indexed documents.
pub(crate) fn ensure_document_indexed(ctx: &mut BuildCtx<'_>, document: DocumentId) {
    let Some(doc) = ctx.documents.get(document) else {
        return;
    };
    if doc.state >= BuildState::Indexed {
        return;
    }
    trace!("[BUILD] indexing {}", doc.uri);

    let nodes: Vec<NodeId> = doc.tree.preorder().collect();
    for node_id in nodes {
        let Some(doc) = ctx.documents.get(document) else {
            return;
        };
        let node = doc.tree.node(node_id).clone();
        if node.kind == SyntaxKind::Reference {
            index_reference(ctx, document, node_id, &node);
        } else {
            index_element(ctx, document, node_id, &node);
        }
    }

    // Public root members become the document's contribution to the
    // global scope. Aliases are published unresolved; global lookups chase
    // them through the linker.
    let Some(doc) = ctx.documents.get(document) else {
        return;
    };
    let Some(root) = doc.root_element else {
        return;
    };
    let exports: Vec<_> = ctx
        .model
        .get(root)
        .children
        .iter()
        .filter(|(_, d)| d.visibility == Visibility::Public)
        .map(|(name, d)| (name.clone(), d.element, d.is_alias))
        .collect();
    let standalone = doc.standalone;
    let language = doc.language.clone();
    if let Some(doc) = ctx.documents.get_mut(document) {
        doc.exports = exports.iter().map(|(name, element, _)| (name.clone(), *element)).collect();
        doc.state = BuildState::Indexed;
    }
    if !standalone {
        ctx.index.publish_document(document, &language, &exports);
    }
}

fn index_element(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    node_id: NodeId,
    node: &crate::syntax::SyntaxNode,
) {
    let element = ctx.model.ensure_element(document, node_id, node.kind);

    // Literal data
    {
        let el = ctx.model.get_mut(element);
        el.name = node.name.clone();
        el.short_name = node.short_name.clone();
        el.direction = node.direction;
        el.is_abstract = node.is_abstract;
        // Unannotated imports are private, everything else public
        el.visibility = node.visibility.unwrap_or(if node.kind == SyntaxKind::Import {
            Visibility::Private
        } else {
            Visibility::default()
        });
    }

    let owner = node
        .parent
        .and_then(|p| ctx.model.element_for_node(document, p));
    ctx.model.get_mut(element).owner = owner;

    if node.kind == SyntaxKind::RootNamespace {
        if let Some(doc) = ctx.documents.get_mut(document) {
            doc.root_element = Some(element);
        }
        return;
    }
    let Some(owner) = owner else {
        return;
    };

    // Documentation bodies annotate the owner
    if matches!(node.kind, SyntaxKind::Documentation | SyntaxKind::Comment) {
        if let Some(text) = &node.text {
            ctx.model.get_mut(owner).docs.push(text.clone());
        }
        return;
    }

    // A feature nested in a type is featured by it
    if node.kind.is_a(SyntaxKind::Feature) && ctx.model.get(owner).kind.is_type() {
        ctx.model
            .add_relationship(element, Relationship::implied(RelationshipKind::Featuring, owner));
    }

    // Membership in the owner's scope, under both names
    let visibility = ctx.model.get(element).visibility;
    let is_alias = node.kind == SyntaxKind::Alias;
    if let Some(name) = node.name.clone() {
        ctx.model
            .add_member(owner, name, element, visibility, is_alias);
    }
    if let Some(short_name) = node.short_name.clone() {
        ctx.model
            .add_member(owner, short_name, element, visibility, is_alias);
    }
}

fn index_reference(
    ctx: &mut BuildCtx<'_>,
    document: DocumentId,
    node_id: NodeId,
    node: &crate::syntax::SyntaxNode,
) {
    let Some(raw) = &node.reference else {
        return;
    };
    let Some(parent_node) = node.parent else {
        return;
    };
    let Some(declarer) = ctx.model.element_for_node(document, parent_node) else {
        return;
    };

    if let Some(doc) = ctx.documents.get_mut(document) {
        doc.references
            .insert(node_id, ElementReference::from_raw(node_id, raw));
    }

    // Explicit relationship stub for roles that establish one; the linker
    // fills in the target later
    let Some(kind) = RelationshipKind::from_role(raw.role) else {
        return;
    };
    match kind {
        RelationshipKind::Import | RelationshipKind::Expose => {
            // The edge belongs to the importing namespace; the import
            // member element carries the declared visibility
            let Some(ns) = ctx.model.owner(declarer) else {
                return;
            };
            let relationship = Relationship::explicit(kind, node_id)
                .with_via(declarer)
                .with_import_kind(raw.import_kind.unwrap_or(ImportKind::Specific));
            ctx.model.add_relationship(ns, relationship);
        }
        _ => {
            ctx.model
                .add_relationship(declarer, Relationship::explicit(kind, node_id));
        }
    }
}

/// Run the registered setup rules for one element, exactly once.
///
/// Safe under cyclic type graphs: re-entering an element whose setup is
/// already running returns immediately.
pub(crate) fn ensure_setup(ctx: &mut BuildCtx<'_>, element: ElementId) {
    match ctx.model.get(element).setup_state {
        SetupState::Completed | SetupState::Active => return,
        SetupState::None => {}
    }
    ctx.model.get_mut(element).setup_state = SetupState::Active;
    ctx.depth += 1;
    if ctx.depth == SETUP_DEPTH_WARN {
        warn!(
            "[BUILD] setup nesting reached {} at {}",
            ctx.depth,
            ctx.model.display_name(element)
        );
    }

    let kind = ctx.model.get(element).kind;
    let rules: Vec<(&'static str, SetupFn)> = ctx
        .registry
        .rules_for(kind)
        .into_iter()
        .map(|r| (r.name, r.run))
        .collect();
    for (name, run) in rules {
        if ctx.options.trace_setup {
            trace!(
                "[BUILD] {}{} on {}",
                "  ".repeat(ctx.depth.min(32)),
                name,
                ctx.model.display_name(element)
            );
        }
        run(ctx, element);
    }

    ctx.depth -= 1;
    ctx.model.get_mut(element).setup_state = SetupState::Completed;
}

/// Resolve a namespace's import targets, exactly once. Wildcard and
/// recursive imports whose target is not a namespace are diagnosed and
/// dropped from scope traversal.
pub(crate) fn ensure_imports_resolved(ctx: &mut BuildCtx<'_>, ns: ElementId) {
    match ctx.model.get(ns).import_state {
        SetupState::Completed | SetupState::Active => return,
        SetupState::None => {}
    }
    ctx.model.get_mut(ns).import_state = SetupState::Active;

    let document = ctx.model.get(ns).document;
    let pending: Vec<NodeId> = ctx
        .model
        .get(ns)
        .relationships
        .iter()
        .filter(|r| matches!(r.kind, RelationshipKind::Import | RelationshipKind::Expose))
        .filter(|r| r.target.is_none())
        .filter_map(|r| r.reference)
        .collect();
    for reference in pending {
        let target = linker::resolve_reference(ctx, document, reference);

        // Member-bringing imports need a namespace to bring members from
        let Some(target) = target else {
            continue;
        };
        let shape = ctx
            .model
            .get(ns)
            .relationships
            .iter()
            .find(|r| r.reference == Some(reference))
            .and_then(|r| r.import_kind)
            .unwrap_or(ImportKind::Specific);
        if shape != ImportKind::Specific && !ctx.model.get(target).is_namespace() {
            let path = ctx.model.display_name(target).to_string();
            let message = LinkError::InvalidImport { path }.to_string();
            let span = ctx
                .documents
                .get(document)
                .and_then(|d| d.references.get(&reference))
                .and_then(|r| r.segment_span(0));
            if let Some(doc) = ctx.documents.get_mut(document) {
                doc.diagnostics
                    .push(Diagnostic::error(document, span, message).with_code("link-import"));
            }
            if let Some(rel) = ctx
                .model
                .get_mut(ns)
                .relationships
                .iter_mut()
                .find(|r| r.reference == Some(reference))
            {
                rel.target = None;
            }
        }
    }

    ctx.model.get_mut(ns).import_state = SetupState::Completed;
}
