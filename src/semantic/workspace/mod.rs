//! The workspace — owns every document, the element model, and the global
//! index, and exposes the incremental update entry points.

mod document;
mod index;

pub use document::{BuildState, Document, Documents};
pub use index::GlobalIndex;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::DocumentId;
use crate::semantic::builder::{BuildCtx, MetamodelBuilder, SetupRegistry};
use crate::semantic::element::{ElementId, Model};
use crate::semantic::evaluate::Evaluate;
use crate::semantic::linker;
use crate::semantic::scope::{self, AliasPolicy, ScopeOptions};
use crate::semantic::types::{BuildError, BuildOptions, Diagnostic};
use crate::syntax::{NodeId, SyntaxTree};

/// A set of documents building into one shared element model.
///
/// All mutation happens through `add`/`update`/`remove` plus an explicit
/// (cancellable) build call; queries in between are read-only except for
/// demand-driven construction, which is idempotent.
pub struct Workspace {
    pub(crate) model: Model,
    pub(crate) documents: Documents,
    pub(crate) index: GlobalIndex,
    pub(crate) options: BuildOptions,
    pub(crate) registry: SetupRegistry,
    pub(crate) evaluator: Option<Box<dyn Evaluate>>,
    uris: FxHashMap<SmolStr, DocumentId>,
}

impl Workspace {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            model: Model::new(),
            documents: Documents::new(),
            index: GlobalIndex::new(),
            options,
            registry: SetupRegistry::standard(),
            evaluator: None,
            uris: FxHashMap::default(),
        }
    }

    /// Plug in an expression evaluator for metadata construction.
    pub fn set_evaluator(&mut self, evaluator: Box<dyn Evaluate>) {
        self.evaluator = evaluator.into();
    }

    pub(crate) fn build_ctx(&mut self) -> BuildCtx<'_> {
        BuildCtx {
            model: &mut self.model,
            documents: &mut self.documents,
            index: &mut self.index,
            options: &self.options,
            registry: &self.registry,
            evaluator: self.evaluator.as_deref(),
            alias_visiting: Default::default(),
            depth: 0,
        }
    }

    // ============================================================
    // Document lifecycle
    // ============================================================

    /// Add a document in the `Parsed` state. `language` partitions the
    /// global scope (e.g. "sysml" or "kerml").
    pub fn add_document(
        &mut self,
        uri: impl Into<SmolStr>,
        language: impl Into<SmolStr>,
        tree: SyntaxTree,
    ) -> DocumentId {
        let uri = uri.into();
        let id = self.documents.next_id();
        trace!("[WORKSPACE] add {} as {:?}", uri, id);
        self.uris.insert(uri.clone(), id);
        self.documents
            .insert(Document::new(id, uri, language.into(), tree))
    }

    /// Add a document that neither reads nor contributes to the global
    /// scope (scratch buffers, isolated snippets).
    pub fn add_standalone_document(
        &mut self,
        uri: impl Into<SmolStr>,
        language: impl Into<SmolStr>,
        tree: SyntaxTree,
    ) -> DocumentId {
        let id = self.add_document(uri, language, tree);
        if let Some(doc) = self.documents.get_mut(id) {
            doc.standalone = true;
        }
        id
    }

    /// Replace a document's syntax tree after an edit. The document and
    /// everything that depended on it fall back to `Parsed`; element
    /// identities of unchanged node ids survive.
    pub fn update_document(&mut self, id: DocumentId, tree: SyntaxTree) {
        let affected = self.index.invalidate(id);
        trace!(
            "[WORKSPACE] update {:?}, {} dependent document(s) reset",
            id,
            affected.len()
        );

        self.index.retract_document(id);
        self.model.reset_document(id);
        if let Some(doc) = self.documents.get_mut(id) {
            doc.tree = tree;
            doc.reset();
        }

        for dependent in affected {
            self.index.retract_document(dependent);
            self.model.reset_document(dependent);
            if let Some(doc) = self.documents.get_mut(dependent) {
                doc.reset();
            }
        }
    }

    /// Remove a document. Its elements become tombstones; dependents are
    /// reset so their dangling references relink (and diagnose) on the next
    /// build.
    pub fn remove_document(&mut self, id: DocumentId) {
        let affected = self.index.invalidate(id);
        self.index.retract_document(id);
        self.model.remove_document(id);
        if let Some(doc) = self.documents.remove(id) {
            self.uris.remove(&doc.uri);
        }

        for dependent in affected {
            self.index.retract_document(dependent);
            self.model.reset_document(dependent);
            if let Some(doc) = self.documents.get_mut(dependent) {
                doc.reset();
            }
        }
    }

    // ============================================================
    // Building
    // ============================================================

    /// Build every document to `Linked`. Cancellation leaves documents at
    /// their last completed state; a later call resumes from there.
    pub fn build_all(&mut self, cancel: &CancellationToken) -> Result<(), BuildError> {
        MetamodelBuilder::new(self, cancel.clone()).build_all()
    }

    /// Build a single document to `Linked`.
    pub fn build_document(
        &mut self,
        id: DocumentId,
        cancel: &CancellationToken,
    ) -> Result<(), BuildError> {
        MetamodelBuilder::new(self, cancel.clone()).build_document(id)
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn document_by_uri(&self, uri: &str) -> Option<DocumentId> {
        self.uris.get(uri).copied()
    }

    pub fn diagnostics(&self, id: DocumentId) -> &[Diagnostic] {
        self.documents
            .get(id)
            .map(|d| d.diagnostics.as_slice())
            .unwrap_or(&[])
    }

    /// Find an element by its fully qualified name in the global scope.
    pub fn find_element(&mut self, qualified_name: &str) -> Option<ElementId> {
        let standalone = self.documents.standalone_set();
        self.index
            .find_global_element(&self.model, qualified_name, &standalone)
    }

    /// The linked target of a reference chain node, if it resolved.
    pub fn resolved_target(&self, document: DocumentId, node: NodeId) -> Option<ElementId> {
        self.documents
            .get(document)?
            .references
            .get(&node)
            .and_then(|r| r.target())
    }

    /// Resolve a name as seen from an element, the way the linker would
    /// resolve the first segment of a reference written there.
    pub fn lookup(&mut self, context: ElementId, name: &str) -> Option<ElementId> {
        let mut ctx = self.build_ctx();
        scope::lookup_from(&mut ctx, context, name, ScopeOptions::default())
    }

    /// Everything visible from an element, for completion. Read-only with
    /// respect to linking: aliases without a settled target are skipped.
    pub fn visible_from(&mut self, context: ElementId) -> Vec<(SmolStr, ElementId)> {
        let mut ctx = self.build_ctx();
        scope::all_visible_from(
            &mut ctx,
            context,
            ScopeOptions {
                skip: None,
                alias: AliasPolicy::ReadOnly,
            },
        )
    }

    /// Everything visible inside a namespace from the outside, for
    /// completion after a qualifier (`P::`).
    pub fn visible_in(&mut self, namespace: ElementId) -> Vec<(SmolStr, ElementId)> {
        let mut ctx = self.build_ctx();
        scope::all_visible_in(
            &mut ctx,
            namespace,
            scope::VisibilityPolicy::OUTSIDE,
            ScopeOptions {
                skip: None,
                alias: AliasPolicy::ReadOnly,
            },
        )
    }

    /// The final target of an alias element, if already linked.
    pub fn alias_target(&mut self, alias: ElementId) -> Option<ElementId> {
        let mut ctx = self.build_ctx();
        linker::resolve_alias(&mut ctx, alias, AliasPolicy::ReadOnly)
    }
}
