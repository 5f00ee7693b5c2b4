//! Documents — one per source, owning its syntax tree and build progress.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::DocumentId;
use crate::semantic::element::ElementId;
use crate::semantic::linker::ElementReference;
use crate::semantic::types::Diagnostic;
use crate::syntax::{NodeId, SyntaxTree};

/// Monotone build progress of a document. A cancelled pass leaves the
/// document at its last completed state; the next build resumes from there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    /// Raw tree attached, no semantic work done.
    Parsed,
    /// Elements attached and initialized, exports published.
    Indexed,
    /// Setup functions ran: relationships wired, implicits synthesized.
    PreLinked,
    /// Every reference chain settled.
    Linked,
}

/// One document in the workspace.
pub struct Document {
    pub id: DocumentId,
    pub uri: SmolStr,
    /// Secondary partition key for the global scope (e.g. "sysml" vs
    /// "kerml"), disambiguating like-named documents across languages.
    pub language: SmolStr,
    pub tree: SyntaxTree,
    pub state: BuildState,
    /// A standalone document neither reads nor pollutes the global scope.
    pub standalone: bool,
    pub root_element: Option<ElementId>,
    /// Exported top-level descriptions (public members of the root).
    pub exports: Vec<(SmolStr, ElementId)>,
    /// Resolution state of every reference chain in this document.
    pub references: FxHashMap<NodeId, ElementReference>,
    /// Accumulated linking/semantic errors.
    pub diagnostics: Vec<Diagnostic>,
    /// Documents this one structurally depended on while linking.
    pub dependencies: FxHashSet<DocumentId>,
}

impl Document {
    pub fn new(id: DocumentId, uri: SmolStr, language: SmolStr, tree: SyntaxTree) -> Self {
        Self {
            id,
            uri,
            language,
            tree,
            state: BuildState::Parsed,
            standalone: false,
            root_element: None,
            exports: Vec::new(),
            references: FxHashMap::default(),
            diagnostics: Vec::new(),
            dependencies: FxHashSet::default(),
        }
    }

    /// Drop everything derived from the old tree ahead of a rebuild.
    pub fn reset(&mut self) {
        self.state = BuildState::Parsed;
        self.root_element = None;
        self.exports.clear();
        self.references.clear();
        self.diagnostics.clear();
        self.dependencies.clear();
    }
}

/// The document collection, indexed by [`DocumentId`]. Removed documents
/// leave `None` slots; ids are never reused.
#[derive(Default)]
pub struct Documents {
    slots: Vec<Option<Document>>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: Document) -> DocumentId {
        let id = document.id;
        debug_assert_eq!(id.index() as usize, self.slots.len());
        self.slots.push(Some(document));
        id
    }

    pub fn next_id(&self) -> DocumentId {
        DocumentId::new(self.slots.len() as u32)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.slots.get(id.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.slots.get_mut(id.index() as usize)?.as_mut()
    }

    pub fn remove(&mut self, id: DocumentId) -> Option<Document> {
        self.slots.get_mut(id.index() as usize)?.take()
    }

    /// Live documents in id order — deterministic for test stability.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.slots.iter().flatten()
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.iter().map(|d| d.id).collect()
    }

    pub fn record_dependency(&mut self, from: DocumentId, to: DocumentId) {
        if from == to {
            return;
        }
        if let Some(doc) = self.get_mut(from) {
            doc.dependencies.insert(to);
        }
    }

    /// The set of standalone document ids, for global-scope filtering.
    pub fn standalone_set(&self) -> FxHashSet<DocumentId> {
        self.iter()
            .filter(|d| d.standalone)
            .map(|d| d.id)
            .collect()
    }
}
