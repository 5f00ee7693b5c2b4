//! The global index — merged view of every document's exported root
//! members, plus the reverse dependency graph for invalidation.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::base::DocumentId;
use crate::semantic::element::{ElementId, Model};

/// One exported root member of a document.
#[derive(Clone, Debug)]
struct ExportEntry {
    document: DocumentId,
    element: ElementId,
    language: SmolStr,
    /// Alias exports point at the alias element; consumers resolve it to
    /// its target through the linker.
    is_alias: bool,
}

/// Workspace-wide lookup structures, rebuilt incrementally as documents are
/// published and retracted.
///
/// The qualified-name cache short-circuits repeated library lookups during
/// implicit synthesis; it is flushed wholesale on any invalidation since a
/// single edit can change what any dotted path means.
#[derive(Default)]
pub struct GlobalIndex {
    exports: FxHashMap<SmolStr, Vec<ExportEntry>>,
    qname_cache: FxHashMap<SmolStr, Option<ElementId>>,
    /// provider → documents that resolved something through it.
    reverse_deps: FxHashMap<DocumentId, FxHashSet<DocumentId>>,
}

impl GlobalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a document's exports into the merged global scope.
    pub fn publish_document(
        &mut self,
        document: DocumentId,
        language: &SmolStr,
        exports: &[(SmolStr, ElementId, bool)],
    ) {
        for (name, element, is_alias) in exports {
            self.exports.entry(name.clone()).or_default().push(ExportEntry {
                document,
                element: *element,
                language: language.clone(),
                is_alias: *is_alias,
            });
        }
        self.qname_cache.clear();
    }

    /// Remove every export published by a document.
    pub fn retract_document(&mut self, document: DocumentId) {
        self.exports.retain(|_, entries| {
            entries.retain(|e| e.document != document);
            !entries.is_empty()
        });
        self.qname_cache.clear();
    }

    /// Find an exported root member by name. Entries from standalone
    /// documents never participate. When several documents export the same
    /// name, one matching the requesting document's language wins; ties
    /// break on document id for determinism.
    pub fn find_export(
        &self,
        name: &str,
        language: Option<&str>,
        standalone: &FxHashSet<DocumentId>,
        requester: Option<DocumentId>,
    ) -> Option<(DocumentId, ElementId)> {
        let entries = self.exports.get(name)?;
        let mut candidates: Vec<&ExportEntry> = entries
            .iter()
            .filter(|e| !standalone.contains(&e.document) && Some(e.document) != requester)
            .collect();
        candidates.sort_by_key(|e| {
            let language_rank = match language {
                Some(l) if e.language == l => 0u8,
                _ => 1,
            };
            (language_rank, e.document)
        });
        candidates.first().map(|e| (e.document, e.element))
    }

    /// Every export visible globally, for scope enumeration. Name collisions
    /// across documents are all reported; the consumer deduplicates by
    /// element identity.
    pub fn all_exports(&self, standalone: &FxHashSet<DocumentId>) -> Vec<(SmolStr, ElementId)> {
        let mut out: Vec<(SmolStr, ElementId, DocumentId)> = self
            .exports
            .iter()
            .flat_map(|(name, entries)| {
                entries
                    .iter()
                    .filter(|e| !standalone.contains(&e.document))
                    .map(|e| (name.clone(), e.element, e.document))
            })
            .collect();
        out.sort_by(|a, b| (a.2, &a.0).cmp(&(b.2, &b.0)));
        out.into_iter().map(|(name, element, _)| (name, element)).collect()
    }

    /// Direct qualified-name lookup (`Base::Anything`), bypassing the scope
    /// engine. This is the fast path of implicit-library resolution: first
    /// segment through the exports map, the rest straight down owned member
    /// tables. Results, including misses, are memoized until the next
    /// invalidation.
    pub fn find_global_element(
        &mut self,
        model: &Model,
        qualified_name: &str,
        standalone: &FxHashSet<DocumentId>,
    ) -> Option<ElementId> {
        if let Some(&cached) = self.qname_cache.get(qualified_name) {
            return cached;
        }
        let found = self.walk_qualified(model, qualified_name, standalone);
        self.qname_cache
            .insert(SmolStr::new(qualified_name), found);
        found
    }

    fn walk_qualified(
        &self,
        model: &Model,
        qualified_name: &str,
        standalone: &FxHashSet<DocumentId>,
    ) -> Option<ElementId> {
        let mut segments = qualified_name.split("::");
        let first = segments.next()?;
        // No linker on this path, so alias exports stay invisible here;
        // the scope engine handles them.
        let mut current = self
            .exports
            .get(first)?
            .iter()
            .filter(|e| !standalone.contains(&e.document) && !e.is_alias)
            .min_by_key(|e| e.document)
            .map(|e| e.element)?;
        for segment in segments {
            let description = model.get(current).children.get(segment)?;
            if description.is_alias {
                return None;
            }
            current = description.element;
        }
        Some(current)
    }

    /// Record that `dependent` resolved something exported by `provider`.
    pub fn record_dependency(&mut self, dependent: DocumentId, provider: DocumentId) {
        if dependent == provider {
            return;
        }
        self.reverse_deps
            .entry(provider)
            .or_default()
            .insert(dependent);
    }

    /// Invalidate a changed document: flush caches and return every
    /// document that (transitively) depended on it and must relink.
    pub fn invalidate(&mut self, document: DocumentId) -> FxHashSet<DocumentId> {
        self.qname_cache.clear();
        let mut affected = FxHashSet::default();
        let mut queue = vec![document];
        while let Some(provider) = queue.pop() {
            if let Some(dependents) = self.reverse_deps.remove(&provider) {
                for dependent in dependents {
                    if dependent != document && affected.insert(dependent) {
                        queue.push(dependent);
                    }
                }
            }
        }
        affected
    }
}
