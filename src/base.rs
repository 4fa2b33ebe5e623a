//! The consolidated document base: type registry, document store,
//! pending-reference cache, link graph, and query surface.
//!
//! A [`DocBase`] has a simple lifecycle: construct it empty, register every
//! type configuration, ingest the full document batch with [`DocBase::create`]
//! (in any order), then serve [`DocBase::get`] / [`DocBase::find`] /
//! [`DocBase::connections`] queries. All state is owned and in-memory; a
//! fresh run rebuilds everything.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::{graphmap::DiGraphMap, Direction};
use serde_json::Value;

use crate::{
    document::{canonical_id, parse_reference, raw_id, raw_type, DocKey, Document, REFERENCE_KEY},
    error::DocBaseError,
    extract::{extract, split_path},
    index::{SearchIndex, SearchTerms},
    registry::TypeConfig,
};


/// In-memory graph-construction and query engine over a batch of typed
/// documents.
///
/// Documents are linked through declared reference paths holding
/// `"<TypeName>/<id>"` tokens. References to documents that have not arrived
/// yet are parked in a pending cache and resolved the moment the target is
/// created, so the final link graph is identical regardless of creation
/// order.
#[derive(Debug, Clone, Default)]
pub struct DocBase {
    types: BTreeMap<String, TypeConfig>,
    docs: Vec<Document>,
    by_id: BTreeMap<String, DocKey>,
    /// One directed edge per resolved reference, source -> target. Outgoing
    /// neighbors are the documents a node references ("children"), incoming
    /// neighbors the documents referencing it ("parents"). A single edge
    /// serves both directions, so the two link sets cannot drift apart.
    links: DiGraphMap<DocKey, ()>,
    /// Canonical target id -> sources awaiting a link to that target. An
    /// entry that never receives its target simply stays unresolved; that is
    /// expected, not an error.
    pending: BTreeMap<String, Vec<DocKey>>,
    index: SearchIndex,
}

impl DocBase {
    pub fn new() -> Self {
        DocBase::default()
    }

    /// Construct a base with an initial set of type configurations.
    pub fn with_types(types: impl IntoIterator<Item = TypeConfig>) -> Self {
        let mut base = DocBase::default();
        for config in types {
            base.register(config);
        }
        base
    }

    /// Register a type configuration. Called once per type before ingestion
    /// begins. Re-registering a name is not a supported path; the new
    /// configuration replaces the old one with a warning.
    pub fn register(&mut self, config: TypeConfig) {
        let name = config.name.clone();
        if self.types.insert(name.clone(), config).is_some() {
            tracing::warn!("Replacing already-registered type configuration for '{name}'");
        }
    }

    /// Look up the configuration registered for `type_name`.
    pub fn config_for(&self, type_name: &str) -> Option<&TypeConfig> {
        self.types.get(type_name)
    }

    /// Create a document from its raw form.
    ///
    /// The raw value must carry a type tag and an id; both are checked before
    /// any state is touched. On success the document is indexed (if its type
    /// declares index paths), pending references to it are resolved, its own
    /// references are resolved or parked, and its key is returned.
    pub fn create(&mut self, raw: Value) -> Result<DocKey, DocBaseError> {
        let type_name = raw_type(&raw)?.to_string();
        let display_id = raw_id(&raw)?;
        let config = self
            .types
            .get(&type_name)
            .ok_or_else(|| DocBaseError::UnknownType(type_name.clone()))?
            .clone();

        let id = canonical_id(&display_id);
        if let Some(existing) = self.by_id.get(&id) {
            return Err(DocBaseError::Duplicate {
                id,
                existing: *existing,
            });
        }

        let key = DocKey(self.docs.len() as u32);
        if !config.index.is_empty() {
            self.index.index_document(key, &display_id, &raw, &config.index);
        }

        let doc = Document::new(key, display_id, type_name, raw);
        self.docs.push(doc);
        self.links.add_node(key);

        // Order matters: resolve links waiting on this id before following
        // this document's own references, then publish the id.
        self.resolve_inbound(&id, key);
        self.resolve_outbound(key, &config.references);
        self.by_id.insert(id, key);

        Ok(key)
    }

    /// Link every source that was waiting for `id`, draining its pending
    /// entry.
    fn resolve_inbound(&mut self, id: &str, key: DocKey) {
        if let Some(waiting) = self.pending.remove(id) {
            tracing::debug!(
                "Resolving {} pending reference(s) to '{}'",
                waiting.len(),
                id
            );
            for source in waiting {
                self.links.add_edge(source, key, ());
            }
        }
    }

    /// Follow the declared reference paths of a newly created document,
    /// linking to targets already in the store and parking the rest.
    fn resolve_outbound(&mut self, key: DocKey, reference_paths: &[String]) {
        let Some(doc) = self.docs.get(key.0 as usize) else {
            return;
        };
        let mut resolved = Vec::new();
        let mut parked = Vec::new();
        for path in reference_paths {
            let Some(found) = extract(doc.payload(), &split_path(path)) else {
                continue;
            };
            for value in found.into_values() {
                let Some(token) = value.get(REFERENCE_KEY).and_then(Value::as_str) else {
                    // Lenient: a reference object without its token field is
                    // skipped, surfaced as a diagnostic rather than an error.
                    tracing::warn!(
                        "{}: reference entry at '{}' lacks a '{}' field: {}",
                        doc,
                        path,
                        REFERENCE_KEY,
                        value
                    );
                    continue;
                };
                let Some((_, target_id)) = parse_reference(token) else {
                    tracing::warn!("{}: malformed reference token '{}' at '{}'", doc, token, path);
                    continue;
                };
                let target_id = canonical_id(target_id);
                match self.by_id.get(&target_id) {
                    Some(target) => resolved.push(*target),
                    None => parked.push(target_id),
                }
            }
        }
        for target in resolved {
            self.links.add_edge(key, target, ());
        }
        for target_id in parked {
            self.pending.entry(target_id).or_default().push(key);
        }
    }

    /// Exact-id lookup. Returns the document only when it exists and its
    /// concrete type equals `type_name`; a miss is `None`, never an error.
    pub fn get(&self, type_name: &str, id: &str) -> Option<&Document> {
        let key = self.by_id.get(&canonical_id(id))?;
        self.document(*key)
            .filter(|doc| doc.type_name() == type_name)
    }

    pub fn document(&self, key: DocKey) -> Option<&Document> {
        self.docs.get(key.0 as usize)
    }

    /// All documents in creation order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Substring-AND search over documents of `type_name`.
    ///
    /// `terms` accepts a single string (split on whitespace) or an explicit
    /// term sequence. Yields matches lazily in creation order; no match is an
    /// empty iterator.
    pub fn find<'a, T: Into<SearchTerms>>(
        &'a self,
        type_name: &'a str,
        terms: T,
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.index
            .scan(terms.into())
            .filter_map(|key| self.document(key))
            .filter(move |doc| doc.type_name() == type_name)
    }

    /// Documents this document references.
    pub fn outgoing(&self, key: DocKey) -> impl Iterator<Item = &Document> + '_ {
        self.links
            .neighbors_directed(key, Direction::Outgoing)
            .filter_map(|neighbor| self.document(neighbor))
    }

    /// Documents referencing this document.
    pub fn incoming(&self, key: DocKey) -> impl Iterator<Item = &Document> + '_ {
        self.links
            .neighbors_directed(key, Direction::Incoming)
            .filter_map(|neighbor| self.document(neighbor))
    }

    /// Every document transitively connected to `key`, grouped by type name
    /// and excluding the document itself.
    ///
    /// The walk expands both link directions at every hop and carries a
    /// visited set, so reference cycles terminate. Groups are disjoint (ids
    /// are store-wide unique) and each group is sorted by canonical id.
    pub fn connections(&self, key: DocKey) -> BTreeMap<String, Vec<&Document>> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<DocKey> = Vec::new();
        if self.links.contains_node(key) {
            stack.push(key);
        }
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            stack.extend(self.links.neighbors_directed(next, Direction::Outgoing));
            stack.extend(self.links.neighbors_directed(next, Direction::Incoming));
        }
        visited.remove(&key);

        let mut grouped: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
        for connected in visited {
            if let Some(doc) = self.document(connected) {
                grouped.entry(doc.type_name().to_string()).or_default().push(doc);
            }
        }
        for group in grouped.values_mut() {
            group.sort();
        }
        grouped
    }

    /// Canonical ids with parked references whose target never arrived.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    /// Display name for `doc`, when its type declares the capability.
    pub fn display_name(&self, doc: &Document) -> Option<String> {
        self.types
            .get(doc.type_name())?
            .display_name
            .as_ref()?
            .apply(doc.payload())
    }
}
