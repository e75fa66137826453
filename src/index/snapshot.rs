//! Immutable, shareable view of the indexed documents.
//!
//! A snapshot is never mutated once published. The writer clones the
//! current snapshot, applies its staged operations to the clone and swaps it
//! in; the clone shares posting lists with its parent until they are
//! modified.

use std::sync::Arc;

use ahash::AHashMap;

use crate::index::reader::IndexReader;
use crate::term::{AssetPath, IndexDocument, IndexTerm};

/// Tombstones tolerated before doc ids are reassigned.
const MIN_TOMBSTONES_BEFORE_COMPACTION: usize = 64;

/// Documents, their inverted postings and the generation that produced them.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    generation: u64,
    /// Doc id → document; `None` marks a deleted slot.
    documents: Vec<Option<Arc<IndexDocument>>>,
    paths: AHashMap<AssetPath, u64>,
    postings: AHashMap<IndexTerm, Arc<Vec<u64>>>,
    live_docs: Arc<Vec<u64>>,
}

impl IndexSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot holding `documents`, assigning doc ids in path order.
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = IndexDocument>,
    {
        let mut documents: Vec<IndexDocument> = documents.into_iter().collect();
        documents.sort_by(|a, b| a.path.cmp(&b.path));

        let mut snapshot = Self::new();
        for document in documents {
            snapshot.upsert(Arc::new(document));
        }
        snapshot
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Number of distinct terms with at least one live document.
    pub fn term_count(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Number of deleted slots still occupying doc ids.
    pub fn tombstones(&self) -> usize {
        self.documents.len() - self.paths.len()
    }

    pub fn contains(&self, path: &AssetPath) -> bool {
        self.paths.contains_key(path)
    }

    /// The live document stored at `path`.
    pub fn get(&self, path: &AssetPath) -> Option<Arc<IndexDocument>> {
        let doc_id = *self.paths.get(path)?;
        self.document(doc_id)
    }

    /// All live paths in ascending order.
    pub fn paths(&self) -> Vec<AssetPath> {
        let mut paths: Vec<AssetPath> = self.paths.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Live documents in doc id order.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<IndexDocument>> {
        self.documents.iter().flatten()
    }

    /// Store `document`, replacing whatever was stored at its path.
    ///
    /// Returns the replaced document.
    pub(crate) fn upsert(&mut self, document: Arc<IndexDocument>) -> Option<Arc<IndexDocument>> {
        let previous = self.delete(&document.path);

        let doc_id = self.documents.len() as u64;
        for term in &document.terms {
            Arc::make_mut(self.postings.entry(term.clone()).or_default()).push(doc_id);
        }
        self.paths.insert(document.path.clone(), doc_id);
        Arc::make_mut(&mut self.live_docs).push(doc_id);
        self.documents.push(Some(document));

        previous
    }

    /// Delete the document stored at `path`, returning it.
    pub(crate) fn delete(&mut self, path: &AssetPath) -> Option<Arc<IndexDocument>> {
        let doc_id = self.paths.remove(path)?;
        let document = self
            .documents
            .get_mut(doc_id as usize)
            .and_then(Option::take)?;

        for term in &document.terms {
            let now_empty = match self.postings.get_mut(term) {
                Some(list) => {
                    let list = Arc::make_mut(list);
                    if let Ok(pos) = list.binary_search(&doc_id) {
                        list.remove(pos);
                    }
                    list.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.postings.remove(term);
            }
        }

        let live_docs = Arc::make_mut(&mut self.live_docs);
        if let Ok(pos) = live_docs.binary_search(&doc_id) {
            live_docs.remove(pos);
        }

        Some(document)
    }

    pub(crate) fn clear(&mut self) {
        let generation = self.generation;
        *self = Self::default();
        self.generation = generation;
    }

    /// Reassign doc ids once deleted slots outnumber live documents.
    ///
    /// Returns whether the snapshot was rebuilt.
    pub(crate) fn compact_if_needed(&mut self) -> bool {
        let tombstones = self.tombstones();
        if tombstones <= MIN_TOMBSTONES_BEFORE_COMPACTION.max(self.paths.len()) {
            return false;
        }

        let mut live: Vec<Arc<IndexDocument>> = self.documents().cloned().collect();
        live.sort_by(|a, b| a.path.cmp(&b.path));

        let mut rebuilt = Self {
            generation: self.generation,
            ..Self::default()
        };
        for document in live {
            rebuilt.upsert(document);
        }
        *self = rebuilt;
        true
    }
}

impl IndexReader for IndexSnapshot {
    fn doc_count(&self) -> u64 {
        self.paths.len() as u64
    }

    fn max_doc(&self) -> u64 {
        self.documents.len() as u64
    }

    fn is_deleted(&self, doc_id: u64) -> bool {
        !matches!(self.documents.get(doc_id as usize), Some(Some(_)))
    }

    fn document(&self, doc_id: u64) -> Option<Arc<IndexDocument>> {
        self.documents.get(doc_id as usize).cloned().flatten()
    }

    fn postings(&self, term: &IndexTerm) -> Option<Arc<Vec<u64>>> {
        self.postings.get(term).cloned()
    }

    fn live_docs(&self) -> Arc<Vec<u64>> {
        Arc::clone(&self.live_docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, terms: &[IndexTerm]) -> Arc<IndexDocument> {
        Arc::new(
            IndexDocument::new(AssetPath::new(path).unwrap(), "scorecard")
                .with_terms(terms.iter().cloned()),
        )
    }

    #[test]
    fn test_upsert_replaces_terms() {
        let mut snapshot = IndexSnapshot::new();
        let applicant = IndexTerm::type_name("applicant");
        let mortgage = IndexTerm::type_name("mortgage");

        snapshot.upsert(doc("a.scgd", &[applicant.clone()]));
        let previous = snapshot.upsert(doc("a.scgd", &[mortgage.clone()]));

        assert!(previous.unwrap().contains(&applicant));
        assert_eq!(snapshot.doc_count(), 1);
        assert!(snapshot.postings(&applicant).is_none());
        assert_eq!(snapshot.postings(&mortgage).unwrap().as_slice(), &[1]);
        assert!(snapshot.is_deleted(0));
        assert_eq!(snapshot.live_docs().as_slice(), &[1]);
    }

    #[test]
    fn test_delete_unknown_path_is_noop() {
        let mut snapshot = IndexSnapshot::new();
        snapshot.upsert(doc("a.scgd", &[IndexTerm::type_name("applicant")]));

        assert!(snapshot.delete(&AssetPath::new("b.scgd").unwrap()).is_none());
        assert_eq!(snapshot.doc_count(), 1);
    }

    #[test]
    fn test_clone_does_not_disturb_parent() {
        let term = IndexTerm::type_name("applicant");
        let mut parent = IndexSnapshot::new();
        parent.upsert(doc("a.scgd", &[term.clone()]));

        let mut child = parent.clone();
        child.upsert(doc("b.scgd", &[term.clone()]));
        child.delete(&AssetPath::new("a.scgd").unwrap());

        assert_eq!(parent.postings(&term).unwrap().as_slice(), &[0]);
        assert_eq!(child.postings(&term).unwrap().as_slice(), &[1]);
        assert_eq!(parent.paths(), vec![AssetPath::new("a.scgd").unwrap()]);
    }

    #[test]
    fn test_compaction_reassigns_ids() {
        let term = IndexTerm::type_name("applicant");
        let mut snapshot = IndexSnapshot::new();
        for round in 0..100 {
            snapshot.upsert(doc("a.scgd", &[term.clone()]));
            if round == 0 {
                snapshot.upsert(doc("b.scgd", &[term.clone()]));
            }
        }
        assert!(snapshot.tombstones() > MIN_TOMBSTONES_BEFORE_COMPACTION);

        assert!(snapshot.compact_if_needed());
        assert_eq!(snapshot.tombstones(), 0);
        assert_eq!(snapshot.postings(&term).unwrap().as_slice(), &[0, 1]);
        assert_eq!(
            snapshot.path(1),
            Some(AssetPath::new("b.scgd").unwrap())
        );
    }

    #[test]
    fn test_clear_keeps_generation() {
        let mut snapshot = IndexSnapshot::new();
        snapshot.set_generation(7);
        snapshot.upsert(doc("a.scgd", &[IndexTerm::type_name("applicant")]));
        snapshot.clear();

        assert_eq!(snapshot.generation(), 7);
        assert_eq!(snapshot.doc_count(), 0);
        assert_eq!(snapshot.term_count(), 0);
    }
}
