//! Read access to an index snapshot, as seen by queries.

use std::sync::Arc;

use crate::term::{AssetPath, IndexDocument, IndexTerm};

/// Trait for index readers.
///
/// Doc ids are dense within one reader and are only meaningful for the
/// lifetime of that reader.
pub trait IndexReader: Send + Sync + std::fmt::Debug {
    /// Get the number of live documents.
    fn doc_count(&self) -> u64;

    /// One past the highest doc id ever assigned in this reader.
    fn max_doc(&self) -> u64;

    /// Check if a doc id refers to a deleted document.
    fn is_deleted(&self, doc_id: u64) -> bool;

    /// Get a live document by id.
    fn document(&self, doc_id: u64) -> Option<Arc<IndexDocument>>;

    /// Ascending doc ids of the live documents containing `term`.
    fn postings(&self, term: &IndexTerm) -> Option<Arc<Vec<u64>>>;

    /// Ascending ids of all live documents.
    fn live_docs(&self) -> Arc<Vec<u64>>;

    /// Path of a live document.
    fn path(&self, doc_id: u64) -> Option<AssetPath> {
        self.document(doc_id).map(|doc| doc.path.clone())
    }

    /// Number of live documents containing `term`.
    fn doc_freq(&self, term: &IndexTerm) -> u64 {
        self.postings(term).map_or(0, |list| list.len() as u64)
    }
}
