//! Staging area for index mutations.
//!
//! The writer normalizes incoming documents through the per-field analyzer
//! and queues them. Nothing is visible until the store applies the queue to
//! a fresh snapshot; what was applied is remembered until the next commit
//! hands it to the WAL.

use std::sync::Arc;

use log::debug;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::Result;
use crate::index::snapshot::IndexSnapshot;
use crate::index::wal::WalPayload;
use crate::term::{AssetPath, IndexDocument, IndexTerm};

/// A staged mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOp {
    Upsert(IndexDocument),
    Delete(AssetPath),
    Rename { from: AssetPath, to: AssetPath },
    Clear,
}

#[derive(Debug)]
pub struct IndexWriter {
    analyzer: Arc<PerFieldAnalyzer>,
    pending: Vec<IndexOp>,
    uncommitted: Vec<WalPayload>,
}

impl IndexWriter {
    pub fn new(analyzer: Arc<PerFieldAnalyzer>) -> Self {
        IndexWriter {
            analyzer,
            pending: Vec::new(),
            uncommitted: Vec::new(),
        }
    }

    pub fn analyzer(&self) -> &Arc<PerFieldAnalyzer> {
        &self.analyzer
    }

    /// Rewrite every term value into its indexed tokens.
    pub fn normalize(&self, document: IndexDocument) -> Result<IndexDocument> {
        let IndexDocument {
            path,
            asset_type,
            terms,
            indexed_at,
        } = document;

        let mut normalized = IndexDocument {
            path,
            asset_type,
            terms: Default::default(),
            indexed_at,
        };
        for term in terms {
            let tokens = self.analyzer.terms_for(term.field.as_str(), &term.value)?;
            if tokens.is_empty() {
                debug!("Dropping term {term} of {}: no tokens", normalized.path);
            }
            for token in tokens {
                normalized.add_term(IndexTerm::new(term.field, token));
            }
        }
        Ok(normalized)
    }

    /// Stage `document` under `path`, replacing what is stored there.
    pub fn add_document(&mut self, path: AssetPath, document: IndexDocument) -> Result<()> {
        let document = self.normalize(document.relocated(path))?;
        self.pending.push(IndexOp::Upsert(document));
        Ok(())
    }

    pub fn delete_document(&mut self, path: AssetPath) {
        self.pending.push(IndexOp::Delete(path));
    }

    pub fn rename_document(&mut self, from: AssetPath, to: AssetPath) {
        self.pending.push(IndexOp::Rename { from, to });
    }

    pub fn clear(&mut self) {
        self.pending.push(IndexOp::Clear);
    }

    /// Drop staged operations that were not applied yet.
    pub fn rollback(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply the staged operations to `snapshot` in order.
    ///
    /// Returns the number of operations applied.
    pub fn apply(&mut self, snapshot: &mut IndexSnapshot) -> usize {
        let ops = std::mem::take(&mut self.pending);
        let applied = ops.len();

        for op in ops {
            match op {
                IndexOp::Upsert(document) => {
                    snapshot.upsert(Arc::new(document.clone()));
                    self.uncommitted.push(WalPayload::Upsert { document });
                }
                IndexOp::Delete(path) => {
                    if snapshot.delete(&path).is_some() {
                        self.uncommitted.push(WalPayload::Delete { path });
                    }
                }
                IndexOp::Rename { from, to } => {
                    if from == to {
                        continue;
                    }
                    match snapshot.delete(&from) {
                        Some(document) => {
                            let moved = document.as_ref().clone().relocated(to);
                            snapshot.upsert(Arc::new(moved.clone()));
                            self.uncommitted.push(WalPayload::Delete { path: from });
                            self.uncommitted.push(WalPayload::Upsert { document: moved });
                        }
                        None => debug!("Rename of unindexed {from} ignored"),
                    }
                }
                IndexOp::Clear => {
                    snapshot.clear();
                    self.uncommitted.push(WalPayload::Clear);
                }
            }
        }

        applied
    }

    /// Applied operations not yet handed to the WAL.
    pub fn take_uncommitted(&mut self) -> Vec<WalPayload> {
        std::mem::take(&mut self.uncommitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::reader::IndexReader;

    fn writer() -> IndexWriter {
        IndexWriter::new(Arc::new(PerFieldAnalyzer::for_index_terms()))
    }

    fn path(path: &str) -> AssetPath {
        AssetPath::new(path).unwrap()
    }

    #[test]
    fn test_normalize_lowercases_values() {
        let document = IndexDocument::new(path("a.rdrl"), "guided_rule").with_terms([
            IndexTerm::type_name("org.mortgages.Applicant"),
            IndexTerm::rule_attribute_name("No-Loop"),
            IndexTerm::rule_attribute_value("  "),
        ]);

        let normalized = writer().normalize(document).unwrap();
        assert!(normalized.contains(&IndexTerm::type_name("org.mortgages.applicant")));
        assert!(normalized.contains(&IndexTerm::rule_attribute_name("no-loop")));
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn test_apply_records_only_effective_changes() {
        let mut writer = writer();
        writer
            .add_document(
                path("a.rdrl"),
                IndexDocument::new(path("ignored.rdrl"), "guided_rule")
                    .with_terms([IndexTerm::rule_name("Approve")]),
            )
            .unwrap();
        writer.delete_document(path("missing.rdrl"));
        writer.rename_document(path("a.rdrl"), path("b.rdrl"));

        let mut snapshot = IndexSnapshot::new();
        assert_eq!(writer.apply(&mut snapshot), 3);
        assert!(!writer.has_pending());
        assert_eq!(snapshot.paths(), vec![path("b.rdrl")]);

        let payloads = writer.take_uncommitted();
        assert_eq!(payloads.len(), 3);
        assert!(matches!(&payloads[1], WalPayload::Delete { path: p } if p.as_str() == "/a.rdrl"));
        assert!(writer.take_uncommitted().is_empty());
    }

    #[test]
    fn test_rollback_discards_pending() {
        let mut writer = writer();
        writer.clear();
        writer.delete_document(path("a.rdrl"));
        assert_eq!(writer.rollback(), 2);

        let mut snapshot = IndexSnapshot::new();
        assert_eq!(writer.apply(&mut snapshot), 0);
        assert_eq!(snapshot.doc_count(), 0);
    }
}
