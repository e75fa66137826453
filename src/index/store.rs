//! The index store: one writer, many concurrent readers.
//!
//! Mutations are staged in the [`IndexWriter`]. [`IndexStore::refresh`]
//! applies them to a copy of the current [`IndexSnapshot`] and swaps the
//! copy in, so a reader holding the previous snapshot keeps seeing it
//! unchanged. [`IndexStore::commit`] appends what was applied to the WAL,
//! compacting it into a document snapshot once it grows past the configured
//! threshold.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex, RwLock};
use uuid::Uuid;

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::{Result, RuledexError};
use crate::index::persistence::{self, DocumentSnapshot, IndexManifest, MANIFEST_FILE};
use crate::index::reader::IndexReader;
use crate::index::searcher::IndexSearcher;
use crate::index::snapshot::IndexSnapshot;
use crate::index::wal::{IndexWal, SeqNumber};
use crate::index::writer::IndexWriter;
use crate::index::{IndexStats, IndexStoreConfig};
use crate::query::builder::QueryBuilder;
use crate::query::{Query, SearchResults};
use crate::storage::{Storage, StorageFactory};
use crate::term::{AssetPath, IndexDocument, IndexTerm};

pub struct IndexStore {
    config: IndexStoreConfig,
    storage: Arc<dyn Storage>,
    analyzer: Arc<PerFieldAnalyzer>,
    writer: Mutex<IndexWriter>,
    current: RwLock<Arc<IndexSnapshot>>,
    /// Mirrors the published generation for [`IndexStore::wait_for_generation`].
    generation: Mutex<u64>,
    generation_changed: Condvar,
    wal: IndexWal,
    manifest: Mutex<IndexManifest>,
    closed: AtomicBool,
}

impl IndexStore {
    /// Open the store described by `config` with the default analyzers.
    pub fn open(config: IndexStoreConfig) -> Result<Self> {
        let storage = StorageFactory::create(config.storage.clone())?;
        Self::open_with(storage, config, PerFieldAnalyzer::for_index_terms())
    }

    /// Open a store on an existing storage with custom analyzers.
    pub fn open_with(
        storage: Arc<dyn Storage>,
        config: IndexStoreConfig,
        analyzer: PerFieldAnalyzer,
    ) -> Result<Self> {
        let state = persistence::load(storage.as_ref())?;

        let mut manifest = state
            .manifest
            .unwrap_or_else(|| IndexManifest::new(Uuid::new_v4()));
        let wal = IndexWal::from_records(
            state.wal_records,
            manifest.wal_last_seq.max(state.snapshot_wal_seq),
        );
        manifest.wal_last_seq = wal.last_seq();

        let mut snapshot = IndexSnapshot::from_documents(state.documents);
        let replayed = wal.replay_into(&mut snapshot, state.snapshot_wal_seq);
        snapshot.compact_if_needed();

        if state.uncommitted_tail > 0 {
            manifest.doc_count = snapshot.doc_count();
            manifest.committed_at = Utc::now();
            persistence::write_manifest(storage.as_ref(), &manifest)?;
        }

        match persistence::remove_stale_snapshots(
            storage.as_ref(),
            manifest.snapshot_file.as_deref(),
        ) {
            Ok(0) => {}
            Ok(removed) => debug!("Removed {removed} unreferenced document snapshots"),
            Err(e) => warn!("Failed to remove unreferenced document snapshots: {e}"),
        }

        info!(
            "Opened index {} with {} documents ({} WAL records replayed)",
            manifest.index_id,
            snapshot.doc_count(),
            replayed
        );

        let analyzer = Arc::new(analyzer);
        Ok(IndexStore {
            config,
            storage,
            writer: Mutex::new(IndexWriter::new(Arc::clone(&analyzer))),
            analyzer,
            current: RwLock::new(Arc::new(snapshot)),
            generation: Mutex::new(0),
            generation_changed: Condvar::new(),
            wal,
            manifest: Mutex::new(manifest),
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &IndexStoreConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &Arc<PerFieldAnalyzer> {
        &self.analyzer
    }

    pub fn index_id(&self) -> Uuid {
        self.manifest.lock().index_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(RuledexError::invalid_operation("Index store is closed"));
        }
        Ok(())
    }

    /// Stage `document` as the content indexed for `path`.
    pub fn index(&self, path: AssetPath, document: IndexDocument) -> Result<()> {
        self.ensure_open()?;
        self.writer.lock().add_document(path, document)
    }

    /// Stage the removal of `path`. Unknown paths are ignored.
    pub fn remove(&self, path: &AssetPath) -> Result<()> {
        self.ensure_open()?;
        self.writer.lock().delete_document(path.clone());
        Ok(())
    }

    /// Stage moving the document at `from` to `to`.
    pub fn rename(&self, from: &AssetPath, to: &AssetPath) -> Result<()> {
        self.ensure_open()?;
        self.writer.lock().rename_document(from.clone(), to.clone());
        Ok(())
    }

    /// Stage dropping every document.
    pub fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        self.writer.lock().clear();
        Ok(())
    }

    /// Stage replacing the whole content with `documents`.
    pub fn replace_all<I>(&self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = IndexDocument>,
    {
        self.ensure_open()?;
        let mut writer = self.writer.lock();
        writer.clear();
        for document in documents {
            let path = document.path.clone();
            writer.add_document(path, document)?;
        }
        Ok(())
    }

    /// Drop staged operations that were not refreshed yet.
    pub fn rollback(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.writer.lock().rollback())
    }

    /// Publish staged operations to new searchers.
    ///
    /// Returns the generation now visible.
    pub fn refresh(&self) -> Result<u64> {
        self.ensure_open()?;
        let mut writer = self.writer.lock();
        Ok(self.refresh_locked(&mut writer))
    }

    fn refresh_locked(&self, writer: &mut IndexWriter) -> u64 {
        let current = self.current.read().clone();
        if !writer.has_pending() {
            return current.generation();
        }

        let mut next = current.as_ref().clone();
        drop(current);

        let applied = writer.apply(&mut next);
        if next.compact_if_needed() {
            debug!("Reassigned doc ids of {} documents", next.doc_count());
        }
        let generation = next.generation() + 1;
        next.set_generation(generation);
        *self.current.write() = Arc::new(next);

        *self.generation.lock() = generation;
        self.generation_changed.notify_all();

        debug!("Refreshed index to generation {generation} ({applied} operations)");
        generation
    }

    /// Refresh, then make everything applied so far durable.
    ///
    /// Returns the last WAL sequence number written.
    pub fn commit(&self) -> Result<SeqNumber> {
        self.ensure_open()?;
        self.commit_inner()
    }

    fn commit_inner(&self) -> Result<SeqNumber> {
        let mut writer = self.writer.lock();
        self.refresh_locked(&mut writer);

        let payloads = writer.take_uncommitted();
        if payloads.is_empty() && self.storage.file_exists(MANIFEST_FILE) {
            return Ok(self.wal.last_seq());
        }
        for payload in payloads {
            self.wal.append(payload);
        }

        if self.wal.len() > self.config.wal_compaction_threshold {
            self.compact_wal()?;
        } else {
            persistence::write_wal(self.storage.as_ref(), &self.wal.records())?;
            self.persist_manifest(None)?;
        }
        self.storage.sync()?;

        let seq = self.wal.last_seq();
        debug!("Committed index through WAL sequence {seq}");
        Ok(seq)
    }

    /// Fold the WAL into a fresh document snapshot.
    fn compact_wal(&self) -> Result<()> {
        let snapshot = self.searcher().snapshot().clone();
        let last_wal_seq = self.wal.last_seq();
        let mut documents: Vec<IndexDocument> = snapshot
            .documents()
            .map(|document| document.as_ref().clone())
            .collect();
        documents.sort_by(|a, b| a.path.cmp(&b.path));

        let (file, checksum) = persistence::write_snapshot(
            self.storage.as_ref(),
            &DocumentSnapshot {
                last_wal_seq,
                documents,
            },
        )?;
        self.persist_manifest(Some((last_wal_seq, file.clone(), checksum)))?;

        // Replay skips records the manifest's snapshot covers.
        self.wal.truncate();
        persistence::write_wal(self.storage.as_ref(), &[])?;
        persistence::remove_stale_snapshots(self.storage.as_ref(), Some(&file))?;

        info!(
            "Compacted index WAL into a snapshot of {} documents at sequence {last_wal_seq}",
            snapshot.doc_count()
        );
        Ok(())
    }

    fn persist_manifest(&self, snapshot: Option<(SeqNumber, String, u32)>) -> Result<()> {
        let mut manifest = self.manifest.lock();
        if let Some((seq, file, checksum)) = snapshot {
            manifest.snapshot_wal_seq = seq;
            manifest.snapshot_file = Some(file);
            manifest.snapshot_checksum = Some(checksum);
        }
        manifest.wal_last_seq = self.wal.last_seq();
        manifest.doc_count = self.current.read().doc_count();
        manifest.committed_at = Utc::now();
        persistence::write_manifest(self.storage.as_ref(), &manifest)
    }

    /// A point-in-time searcher over the latest published snapshot.
    pub fn searcher(&self) -> IndexSearcher {
        IndexSearcher::new(self.current.read().clone())
    }

    /// Paths whose document contains every one of `terms`, sorted.
    ///
    /// Values are normalized like indexed values. No terms → no paths.
    pub fn query(&self, terms: &[IndexTerm]) -> Result<Vec<AssetPath>> {
        self.ensure_open()?;
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let query = terms
            .iter()
            .cloned()
            .fold(QueryBuilder::new(), QueryBuilder::add_term)
            .build(&self.analyzer)?;
        self.searcher().paths(&query)
    }

    /// Run an arbitrary query, keeping the first `limit` hits by path.
    pub fn search(&self, query: &dyn Query, limit: usize) -> Result<SearchResults> {
        self.ensure_open()?;
        self.searcher().search(query, limit)
    }

    /// The searchable document stored at `path`.
    pub fn document(&self, path: &AssetPath) -> Result<Option<IndexDocument>> {
        self.ensure_open()?;
        Ok(self
            .current
            .read()
            .get(path)
            .map(|document| document.as_ref().clone()))
    }

    pub fn contains(&self, path: &AssetPath) -> bool {
        self.current.read().contains(path)
    }

    pub fn doc_count(&self) -> u64 {
        self.current.read().doc_count()
    }

    pub fn paths(&self) -> Vec<AssetPath> {
        self.current.read().paths()
    }

    /// Generation of the latest published snapshot.
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Block until a snapshot of at least `generation` is published.
    pub fn wait_for_generation(&self, generation: u64, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut current = self.generation.lock();
        while *current < generation {
            if self.is_closed() {
                return Err(RuledexError::invalid_operation("Index store is closed"));
            }
            if self
                .generation_changed
                .wait_until(&mut current, deadline)
                .timed_out()
                && *current < generation
            {
                return Err(RuledexError::timeout(format!(
                    "index generation {generation} not reached within {timeout:?} (at {})",
                    *current
                )));
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.searcher().snapshot().clone();
        let mut documents_by_type = BTreeMap::new();
        for document in snapshot.documents() {
            *documents_by_type
                .entry(document.asset_type.clone())
                .or_insert(0u64) += 1;
        }
        let manifest = self.manifest.lock().clone();

        IndexStats {
            index_id: manifest.index_id,
            doc_count: snapshot.doc_count(),
            term_count: snapshot.term_count(),
            generation: snapshot.generation(),
            pending_operations: self.writer.lock().pending_len(),
            wal_records: self.wal.len(),
            last_committed_seq: manifest.wal_last_seq,
            snapshot_wal_seq: manifest.snapshot_wal_seq,
            documents_by_type,
        }
    }

    /// Commit and release the storage. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        let committed = self.commit_inner();
        self.closed.store(true, Ordering::Release);
        {
            let _guard = self.generation.lock();
            self.generation_changed.notify_all();
        }
        committed?;
        self.storage.close()?;
        info!("Closed index {}", self.index_id());
        Ok(())
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("config", &self.config)
            .field("generation", &self.generation())
            .field("doc_count", &self.doc_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for IndexStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close index store: {e}");
        }
    }
}
