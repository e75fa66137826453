//! Background indexing of asset store changes.
//!
//! The service subscribes to an [`AssetStore`] and runs a worker thread that
//! turns change events into index updates: read the latest content, pick the
//! indexer by path, extract the document and stage it. Each batch of events
//! ends with a refresh, so its effects become searchable together; commits
//! happen every few batches and on shutdown.
//!
//! Callers that need to see their own writes wait on
//! [`IndexingService::wait_until_processed`] with the revision returned by
//! the store.
//!
//! The worker is the only thread that updates the index. Full rebuilds are
//! sent to it as commands, so they are ordered with the change events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::index::IndexStore;
use crate::indexer::IndexerRegistry;
use crate::term::{AssetPath, IndexDocument};
use crate::vfs::{AssetStore, ChangeEvent, ChangeKind, Revision};

/// Configuration for an [`IndexingService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Most events handled before a refresh.
    pub batch_size: usize,
    /// How long the worker blocks waiting for an event.
    pub poll_interval_ms: u64,
    /// Commit after this many batches.
    pub commit_every_batches: usize,
    /// Bound used by [`IndexingService::wait_until_caught_up`].
    pub default_wait_ms: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        IndexingConfig {
            batch_size: 64,
            poll_interval_ms: 50,
            commit_every_batches: 8,
            default_wait_ms: 5000,
        }
    }
}

impl IndexingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }
}

/// Counters of the work done by an [`IndexingService`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingStats {
    pub events: u64,
    pub indexed: u64,
    pub removed: u64,
    pub renamed: u64,
    /// Events for paths no indexer handles.
    pub skipped: u64,
    /// Events whose asset could not be read or parsed.
    pub failed: u64,
    pub batches: u64,
    pub commits: u64,
}

struct Shared {
    store: Arc<dyn AssetStore>,
    index: Arc<IndexStore>,
    registry: IndexerRegistry,
    config: IndexingConfig,
    running: AtomicBool,
    processed: Mutex<Revision>,
    processed_changed: Condvar,
    stats: Mutex<IndexingStats>,
}

/// Work other than change events, run on the worker thread.
enum Command {
    Reindex { reply: Sender<Result<usize>> },
}

pub struct IndexingService {
    shared: Arc<Shared>,
    commands: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl IndexingService {
    /// Subscribe to `store` and start the worker thread.
    pub fn start(
        store: Arc<dyn AssetStore>,
        index: Arc<IndexStore>,
        registry: IndexerRegistry,
        config: IndexingConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 || config.commit_every_batches == 0 {
            return Err(RuledexError::invalid_config(
                "batch_size and commit_every_batches must be positive",
            ));
        }

        let events = store.subscribe();
        let (commands, command_receiver) = unbounded();
        let processed = store.last_revision();
        let shared = Arc::new(Shared {
            store,
            index,
            registry,
            config,
            running: AtomicBool::new(true),
            processed: Mutex::new(processed),
            processed_changed: Condvar::new(),
            stats: Mutex::new(IndexingStats::default()),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("ruledex-indexer".to_string())
                .spawn(move || shared.run(events, command_receiver))?
        };
        info!("Indexing service started at revision {processed}");

        Ok(IndexingService {
            shared,
            commands,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn index(&self) -> &Arc<IndexStore> {
        &self.shared.index
    }

    pub fn config(&self) -> &IndexingConfig {
        &self.shared.config
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Revision of the last change whose effects are searchable.
    pub fn processed_sequence(&self) -> Revision {
        *self.shared.processed.lock()
    }

    /// Block until the change made under `revision` is searchable.
    pub fn wait_until_processed(&self, revision: Revision, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut processed = self.shared.processed.lock();
        while *processed < revision {
            if !self.is_running() {
                return Err(RuledexError::invalid_operation(
                    "Indexing service is stopped",
                ));
            }
            if self
                .shared
                .processed_changed
                .wait_until(&mut processed, deadline)
                .timed_out()
                && *processed < revision
            {
                return Err(RuledexError::timeout(format!(
                    "revision {revision} not indexed within {timeout:?} (at {})",
                    *processed
                )));
            }
        }
        Ok(())
    }

    /// Wait for every change published so far, bounded by the configured
    /// default wait.
    pub fn wait_until_caught_up(&self) -> Result<()> {
        let revision = self.shared.store.last_revision();
        self.wait_until_processed(revision, self.shared.config.default_wait())
    }

    pub fn stats(&self) -> IndexingStats {
        self.shared.stats.lock().clone()
    }

    /// Rebuild the index from every asset currently in the store.
    ///
    /// Runs on the worker between two batches of change events. Assets are
    /// parsed in parallel; the index content is replaced in one refresh and
    /// committed. Returns the number of documents indexed.
    pub fn reindex_all(&self) -> Result<usize> {
        if !self.is_running() {
            return Err(RuledexError::invalid_operation("Indexing service is stopped"));
        }
        let (reply, outcome) = bounded(1);
        self.commands
            .send(Command::Reindex { reply })
            .map_err(|_| RuledexError::invalid_operation("Indexing service is stopped"))?;
        outcome.recv().map_err(|_| {
            RuledexError::invalid_operation("Indexing service stopped before reindexing")
        })?
    }

    /// Stop the worker after it drains queued events and commits.
    pub fn stop(&self) -> Result<()> {
        self.shared.running.store(false, Ordering::Release);
        let Some(worker) = self.worker.lock().take() else {
            return Ok(());
        };
        {
            let _guard = self.shared.processed.lock();
            self.shared.processed_changed.notify_all();
        }
        worker
            .join()
            .map_err(|_| RuledexError::internal("indexing worker panicked"))?;
        info!("Indexing service stopped at revision {}", self.processed_sequence());
        Ok(())
    }
}

impl std::fmt::Debug for IndexingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingService")
            .field("config", &self.shared.config)
            .field("processed", &self.processed_sequence())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for IndexingService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop indexing service: {e}");
        }
    }
}

impl Shared {
    fn run(&self, events: Receiver<ChangeEvent>, commands: Receiver<Command>) {
        let mut batches = 0usize;
        while self.running.load(Ordering::Acquire) {
            select! {
                recv(commands) -> command => match command {
                    Ok(command) => self.execute(command),
                    Err(_) => break,
                },
                recv(events) -> event => match event {
                    Ok(first) => {
                        let mut batch = vec![first];
                        batch.extend(events.try_iter().take(self.config.batch_size - 1));
                        self.process_batch(&batch);

                        batches += 1;
                        if batches % self.config.commit_every_batches == 0 {
                            self.commit();
                        }
                    }
                    Err(_) => break,
                },
                default(self.config.poll_interval()) => {}
            }
        }

        loop {
            let batch: Vec<ChangeEvent> = events.try_iter().take(self.config.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            self.process_batch(&batch);
        }
        self.commit();
    }

    fn execute(&self, command: Command) {
        match command {
            Command::Reindex { reply } => {
                let outcome = self.reindex();
                if let Err(e) = &outcome {
                    warn!("Failed to reindex: {e}");
                }
                if reply.send(outcome).is_err() {
                    debug!("Reindex caller went away before the result");
                }
            }
        }
    }

    fn reindex(&self) -> Result<usize> {
        // Content read below is at least as new as this revision.
        let revision = self.store.last_revision();
        let mut sources = Vec::new();
        for path in self.store.list()? {
            if !self.registry.supports(&path) {
                continue;
            }
            if let Some(content) = self.store.read(&path)? {
                sources.push((path, content));
            }
        }

        let parsed: Vec<(AssetPath, Result<IndexDocument>)> = sources
            .par_iter()
            .map(|(path, content)| (path.clone(), self.registry.index_content(path, content)))
            .collect();

        let mut documents = Vec::with_capacity(parsed.len());
        let mut failed = 0;
        for (path, result) in parsed {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Failed to index {path}: {e}");
                    failed += 1;
                }
            }
        }

        let indexed = documents.len();
        self.index.replace_all(documents)?;
        self.index.commit()?;
        self.mark_processed(revision);
        {
            let mut stats = self.stats.lock();
            stats.indexed += indexed as u64;
            stats.failed += failed;
            stats.commits += 1;
        }
        info!("Reindexed {indexed} assets ({failed} failed) at revision {revision}");
        Ok(indexed)
    }

    fn process_batch(&self, batch: &[ChangeEvent]) {
        for event in batch {
            self.handle(event);
        }

        match self.index.refresh() {
            Ok(_) => {
                if let Some(last) = batch.iter().map(|event| event.sequence).max() {
                    self.mark_processed(last);
                }
            }
            // The batch stays unprocessed for waiters.
            Err(e) => warn!("Failed to refresh index: {e}"),
        }

        let mut stats = self.stats.lock();
        stats.events += batch.len() as u64;
        stats.batches += 1;
        debug!("Indexed batch of {} events", batch.len());
    }

    fn mark_processed(&self, revision: Revision) {
        let mut processed = self.processed.lock();
        if revision > *processed {
            *processed = revision;
        }
        self.processed_changed.notify_all();
    }

    fn commit(&self) {
        match self.index.commit() {
            Ok(seq) => {
                self.stats.lock().commits += 1;
                debug!("Committed index at WAL sequence {seq}");
            }
            Err(e) => warn!("Failed to commit index: {e}"),
        }
    }

    fn handle(&self, event: &ChangeEvent) {
        let outcome = match &event.kind {
            ChangeKind::Added | ChangeKind::Modified => self.index_path(&event.path),
            ChangeKind::Deleted => self.remove_path(&event.path),
            ChangeKind::Renamed { from } => self.rename_path(from, &event.path),
        };

        let mut stats = self.stats.lock();
        match outcome {
            Ok(Outcome::Indexed) => stats.indexed += 1,
            Ok(Outcome::Removed) => stats.removed += 1,
            Ok(Outcome::Renamed) => stats.renamed += 1,
            Ok(Outcome::Skipped) => stats.skipped += 1,
            Err(e) => {
                warn!("Failed to index {} at revision {}: {e}", event.path, event.sequence);
                stats.failed += 1;
            }
        }
    }

    fn index_path(&self, path: &AssetPath) -> Result<Outcome> {
        if !self.registry.supports(path) {
            debug!("No indexer for {path}");
            return Ok(Outcome::Skipped);
        }
        let Some(content) = self.store.read(path)? else {
            // Deleted since the event was published.
            self.index.remove(path)?;
            return Ok(Outcome::Removed);
        };
        let document = self.registry.index_content(path, &content)?;
        self.index.index(path.clone(), document)?;
        Ok(Outcome::Indexed)
    }

    fn remove_path(&self, path: &AssetPath) -> Result<Outcome> {
        if !self.registry.supports(path) {
            return Ok(Outcome::Skipped);
        }
        self.index.remove(path)?;
        Ok(Outcome::Removed)
    }

    /// Re-parse the target so that an extension change picks the right
    /// indexer. Both steps land in the same refresh.
    fn rename_path(&self, from: &AssetPath, to: &AssetPath) -> Result<Outcome> {
        if self.registry.supports(from) {
            self.index.remove(from)?;
        }
        match self.index_path(to)? {
            Outcome::Indexed => Ok(Outcome::Renamed),
            other => Ok(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Indexed,
    Removed,
    Renamed,
    Skipped,
}
