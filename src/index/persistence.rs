//! On-storage layout of an index: document snapshots, WAL and manifest.
//!
//! The manifest is written last and is the source of truth. It names the
//! snapshot file it trusts, the WAL sequence that snapshot covers and the
//! crc32 of its bytes, so a torn or foreign snapshot is rejected on open.
//! Snapshots are written under a per-sequence name and never overwritten;
//! files the manifest does not name are leftovers of an interrupted
//! compaction.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, RuledexError};
use crate::index::wal::{SeqNumber, WalRecord};
use crate::storage::{Storage, read_file, write_file_atomic};
use crate::term::IndexDocument;

pub const DOCUMENT_SNAPSHOT_PREFIX: &str = "documents-";
pub const WAL_FILE: &str = "wal.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: u32 = 2;

/// Name of the snapshot file covering the WAL through `seq`.
pub fn snapshot_file_name(seq: SeqNumber) -> String {
    format!("{DOCUMENT_SNAPSHOT_PREFIX}{seq}.json")
}

pub fn is_snapshot_file(name: &str) -> bool {
    name.strip_prefix(DOCUMENT_SNAPSHOT_PREFIX)
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|seq| seq.parse::<SeqNumber>().is_ok())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub last_wal_seq: SeqNumber,
    pub documents: Vec<IndexDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    pub index_id: Uuid,
    /// Snapshot file holding the documents through `snapshot_wal_seq`.
    #[serde(default)]
    pub snapshot_file: Option<String>,
    pub snapshot_wal_seq: SeqNumber,
    pub wal_last_seq: SeqNumber,
    pub snapshot_checksum: Option<u32>,
    pub doc_count: u64,
    pub committed_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(index_id: Uuid) -> Self {
        IndexManifest {
            version: MANIFEST_VERSION,
            index_id,
            snapshot_file: None,
            snapshot_wal_seq: 0,
            wal_last_seq: 0,
            snapshot_checksum: None,
            doc_count: 0,
            committed_at: Utc::now(),
        }
    }
}

/// Everything read back from storage by [`load`].
#[derive(Debug, Default)]
pub struct PersistedState {
    pub manifest: Option<IndexManifest>,
    pub documents: Vec<IndexDocument>,
    pub snapshot_wal_seq: SeqNumber,
    pub wal_records: Vec<WalRecord>,
    /// WAL records written after the last manifest. The WAL is replaced
    /// atomically, so they are complete and get replayed.
    pub uncommitted_tail: usize,
}

/// Read and cross-check the persisted files.
pub fn load(storage: &dyn Storage) -> Result<PersistedState> {
    let manifest = load_manifest(storage)?;
    let mut state = PersistedState::default();

    if let Some(manifest) = manifest.as_ref() {
        if manifest.wal_last_seq < manifest.snapshot_wal_seq {
            return Err(RuledexError::index(format!(
                "manifest WAL sequence {} is behind snapshot sequence {}",
                manifest.wal_last_seq, manifest.snapshot_wal_seq
            )));
        }
        if let Some(name) = manifest.snapshot_file.as_deref() {
            let snapshot = load_snapshot(storage, name, manifest)?;
            state.snapshot_wal_seq = snapshot.last_wal_seq;
            state.documents = snapshot.documents;
        }
    }

    if storage.file_exists(WAL_FILE) {
        let bytes = read_file(storage, WAL_FILE)?;
        if !bytes.is_empty() {
            state.wal_records = serde_json::from_slice(&bytes)?;
        }
    }

    let committed_through = manifest.as_ref().map_or(0, |m| m.wal_last_seq);
    state.uncommitted_tail = state
        .wal_records
        .iter()
        .filter(|record| record.seq > committed_through)
        .count();
    if state.uncommitted_tail > 0 && manifest.is_some() {
        warn!(
            "Replaying {} WAL records written after the manifest (sequence {committed_through})",
            state.uncommitted_tail
        );
    }

    state.manifest = manifest;
    Ok(state)
}

fn load_snapshot(
    storage: &dyn Storage,
    name: &str,
    manifest: &IndexManifest,
) -> Result<DocumentSnapshot> {
    if !storage.file_exists(name) {
        return Err(RuledexError::index(format!(
            "document snapshot {name} named by the manifest is missing"
        )));
    }

    let bytes = read_file(storage, name)?;
    let checksum = crc32fast::hash(&bytes);
    if manifest.snapshot_checksum != Some(checksum) {
        return Err(RuledexError::index(format!(
            "document snapshot checksum mismatch: manifest {:?}, computed {checksum}",
            manifest.snapshot_checksum
        )));
    }

    let snapshot: DocumentSnapshot = serde_json::from_slice(&bytes)?;
    if snapshot.last_wal_seq != manifest.snapshot_wal_seq {
        return Err(RuledexError::index(format!(
            "document snapshot sequence mismatch: manifest {}, snapshot {}",
            manifest.snapshot_wal_seq, snapshot.last_wal_seq
        )));
    }
    Ok(snapshot)
}

pub fn load_manifest(storage: &dyn Storage) -> Result<Option<IndexManifest>> {
    if !storage.file_exists(MANIFEST_FILE) {
        return Ok(None);
    }

    let bytes = read_file(storage, MANIFEST_FILE)?;
    let manifest: IndexManifest = serde_json::from_slice(&bytes)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(RuledexError::index(format!(
            "manifest version mismatch: expected {MANIFEST_VERSION}, found {}",
            manifest.version
        )));
    }
    Ok(Some(manifest))
}

/// Write a new snapshot file, returning its name and the crc32 of its bytes.
pub fn write_snapshot(
    storage: &dyn Storage,
    snapshot: &DocumentSnapshot,
) -> Result<(String, u32)> {
    let name = snapshot_file_name(snapshot.last_wal_seq);
    let bytes = serde_json::to_vec(snapshot)?;
    write_file_atomic(storage, &name, &bytes)?;
    Ok((name, crc32fast::hash(&bytes)))
}

/// Delete every snapshot file except `keep`. Returns how many were removed.
pub fn remove_stale_snapshots(storage: &dyn Storage, keep: Option<&str>) -> Result<usize> {
    let mut removed = 0;
    for name in storage.list_files()? {
        if is_snapshot_file(&name) && Some(name.as_str()) != keep {
            storage.delete_file(&name)?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn write_wal(storage: &dyn Storage, records: &[WalRecord]) -> Result<()> {
    let bytes = serde_json::to_vec(records)?;
    write_file_atomic(storage, WAL_FILE, &bytes)
}

pub fn write_manifest(storage: &dyn Storage, manifest: &IndexManifest) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(manifest)?;
    write_file_atomic(storage, MANIFEST_FILE, &bytes)
}
