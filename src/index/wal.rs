//! Write-ahead log of committed index operations.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::index::snapshot::IndexSnapshot;
use crate::term::{AssetPath, IndexDocument};

pub type SeqNumber = u64;

#[derive(Debug, Default)]
pub struct IndexWal {
    records: Mutex<Vec<WalRecord>>,
    next_seq: AtomicU64,
}

impl IndexWal {
    /// Restore a log; sequence numbering continues above both the highest
    /// record and `floor`.
    pub fn from_records(records: Vec<WalRecord>, floor: SeqNumber) -> Self {
        let max_seq = records
            .iter()
            .map(|record| record.seq)
            .max()
            .unwrap_or(0)
            .max(floor);
        Self {
            records: Mutex::new(records),
            next_seq: AtomicU64::new(max_seq),
        }
    }

    pub fn records(&self) -> Vec<WalRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn last_seq(&self) -> SeqNumber {
        self.next_seq.load(Ordering::SeqCst)
    }

    pub fn append(&self, payload: WalPayload) -> SeqNumber {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.records.lock().push(WalRecord { seq, payload });
        seq
    }

    /// Drop every record, keeping the sequence counter.
    pub fn truncate(&self) {
        self.records.lock().clear();
    }

    /// Apply the records with a sequence number above `after`.
    pub fn replay_into(&self, snapshot: &mut IndexSnapshot, after: SeqNumber) -> usize {
        let records = self.records.lock();
        let mut replayed = 0;
        for record in records.iter().filter(|record| record.seq > after) {
            record.payload.apply(snapshot);
            replayed += 1;
        }
        replayed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalRecord {
    pub seq: SeqNumber,
    pub payload: WalPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalPayload {
    Upsert { document: IndexDocument },
    Delete { path: AssetPath },
    Clear,
}

impl WalPayload {
    pub(crate) fn apply(&self, snapshot: &mut IndexSnapshot) {
        match self {
            WalPayload::Upsert { document } => {
                snapshot.upsert(std::sync::Arc::new(document.clone()));
            }
            WalPayload::Delete { path } => {
                snapshot.delete(path);
            }
            WalPayload::Clear => snapshot.clear(),
        }
    }
}
