//! Near-real-time term index over asset documents.
//!
//! The [`IndexStore`] owns a single [`IndexWriter`] and publishes immutable
//! [`IndexSnapshot`]s. Staged operations become searchable on
//! [`IndexStore::refresh`] and durable on [`IndexStore::commit`].
//!
//! # Example
//!
//! ```
//! use ruledex::index::{IndexStore, IndexStoreConfig};
//! use ruledex::term::{AssetPath, IndexDocument, IndexTerm};
//!
//! # fn main() -> ruledex::error::Result<()> {
//! let store = IndexStore::open(IndexStoreConfig::default())?;
//! let path = AssetPath::new("org/mortgages/rates.scgd")?;
//! let document = IndexDocument::new(path.clone(), "scorecard")
//!     .with_terms([IndexTerm::type_name("org.mortgages.Applicant")]);
//!
//! store.index(path.clone(), document)?;
//! store.refresh()?;
//!
//! let hits = store.query(&[IndexTerm::type_name("org.mortgages.Applicant")])?;
//! assert_eq!(hits, vec![path]);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::StorageConfig;

pub mod persistence;
pub mod reader;
pub mod searcher;
pub mod snapshot;
pub mod store;
pub mod wal;
pub mod writer;

pub use reader::IndexReader;
pub use searcher::IndexSearcher;
pub use snapshot::IndexSnapshot;
pub use store::IndexStore;
pub use writer::IndexWriter;

/// Number of WAL records above which a commit compacts the log into a new
/// document snapshot.
pub const DEFAULT_WAL_COMPACTION_THRESHOLD: usize = 64;

/// Configuration for an [`IndexStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexStoreConfig {
    /// Where snapshot, WAL and manifest are kept.
    pub storage: StorageConfig,
    pub wal_compaction_threshold: usize,
}

impl Default for IndexStoreConfig {
    fn default() -> Self {
        IndexStoreConfig {
            storage: StorageConfig::default(),
            wal_compaction_threshold: DEFAULT_WAL_COMPACTION_THRESHOLD,
        }
    }
}

/// Point-in-time statistics of an [`IndexStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub index_id: Uuid,
    pub doc_count: u64,
    pub term_count: u64,
    pub generation: u64,
    pub pending_operations: usize,
    pub wal_records: usize,
    pub last_committed_seq: u64,
    pub snapshot_wal_seq: u64,
    pub documents_by_type: BTreeMap<String, u64>,
}
