//! # ruledex
//!
//! A near-real-time term index for rule-authoring assets.
//!
//! ## Features
//!
//! - Term extraction from scorecards, test scenarios and guided rules
//! - Conjunctive term queries answered with asset paths
//! - Per-field analysis applied at index and query time
//! - Copy-on-write snapshots: readers never see a half-indexed document
//! - Durable JSON snapshot, write-ahead log and checksummed manifest
//! - Background indexing of asset store changes with an observable
//!   completion signal
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ruledex::index::{IndexStore, IndexStoreConfig};
//! use ruledex::indexer::IndexerRegistry;
//! use ruledex::model::DataModel;
//! use ruledex::service::{IndexingConfig, IndexingService};
//! use ruledex::term::{AssetPath, IndexTerm};
//! use ruledex::vfs::{AssetStore, MemoryAssetStore};
//!
//! # fn main() -> ruledex::error::Result<()> {
//! let assets = Arc::new(MemoryAssetStore::new());
//! let index = Arc::new(IndexStore::open(IndexStoreConfig::default())?);
//! let registry = IndexerRegistry::with_defaults(Arc::new(DataModel::new()));
//! let service = IndexingService::start(
//!     assets.clone(),
//!     index.clone(),
//!     registry,
//!     IndexingConfig::default(),
//! )?;
//!
//! let path = AssetPath::new("/org/mortgages/approve.rdrl")?;
//! let revision = assets.write(&path, r#"{"name": "approve", "package_name": "org.mortgages"}"#)?;
//! service.wait_until_processed(revision, Duration::from_secs(5))?;
//!
//! assert_eq!(index.query(&[IndexTerm::rule_name("approve")])?, vec![path]);
//! service.stop()?;
//! # Ok(())
//! # }
//! ```

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, RuledexError};

pub mod analysis;
pub mod asset;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod model;
pub mod query;
pub mod service;
pub mod storage;
pub mod term;
pub mod vfs;

pub mod prelude {
    pub use crate::asset::{Asset, AssetType};
    pub use crate::error::{Result, RuledexError};
    pub use crate::index::{IndexStore, IndexStoreConfig};
    pub use crate::indexer::{AssetIndexer, IndexerRegistry};
    pub use crate::model::DataModel;
    pub use crate::service::{IndexingConfig, IndexingService};
    pub use crate::term::{AssetPath, IndexDocument, IndexTerm, IndexableElement};
    pub use crate::vfs::{AssetStore, DirectoryAssetStore, MemoryAssetStore};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evaluate `predicate` every `interval` until it holds or `timeout` elapses.
///
/// The predicate runs at least once. Errors from the predicate abort the
/// wait.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate()? {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(RuledexError::timeout(format!(
                "condition not met within {timeout:?}"
            )));
        }
        thread::sleep(interval.min(deadline - now));
    }
}
