//! Top-level configuration, loadable from JSON.
//!
//! ```
//! use ruledex::config::RuledexConfig;
//!
//! let config = RuledexConfig::from_json_str(
//!     r#"{"index": {"storage": {"type": "memory"}}, "indexing": {"batch_size": 8}}"#,
//! )
//! .unwrap();
//! assert_eq!(config.indexing.batch_size, 8);
//! assert_eq!(config.indexing.commit_every_batches, 8);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};
use crate::index::IndexStoreConfig;
use crate::model::DataModel;
use crate::service::IndexingConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuledexConfig {
    pub index: IndexStoreConfig,
    pub indexing: IndexingConfig,
    /// JSON data model used to resolve field classes.
    pub data_model: Option<PathBuf>,
}

impl RuledexConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuledexError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: RuledexConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indexing.batch_size == 0 {
            return Err(RuledexError::invalid_config("indexing.batch_size must be positive"));
        }
        if self.indexing.commit_every_batches == 0 {
            return Err(RuledexError::invalid_config(
                "indexing.commit_every_batches must be positive",
            ));
        }
        Ok(())
    }

    /// The configured data model, or an empty one.
    pub fn load_data_model(&self) -> Result<DataModel> {
        match &self.data_model {
            Some(path) => DataModel::from_json_file(path),
            None => Ok(DataModel::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuledexConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuledexConfig::default());
        assert!(matches!(config.index.storage, StorageConfig::Memory(_)));
        assert!(config.load_data_model().unwrap().type_names().next().is_none());
    }

    #[test]
    fn test_file_storage_config() {
        let config = RuledexConfig::from_json_str(
            r#"{"index": {"storage": {"type": "file", "path": "/tmp/idx"},
                "wal_compaction_threshold": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.index.wal_compaction_threshold, 4);
        assert!(matches!(config.index.storage, StorageConfig::File(_)));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(RuledexConfig::from_json_str(r#"{"indexing": {"batch_size": 0}}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ruledex.json");
        std::fs::write(&path, r#"{"indexing": {"poll_interval_ms": 5}}"#).unwrap();

        let config = RuledexConfig::from_file(&path).unwrap();
        assert_eq!(config.indexing.poll_interval_ms, 5);
        assert!(RuledexConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
