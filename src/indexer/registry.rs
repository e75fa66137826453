//! Indexer lookup by asset path.

use std::sync::Arc;

use crate::error::{Result, RuledexError};
use crate::indexer::{AssetIndexer, default_indexers};
use crate::model::DataModel;
use crate::term::{AssetPath, IndexDocument};

/// The set of indexers available to the indexing pipeline.
#[derive(Clone, Default)]
pub struct IndexerRegistry {
    indexers: Vec<Arc<dyn AssetIndexer>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding an indexer for every supported asset kind.
    pub fn with_defaults(data_model: Arc<DataModel>) -> Self {
        IndexerRegistry {
            indexers: default_indexers(data_model),
        }
    }

    /// Add an indexer. Earlier registrations win for a given path.
    pub fn register(&mut self, indexer: Arc<dyn AssetIndexer>) {
        self.indexers.push(indexer);
    }

    pub fn indexer_for(&self, path: &AssetPath) -> Option<&Arc<dyn AssetIndexer>> {
        self.indexers.iter().find(|indexer| indexer.supports(path))
    }

    pub fn supports(&self, path: &AssetPath) -> bool {
        self.indexer_for(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }

    /// Parse and index `content` with the indexer responsible for `path`.
    pub fn index_content(&self, path: &AssetPath, content: &str) -> Result<IndexDocument> {
        let indexer = self
            .indexer_for(path)
            .ok_or_else(|| RuledexError::not_found(format!("No indexer for {path}")))?;
        indexer.index_content(path, content)
    }
}

impl std::fmt::Debug for IndexerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerRegistry")
            .field(
                "asset_types",
                &self
                    .indexers
                    .iter()
                    .map(|i| i.asset_type().as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
