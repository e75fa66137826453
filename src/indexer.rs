//! Term extraction from parsed assets.
//!
//! Each asset kind has an [`AssetIndexer`] that walks its model and records
//! the referenced types, fields, rules and attributes in a
//! [`DocumentBuilder`]. Values are emitted as written (qualified but not
//! case-normalized); the index store normalizes them per field.

use std::sync::Arc;

use crate::asset::persistence;
use crate::asset::{Asset, AssetType};
use crate::error::Result;
use crate::model::DataModel;
use crate::term::{AssetPath, IndexDocument};

pub mod builder;
pub mod guided_rule;
pub mod registry;
pub mod scenario;
pub mod scorecard;

pub use builder::{DocumentBuilder, ReferenceResolver};
pub use guided_rule::GuidedRuleIndexer;
pub use registry::IndexerRegistry;
pub use scenario::TestScenarioIndexer;
pub use scorecard::ScoreCardIndexer;

/// Produces the [`IndexDocument`] for one asset kind.
pub trait AssetIndexer: Send + Sync {
    /// The asset kind handled by this indexer.
    fn asset_type(&self) -> AssetType;

    /// Whether `path` names an asset this indexer handles.
    fn supports(&self, path: &AssetPath) -> bool {
        AssetType::from_path(path) == Some(self.asset_type())
    }

    /// Extract the terms of an already parsed asset.
    fn index_asset(&self, path: &AssetPath, asset: &Asset) -> Result<IndexDocument>;

    /// Parse persisted content and extract its terms.
    fn index_content(&self, path: &AssetPath, content: &str) -> Result<IndexDocument> {
        let asset = persistence::unmarshal(self.asset_type(), content)?;
        self.index_asset(path, &asset)
    }
}

/// The indexers for every supported asset kind, sharing one data model.
pub fn default_indexers(data_model: Arc<DataModel>) -> Vec<Arc<dyn AssetIndexer>> {
    vec![
        Arc::new(ScoreCardIndexer::new(Arc::clone(&data_model))),
        Arc::new(TestScenarioIndexer::new(Arc::clone(&data_model))),
        Arc::new(GuidedRuleIndexer::new(data_model)),
    ]
}
