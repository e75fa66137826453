//! Queries over an index snapshot.
//!
//! A [`Query`] produces a [`Matcher`](matcher::Matcher) for a point-in-time
//! [`IndexReader`]; collectors turn the matched doc ids into
//! [`SearchResults`]. Matching is boolean: there is no scoring, and hits are
//! ordered by asset path.

use std::any::Any;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::term::{AssetPath, IndexableElement};

pub mod boolean;
pub mod builder;
pub mod collector;
pub mod matcher;
pub mod term;

pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use builder::QueryBuilder;
pub use collector::{Collector, CountCollector, TopDocsCollector};
pub use term::TermQuery;

/// Trait for all query types.
pub trait Query: Send + Sync + Debug {
    /// Create a matcher for this query.
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>>;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Check if this query matches no documents.
    fn is_empty(&self, reader: &dyn IndexReader) -> Result<bool> {
        Ok(self.matcher(reader)?.is_exhausted())
    }

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The field this query searches in, if it targets a single one.
    fn field(&self) -> Option<IndexableElement> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: u64,
    pub path: AssetPath,
}

/// Hits of a search, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    /// Number of matching documents, including those beyond the limit.
    pub total_hits: u64,
}

impl SearchResults {
    pub fn paths(&self) -> Vec<AssetPath> {
        self.hits.iter().map(|hit| hit.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}
