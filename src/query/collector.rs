//! Collector implementations for gathering search results.

use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::error::Result;
use crate::query::SearchHit;
use crate::term::AssetPath;

/// Trait for collecting search results.
pub trait Collector: Send + Debug {
    /// Collect a matching document.
    fn collect(&mut self, doc_id: u64, path: &AssetPath) -> Result<()>;

    /// Get the final results, ordered by path.
    fn results(&self) -> Vec<SearchHit>;

    /// Get the total number of hits collected.
    fn total_hits(&self) -> u64;

    /// Reset the collector for a new search.
    fn reset(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PathHit {
    path: AssetPath,
    doc_id: u64,
}

/// Keeps the first `max_docs` hits in path order.
#[derive(Debug)]
pub struct TopDocsCollector {
    max_docs: usize,
    /// Max-heap on path: the top is the first hit to drop.
    hits: BinaryHeap<PathHit>,
    total_hits: u64,
}

impl TopDocsCollector {
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
        }
    }

    /// A collector without a limit.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn max_docs(&self) -> usize {
        self.max_docs
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc_id: u64, path: &AssetPath) -> Result<()> {
        self.total_hits += 1;
        if self.max_docs == 0 {
            return Ok(());
        }

        if self.hits.len() < self.max_docs {
            self.hits.push(PathHit {
                path: path.clone(),
                doc_id,
            });
        } else if let Some(last) = self.hits.peek()
            && path < &last.path
        {
            self.hits.pop();
            self.hits.push(PathHit {
                path: path.clone(),
                doc_id,
            });
        }

        Ok(())
    }

    fn results(&self) -> Vec<SearchHit> {
        let mut hits: Vec<_> = self.hits.iter().cloned().collect();
        hits.sort();
        hits.into_iter()
            .map(|hit| SearchHit {
                doc_id: hit.doc_id,
                path: hit.path,
            })
            .collect()
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }

    fn reset(&mut self) {
        self.hits.clear();
        self.total_hits = 0;
    }
}

/// A collector that just counts the number of matching documents.
#[derive(Debug, Default)]
pub struct CountCollector {
    count: u64,
}

impl CountCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Collector for CountCollector {
    fn collect(&mut self, _doc_id: u64, _path: &AssetPath) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn results(&self) -> Vec<SearchHit> {
        // Count collector doesn't return actual documents
        Vec::new()
    }

    fn total_hits(&self) -> u64 {
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}
