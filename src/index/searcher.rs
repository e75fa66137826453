//! Point-in-time search over one snapshot.

use std::sync::Arc;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::index::snapshot::IndexSnapshot;
use crate::query::collector::{Collector, CountCollector, TopDocsCollector};
use crate::query::matcher::Matcher;
use crate::query::{Query, SearchResults};
use crate::term::AssetPath;

/// Searches a fixed snapshot; later refreshes of the store are not seen.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    snapshot: Arc<IndexSnapshot>,
}

impl IndexSearcher {
    pub fn new(snapshot: Arc<IndexSnapshot>) -> Self {
        IndexSearcher { snapshot }
    }

    pub fn snapshot(&self) -> &Arc<IndexSnapshot> {
        &self.snapshot
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.generation()
    }

    /// Search for the first `limit` matching paths.
    pub fn search(&self, query: &dyn Query, limit: usize) -> Result<SearchResults> {
        let mut collector = TopDocsCollector::new(limit);
        self.search_with_collector(query, &mut collector)?;
        Ok(SearchResults {
            hits: collector.results(),
            total_hits: collector.total_hits(),
        })
    }

    /// Feed every match of `query` to `collector`, in doc id order.
    pub fn search_with_collector(
        &self,
        query: &dyn Query,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let reader: &dyn IndexReader = self.snapshot.as_ref();
        let mut matcher = query.matcher(reader)?;

        while !matcher.is_exhausted() {
            let doc_id = matcher.doc_id();
            if let Some(document) = reader.document(doc_id) {
                collector.collect(doc_id, &document.path)?;
            }
            matcher.next()?;
        }
        Ok(())
    }

    pub fn count(&self, query: &dyn Query) -> Result<u64> {
        let mut collector = CountCollector::new();
        self.search_with_collector(query, &mut collector)?;
        Ok(collector.count())
    }

    /// All matching paths, sorted.
    pub fn paths(&self, query: &dyn Query) -> Result<Vec<AssetPath>> {
        let mut collector = TopDocsCollector::unbounded();
        self.search_with_collector(query, &mut collector)?;
        Ok(collector
            .results()
            .into_iter()
            .map(|hit| hit.path)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BooleanQuery, TermQuery};
    use crate::term::{IndexDocument, IndexTerm};

    fn searcher() -> IndexSearcher {
        let documents = [
            ("c.scgd", vec!["applicant", "mortgage"]),
            ("a.scgd", vec!["applicant"]),
            ("b.scgd", vec!["mortgage"]),
        ]
        .into_iter()
        .map(|(path, types)| {
            IndexDocument::new(AssetPath::new(path).unwrap(), "scorecard")
                .with_terms(types.into_iter().map(IndexTerm::type_name))
        });
        IndexSearcher::new(Arc::new(IndexSnapshot::from_documents(documents)))
    }

    #[test]
    fn test_search_orders_by_path() {
        let searcher = searcher();
        let query = TermQuery::from_term(IndexTerm::type_name("applicant"));

        let results = searcher.search(&query, 10).unwrap();
        assert_eq!(results.total_hits, 2);
        let paths: Vec<String> = results.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["/a.scgd", "/c.scgd"]);
    }

    #[test]
    fn test_search_limit_keeps_total() {
        let searcher = searcher();
        let mut query = BooleanQuery::new();
        query.add_should(Box::new(TermQuery::from_term(IndexTerm::type_name("applicant"))));
        query.add_should(Box::new(TermQuery::from_term(IndexTerm::type_name("mortgage"))));

        let results = searcher.search(&query, 1).unwrap();
        assert_eq!(results.total_hits, 3);
        assert_eq!(results.paths(), vec![AssetPath::new("a.scgd").unwrap()]);
        assert_eq!(searcher.count(&query).unwrap(), 3);
    }

    #[test]
    fn test_conjunction_paths() {
        let searcher = searcher();
        let mut query = BooleanQuery::new();
        query.add_must(Box::new(TermQuery::from_term(IndexTerm::type_name("applicant"))));
        query.add_must(Box::new(TermQuery::from_term(IndexTerm::type_name("mortgage"))));

        assert_eq!(
            searcher.paths(&query).unwrap(),
            vec![AssetPath::new("c.scgd").unwrap()]
        );
    }
}
