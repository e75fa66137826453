//! Matchers walk the documents a query matches, in ascending doc id order.
//!
//! Every matcher is positioned on its first match when constructed.
//! `doc_id()` returns [`NO_MORE_DOCS`] once exhausted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;

/// Sentinel doc id of an exhausted matcher.
pub const NO_MORE_DOCS: u64 = u64::MAX;

/// Trait for iterating over matching documents.
pub trait Matcher: Send + Debug {
    /// Get the current document ID.
    fn doc_id(&self) -> u64;

    /// Advance to the next matching document.
    fn next(&mut self) -> Result<bool>;

    /// Advance to the first match at or beyond `target`.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Upper bound on the number of matches.
    fn cost(&self) -> u64;

    /// Check if this matcher is exhausted.
    fn is_exhausted(&self) -> bool;
}

/// A matcher that never matches.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> u64 {
        NO_MORE_DOCS
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn skip_to(&mut self, _target: u64) -> Result<bool> {
        Ok(false)
    }

    fn cost(&self) -> u64 {
        0
    }

    fn is_exhausted(&self) -> bool {
        true
    }
}

/// Iterates a sorted posting list.
#[derive(Debug)]
pub struct PostingMatcher {
    postings: Arc<Vec<u64>>,
    position: usize,
}

impl PostingMatcher {
    /// `postings` must be sorted ascending without duplicates.
    pub fn new(postings: Arc<Vec<u64>>) -> Self {
        PostingMatcher {
            postings,
            position: 0,
        }
    }
}

impl Matcher for PostingMatcher {
    fn doc_id(&self) -> u64 {
        self.postings
            .get(self.position)
            .copied()
            .unwrap_or(NO_MORE_DOCS)
    }

    fn next(&mut self) -> Result<bool> {
        if self.position < self.postings.len() {
            self.position += 1;
        }
        Ok(self.position < self.postings.len())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.position < self.postings.len() {
            let rest = &self.postings[self.position..];
            self.position += rest.partition_point(|&doc| doc < target);
        }
        Ok(self.position < self.postings.len())
    }

    fn cost(&self) -> u64 {
        self.postings.len() as u64
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.postings.len()
    }
}

/// Matches every live document.
#[derive(Debug)]
pub struct AllMatcher {
    inner: PostingMatcher,
}

impl AllMatcher {
    /// `live_docs` must be sorted ascending.
    pub fn new(live_docs: Arc<Vec<u64>>) -> Self {
        AllMatcher {
            inner: PostingMatcher::new(live_docs),
        }
    }
}

impl Matcher for AllMatcher {
    fn doc_id(&self) -> u64 {
        self.inner.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        self.inner.next()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        self.inner.skip_to(target)
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }
}

#[derive(Debug)]
struct MatcherEntry {
    matcher: Box<dyn Matcher>,
}

impl PartialEq for MatcherEntry {
    fn eq(&self, other: &Self) -> bool {
        self.matcher.doc_id() == other.matcher.doc_id()
    }
}

impl Eq for MatcherEntry {}

impl PartialOrd for MatcherEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatcherEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower doc IDs come first
        other.matcher.doc_id().cmp(&self.matcher.doc_id())
    }
}

/// Matches documents matched by any sub-matcher, optionally requiring a
/// minimum number of them.
#[derive(Debug)]
pub struct DisjunctionMatcher {
    heap: BinaryHeap<MatcherEntry>,
    current_doc: u64,
    minimum_match: usize,
    cost: u64,
}

impl DisjunctionMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Result<Self> {
        Self::with_minimum_match(matchers, 1)
    }

    /// A document matches when at least `minimum_match` sub-matchers are on
    /// it.
    pub fn with_minimum_match(
        matchers: Vec<Box<dyn Matcher>>,
        minimum_match: usize,
    ) -> Result<Self> {
        let mut heap = BinaryHeap::new();
        let mut cost = 0;

        for matcher in matchers {
            if !matcher.is_exhausted() {
                cost += matcher.cost();
                heap.push(MatcherEntry { matcher });
            }
        }

        let mut disjunction = DisjunctionMatcher {
            heap,
            current_doc: NO_MORE_DOCS,
            minimum_match: minimum_match.max(1),
            cost,
        };
        disjunction.settle()?;
        Ok(disjunction)
    }

    /// Number of sub-matchers positioned on `doc`.
    fn count_on(&self, doc: u64) -> usize {
        self.heap
            .iter()
            .filter(|entry| entry.matcher.doc_id() == doc)
            .count()
    }

    /// Advance every sub-matcher positioned on `doc`.
    fn advance_past(&mut self, doc: u64) -> Result<()> {
        let mut advanced = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.matcher.doc_id() != doc {
                break;
            }
            if let Some(mut entry) = self.heap.pop()
                && entry.matcher.next()?
            {
                advanced.push(entry);
            }
        }
        self.heap.extend(advanced);
        Ok(())
    }

    /// Move to the lowest doc satisfying the minimum match from the current
    /// heap state.
    fn settle(&mut self) -> Result<()> {
        loop {
            let Some(top) = self.heap.peek().map(|entry| entry.matcher.doc_id()) else {
                self.current_doc = NO_MORE_DOCS;
                return Ok(());
            };
            if self.count_on(top) >= self.minimum_match {
                self.current_doc = top;
                return Ok(());
            }
            self.advance_past(top)?;
        }
    }
}

impl Matcher for DisjunctionMatcher {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.current_doc == NO_MORE_DOCS {
            return Ok(false);
        }

        self.advance_past(self.current_doc)?;
        self.settle()?;
        Ok(!self.is_exhausted())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.current_doc == NO_MORE_DOCS || target <= self.current_doc {
            return Ok(!self.is_exhausted());
        }

        let mut skipped = Vec::new();
        while let Some(mut entry) = self.heap.pop() {
            if entry.matcher.skip_to(target)? {
                skipped.push(entry);
            }
        }
        self.heap.extend(skipped);
        self.settle()?;
        Ok(!self.is_exhausted())
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.current_doc == NO_MORE_DOCS
    }
}

/// Matches documents matched by every sub-matcher.
#[derive(Debug)]
pub struct ConjunctionMatcher {
    matchers: Vec<Box<dyn Matcher>>,
    current_doc: u64,
    cost: u64,
}

impl ConjunctionMatcher {
    /// An empty list of sub-matchers matches nothing.
    pub fn new(mut matchers: Vec<Box<dyn Matcher>>) -> Result<Self> {
        // Lead with the rarest matcher
        matchers.sort_by_key(|m| m.cost());
        let cost = matchers.first().map(|m| m.cost()).unwrap_or(0);

        let mut conjunction = ConjunctionMatcher {
            matchers,
            current_doc: NO_MORE_DOCS,
            cost,
        };
        if !conjunction.matchers.is_empty() {
            conjunction.align()?;
        }
        Ok(conjunction)
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.current_doc = NO_MORE_DOCS;
        Ok(false)
    }

    /// Advance until every sub-matcher sits on the same document.
    fn align(&mut self) -> Result<bool> {
        loop {
            let mut max_doc = 0;
            for matcher in &self.matchers {
                let doc_id = matcher.doc_id();
                if doc_id == NO_MORE_DOCS {
                    return self.exhaust();
                }
                max_doc = max_doc.max(doc_id);
            }

            let mut all_aligned = true;
            for matcher in &mut self.matchers {
                if matcher.doc_id() < max_doc {
                    if !matcher.skip_to(max_doc)? {
                        return self.exhaust();
                    }
                    if matcher.doc_id() != max_doc {
                        all_aligned = false;
                    }
                }
            }

            if all_aligned {
                self.current_doc = max_doc;
                return Ok(true);
            }
        }
    }
}

impl Matcher for ConjunctionMatcher {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }

        if !self.matchers[0].next()? {
            return self.exhaust();
        }

        self.align()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.is_exhausted() || target <= self.current_doc {
            return Ok(!self.is_exhausted());
        }

        if !self.matchers[0].skip_to(target)? {
            return self.exhaust();
        }

        self.align()
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.current_doc == NO_MORE_DOCS
    }
}

/// Matches documents of `positive` not matched by any of `negatives`.
#[derive(Debug)]
pub struct ExclusionMatcher {
    positive: Box<dyn Matcher>,
    negatives: Vec<Box<dyn Matcher>>,
    current_doc: u64,
}

impl ExclusionMatcher {
    pub fn new(positive: Box<dyn Matcher>, negatives: Vec<Box<dyn Matcher>>) -> Result<Self> {
        let mut matcher = ExclusionMatcher {
            positive,
            negatives,
            current_doc: NO_MORE_DOCS,
        };
        matcher.advance_to_next_valid()?;
        Ok(matcher)
    }

    fn is_excluded(&mut self, doc_id: u64) -> Result<bool> {
        for negative in &mut self.negatives {
            if negative.doc_id() < doc_id {
                negative.skip_to(doc_id)?;
            }
            if negative.doc_id() == doc_id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn advance_to_next_valid(&mut self) -> Result<bool> {
        loop {
            let doc_id = self.positive.doc_id();
            if doc_id == NO_MORE_DOCS {
                self.current_doc = NO_MORE_DOCS;
                return Ok(false);
            }

            if !self.is_excluded(doc_id)? {
                self.current_doc = doc_id;
                return Ok(true);
            }

            self.positive.next()?;
        }
    }
}

impl Matcher for ExclusionMatcher {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.is_exhausted() {
            return Ok(false);
        }

        self.positive.next()?;
        self.advance_to_next_valid()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.is_exhausted() || target <= self.current_doc {
            return Ok(!self.is_exhausted());
        }

        self.positive.skip_to(target)?;
        self.advance_to_next_valid()
    }

    fn cost(&self) -> u64 {
        self.positive.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.current_doc == NO_MORE_DOCS
    }
}

/// Matches every live document not matched by `negative`.
#[derive(Debug)]
pub struct NotMatcher {
    inner: ExclusionMatcher,
}

impl NotMatcher {
    pub fn new(negative: Box<dyn Matcher>, live_docs: Arc<Vec<u64>>) -> Result<Self> {
        Ok(NotMatcher {
            inner: ExclusionMatcher::new(Box::new(AllMatcher::new(live_docs)), vec![negative])?,
        })
    }
}

impl Matcher for NotMatcher {
    fn doc_id(&self) -> u64 {
        self.inner.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        self.inner.next()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        self.inner.skip_to(target)
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }
}

/// Drain a matcher into its doc ids.
pub fn collect_doc_ids(matcher: &mut dyn Matcher) -> Result<Vec<u64>> {
    let mut docs = Vec::new();
    while !matcher.is_exhausted() {
        docs.push(matcher.doc_id());
        matcher.next()?;
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postings(docs: &[u64]) -> Box<dyn Matcher> {
        Box::new(PostingMatcher::new(Arc::new(docs.to_vec())))
    }

    #[test]
    fn test_posting_matcher() {
        let mut matcher = PostingMatcher::new(Arc::new(vec![1, 4, 9]));
        assert_eq!(matcher.doc_id(), 1);
        assert!(matcher.skip_to(5).unwrap());
        assert_eq!(matcher.doc_id(), 9);
        assert!(!matcher.next().unwrap());
        assert_eq!(matcher.doc_id(), NO_MORE_DOCS);
        assert!(matcher.is_exhausted());
    }

    #[test]
    fn test_conjunction() {
        let mut matcher = ConjunctionMatcher::new(vec![
            postings(&[1, 2, 5, 8, 9]),
            postings(&[2, 3, 8, 9]),
            postings(&[0, 8, 9]),
        ])
        .unwrap();
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![8, 9]);

        let mut empty = ConjunctionMatcher::new(vec![]).unwrap();
        assert!(collect_doc_ids(&mut empty).unwrap().is_empty());

        let mut disjoint = ConjunctionMatcher::new(vec![postings(&[1]), postings(&[2])]).unwrap();
        assert!(disjoint.is_exhausted());
    }

    #[test]
    fn test_disjunction() {
        let mut matcher =
            DisjunctionMatcher::new(vec![postings(&[1, 5]), postings(&[2, 5, 7]), postings(&[])])
                .unwrap();
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![1, 2, 5, 7]);
    }

    #[test]
    fn test_disjunction_minimum_match() {
        let mut matcher = DisjunctionMatcher::with_minimum_match(
            vec![postings(&[1, 5, 7]), postings(&[2, 5, 7]), postings(&[7])],
            2,
        )
        .unwrap();
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![5, 7]);
    }

    #[test]
    fn test_disjunction_skip_to() {
        let mut matcher =
            DisjunctionMatcher::new(vec![postings(&[1, 5]), postings(&[2, 9])]).unwrap();
        assert!(matcher.skip_to(3).unwrap());
        assert_eq!(matcher.doc_id(), 5);
        assert!(matcher.skip_to(6).unwrap());
        assert_eq!(matcher.doc_id(), 9);
        assert!(!matcher.skip_to(10).unwrap());
    }

    #[test]
    fn test_exclusion_and_not() {
        let mut matcher =
            ExclusionMatcher::new(postings(&[1, 2, 3, 4]), vec![postings(&[2]), postings(&[4, 6])])
                .unwrap();
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![1, 3]);

        let mut matcher = NotMatcher::new(postings(&[0, 3]), Arc::new(vec![0, 1, 3, 6])).unwrap();
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![1, 6]);
    }

    #[test]
    fn test_all_matcher() {
        let mut matcher = AllMatcher::new(Arc::new(vec![0, 2, 3]));
        assert_eq!(collect_doc_ids(&mut matcher).unwrap(), vec![0, 2, 3]);
        assert!(EmptyMatcher::new().is_exhausted());
    }
}
