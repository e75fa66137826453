//! Boolean query implementation for combining multiple queries.

use std::any::Any;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::Query;
use crate::query::matcher::{
    AllMatcher, ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, ExclusionMatcher, Matcher,
};

/// How a clause takes part in a boolean query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause should match; see `minimum_should_match`.
    Should,
    /// The clause must not match.
    MustNot,
}

#[derive(Debug)]
pub struct BooleanClause {
    pub query: Box<dyn Query>,
    pub occur: Occur,
}

impl Clone for BooleanClause {
    fn clone(&self) -> Self {
        BooleanClause {
            query: self.query.clone_box(),
            occur: self.occur,
        }
    }
}

impl BooleanClause {
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    pub fn must(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    pub fn should(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    pub fn must_not(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// Combines clauses: MUST clauses are intersected, SHOULD clauses are
/// unioned and MUST_NOT clauses are subtracted.
///
/// Without MUST clauses at least `max(1, minimum_should_match)` SHOULD
/// clauses must match. With MUST clauses, SHOULD clauses are only required
/// when `minimum_should_match` is set. A query with only MUST_NOT clauses
/// matches every other live document; a query without clauses matches
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    minimum_should_match: usize,
}

impl BooleanQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must(query));
    }

    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::should(query));
    }

    pub fn add_must_not(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must_not(query));
    }

    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn set_minimum_should_match(&mut self, minimum: usize) {
        self.minimum_should_match = minimum;
    }

    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses_by_occur(&self, occur: Occur) -> Vec<&BooleanClause> {
        self.clauses.iter().filter(|c| c.occur == occur).collect()
    }

    fn matchers(
        clauses: &[&BooleanClause],
        reader: &dyn IndexReader,
    ) -> Result<Vec<Box<dyn Matcher>>> {
        clauses
            .iter()
            .map(|clause| clause.query.matcher(reader))
            .collect()
    }
}

impl Query for BooleanQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.clauses.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let must_clauses = self.clauses_by_occur(Occur::Must);
        let should_clauses = self.clauses_by_occur(Occur::Should);
        let must_not_clauses = self.clauses_by_occur(Occur::MustNot);

        let mut required = Self::matchers(&must_clauses, reader)?;
        if required.iter().any(|m| m.is_exhausted()) {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let should_required = if must_clauses.is_empty() {
            self.minimum_should_match.max(1)
        } else {
            self.minimum_should_match
        };
        if !should_clauses.is_empty() && should_required > 0 {
            if should_required > should_clauses.len() {
                return Ok(Box::new(EmptyMatcher::new()));
            }
            let should = Self::matchers(&should_clauses, reader)?;
            let disjunction = DisjunctionMatcher::with_minimum_match(should, should_required)?;
            if disjunction.is_exhausted() {
                return Ok(Box::new(EmptyMatcher::new()));
            }
            required.push(Box::new(disjunction));
        }

        let positive: Box<dyn Matcher> = match required.len() {
            0 => Box::new(AllMatcher::new(reader.live_docs())),
            1 => match required.pop() {
                Some(matcher) => matcher,
                None => Box::new(EmptyMatcher::new()),
            },
            _ => Box::new(ConjunctionMatcher::new(required)?),
        };

        let negatives: Vec<Box<dyn Matcher>> = Self::matchers(&must_not_clauses, reader)?
            .into_iter()
            .filter(|m| !m.is_exhausted())
            .collect();
        if negatives.is_empty() {
            Ok(positive)
        } else {
            Ok(Box::new(ExclusionMatcher::new(positive, negatives)?))
        }
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{prefix}{}", clause.query.description())
            })
            .collect();

        if self.minimum_should_match > 0 {
            format!("({})~{}", parts.join(" "), self.minimum_should_match)
        } else {
            format!("({})", parts.join(" "))
        }
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
