//! Term query implementation.

use std::any::Any;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::Query;
use crate::query::matcher::{EmptyMatcher, Matcher, PostingMatcher};
use crate::term::{IndexTerm, IndexableElement};

/// Matches documents holding exactly one term.
///
/// The value is compared as is; run it through the field's analyzer first
/// (see [`QueryBuilder`](crate::query::QueryBuilder)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    term: IndexTerm,
}

impl TermQuery {
    pub fn new<S: Into<String>>(field: IndexableElement, value: S) -> Self {
        TermQuery {
            term: IndexTerm::new(field, value),
        }
    }

    pub fn from_term(term: IndexTerm) -> Self {
        TermQuery { term }
    }

    pub fn term(&self) -> &IndexTerm {
        &self.term
    }
}

impl Query for TermQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        match reader.postings(&self.term) {
            Some(postings) if !postings.is_empty() => Ok(Box::new(PostingMatcher::new(postings))),
            _ => Ok(Box::new(EmptyMatcher::new())),
        }
    }

    fn description(&self) -> String {
        self.term.to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn field(&self) -> Option<IndexableElement> {
        Some(self.term.field)
    }
}
