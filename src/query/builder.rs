//! Building boolean queries from index terms.

use crate::analysis::analyzer::per_field::PerFieldAnalyzer;
use crate::error::{Result, RuledexError};
use crate::query::Query;
use crate::query::boolean::{BooleanClause, BooleanQuery, Occur};
use crate::query::term::TermQuery;
use crate::term::IndexTerm;

/// Collects term predicates and turns them into a [`BooleanQuery`] whose
/// values are normalized the way the index normalized them.
///
/// ```
/// use ruledex::analysis::analyzer::per_field::PerFieldAnalyzer;
/// use ruledex::query::{Query, QueryBuilder};
/// use ruledex::term::IndexTerm;
///
/// let query = QueryBuilder::new()
///     .add_term(IndexTerm::type_name("org.example.Mortgage"))
///     .add_term(IndexTerm::field_type_name("amount"))
///     .build(&PerFieldAnalyzer::for_index_terms())
///     .unwrap();
///
/// assert_eq!(
///     query.description(),
///     "(+TYPE_NAME=org.example.mortgage +FIELD_TYPE_NAME=amount)"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    clauses: Vec<(IndexTerm, Occur)>,
    minimum_should_match: usize,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `term`.
    pub fn add_term(self, term: IndexTerm) -> Self {
        self.add(term, Occur::Must)
    }

    /// Add `term` as an alternative.
    pub fn add_should(self, term: IndexTerm) -> Self {
        self.add(term, Occur::Should)
    }

    /// Exclude documents holding `term`.
    pub fn add_must_not(self, term: IndexTerm) -> Self {
        self.add(term, Occur::MustNot)
    }

    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    pub fn add(mut self, term: IndexTerm, occur: Occur) -> Self {
        self.clauses.push((term, occur));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Analyze every value with its field's analyzer and build the query.
    ///
    /// A value analyzed into several tokens requires all of them (or, for
    /// SHOULD and MUST_NOT, treats them as one conjunctive sub-query). A
    /// value analyzed into nothing is a query error.
    pub fn build(&self, analyzer: &PerFieldAnalyzer) -> Result<BooleanQuery> {
        let mut query = BooleanQuery::new().with_minimum_should_match(self.minimum_should_match);

        for (term, occur) in &self.clauses {
            let tokens = analyzer.terms_for(term.field.as_str(), &term.value)?;
            if tokens.is_empty() {
                return Err(RuledexError::query(format!(
                    "Term {term} has no searchable tokens"
                )));
            }

            let mut term_queries: Vec<Box<dyn Query>> = tokens
                .into_iter()
                .map(|token| Box::new(TermQuery::new(term.field, token)) as Box<dyn Query>)
                .collect();

            match occur {
                Occur::Must => {
                    for term_query in term_queries {
                        query.add_must(term_query);
                    }
                }
                _ if term_queries.len() == 1 => {
                    if let Some(term_query) = term_queries.pop() {
                        query.add_clause(BooleanClause::new(term_query, *occur));
                    }
                }
                _ => {
                    let mut all_tokens = BooleanQuery::new();
                    for term_query in term_queries {
                        all_tokens.add_must(term_query);
                    }
                    query.add_clause(BooleanClause::new(Box::new(all_tokens), *occur));
                }
            }
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::IndexableElement;

    #[test]
    fn test_build_normalizes_values() {
        let query = QueryBuilder::new()
            .add_term(IndexTerm::type_name("  Org.Example.Mortgage "))
            .add_must_not(IndexTerm::rule_attribute_name("No-Loop"))
            .build(&PerFieldAnalyzer::for_index_terms())
            .unwrap();

        assert_eq!(
            query.description(),
            "(+TYPE_NAME=org.example.mortgage -RULE_ATTRIBUTE_NAME=no-loop)"
        );
    }

    #[test]
    fn test_multi_token_values() {
        let query = QueryBuilder::new()
            .add_term(IndexTerm::rule_attribute_value("High Risk"))
            .add_should(IndexTerm::rule_attribute_value("Low Risk"))
            .minimum_should_match(1)
            .build(&PerFieldAnalyzer::for_index_terms())
            .unwrap();

        assert_eq!(
            query.description(),
            concat!(
                "(+RULE_ATTRIBUTE_VALUE=high +RULE_ATTRIBUTE_VALUE=risk ",
                "(+RULE_ATTRIBUTE_VALUE=low +RULE_ATTRIBUTE_VALUE=risk))~1"
            )
        );
    }

    #[test]
    fn test_blank_value_is_an_error() {
        let result = QueryBuilder::new()
            .add_term(IndexTerm::new(IndexableElement::TypeName, "   "))
            .build(&PerFieldAnalyzer::for_index_terms());
        assert!(result.is_err());
    }
}
