//! Text analysis for index terms.
//!
//! Values of [`IndexTerm`](crate::term::IndexTerm)s pass through an analyzer
//! both when a document is indexed and when a query is built, so that the two
//! sides agree on the normalized form (for example lower-cased type names).

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
