//! Analyzers combine a tokenizer with a chain of filters.
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Index
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 … Filter N
//! ```
//!
//! # Available Implementations
//!
//! - [`KeywordAnalyzer`](keyword::KeywordAnalyzer) - Entire input as one token
//! - [`PipelineAnalyzer`](pipeline::PipelineAnalyzer) - Custom tokenizer + filter chains
//! - [`RuleAttributeNameAnalyzer`](rule_attribute::RuleAttributeNameAnalyzer) - Atomic attribute
//!   names
//! - [`PerFieldAnalyzer`](per_field::PerFieldAnalyzer) - Different analyzers per index field

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod keyword;
pub mod per_field;
pub mod pipeline;
pub mod rule_attribute;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers are shared between the indexing thread and query callers, hence
/// the `Send + Sync` bound.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Provide access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Analyze `text` and collect the surviving token texts.
///
/// Empty tokens are dropped.
pub fn analyze_terms(analyzer: &dyn Analyzer, text: &str) -> Result<Vec<String>> {
    Ok(analyzer
        .analyze(text)?
        .filter(|token| !token.is_empty())
        .map(|token| token.text)
        .collect())
}
