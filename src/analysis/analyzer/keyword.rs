//! Keyword analyzer that treats the entire input as a single token.
//!
//! Fully-qualified class names and field identifiers are indexed with this
//! analyzer: they are matched exactly, never split on dots or word
//! boundaries.
//!
//! # Examples
//!
//! ```
//! use ruledex::analysis::analyzer::Analyzer;
//! use ruledex::analysis::analyzer::keyword::KeywordAnalyzer;
//!
//! let analyzer = KeywordAnalyzer::lowercased();
//! let tokens: Vec<_> = analyzer.analyze("org.example.Applicant").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].text, "org.example.applicant");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::Result;

/// A keyword analyzer that treats the entire input as a single token.
pub struct KeywordAnalyzer {
    inner: PipelineAnalyzer,
    lowercase: bool,
}

impl KeywordAnalyzer {
    /// Create a keyword analyzer that keeps the input verbatim.
    pub fn new() -> Self {
        KeywordAnalyzer {
            inner: PipelineAnalyzer::new(Arc::new(WholeTokenizer::new())),
            lowercase: false,
        }
    }

    /// Create a keyword analyzer that trims and lower-cases its single token.
    pub fn lowercased() -> Self {
        KeywordAnalyzer {
            inner: PipelineAnalyzer::new(Arc::new(WholeTokenizer::new()))
                .add_filter(Arc::new(StripFilter::new()))
                .add_filter(Arc::new(LowercaseFilter::new())),
            lowercase: true,
        }
    }

    /// Whether the token is lower-cased.
    pub fn is_lowercased(&self) -> bool {
        self.lowercase
    }
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "keyword"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl std::fmt::Debug for KeywordAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordAnalyzer")
            .field("lowercase", &self.lowercase)
            .finish()
    }
}
