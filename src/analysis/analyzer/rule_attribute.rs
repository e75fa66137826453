//! Analyzer for rule attribute names.
//!
//! Attribute names such as `no-loop`, `date-effective` or `ruleflow-group`
//! are matched as whole tokens. A word-splitting analyzer would break them at
//! the hyphen and let `no` match `no-loop`.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::strip::StripFilter;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::Result;

/// Emits the whole attribute name as one trimmed, lower-cased token.
#[derive(Debug, Clone)]
pub struct RuleAttributeNameAnalyzer {
    inner: PipelineAnalyzer,
}

impl RuleAttributeNameAnalyzer {
    /// Create a new rule attribute name analyzer.
    pub fn new() -> Self {
        let inner = PipelineAnalyzer::new(Arc::new(WholeTokenizer::new()))
            .add_filter(Arc::new(StripFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("rule_attribute_name");

        RuleAttributeNameAnalyzer { inner }
    }
}

impl Default for RuleAttributeNameAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for RuleAttributeNameAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "rule_attribute_name"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_hyphenated_attribute_is_atomic() {
        let analyzer = RuleAttributeNameAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze("No-Loop").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "no-loop");
    }

    #[test]
    fn test_multi_word_attribute_is_atomic() {
        let analyzer = RuleAttributeNameAnalyzer::new();
        let tokens: Vec<Token> = analyzer.analyze(" lock on active ").unwrap().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "lock on active");
    }
}
