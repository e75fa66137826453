//! Per-field analyzer.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::keyword::KeywordAnalyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::analyzer::rule_attribute::RuleAttributeNameAnalyzer;
use crate::analysis::token::TokenStream;
use crate::error::Result;
use crate::term::IndexableElement;

/// A per-field analyzer that applies different analyzers to different fields.
///
/// Fields without a specific analyzer fall back to the default one. Reuse a
/// single instance through `Arc::clone` when several fields share an
/// analyzer.
///
/// # Example
///
/// ```
/// use ruledex::analysis::analyzer::Analyzer;
/// use ruledex::analysis::analyzer::keyword::KeywordAnalyzer;
/// use ruledex::analysis::analyzer::per_field::PerFieldAnalyzer;
/// use ruledex::analysis::analyzer::pipeline::PipelineAnalyzer;
/// use std::sync::Arc;
///
/// let keyword_analyzer: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::lowercased());
/// let mut analyzer = PerFieldAnalyzer::new(Arc::new(PipelineAnalyzer::whitespace_lowercase()));
/// analyzer.add_analyzer("TYPE_NAME", Arc::clone(&keyword_analyzer));
/// analyzer.add_analyzer("PACKAGE_NAME", Arc::clone(&keyword_analyzer));
/// ```
#[derive(Clone)]
pub struct PerFieldAnalyzer {
    /// Default analyzer for fields not in the map.
    default_analyzer: Arc<dyn Analyzer>,

    /// Map of field names to their specific analyzers.
    field_analyzers: AHashMap<String, Arc<dyn Analyzer>>,
}

impl PerFieldAnalyzer {
    /// Create a new per-field analyzer with a default analyzer.
    pub fn new(default_analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            default_analyzer,
            field_analyzers: AHashMap::new(),
        }
    }

    /// The analysis used for every [`IndexableElement`] field.
    ///
    /// Type names, field names, class names, package and rule names are
    /// single lower-cased keywords. Rule attribute names go through
    /// [`RuleAttributeNameAnalyzer`]. Anything else is split on whitespace and
    /// lower-cased.
    pub fn for_index_terms() -> Self {
        let keyword: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::lowercased());
        let mut analyzer =
            PerFieldAnalyzer::new(Arc::new(PipelineAnalyzer::whitespace_lowercase()));

        for element in [
            IndexableElement::TypeName,
            IndexableElement::FieldTypeName,
            IndexableElement::FieldTypeFullyQualifiedClassName,
            IndexableElement::RuleName,
            IndexableElement::PackageName,
        ] {
            analyzer.add_analyzer(element.as_str(), Arc::clone(&keyword));
        }
        analyzer.add_analyzer(
            IndexableElement::RuleAttributeName.as_str(),
            Arc::new(RuleAttributeNameAnalyzer::new()),
        );

        analyzer
    }

    /// Add a field-specific analyzer.
    pub fn add_analyzer(&mut self, field: impl Into<String>, analyzer: Arc<dyn Analyzer>) {
        self.field_analyzers.insert(field.into(), analyzer);
    }

    /// Get the analyzer for a specific field.
    pub fn get_analyzer(&self, field: &str) -> &Arc<dyn Analyzer> {
        self.field_analyzers
            .get(field)
            .unwrap_or(&self.default_analyzer)
    }

    /// Get the default analyzer.
    pub fn default_analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.default_analyzer
    }

    /// Analyze text with the analyzer for the given field.
    pub fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.get_analyzer(field).analyze(text)
    }

    /// Analyze text for `field` and collect the normalized term values.
    pub fn terms_for(&self, field: &str, text: &str) -> Result<Vec<String>> {
        super::analyze_terms(self.get_analyzer(field).as_ref(), text)
    }
}

impl Default for PerFieldAnalyzer {
    fn default() -> Self {
        Self::for_index_terms()
    }
}

impl Analyzer for PerFieldAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        // When used as a regular Analyzer, use the default analyzer
        self.default_analyzer.analyze(text)
    }

    fn name(&self) -> &'static str {
        "PerFieldAnalyzer"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl std::fmt::Debug for PerFieldAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.field_analyzers.keys().collect();
        fields.sort();
        f.debug_struct("PerFieldAnalyzer")
            .field("default", &self.default_analyzer.name())
            .field("fields", &fields)
            .finish()
    }
}
