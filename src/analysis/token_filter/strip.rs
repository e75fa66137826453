//! Trimming of surrounding whitespace.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Trims each token and drops tokens that are blank.
///
/// Values typed into rule editors often carry stray spaces (`" no-loop"`);
/// a blank value must never become an indexed term.
#[derive(Clone, Debug, Default)]
pub struct StripFilter;

impl StripFilter {
    pub fn new() -> Self {
        StripFilter
    }
}

impl Filter for StripFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.filter_map(|token| {
            let trimmed = token.text.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.len() == token.text.len() {
                Some(token)
            } else {
                let trimmed = trimmed.to_string();
                Some(token.map_text(|_| trimmed))
            }
        })))
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}
