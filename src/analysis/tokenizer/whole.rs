//! Tokenizer that keeps a value intact.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Emits the whole value as one token.
///
/// Qualified class names and rule attribute names are identifiers; splitting
/// `org.mortgages.Applicant` at the dots or `no-loop` at the hyphen would
/// make partial values match.
#[derive(Clone, Debug, Default)]
pub struct WholeTokenizer;

impl WholeTokenizer {
    pub fn new() -> Self {
        WholeTokenizer
    }
}

impl Tokenizer for WholeTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        if text.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        Ok(Box::new(std::iter::once(Token::new(text, 0))))
    }

    fn name(&self) -> &'static str {
        "whole"
    }
}
