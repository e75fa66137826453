//! Filters rewriting the tokens of a term value.
//!
//! Filters are lazy: each wraps the incoming stream in an iterator adapter.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Short identifier shown in analyzer debug output.
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod strip;
