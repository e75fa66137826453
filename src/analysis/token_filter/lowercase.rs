//! Case folding of term values.
//!
//! ```
//! use ruledex::analysis::token::Token;
//! use ruledex::analysis::token_filter::Filter;
//! use ruledex::analysis::token_filter::lowercase::LowercaseFilter;
//!
//! let tokens = vec![Token::new("java.lang.Integer", 0)];
//! let folded: Vec<_> = LowercaseFilter::new()
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(folded[0].text, "java.lang.integer");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.text.bytes().any(|b| b.is_ascii_uppercase()) || !token.text.is_ascii() {
                token.map_text(str::to_lowercase)
            } else {
                token
            }
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
