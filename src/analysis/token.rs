//! Tokens produced while normalizing term values.
//!
//! ```
//! use ruledex::analysis::token::Token;
//!
//! let token = Token::spanning("Mortgage", 1, 4..12);
//! assert_eq!(token.span, 4..12);
//! assert_eq!(token.map_text(|t| t.to_lowercase()).text, "mortgage");
//! ```

use std::fmt;
use std::ops::Range;

/// One normalized fragment of a term value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Index of the token within its value.
    pub position: usize,
    /// Byte range of the token in the value as written.
    pub span: Range<usize>,
}

impl Token {
    /// A token covering all of `text`.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let span = 0..text.len();
        Token {
            text,
            position,
            span,
        }
    }

    pub fn spanning<S: Into<String>>(text: S, position: usize, span: Range<usize>) -> Self {
        Token {
            text: text.into(),
            position,
            span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Rewrite the text, keeping position and span.
    pub fn map_text<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        self.text = f(&self.text);
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokens flowing from a tokenizer through the filters of an analyzer.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
