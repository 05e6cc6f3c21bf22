//! Lexical analysis module
//!
//! Tokenizes PHP source into raw `(kind_hint, text)` tokens for the chain.
//! Bounds on token count, comment length and string size are compile-time.

pub mod analyzer;

use crate::tokens::RawToken;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize with default preferences
pub fn tokenize(source: &str) -> Result<Vec<RawToken>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Check that every lexical error code is registered with metadata
pub fn validate_error_codes() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::UNTERMINATED_COMMENT,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
        crate::logging::codes::lexical::COMMENT_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}
