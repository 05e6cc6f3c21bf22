//! Token system for the fixer
//!
//! Tokens are the atomic units the chain wraps. The lexer emits [`RawToken`]s
//! carrying a kind hint; [`Token::classify`] turns them into immutable
//! [`Token`]s, reclassifying whitespace-only text unconditionally.
//!
//! ## Token Classification
//!
//! - `Keyword`, `Identifier`, `Variable` - names
//! - `Operator`, `Punctuation` - symbols; brackets are punctuation
//! - `StringLiteral`, `NumberLiteral` - constant values
//! - `Whitespace` - spaces, tabs, line breaks
//! - `Comment`, `DocComment` - ignored by most rules
//! - `OpenTag`, `InlineText`, `Unclassified` - everything else

pub mod token;

pub use token::{is_whitespace_text, RawToken, Token, TokenKind, WHITESPACE_CHARS};
