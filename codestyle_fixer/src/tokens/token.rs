//! Token kinds and whitespace-normalizing classification
//!
//! A token is an immutable `(kind, text)` pair. The kind supplied by the lexer
//! is only a hint: whitespace-only text is always classified as `Whitespace`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that make a token whitespace
pub const WHITESPACE_CHARS: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Lexical kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `<?php` / `<?=` opening tag, or the `?>` closing tag
    OpenTag,
    /// Text outside of the code section
    InlineText,
    /// Reserved word (`class`, `function`, `private`, ...)
    Keyword,
    /// Bare name (`Sample`, `__construct`, `true`, ...)
    Identifier,
    /// `$name`
    Variable,
    /// Spaces, tabs and line breaks
    Whitespace,
    /// Single structural character (`;`, `,`, brackets)
    Punctuation,
    /// Operator symbol (`=`, `->`, `::`, `=>`, ...)
    Operator,
    /// `//`, `#` and `/* */` comments
    Comment,
    /// `/** */` documentation comment
    DocComment,
    /// Quoted string
    StringLiteral,
    /// Integer or float
    NumberLiteral,
    /// Anything the lexer could not classify
    Unclassified,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenTag => "open_tag",
            Self::InlineText => "inline_text",
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::Variable => "variable",
            Self::Whitespace => "whitespace",
            Self::Punctuation => "punctuation",
            Self::Operator => "operator",
            Self::Comment => "comment",
            Self::DocComment => "doc_comment",
            Self::StringLiteral => "string_literal",
            Self::NumberLiteral => "number_literal",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token as emitted by a lexer, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub kind_hint: TokenKind,
    pub text: String,
}

impl RawToken {
    pub fn new(kind_hint: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind_hint,
            text: text.into(),
        }
    }
}

/// Immutable classified token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Classify a token, forcing whitespace-only text to `Whitespace`
    pub fn classify(kind: TokenKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if is_whitespace_text(&text) {
            TokenKind::Whitespace
        } else {
            kind
        };
        Self { kind, text }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }

    /// Neither whitespace nor comment
    pub fn is_significant(&self) -> bool {
        !self.is_whitespace() && !self.is_comment()
    }

    /// Check if this token is the given keyword (case-insensitive, as PHP keywords are)
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    pub fn is_punctuation(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation && self.text.len() == ch.len_utf8() && self.text.starts_with(ch)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// `true`, `false` or `null`, in any case
    pub fn is_constant_name(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
            && ["true", "false", "null"]
                .iter()
                .any(|name| self.text.eq_ignore_ascii_case(name))
    }

    pub fn contains_line_break(&self) -> bool {
        self.text.contains('\n')
    }

    /// Opening bracket that starts a group, with its closer; `#[` opens an attribute
    pub fn group_closer(&self) -> Option<char> {
        if self.kind != TokenKind::Punctuation {
            return None;
        }
        match self.text.as_str() {
            "(" => Some(')'),
            "[" => Some(']'),
            "{" => Some('}'),
            "#[" => Some(']'),
            _ => None,
        }
    }

    pub fn is_attribute_opener(&self) -> bool {
        self.kind == TokenKind::Punctuation && self.text == "#["
    }

    pub fn is_group_closer(&self) -> bool {
        self.kind == TokenKind::Punctuation && matches!(self.text.as_str(), ")" | "]" | "}")
    }
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        Token::classify(raw.kind_hint, raw.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Non-empty text made only of whitespace characters
pub fn is_whitespace_text(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| WHITESPACE_CHARS.contains(&c))
}
