//! PHP-subset lexical analyzer
//!
//! Produces lossless `RawToken`s: concatenating their texts reproduces the
//! input byte for byte. Tokens carry a coarse kind; there is no grammar.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{RawToken, TokenKind, WHITESPACE_CHARS};
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;

/// Lexical analysis errors with compile-time bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },

    #[error("Unterminated comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Comment too long: {length} bytes (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
        }
    }
}

const KEYWORDS: &[&str] = &[
    "abstract", "and", "array", "as", "break", "callable", "case", "catch", "class", "clone",
    "const", "continue", "declare", "default", "do", "echo", "else", "elseif", "empty",
    "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "enum", "extends",
    "final", "finally", "fn", "for", "foreach", "function", "global", "goto", "if",
    "implements", "include", "include_once", "instanceof", "insteadof", "interface", "isset",
    "list", "match", "namespace", "new", "or", "print", "private", "protected", "public",
    "readonly", "require", "require_once", "return", "static", "switch", "throw", "trait",
    "try", "unset", "use", "var", "while", "xor", "yield",
];

/// Multi-character operators, longest first
const OPERATORS: &[&str] = &[
    "<=>", "===", "!==", "**=", "...", "??=", "<<=", ">>=", "?->", "->", "=>", "::", "==", "!=",
    "<>", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=", "/=", ".=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

const SINGLE_OPERATORS: &str = "=+-*/%.<>!?:&|^~@\\$";

/// Per-tokenization counters
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub whitespace_tokens: usize,
    pub comment_count: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,

    // Only filled when detailed metrics are enabled
    pub kind_counts: HashMap<TokenKind, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, kind: TokenKind, text: &str, preferences: &LexicalPreferences) {
        match kind {
            TokenKind::Whitespace => {
                self.whitespace_tokens += 1;
                if !preferences.include_whitespace_in_counts {
                    return;
                }
            }
            TokenKind::Comment | TokenKind::DocComment => {
                self.comment_count += 1;
                self.max_comment_length = self.max_comment_length.max(text.len());
            }
            TokenKind::StringLiteral => {
                self.max_string_length = self.max_string_length.max(text.len());
            }
            _ => {}
        }

        self.total_tokens += 1;
        if preferences.collect_detailed_metrics {
            *self.kind_counts.entry(kind).or_insert(0) += 1;
        }
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Metrics of the last `tokenize` call
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Split `source` into raw tokens
    pub fn tokenize(&mut self, source: &str) -> Result<Vec<RawToken>, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT,
            "max_string_size_allowed" => MAX_STRING_SIZE
        );

        let mut tokens: Vec<RawToken> = Vec::new();
        let mut pos = 0;
        let mut line = 1;
        let mut in_code = false;
        let mut after_member_access = false;

        while pos < source.len() {
            let rest = &source[pos..];
            let scanned = if in_code {
                scan_code(rest, line, after_member_access)
            } else {
                Ok(scan_inline(rest))
            };

            let (kind, len) = match scanned {
                Ok(found) => found,
                Err(error) => {
                    log_error!(error.error_code(), "Lexical analysis failed",
                        "line" => line,
                        "tokens_processed" => tokens.len()
                    );
                    return Err(error);
                }
            };

            if tokens.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    count: tokens.len() + 1,
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    "token_count" => tokens.len(),
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }

            let text = &rest[..len];
            match kind {
                TokenKind::OpenTag => in_code = text.starts_with("<?"),
                TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment => {}
                _ => after_member_access = kind == TokenKind::Operator && matches!(text, "->" | "?->"),
            }

            self.metrics.record_token(kind, text, &self.preferences);
            tokens.push(RawToken::new(kind, text));
            line += text.matches('\n').count();
            pos += len;
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis completed",
            "tokens" => tokens.len(),
            "lines" => line,
            "comments" => self.metrics.comment_count
        );

        Ok(tokens)
    }
}

/// Text outside `<?php ... ?>`
fn scan_inline(rest: &str) -> (TokenKind, usize) {
    let lowered = rest.to_ascii_lowercase();
    if lowered.starts_with("<?php") {
        return (TokenKind::OpenTag, 5);
    }
    if rest.starts_with("<?=") {
        return (TokenKind::OpenTag, 3);
    }

    let next_tag = [lowered.find("<?php"), rest.find("<?=")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    (TokenKind::InlineText, next_tag)
}

fn scan_code(rest: &str, line: usize, after_member_access: bool) -> Result<(TokenKind, usize), LexerError> {
    let mut chars = rest.chars();
    let Some(ch) = chars.next() else {
        return Ok((TokenKind::Unclassified, 0));
    };
    let second = chars.next();

    let scanned = match ch {
        c if WHITESPACE_CHARS.contains(&c) => (
            TokenKind::Whitespace,
            prefix_len(rest, |c| WHITESPACE_CHARS.contains(&c)),
        ),
        '$' if second.is_some_and(is_ident_start) => {
            (TokenKind::Variable, 1 + prefix_len(&rest[1..], is_ident_char))
        }
        c if is_ident_start(c) => {
            let len = prefix_len(rest, is_ident_char);
            let word = &rest[..len];
            let is_keyword = !after_member_access
                && KEYWORDS.iter().any(|keyword| word.eq_ignore_ascii_case(keyword));
            let kind = if is_keyword {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            (kind, len)
        }
        '0'..='9' => (TokenKind::NumberLiteral, scan_number(rest)),
        '.' if second.is_some_and(|c| c.is_ascii_digit()) => (TokenKind::NumberLiteral, scan_number(rest)),
        '\'' | '"' => (TokenKind::StringLiteral, scan_quoted(rest, ch, line)?),
        '#' if second == Some('[') => (TokenKind::Punctuation, 2),
        '#' => (TokenKind::Comment, scan_line_comment(rest)?),
        '/' if second == Some('/') => (TokenKind::Comment, scan_line_comment(rest)?),
        '/' if second == Some('*') => scan_block_comment(rest, line)?,
        '?' if second == Some('>') => (TokenKind::OpenTag, 2),
        '<' if rest.starts_with("<<<") => match scan_heredoc(rest, line)? {
            Some(len) => (TokenKind::StringLiteral, len),
            None => (TokenKind::Operator, 2),
        },
        '(' | ')' | '[' | ']' | '{' | '}' | ';' | ',' => (TokenKind::Punctuation, 1),
        _ => match OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            Some(op) => (TokenKind::Operator, op.len()),
            None if SINGLE_OPERATORS.contains(ch) => (TokenKind::Operator, 1),
            None => (TokenKind::Unclassified, ch.len_utf8()),
        },
    };

    Ok(scanned)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn prefix_len(text: &str, keep: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|(_, c)| !keep(*c))
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

fn scan_number(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits_from = |start: usize, accept: fn(u8) -> bool| {
        let mut end = start;
        while end < bytes.len() && (accept(bytes[end]) || bytes[end] == b'_') {
            end += 1;
        }
        end
    };

    if bytes.len() > 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' if bytes[2].is_ascii_hexdigit() => return digits_from(2, |b| b.is_ascii_hexdigit()),
            b'b' | b'B' if matches!(bytes[2], b'0' | b'1') => return digits_from(2, |b| matches!(b, b'0' | b'1')),
            _ => {}
        }
    }

    let mut end = digits_from(0, |b| b.is_ascii_digit());
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end = digits_from(end + 1, |b| b.is_ascii_digit());
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent = end + 1;
        if exponent < bytes.len() && matches!(bytes[exponent], b'+' | b'-') {
            exponent += 1;
        }
        if exponent < bytes.len() && bytes[exponent].is_ascii_digit() {
            end = digits_from(exponent, |b| b.is_ascii_digit());
        }
    }
    end
}

fn scan_quoted(rest: &str, quote: char, line: usize) -> Result<usize, LexerError> {
    let bytes = rest.as_bytes();
    let quote = quote as u8;
    let mut index = 1;

    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b if b == quote => {
                let size = index + 1;
                if size > MAX_STRING_SIZE {
                    return Err(LexerError::StringTooLarge { size });
                }
                return Ok(size);
            }
            _ => index += 1,
        }
    }

    Err(LexerError::UnterminatedString { line })
}

fn scan_line_comment(rest: &str) -> Result<usize, LexerError> {
    let end = [rest.find('\n'), rest.find('\r'), rest.find("?>")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    if end > MAX_COMMENT_LENGTH {
        return Err(LexerError::CommentTooLong { length: end });
    }
    Ok(end)
}

fn scan_block_comment(rest: &str, line: usize) -> Result<(TokenKind, usize), LexerError> {
    let Some(close) = rest[2..].find("*/") else {
        return Err(LexerError::UnterminatedComment { line });
    };
    let len = close + 4;
    if len > MAX_COMMENT_LENGTH {
        return Err(LexerError::CommentTooLong { length: len });
    }

    let is_doc = rest.starts_with("/**")
        && rest[3..]
            .chars()
            .next()
            .is_some_and(|c| WHITESPACE_CHARS.contains(&c));
    let kind = if is_doc {
        TokenKind::DocComment
    } else {
        TokenKind::Comment
    };
    Ok((kind, len))
}

/// Heredoc or nowdoc through its closing label; `None` if `<<<` does not start one
fn scan_heredoc(rest: &str, line: usize) -> Result<Option<usize>, LexerError> {
    let header = &rest[3..];
    let mut offset = 3 + prefix_len(header, |c| c == ' ' || c == '\t');

    let quote = match rest[offset..].chars().next() {
        Some(q @ ('\'' | '"')) => {
            offset += 1;
            Some(q)
        }
        _ => None,
    };

    let label_len = prefix_len(&rest[offset..], is_ident_char);
    if label_len == 0 || !rest[offset..].starts_with(is_ident_start) {
        return Ok(None);
    }
    let label = &rest[offset..offset + label_len];
    offset += label_len;

    if let Some(q) = quote {
        if !rest[offset..].starts_with(q) {
            return Ok(None);
        }
        offset += 1;
    }

    let body_start = match rest[offset..].find('\n') {
        Some(newline) if rest[offset..offset + newline].trim_end_matches('\r').is_empty() => offset + newline + 1,
        _ => return Ok(None),
    };

    let mut line_start = body_start;
    while line_start <= rest.len() {
        let line_text = &rest[line_start..];
        let indent = prefix_len(line_text, |c| c == ' ' || c == '\t');
        let candidate = &line_text[indent..];
        if candidate.starts_with(label)
            && !candidate[label.len()..].starts_with(is_ident_char)
        {
            let size = line_start + indent + label.len();
            if size > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge { size });
            }
            return Ok(Some(size));
        }
        match line_text.find('\n') {
            Some(newline) => line_start += newline + 1,
            None => break,
        }
    }

    Err(LexerError::UnterminatedString { line })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> Vec<RawToken> {
        LexicalAnalyzer::new().tokenize(source).unwrap()
    }

    fn kinds_and_texts(source: &str) -> Vec<(TokenKind, String)> {
        lex(source)
            .into_iter()
            .map(|token| (token.kind_hint, token.text))
            .collect()
    }

    fn assert_lossless(source: &str) {
        let rebuilt: String = lex(source).into_iter().map(|token| token.text).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_property_assignment() {
        use TokenKind::*;
        let tokens = kinds_and_texts("<?php\n$this->foo = 'bar';");
        let expected: Vec<(TokenKind, String)> = vec![
            (OpenTag, "<?php"),
            (Whitespace, "\n"),
            (Variable, "$this"),
            (Operator, "->"),
            (Identifier, "foo"),
            (Whitespace, " "),
            (Operator, "="),
            (Whitespace, " "),
            (StringLiteral, "'bar'"),
            (Punctuation, ";"),
        ]
        .into_iter()
        .map(|(kind, text)| (kind, text.to_string()))
        .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_whitespace_runs_are_maximal() {
        let tokens = kinds_and_texts("<?php\n    \n\t$a;");
        assert_eq!(tokens[1], (TokenKind::Whitespace, "\n    \n\t".to_string()));
    }

    #[test]
    fn test_keywords_and_member_names() {
        let tokens = kinds_and_texts("<?php PRIVATE function $x->class");
        assert_eq!(tokens[2].0, TokenKind::Keyword);
        assert_eq!(tokens[4].0, TokenKind::Keyword);
        assert_eq!(tokens[8], (TokenKind::Identifier, "class".to_string()));
    }

    #[test]
    fn test_comments() {
        let tokens = kinds_and_texts("<?php\n/** doc */\n/**/ // tail\n# hash");
        assert_eq!(tokens[2], (TokenKind::DocComment, "/** doc */".to_string()));
        assert_eq!(tokens[4], (TokenKind::Comment, "/**/".to_string()));
        assert_eq!(tokens[6], (TokenKind::Comment, "// tail".to_string()));
        assert_eq!(tokens[8], (TokenKind::Comment, "# hash".to_string()));
    }

    #[test]
    fn test_numbers_and_operators() {
        let tokens = kinds_and_texts("<?php -1.5e3 0x1F === $a ?? [1,2]");
        assert_eq!(tokens[2], (TokenKind::Operator, "-".to_string()));
        assert_eq!(tokens[3], (TokenKind::NumberLiteral, "1.5e3".to_string()));
        assert_eq!(tokens[5], (TokenKind::NumberLiteral, "0x1F".to_string()));
        assert_eq!(tokens[7], (TokenKind::Operator, "===".to_string()));
        assert_eq!(tokens[11], (TokenKind::Operator, "??".to_string()));
        assert_eq!(tokens[13], (TokenKind::Punctuation, "[".to_string()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = kinds_and_texts(r#"<?php "a\"b" 'c\'d'"#);
        assert_eq!(tokens[2], (TokenKind::StringLiteral, r#""a\"b""#.to_string()));
        assert_eq!(tokens[4], (TokenKind::StringLiteral, r"'c\'d'".to_string()));
    }

    #[test]
    fn test_heredoc() {
        let source = "<?php $a = <<<EOT\nline 'one'\n  EOT;\n";
        let tokens = kinds_and_texts(source);
        assert_eq!(
            tokens[6],
            (TokenKind::StringLiteral, "<<<EOT\nline 'one'\n  EOT".to_string())
        );
        assert_eq!(tokens[7], (TokenKind::Punctuation, ";".to_string()));
    }

    #[test]
    fn test_inline_text_and_close_tag() {
        let tokens = kinds_and_texts("<html>\n<?php echo 1; ?>\n</html>");
        assert_eq!(tokens[0], (TokenKind::InlineText, "<html>\n".to_string()));
        assert_eq!(tokens[1].0, TokenKind::OpenTag);
        assert_eq!(tokens[8], (TokenKind::OpenTag, "?>".to_string()));
        assert_eq!(tokens[9], (TokenKind::InlineText, "\n</html>".to_string()));
    }

    #[test]
    fn test_lossless() {
        assert_lossless("");
        assert_lossless("no php at all");
        assert_lossless("<?php\r\nclass A { private $b = [1 => 'x', 2 => \"y\"]; }\r\n");
        assert_lossless("<?php\n$s = <<<'NOW'\n$raw\nNOW;\n$é = `cmd` ~ @$x;");
    }

    #[test]
    fn test_unterminated_string() {
        let result = LexicalAnalyzer::new().tokenize("<?php\n$a = 'oops;");
        assert_matches!(result, Err(LexerError::UnterminatedString { line: 2 }));
    }

    #[test]
    fn test_unterminated_comment() {
        let result = LexicalAnalyzer::new().tokenize("<?php /* never closed");
        assert_matches!(result, Err(LexerError::UnterminatedComment { line: 1 }));
    }

    #[test]
    fn test_metrics() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: true,
            include_whitespace_in_counts: false,
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        analyzer.tokenize("<?php // c\n$a = 'xyz';").unwrap();

        let metrics = analyzer.metrics();
        assert_eq!(metrics.comment_count, 1);
        assert_eq!(metrics.whitespace_tokens, 4);
        assert_eq!(metrics.total_tokens, 6);
        assert_eq!(metrics.max_string_length, 5);
        assert_eq!(metrics.kind_counts.get(&TokenKind::Variable), Some(&1));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LexerError::TooManyTokens { count: 1 }.error_code(),
            codes::lexical::TOO_MANY_TOKENS
        );
        assert_eq!(
            LexerError::UnterminatedComment { line: 1 }.error_code(),
            codes::lexical::UNTERMINATED_COMMENT
        );
    }
}
