//! Stateless navigation helpers over a chain
//!
//! Nothing here mutates the chain. The `Chain` methods at the bottom are the
//! rule-facing spelling of the same helpers.

use super::error::{ChainError, Direction};
use super::list::Chain;
use super::node::NodeId;

/// Nearest node before `id` that is not whitespace
pub fn skip_whitespace_backward(chain: &Chain, id: NodeId) -> Result<NodeId, ChainError> {
    let mut current = chain.previous(id)?;
    for _ in 0..chain.len() {
        if !chain.token(current)?.is_whitespace() {
            return Ok(current);
        }
        current = chain.previous(current)?;
    }
    Err(ChainError::NoSuchNeighbor {
        node: id,
        direction: Direction::Previous,
    })
}

/// Nearest node after `id` that is not whitespace
pub fn skip_whitespace_forward(chain: &Chain, id: NodeId) -> Result<NodeId, ChainError> {
    let mut current = chain.next(id)?;
    for _ in 0..chain.len() {
        if !chain.token(current)?.is_whitespace() {
            return Ok(current);
        }
        current = chain.next(current)?;
    }
    Err(ChainError::NoSuchNeighbor {
        node: id,
        direction: Direction::Next,
    })
}

/// Leading whitespace of the line `id` sits on.
///
/// Text before `id` is collected backward up to the nearest line break; the
/// indent is the whitespace run that starts that text. With no line break
/// before `id`, the run starts at the chain start.
pub fn compute_indent(chain: &Chain, id: NodeId) -> Result<String, ChainError> {
    let mut pieces: Vec<&str> = Vec::new();
    let mut current = id;
    let mut steps = 0usize;

    while let Some(prev) = chain.peek_previous(current)? {
        steps += 1;
        if steps > chain.len() {
            return Err(ChainError::IndentComputationError {
                node: id,
                reason: "previous links form a cycle".to_string(),
            });
        }

        let text = chain.text(prev)?;
        if let Some(pos) = text.rfind('\n') {
            pieces.push(&text[pos + 1..]);
            break;
        }
        pieces.push(text);
        current = prev;
    }

    let line_start: String = pieces.into_iter().rev().collect();
    let indent: String = line_start
        .chars()
        .take_while(|c| matches!(c, ' ' | '\t' | '\r' | '\x0B' | '\x0C'))
        .collect();

    Ok(indent)
}

/// True iff any node in `first..=last` contains a line break
pub fn detect_multiline_span(chain: &Chain, first: NodeId, last: NodeId) -> Result<bool, ChainError> {
    for id in chain.span(first, last)? {
        if chain.is_multi_line(id)? {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Chain {
    pub fn previous_non_whitespace(&self, id: NodeId) -> Result<NodeId, ChainError> {
        skip_whitespace_backward(self, id)
    }

    pub fn next_non_whitespace(&self, id: NodeId) -> Result<NodeId, ChainError> {
        skip_whitespace_forward(self, id)
    }

    pub fn line_indent(&self, id: NodeId) -> Result<String, ChainError> {
        compute_indent(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Token, TokenKind};
    use assert_matches::assert_matches;

    fn chain_of(tokens: &[(TokenKind, &str)]) -> (Chain, Vec<NodeId>) {
        let chain = Chain::from_tokens(
            tokens
                .iter()
                .map(|(kind, text)| Token::classify(*kind, *text)),
        )
        .unwrap();
        let ids = chain.iter().collect();
        (chain, ids)
    }

    fn assignment_lines() -> (Chain, Vec<NodeId>) {
        use TokenKind::*;
        chain_of(&[
            (Whitespace, "  "),
            (Variable, "$x"),
            (Whitespace, " "),
            (Operator, "="),
            (Whitespace, " "),
            (NumberLiteral, "1"),
            (Punctuation, ";"),
            (Whitespace, "\n    "),
            (Variable, "$y"),
            (Whitespace, " "),
            (Operator, "="),
            (Whitespace, " "),
            (NumberLiteral, "2"),
            (Punctuation, ";"),
        ])
    }

    #[test]
    fn test_line_indent_after_line_break() {
        let (chain, ids) = assignment_lines();
        assert_eq!(chain.line_indent(ids[8]), Ok("    ".to_string()));
        assert_eq!(chain.line_indent(ids[12]), Ok("    ".to_string()));
    }

    #[test]
    fn test_line_indent_without_line_break_uses_chain_start() {
        let (chain, ids) = assignment_lines();
        assert_eq!(chain.line_indent(ids[1]), Ok("  ".to_string()));
        assert_eq!(chain.line_indent(ids[5]), Ok("  ".to_string()));
        assert_eq!(chain.line_indent(ids[0]), Ok(String::new()));
    }

    #[test]
    fn test_line_indent_zero_when_file_starts_with_code() {
        use TokenKind::*;
        let (chain, ids) = chain_of(&[(OpenTag, "<?php"), (Whitespace, " "), (Variable, "$a")]);
        assert_eq!(chain.line_indent(ids[2]), Ok(String::new()));
    }

    #[test]
    fn test_line_indent_spanning_several_tokens() {
        use TokenKind::*;
        let (chain, ids) = chain_of(&[
            (Comment, "// a\n"),
            (Whitespace, "\t "),
            (Keyword, "return"),
            (Whitespace, " "),
            (Variable, "$v"),
        ]);
        assert_eq!(chain.line_indent(ids[4]), Ok("\t ".to_string()));
    }

    #[test]
    fn test_previous_non_whitespace_skips_runs() {
        use TokenKind::*;
        let (chain, ids) = chain_of(&[
            (Identifier, "A"),
            (Whitespace, " "),
            (Whitespace, "\n"),
            (Identifier, "D"),
        ]);
        assert_eq!(chain.previous_non_whitespace(ids[3]), Ok(ids[0]));
        assert_eq!(chain.next_non_whitespace(ids[0]), Ok(ids[3]));
    }

    #[test]
    fn test_skip_reaching_chain_ends() {
        use TokenKind::*;
        let (chain, ids) = chain_of(&[(Whitespace, " "), (Identifier, "A"), (Whitespace, " ")]);
        assert_matches!(
            skip_whitespace_backward(&chain, ids[1]),
            Err(ChainError::NoSuchNeighbor { direction: Direction::Previous, .. })
        );
        assert_matches!(
            skip_whitespace_forward(&chain, ids[1]),
            Err(ChainError::NoSuchNeighbor { direction: Direction::Next, .. })
        );
    }

    #[test]
    fn test_detect_multiline_span() {
        let (chain, ids) = assignment_lines();
        assert_eq!(detect_multiline_span(&chain, ids[1], ids[6]), Ok(false));
        assert_eq!(detect_multiline_span(&chain, ids[1], ids[8]), Ok(true));
        assert_matches!(
            detect_multiline_span(&chain, ids[8], ids[1]),
            Err(ChainError::NoSuchNeighbor { .. })
        );
    }
}
