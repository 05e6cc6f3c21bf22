use super::Item;
use crate::chain::{detect_multiline_span, Chain, ChainError, NodeId};

/// Bracket group: an opener, its matching closer and the groups nested
/// directly inside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeItem {
    open: NodeId,
    close: NodeId,
    children: Vec<CompositeItem>,
}

struct Frame {
    open: NodeId,
    expected: char,
    children: Vec<CompositeItem>,
}

impl Frame {
    fn new(open: NodeId, expected: char) -> Self {
        Self {
            open,
            expected,
            children: Vec::new(),
        }
    }

    fn unbalanced(&self, chain: &Chain) -> ChainError {
        ChainError::UnbalancedGroup {
            node: self.open,
            open: chain.text(self.open).map(str::to_string).unwrap_or_default(),
            expected: self.expected,
        }
    }
}

impl CompositeItem {
    /// Group starting at `open`, or `None` if `open` is not an opening bracket
    pub fn parse(chain: &Chain, open: NodeId) -> Result<Option<Self>, ChainError> {
        let Some(expected) = chain.token(open)?.group_closer() else {
            return Ok(None);
        };

        let mut frame = Frame::new(open, expected);
        let mut parents: Vec<Frame> = Vec::new();
        let mut current = open;

        for _ in 0..chain.len() {
            let Some(next) = chain.peek_next(current)? else {
                return Err(frame.unbalanced(chain));
            };
            current = next;
            let token = chain.token(current)?;

            if let Some(closer) = token.group_closer() {
                parents.push(std::mem::replace(&mut frame, Frame::new(current, closer)));
                continue;
            }

            if token.is_group_closer() {
                if !token.is_punctuation(frame.expected) {
                    return Err(frame.unbalanced(chain));
                }
                let item = CompositeItem {
                    open: frame.open,
                    close: current,
                    children: frame.children,
                };
                match parents.pop() {
                    Some(mut parent) => {
                        parent.children.push(item);
                        frame = parent;
                    }
                    None => return Ok(Some(item)),
                }
            }
        }

        Err(frame.unbalanced(chain))
    }

    pub fn open(&self) -> NodeId {
        self.open
    }

    pub fn close(&self) -> NodeId {
        self.close
    }

    pub fn children(&self) -> &[CompositeItem] {
        &self.children
    }

    /// Same token sequence and same nesting
    pub fn equals(&self, other: &CompositeItem, chain: &Chain) -> Result<bool, ChainError> {
        let ours = chain.span(self.open, self.close)?;
        let theirs = chain.span(other.open, other.close)?;
        if ours.len() != theirs.len() || self.children.len() != other.children.len() {
            return Ok(false);
        }
        for (a, b) in ours.into_iter().zip(theirs) {
            if !chain.equals_as_item(a, b)? {
                return Ok(false);
            }
        }
        for (a, b) in self.children.iter().zip(&other.children) {
            if !a.equals(b, chain)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Item for CompositeItem {
    fn first_token(&self) -> NodeId {
        self.open
    }

    fn last_token(&self) -> NodeId {
        self.close
    }

    fn is_multi_line(&self, chain: &Chain) -> Result<bool, ChainError> {
        detect_multiline_span(chain, self.open, self.close)
    }

    fn complex_sub_lists(&self) -> Vec<&CompositeItem> {
        std::iter::once(self).chain(self.children.iter()).collect()
    }

    fn equals_as_item(&self, other: &Self, chain: &Chain) -> Result<bool, ChainError> {
        self.equals(other, chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Token, TokenKind};
    use assert_matches::assert_matches;

    fn chain_of(texts: &[&str]) -> (Chain, Vec<NodeId>) {
        let chain = Chain::from_tokens(texts.iter().map(|text| {
            let kind = match *text {
                "(" | ")" | "[" | "]" | "{" | "}" | "#[" | "," | ";" => TokenKind::Punctuation,
                _ => TokenKind::Unclassified,
            };
            Token::classify(kind, *text)
        }))
        .unwrap();
        let ids = chain.iter().collect();
        (chain, ids)
    }

    #[test]
    fn test_parse_nested_groups() {
        let (chain, ids) = chain_of(&["[", "1", ",", "[", "2", "]", ",", "(", ")", "]", ";"]);
        let item = CompositeItem::parse(&chain, ids[0]).unwrap().unwrap();

        assert_eq!(item.first_token(), ids[0]);
        assert_eq!(item.last_token(), ids[9]);
        assert_eq!(item.children().len(), 2);
        assert_eq!(item.children()[0].open(), ids[3]);
        assert_eq!(item.children()[0].close(), ids[5]);
        assert_eq!(item.children()[1].open(), ids[7]);

        let sub_lists = item.complex_sub_lists();
        assert_eq!(sub_lists.len(), 3);
        assert_eq!(sub_lists[0], &item);
    }

    #[test]
    fn test_parse_non_opener() {
        let (chain, ids) = chain_of(&["x", "(", ")"]);
        assert_eq!(CompositeItem::parse(&chain, ids[0]), Ok(None));
    }

    #[test]
    fn test_parse_missing_closer() {
        let (chain, ids) = chain_of(&["(", "[", "]"]);
        assert_matches!(
            CompositeItem::parse(&chain, ids[0]),
            Err(ChainError::UnbalancedGroup { expected: ')', .. })
        );
    }

    #[test]
    fn test_parse_mismatched_closer() {
        let (chain, ids) = chain_of(&["(", "[", ")", ")"]);
        assert_matches!(
            CompositeItem::parse(&chain, ids[0]),
            Err(ChainError::UnbalancedGroup { expected: ']', .. })
        );
    }

    #[test]
    fn test_multi_line_and_equality() {
        let (chain, ids) = chain_of(&["[", "1", "]", "[", "\n", "1", "]", "[", "1", "]"]);
        let first = CompositeItem::parse(&chain, ids[0]).unwrap().unwrap();
        let second = CompositeItem::parse(&chain, ids[3]).unwrap().unwrap();
        let third = CompositeItem::parse(&chain, ids[7]).unwrap().unwrap();

        assert_eq!(first.is_multi_line(&chain), Ok(false));
        assert_eq!(second.is_multi_line(&chain), Ok(true));
        assert_eq!(first.equals(&third, &chain), Ok(true));
        assert_eq!(first.equals(&second, &chain), Ok(false));
        assert_eq!(Item::equals_as_item(&first, &third, &chain), Ok(true));
        assert_eq!(Item::equals_as_item(&ids[1], &ids[8], &chain), Ok(true));
    }

    #[test]
    fn test_attribute_group() {
        let (chain, ids) = chain_of(&["#[", "A", "(", ")", "]", "{", "}"]);
        let item = CompositeItem::parse(&chain, ids[0]).unwrap().unwrap();
        assert_eq!(item.close(), ids[4]);
        assert_eq!(item.children().len(), 1);
    }
}
