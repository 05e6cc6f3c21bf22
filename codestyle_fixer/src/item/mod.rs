//! Item abstraction
//!
//! Rules reason about "items" without caring whether they are a single token
//! or a bracket group. Both implement [`Item`]; [`ChainItem`] is the closed
//! set of variants.

pub mod composite;

pub use composite::CompositeItem;

use crate::chain::{Chain, ChainError, NodeId};

/// Capabilities shared by atomic and composite items
pub trait Item {
    fn first_token(&self) -> NodeId;

    fn last_token(&self) -> NodeId;

    fn is_multi_line(&self, chain: &Chain) -> Result<bool, ChainError>;

    /// Bracket groups this item contains; empty for atomic items
    fn complex_sub_lists(&self) -> Vec<&CompositeItem>;

    /// Content equality, ignoring where in the chain either item sits
    fn equals_as_item(&self, other: &Self, chain: &Chain) -> Result<bool, ChainError>;
}

/// A bare node is an atomic item
impl Item for NodeId {
    fn first_token(&self) -> NodeId {
        *self
    }

    fn last_token(&self) -> NodeId {
        *self
    }

    fn is_multi_line(&self, chain: &Chain) -> Result<bool, ChainError> {
        chain.is_multi_line(*self)
    }

    fn complex_sub_lists(&self) -> Vec<&CompositeItem> {
        Vec::new()
    }

    fn equals_as_item(&self, other: &Self, chain: &Chain) -> Result<bool, ChainError> {
        chain.equals_as_item(*self, *other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainItem {
    Atomic(NodeId),
    Composite(CompositeItem),
}

impl ChainItem {
    /// Item starting at `id`: a group if `id` opens one, else the node itself
    pub fn at(chain: &Chain, id: NodeId) -> Result<Self, ChainError> {
        Ok(match CompositeItem::parse(chain, id)? {
            Some(composite) => ChainItem::Composite(composite),
            None => ChainItem::Atomic(id),
        })
    }

    /// Split `first..=last` into consecutive top-level items
    pub fn sequence(chain: &Chain, first: NodeId, last: NodeId) -> Result<Vec<Self>, ChainError> {
        let span = chain.span(first, last)?;
        let mut items = Vec::new();
        let mut index = 0;

        while index < span.len() {
            let item = ChainItem::at(chain, span[index])?;
            let end = item.last_token();
            match span[index..].iter().position(|id| *id == end) {
                Some(offset) => index += offset + 1,
                None => {
                    return Err(ChainError::NoSuchNeighbor {
                        node: last,
                        direction: crate::chain::Direction::Next,
                    })
                }
            }
            items.push(item);
        }

        Ok(items)
    }

    /// Source text of the item's span
    pub fn render_item(&self, chain: &Chain) -> Result<String, ChainError> {
        chain.render_span(self.first_token(), self.last_token())
    }

    pub fn as_composite(&self) -> Option<&CompositeItem> {
        match self {
            ChainItem::Composite(composite) => Some(composite),
            ChainItem::Atomic(_) => None,
        }
    }
}

impl Item for ChainItem {
    fn first_token(&self) -> NodeId {
        match self {
            ChainItem::Atomic(id) => id.first_token(),
            ChainItem::Composite(composite) => composite.first_token(),
        }
    }

    fn last_token(&self) -> NodeId {
        match self {
            ChainItem::Atomic(id) => id.last_token(),
            ChainItem::Composite(composite) => composite.last_token(),
        }
    }

    fn is_multi_line(&self, chain: &Chain) -> Result<bool, ChainError> {
        match self {
            ChainItem::Atomic(id) => id.is_multi_line(chain),
            ChainItem::Composite(composite) => composite.is_multi_line(chain),
        }
    }

    fn complex_sub_lists(&self) -> Vec<&CompositeItem> {
        match self {
            ChainItem::Atomic(_) => Vec::new(),
            ChainItem::Composite(composite) => composite.complex_sub_lists(),
        }
    }

    /// Only items of the same variant can be equal
    fn equals_as_item(&self, other: &Self, chain: &Chain) -> Result<bool, ChainError> {
        match (self, other) {
            (ChainItem::Atomic(a), ChainItem::Atomic(b)) => a.equals_as_item(b, chain),
            (ChainItem::Composite(a), ChainItem::Composite(b)) => a.equals_as_item(b, chain),
            _ => Ok(false),
        }
    }
}
