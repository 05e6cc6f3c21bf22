use crate::tokens::Token;
use std::fmt;

/// Stable index of a node inside its chain's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        // Chain::create_node caps the arena at MAX_CHAIN_NODES, which build.rs keeps within u32
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created but never linked
    Unlinked,
    /// Participating in the chain
    Linked,
    /// Excised by a replace or remove; never linked again
    Orphaned,
}

/// One token plus its links in the chain
#[derive(Debug, Clone)]
pub struct ContextualNode {
    pub(crate) token: Token,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) state: NodeState,
}

impl ContextualNode {
    pub(crate) fn new(token: Token) -> Self {
        Self {
            token,
            previous: None,
            next: None,
            state: NodeState::Unlinked,
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn text(&self) -> &str {
        self.token.text()
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_orphaned(&self) -> bool {
        self.state == NodeState::Orphaned
    }

    /// True iff this node's own text contains a line break
    pub fn is_multi_line(&self) -> bool {
        self.token.contains_line_break()
    }

    pub(crate) fn orphan(&mut self) {
        self.previous = None;
        self.next = None;
        self.state = NodeState::Orphaned;
    }
}
