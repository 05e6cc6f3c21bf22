//! Arena-backed chain of contextual nodes
//!
//! Every node lives in one `Vec` slot and is addressed by [`NodeId`].
//! Links are `Option<NodeId>` pairs kept symmetric by [`Chain::link`]; all
//! public edits validate their inputs before touching any link, so a failed
//! edit leaves the chain exactly as it was.

use super::error::{ChainError, Direction};
use super::node::{ContextualNode, NodeId, NodeState};
use crate::config::compile_time::chain::MAX_CHAIN_NODES;
use crate::log_debug;
use crate::tokens::{RawToken, Token, TokenKind};
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct Chain {
    nodes: Vec<ContextualNode>,
    head: Option<NodeId>,
    edit_count: usize,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify raw lexer output and thread it into a chain
    pub fn from_raw_tokens<I>(raw_tokens: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = RawToken>,
    {
        Self::from_tokens(raw_tokens.into_iter().map(Token::from))
    }

    pub fn from_tokens<I>(tokens: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut chain = Self::new();
        let mut last: Option<NodeId> = None;

        for token in tokens {
            let id = chain.create_node(token)?;
            match last {
                Some(prev) => chain.link(prev, id),
                None => {
                    chain.nodes[id.index()].state = NodeState::Linked;
                    chain.head = Some(id);
                }
            }
            last = Some(id);
        }

        log_debug!("Chain constructed",
            "nodes" => chain.nodes.len()
        );

        Ok(chain)
    }

    /// Allocate a fresh, unlinked node
    pub fn create_node(&mut self, token: Token) -> Result<NodeId, ChainError> {
        if self.nodes.len() >= MAX_CHAIN_NODES {
            return Err(ChainError::ChainTooLarge {
                count: self.nodes.len() + 1,
            });
        }
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(ContextualNode::new(token));
        Ok(id)
    }

    /// Shorthand for `create_node(Token::classify(kind, text))`
    pub fn create(&mut self, kind: TokenKind, text: impl Into<String>) -> Result<NodeId, ChainError> {
        self.create_node(Token::classify(kind, text))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Result<&ContextualNode, ChainError> {
        self.nodes
            .get(id.index())
            .ok_or(ChainError::UnknownNode { node: id })
    }

    pub fn token(&self, id: NodeId) -> Result<&Token, ChainError> {
        self.node(id).map(ContextualNode::token)
    }

    pub fn text(&self, id: NodeId) -> Result<&str, ChainError> {
        self.node(id).map(ContextualNode::text)
    }

    pub fn state(&self, id: NodeId) -> Result<NodeState, ChainError> {
        self.node(id).map(ContextualNode::state)
    }

    /// Number of allocated nodes, orphans included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Successful mutations since construction
    pub fn edit_count(&self) -> usize {
        self.edit_count
    }

    /// Start of the chain
    pub fn first(&self) -> Option<NodeId> {
        let mut current = self.head?;
        for _ in 0..self.nodes.len() {
            match self.nodes[current.index()].previous {
                Some(prev) => current = prev,
                None => return Some(current),
            }
        }
        Some(current)
    }

    pub fn last(&self) -> Option<NodeId> {
        self.iter().last()
    }

    /// Linked nodes in link order
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            current: self.first(),
            remaining: self.nodes.len(),
        }
    }

    /// Concatenate node texts in link order
    pub fn render(&self) -> String {
        let mut output = String::new();
        for id in self.iter() {
            output.push_str(self.nodes[id.index()].text());
        }
        output
    }

    /// Concatenate `first..=last` in link order
    pub fn render_span(&self, first: NodeId, last: NodeId) -> Result<String, ChainError> {
        let mut output = String::new();
        for id in self.span(first, last)? {
            output.push_str(self.nodes[id.index()].text());
        }
        Ok(output)
    }

    /// Nodes of `first..=last`; `NoSuchNeighbor` if `last` is unreachable
    pub fn span(&self, first: NodeId, last: NodeId) -> Result<Vec<NodeId>, ChainError> {
        self.node(first)?;
        self.node(last)?;

        let mut ids = vec![first];
        let mut current = first;
        while current != last {
            if ids.len() > self.nodes.len() {
                break;
            }
            match self.nodes[current.index()].next {
                Some(next) => {
                    ids.push(next);
                    current = next;
                }
                None => break,
            }
        }

        if current == last {
            Ok(ids)
        } else {
            Err(ChainError::NoSuchNeighbor {
                node: current,
                direction: Direction::Next,
            })
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next(&self, id: NodeId) -> Result<NodeId, ChainError> {
        self.peek_next(id)?.ok_or(ChainError::NoSuchNeighbor {
            node: id,
            direction: Direction::Next,
        })
    }

    pub fn previous(&self, id: NodeId) -> Result<NodeId, ChainError> {
        self.peek_previous(id)?.ok_or(ChainError::NoSuchNeighbor {
            node: id,
            direction: Direction::Previous,
        })
    }

    pub fn peek_next(&self, id: NodeId) -> Result<Option<NodeId>, ChainError> {
        self.node(id).map(ContextualNode::next)
    }

    pub fn peek_previous(&self, id: NodeId) -> Result<Option<NodeId>, ChainError> {
        self.node(id).map(ContextualNode::previous)
    }

    pub fn is_multi_line(&self, id: NodeId) -> Result<bool, ChainError> {
        self.node(id).map(ContextualNode::is_multi_line)
    }

    /// Same token kind and text
    pub fn equals_as_item(&self, a: NodeId, b: NodeId) -> Result<bool, ChainError> {
        Ok(self.token(a)? == self.token(b)?)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Link `a -> b`, detaching any stale partner of either side.
    ///
    /// The chain becomes the run through `a -> b`; nodes no longer reachable
    /// from its start are orphaned. Fails with `LinkCycle` if `a` already
    /// follows `b`.
    pub fn set_next(&mut self, a: NodeId, b: NodeId) -> Result<(), ChainError> {
        self.ensure_linkable(a)?;
        self.ensure_linkable(b)?;
        if a == b {
            return Err(ChainError::NodeInUse { node: b });
        }
        if self.follows(a, b) {
            return Err(ChainError::LinkCycle { from: a, to: b });
        }

        self.link(a, b);
        self.head = Some(a);
        self.orphan_unreachable();
        self.edit_count += 1;
        Ok(())
    }

    /// Put `replacement` where `id` is; `id` becomes orphaned
    pub fn replace_with(&mut self, id: NodeId, replacement: NodeId) -> Result<(), ChainError> {
        self.ensure_linkable(id)?;
        self.ensure_insertable(replacement)?;
        let prev = self.require_previous(id, "replace")?;
        let next = self.nodes[id.index()].next;

        self.link(prev, replacement);
        if let Some(next) = next {
            self.link(replacement, next);
        }
        self.orphan(id, prev);
        self.edit_count += 1;
        Ok(())
    }

    /// Link `previous -> inserted -> id`
    pub fn insert_before(&mut self, id: NodeId, inserted: NodeId) -> Result<(), ChainError> {
        self.ensure_linkable(id)?;
        self.ensure_insertable(inserted)?;
        let prev = self.require_previous(id, "insert before")?;

        self.link(prev, inserted);
        self.link(inserted, id);
        self.edit_count += 1;
        Ok(())
    }

    /// Link `id -> inserted -> (old next)`
    pub fn insert_after(&mut self, id: NodeId, inserted: NodeId) -> Result<(), ChainError> {
        self.ensure_linkable(id)?;
        self.ensure_insertable(inserted)?;
        let next = self.nodes[id.index()].next;

        self.link(id, inserted);
        if let Some(next) = next {
            self.link(inserted, next);
        }
        if self.head.is_none() {
            self.head = Some(id);
        }
        self.edit_count += 1;
        Ok(())
    }

    /// Unlink `id`, joining its neighbors; `id` becomes orphaned
    pub fn remove(&mut self, id: NodeId) -> Result<(), ChainError> {
        self.remove_range(id, id)
    }

    /// Unlink `first..=last` as one edit
    pub fn remove_range(&mut self, first: NodeId, last: NodeId) -> Result<(), ChainError> {
        self.ensure_linkable(first)?;
        self.ensure_linkable(last)?;
        let prev = self.require_previous(first, "remove")?;
        let removed = self.span(first, last)?;
        let after = self.nodes[last.index()].next;

        match after {
            Some(after) => self.link(prev, after),
            None => self.nodes[prev.index()].next = None,
        }
        for id in removed {
            self.orphan(id, prev);
        }
        self.edit_count += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_linkable(&self, id: NodeId) -> Result<(), ChainError> {
        if self.node(id)?.is_orphaned() {
            return Err(ChainError::OrphanedNode { node: id });
        }
        Ok(())
    }

    fn ensure_insertable(&self, id: NodeId) -> Result<(), ChainError> {
        match self.node(id)?.state() {
            NodeState::Unlinked => Ok(()),
            NodeState::Linked => Err(ChainError::NodeInUse { node: id }),
            NodeState::Orphaned => Err(ChainError::OrphanedNode { node: id }),
        }
    }

    fn require_previous(&self, id: NodeId, operation: &'static str) -> Result<NodeId, ChainError> {
        self.nodes[id.index()]
            .previous
            .ok_or(ChainError::CannotReplaceBoundary { node: id, operation })
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        if let Some(old_next) = self.nodes[a.index()].next {
            if old_next != b {
                self.nodes[old_next.index()].previous = None;
            }
        }
        if let Some(old_prev) = self.nodes[b.index()].previous {
            if old_prev != a {
                self.nodes[old_prev.index()].next = None;
            }
        }

        self.nodes[a.index()].next = Some(b);
        self.nodes[b.index()].previous = Some(a);
        self.nodes[a.index()].state = NodeState::Linked;
        self.nodes[b.index()].state = NodeState::Linked;
    }

    /// True if walking `next` links from `start` reaches `target`
    fn follows(&self, target: NodeId, start: NodeId) -> bool {
        let mut current = start;
        for _ in 0..self.nodes.len() {
            if current == target {
                return true;
            }
            match self.nodes[current.index()].next {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    fn orphan_unreachable(&mut self) {
        let mut reachable = vec![false; self.nodes.len()];
        for id in self.iter() {
            reachable[id.index()] = true;
        }
        for (node, reached) in self.nodes.iter_mut().zip(reachable) {
            if !reached && node.state == NodeState::Linked {
                node.orphan();
            }
        }
    }

    fn orphan(&mut self, id: NodeId, survivor: NodeId) {
        self.nodes[id.index()].orphan();
        if self.head == Some(id) {
            self.head = Some(survivor);
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.iter() {
            f.write_str(self.nodes[id.index()].text())?;
        }
        Ok(())
    }
}

/// Link-order iterator; stops after `len()` steps if links ever form a cycle
pub struct ChainIter<'a> {
    chain: &'a Chain,
    current: Option<NodeId>,
    remaining: usize,
}

impl Iterator for ChainIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.current?;
        self.remaining -= 1;
        self.current = self.chain.nodes[id.index()].next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn chain_of(texts: &[&str]) -> Chain {
        Chain::from_tokens(
            texts
                .iter()
                .map(|text| Token::classify(TokenKind::Unclassified, *text)),
        )
        .unwrap()
    }

    fn ids(chain: &Chain) -> Vec<NodeId> {
        chain.iter().collect()
    }

    fn assert_symmetric(chain: &Chain) {
        for index in 0..chain.len() {
            let id = NodeId::from_index(index);
            let node = chain.node(id).unwrap();
            if let Some(next) = node.next() {
                assert_eq!(chain.node(next).unwrap().previous(), Some(id));
            }
            if let Some(prev) = node.previous() {
                assert_eq!(chain.node(prev).unwrap().next(), Some(id));
            }
        }
    }

    #[test]
    fn test_round_trip_of_unedited_chain() {
        let source = ["<?php", "\n", "$x", " ", "=", " ", "1", ";", "\n"];
        let chain = chain_of(&source);
        assert_eq!(chain.render(), source.concat());
        assert_eq!(chain.to_string(), source.concat());
        assert_eq!(chain.edit_count(), 0);
        assert_symmetric(&chain);
    }

    #[test]
    fn test_empty_chain() {
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.first(), None);
        assert_eq!(chain.render(), "");
    }

    #[test]
    fn test_navigation_at_ends() {
        let chain = chain_of(&["a", "b"]);
        let [a, b] = [ids(&chain)[0], ids(&chain)[1]];

        assert_eq!(chain.next(a), Ok(b));
        assert_eq!(chain.previous(b), Ok(a));
        assert_eq!(chain.peek_previous(a), Ok(None));
        assert_matches!(
            chain.next(b),
            Err(ChainError::NoSuchNeighbor { direction: Direction::Next, .. })
        );
        assert_matches!(
            chain.previous(a),
            Err(ChainError::NoSuchNeighbor { direction: Direction::Previous, .. })
        );
    }

    #[test]
    fn test_set_next_detaches_stale_partners() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);
        let (a, b, c) = (nodes[0], nodes[1], nodes[2]);

        chain.set_next(a, c).unwrap();

        assert_eq!(chain.peek_next(a), Ok(Some(c)));
        assert_eq!(chain.peek_previous(c), Ok(Some(a)));
        assert_eq!(chain.peek_previous(b), Ok(None));
        assert_eq!(chain.peek_next(b), Ok(None));
        assert_eq!(chain.state(b), Ok(NodeState::Orphaned));
        assert_symmetric(&chain);
        assert_eq!(chain.render(), "ac");
    }

    #[test]
    fn test_set_next_rejects_cycle() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);
        let (a, c) = (nodes[0], nodes[2]);

        assert_matches!(
            chain.set_next(c, a),
            Err(ChainError::LinkCycle { from, to }) if from == c && to == a
        );
        assert_eq!(chain.peek_previous(a), Ok(None));
        assert_eq!(chain.peek_next(c), Ok(None));
        assert_eq!(chain.edit_count(), 0);

        let x = chain.create(TokenKind::Identifier, "x").unwrap();
        assert_matches!(
            chain.replace_with(a, x),
            Err(ChainError::CannotReplaceBoundary { .. })
        );
        assert_eq!(chain.render(), "abc");
    }

    #[test]
    fn test_set_next_builds_chain_from_fresh_nodes() {
        let mut chain = Chain::new();
        let x = chain.create(TokenKind::Identifier, "x").unwrap();
        let y = chain.create(TokenKind::Identifier, "y").unwrap();
        let w = chain.create(TokenKind::Identifier, "w").unwrap();

        chain.set_next(x, y).unwrap();
        chain.set_next(w, x).unwrap();

        assert_eq!(chain.render(), "wxy");
        assert_eq!(chain.first(), Some(w));
        assert_symmetric(&chain);
    }

    #[test]
    fn test_set_next_orphans_cut_off_prefix() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);
        let (a, b) = (nodes[0], nodes[1]);
        let x = chain.create(TokenKind::Identifier, "x").unwrap();

        chain.set_next(x, b).unwrap();

        assert_eq!(chain.render(), "xbc");
        assert_eq!(chain.state(a), Ok(NodeState::Orphaned));
        assert_eq!(chain.peek_next(a), Ok(None));
        assert_symmetric(&chain);
    }

    #[test]
    fn test_replace_with() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let b = ids(&chain)[1];
        let x = chain.create(TokenKind::Identifier, "x").unwrap();

        chain.replace_with(b, x).unwrap();

        assert_eq!(chain.render(), "axc");
        assert_eq!(chain.state(b), Ok(NodeState::Orphaned));
        assert_eq!(chain.state(x), Ok(NodeState::Linked));
        assert_eq!(chain.edit_count(), 1);
        assert_symmetric(&chain);
    }

    #[test]
    fn test_replace_last_node() {
        let mut chain = chain_of(&["a", "b"]);
        let b = ids(&chain)[1];
        let x = chain.create(TokenKind::Identifier, "x").unwrap();

        chain.replace_with(b, x).unwrap();
        assert_eq!(chain.render(), "ax");
        assert_eq!(chain.peek_next(x), Ok(None));
    }

    #[test]
    fn test_boundary_protection() {
        let mut chain = chain_of(&["a", "b"]);
        let a = ids(&chain)[0];
        let before = chain.render();

        let x = chain.create(TokenKind::Identifier, "x").unwrap();
        assert_matches!(
            chain.replace_with(a, x),
            Err(ChainError::CannotReplaceBoundary { operation: "replace", .. })
        );
        assert_matches!(
            chain.insert_before(a, x),
            Err(ChainError::CannotReplaceBoundary { .. })
        );
        assert_matches!(chain.remove(a), Err(ChainError::CannotReplaceBoundary { .. }));

        assert_eq!(chain.render(), before);
        assert_eq!(chain.state(x), Ok(NodeState::Unlinked));
        assert_eq!(chain.edit_count(), 0);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut chain = chain_of(&["a", "c"]);
        let nodes = ids(&chain);
        let (a, c) = (nodes[0], nodes[1]);

        let b = chain.create(TokenKind::Identifier, "b").unwrap();
        chain.insert_before(c, b).unwrap();
        let d = chain.create(TokenKind::Identifier, "d").unwrap();
        chain.insert_after(c, d).unwrap();
        let a2 = chain.create(TokenKind::Identifier, "A").unwrap();
        chain.insert_after(a, a2).unwrap();

        assert_eq!(chain.render(), "aAbcd");
        assert_eq!(chain.edit_count(), 3);
        assert_symmetric(&chain);
    }

    #[test]
    fn test_linked_node_cannot_be_inserted_twice() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);

        assert_matches!(
            chain.insert_after(nodes[2], nodes[0]),
            Err(ChainError::NodeInUse { .. })
        );
        assert_eq!(chain.render(), "abc");
    }

    #[test]
    fn test_orphan_non_reentry() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);
        let (a, b, c) = (nodes[0], nodes[1], nodes[2]);

        chain.remove(b).unwrap();
        assert_eq!(chain.render(), "ac");

        assert_matches!(chain.insert_after(a, b), Err(ChainError::OrphanedNode { .. }));
        assert_matches!(chain.set_next(b, c), Err(ChainError::OrphanedNode { .. }));
        assert_matches!(chain.remove(b), Err(ChainError::OrphanedNode { .. }));
        assert_eq!(chain.render(), "ac");
        assert_symmetric(&chain);
    }

    #[test]
    fn test_remove_range() {
        let mut chain = chain_of(&["a", "b", "c", "d", "e"]);
        let nodes = ids(&chain);

        chain.remove_range(nodes[1], nodes[3]).unwrap();

        assert_eq!(chain.render(), "ae");
        assert_eq!(chain.edit_count(), 1);
        for id in &nodes[1..=3] {
            assert_eq!(chain.state(*id), Ok(NodeState::Orphaned));
        }
        assert_symmetric(&chain);
    }

    #[test]
    fn test_remove_range_to_end() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);

        chain.remove_range(nodes[1], nodes[2]).unwrap();
        assert_eq!(chain.render(), "a");
        assert_eq!(chain.peek_next(nodes[0]), Ok(None));
    }

    #[test]
    fn test_remove_range_unreachable_last_touches_nothing() {
        let mut chain = chain_of(&["a", "b", "c"]);
        let nodes = ids(&chain);

        assert_matches!(
            chain.remove_range(nodes[2], nodes[1]),
            Err(ChainError::NoSuchNeighbor { .. })
        );
        assert_eq!(chain.render(), "abc");
        assert_eq!(chain.edit_count(), 0);
    }

    #[test]
    fn test_unknown_node() {
        let chain = chain_of(&["a"]);
        let foreign = NodeId::from_index(99);
        assert_matches!(chain.next(foreign), Err(ChainError::UnknownNode { .. }));
        assert_matches!(chain.token(foreign), Err(ChainError::UnknownNode { .. }));
    }

    #[test]
    fn test_equals_as_item_and_multi_line() {
        let chain = chain_of(&["x", "\n  ", "x", "y"]);
        let nodes = ids(&chain);

        assert_eq!(chain.equals_as_item(nodes[0], nodes[2]), Ok(true));
        assert_eq!(chain.equals_as_item(nodes[0], nodes[3]), Ok(false));
        assert_eq!(chain.is_multi_line(nodes[1]), Ok(true));
        assert_eq!(chain.is_multi_line(nodes[0]), Ok(false));
    }

    #[test]
    fn test_whitespace_is_normalized_on_construction() {
        let chain = Chain::from_raw_tokens(vec![
            RawToken::new(TokenKind::Keyword, "class"),
            RawToken::new(TokenKind::Identifier, " \t"),
        ])
        .unwrap();
        let nodes = ids(&chain);
        assert_eq!(chain.token(nodes[1]).unwrap().kind(), TokenKind::Whitespace);
    }

    #[test]
    fn test_span_and_render_span() {
        let chain = chain_of(&["a", "b", "c", "d"]);
        let nodes = ids(&chain);
        assert_eq!(chain.render_span(nodes[1], nodes[2]), Ok("bc".to_string()));
        assert_eq!(chain.span(nodes[3], nodes[3]), Ok(vec![nodes[3]]));
    }
}
