use super::node::NodeId;
use crate::config::compile_time::chain::MAX_CHAIN_NODES;
use crate::logging::codes;
use std::fmt;

/// Link direction used in navigation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.write_str("next"),
            Direction::Previous => f.write_str("previous"),
        }
    }
}

/// Structural errors raised by chain operations.
///
/// None of these are repaired inside the chain; a failed operation leaves
/// every link exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("Cannot {operation} node {node}: it has no previous node (chain anchor)")]
    CannotReplaceBoundary {
        node: NodeId,
        operation: &'static str,
    },

    #[error("No {direction} node after {node}")]
    NoSuchNeighbor { node: NodeId, direction: Direction },

    #[error("Cannot compute line indent for node {node}: {reason}")]
    IndentComputationError { node: NodeId, reason: String },

    #[error("Node {node} was removed from the chain and cannot be linked again")]
    OrphanedNode { node: NodeId },

    #[error("Node {node} is already linked and cannot be inserted again")]
    NodeInUse { node: NodeId },

    #[error("Node {node} does not belong to this chain")]
    UnknownNode { node: NodeId },

    #[error("Unbalanced group: '{open}' at node {node} has no matching '{expected}'")]
    UnbalancedGroup {
        node: NodeId,
        open: String,
        expected: char,
    },

    #[error("Linking {from} -> {to} would close the chain into a loop")]
    LinkCycle { from: NodeId, to: NodeId },

    #[error("Chain too large: {count} nodes (max {MAX_CHAIN_NODES})")]
    ChainTooLarge { count: usize },
}

impl ChainError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ChainError::CannotReplaceBoundary { .. } => codes::chain::CANNOT_REPLACE_BOUNDARY,
            ChainError::NoSuchNeighbor { .. } => codes::chain::NO_SUCH_NEIGHBOR,
            ChainError::IndentComputationError { .. } => codes::chain::INDENT_COMPUTATION_ERROR,
            ChainError::OrphanedNode { .. } => codes::chain::ORPHANED_NODE,
            ChainError::NodeInUse { .. } => codes::chain::NODE_IN_USE,
            ChainError::UnknownNode { .. } => codes::chain::UNKNOWN_NODE,
            ChainError::UnbalancedGroup { .. } => codes::chain::UNBALANCED_GROUP,
            ChainError::LinkCycle { .. } => codes::chain::LINK_CYCLE,
            ChainError::ChainTooLarge { .. } => codes::chain::CHAIN_TOO_LARGE,
        }
    }
}
