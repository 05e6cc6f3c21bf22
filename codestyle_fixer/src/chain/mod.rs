//! Contextual token chain
//!
//! A bidirectionally linked, mutation-safe view over a token sequence. Rules
//! navigate and edit code in place through [`Chain`]; nodes are arena slots
//! addressed by [`NodeId`].
//!
//! ## Link invariants
//!
//! - `a.next == Some(b)` if and only if `b.previous == Some(a)`
//! - the first node has no previous, the last has no next
//! - an orphaned node has no links and is never linked again
//!
//! Every successful edit bumps [`Chain::edit_count`].

pub mod cursor;
pub mod error;
pub mod list;
pub mod node;

pub use cursor::{compute_indent, detect_multiline_span, skip_whitespace_backward, skip_whitespace_forward};
pub use error::{ChainError, Direction};
pub use list::{Chain, ChainIter};
pub use node::{ContextualNode, NodeId, NodeState};
