// Internal modules
pub mod chain;
pub mod config;
pub mod item;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod rules;
pub mod tokens;

// Re-export key types for library consumers
pub use chain::{Chain, ChainError, NodeId, NodeState};
pub use item::{ChainItem, CompositeItem, Item};
pub use pipeline::{fix_labeled_source, fix_source, fix_source_with_preferences, FixResult, PipelineError};
pub use rules::{default_rules, Rule};
pub use tokens::{RawToken, Token, TokenKind};
