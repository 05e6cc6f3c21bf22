//! Consolidated error codes and classification system
//!
//! Single source of truth for all log codes and their metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNTERMINATED_STRING: Code = Code::new("E020");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E021");
    pub const TOO_MANY_TOKENS: Code = Code::new("E022");
    pub const COMMENT_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
}

/// Chain structure error codes
pub mod chain {
    use super::Code;

    pub const CANNOT_REPLACE_BOUNDARY: Code = Code::new("E040");
    pub const NO_SUCH_NEIGHBOR: Code = Code::new("E041");
    pub const INDENT_COMPUTATION_ERROR: Code = Code::new("E042");
    pub const ORPHANED_NODE: Code = Code::new("E043");
    pub const NODE_IN_USE: Code = Code::new("E044");
    pub const UNKNOWN_NODE: Code = Code::new("E045");
    pub const UNBALANCED_GROUP: Code = Code::new("E046");
    pub const CHAIN_TOO_LARGE: Code = Code::new("E047");
    pub const LINK_CYCLE: Code = Code::new("E048");
}

/// Fixing pass error codes
pub mod fixing {
    use super::Code;

    pub const FIXED_POINT_NOT_REACHED: Code = Code::new("E060");
    pub const NOT_IDEMPOTENT: Code = Code::new("E061");
    pub const TOO_MANY_RULES: Code = Code::new("E062");
    pub const PASS_ABORTED: Code = Code::new("E063");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CHAIN_CONSTRUCTED: Code = Code::new("I040");
    pub const RULE_FIXED_POINT_REACHED: Code = Code::new("I060");
    pub const FIXING_PASS_COMPLETE: Code = Code::new("I061");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "String literal is not terminated before end of input",
                "Close the string literal",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Block comment is not terminated before end of input",
                "Close the block comment with */",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::High,
                false,
                true,
                "Source produces more tokens than allowed",
                "Split the file or raise max_token_count",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Comment exceeds maximum length",
                "Shorten the comment or raise max_comment_length",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "String literal exceeds maximum size",
                "Shorten the literal or raise max_string_size",
            ),
            ErrorMetadata::new(
                "E040",
                "Chain",
                Severity::High,
                false,
                true,
                "Attempted to replace, remove or insert before the chain anchor",
                "Edit a node that has a previous neighbor",
            ),
            ErrorMetadata::new(
                "E041",
                "Chain",
                Severity::High,
                false,
                true,
                "Navigation requested past a chain end",
                "Use peek_next or peek_previous for optional lookahead",
            ),
            ErrorMetadata::new(
                "E042",
                "Chain",
                Severity::Critical,
                false,
                true,
                "Leading whitespace of a line could not be computed",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "E043",
                "Chain",
                Severity::High,
                false,
                true,
                "Orphaned node used in a linking operation",
                "Create a fresh node instead of re-inserting a removed one",
            ),
            ErrorMetadata::new(
                "E044",
                "Chain",
                Severity::High,
                false,
                true,
                "Node is already linked elsewhere in the chain",
                "Insert a freshly created node",
            ),
            ErrorMetadata::new(
                "E045",
                "Chain",
                Severity::Critical,
                false,
                true,
                "Node id does not belong to this chain",
                "Only use ids returned by the same chain",
            ),
            ErrorMetadata::new(
                "E046",
                "Chain",
                Severity::Medium,
                false,
                true,
                "Bracket group has no matching closer",
                "Check the source for unbalanced brackets",
            ),
            ErrorMetadata::new(
                "E047",
                "Chain",
                Severity::High,
                false,
                true,
                "Chain exceeds the maximum node count",
                "Split the file or raise max_chain_nodes",
            ),
            ErrorMetadata::new(
                "E048",
                "Chain",
                Severity::Critical,
                false,
                true,
                "Linking two nodes would close the chain into a loop",
                "Fix the rule so it links nodes in chain order",
            ),
            ErrorMetadata::new(
                "E060",
                "Fixing",
                Severity::High,
                false,
                true,
                "Rule kept editing beyond the fixed-point iteration limit",
                "Check the rule for oscillating edits",
            ),
            ErrorMetadata::new(
                "E061",
                "Fixing",
                Severity::High,
                false,
                true,
                "Rule edited its own output",
                "Check the rule for idempotence",
            ),
            ErrorMetadata::new(
                "E062",
                "Fixing",
                Severity::Medium,
                false,
                true,
                "Too many rules registered for one pass",
                "Reduce the rule set or raise max_rules_per_pass",
            ),
            ErrorMetadata::new(
                "E063",
                "Fixing",
                Severity::High,
                false,
                true,
                "Fixing pass aborted on a structural error",
                "Inspect the logged chain error; the file was left unmodified",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|meta| meta.severity)
        .unwrap_or(Severity::Low)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|meta| meta.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|meta| meta.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|meta| meta.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|meta| meta.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    if let Some(meta) = get_error_metadata(code) {
        return meta.category;
    }
    match code.chars().next() {
        Some('I') => "Success",
        Some('W') => "Warning",
        Some('D') => "Debug",
        _ => "Unknown",
    }
}
