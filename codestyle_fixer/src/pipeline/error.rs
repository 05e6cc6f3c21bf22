use crate::chain::ChainError;
use crate::config::compile_time::fixing::{MAX_FIXED_POINT_ITERATIONS, MAX_RULES_PER_PASS};
use crate::lexical::LexerError;
use crate::logging::codes;

/// Fixing pass errors; any of them leaves the input text unmodified
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Chain operation failed: {0}")]
    Chain(#[from] ChainError),

    #[error("Rule '{rule}' did not reach a fixed point within {MAX_FIXED_POINT_ITERATIONS} applications")]
    FixedPointNotReached { rule: &'static str },

    #[error("Rule '{rule}' made {edits} edits when re-applied to its own output")]
    NotIdempotent { rule: &'static str, edits: usize },

    #[error("Too many rules: {count} (max {MAX_RULES_PER_PASS})")]
    TooManyRules { count: usize },
}

impl PipelineError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::LexicalAnalysis(error) => error.error_code(),
            PipelineError::Chain(error) => error.error_code(),
            PipelineError::FixedPointNotReached { .. } => codes::fixing::FIXED_POINT_NOT_REACHED,
            PipelineError::NotIdempotent { .. } => codes::fixing::NOT_IDEMPOTENT,
            PipelineError::TooManyRules { .. } => codes::fixing::TOO_MANY_RULES,
        }
    }
}
