use crate::lexical::LexicalMetrics;
use std::time::Duration;

/// Fixed-point run of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub rule: &'static str,
    /// Applications including the final zero-edit one
    pub applications: usize,
    pub edits: usize,
}

impl RuleReport {
    pub fn new(rule: &'static str) -> Self {
        Self {
            rule,
            applications: 0,
            edits: 0,
        }
    }
}

/// Outcome of a fixing pass over one source text
#[derive(Debug, Clone)]
pub struct FixResult {
    pub output: String,
    pub changed: bool,
    pub rule_reports: Vec<RuleReport>,
    pub lexical_metrics: LexicalMetrics,
    pub token_count: usize,
    pub duration: Duration,
}

impl FixResult {
    pub fn total_edits(&self) -> usize {
        self.rule_reports.iter().map(|report| report.edits).sum()
    }

    pub fn log_success(&self, label: &str) {
        crate::log_success!(
            crate::logging::codes::success::FIXING_PASS_COMPLETE,
            "Fixing pass completed",
            "file" => label,
            "changed" => self.changed,
            "edits" => self.total_edits(),
            "tokens" => self.token_count,
            "duration_ms" => format!("{:.2}", self.duration.as_secs_f64() * 1000.0)
        );
    }
}
