mod error;
mod result;
mod validation;

pub use error::PipelineError;
pub use result::{FixResult, RuleReport};
pub use validation::validate_pipeline;

use crate::chain::Chain;
use crate::config::compile_time::fixing::{MAX_FIXED_POINT_ITERATIONS, MAX_RULES_PER_PASS};
use crate::config::runtime::{FixingPreferences, RuntimeConfig};
use crate::lexical::LexicalAnalyzer;
use crate::logging::{self, codes};
use crate::rules::Rule;
use std::time::Instant;

const ANONYMOUS_SOURCE: &str = "<source>";

/// Fix `source` with default runtime preferences (source -> lexical -> chain -> rules -> render)
pub fn fix_source(source: &str, rules: &[Box<dyn Rule>]) -> Result<FixResult, PipelineError> {
    fix_source_with_preferences(source, rules, &RuntimeConfig::default())
}

/// Fix `source` with custom runtime preferences
pub fn fix_source_with_preferences(
    source: &str,
    rules: &[Box<dyn Rule>],
    config: &RuntimeConfig,
) -> Result<FixResult, PipelineError> {
    fix_labeled_source(ANONYMOUS_SOURCE, source, rules, config)
}

/// Fix `source`, tagging every log event with `label`
pub fn fix_labeled_source(
    label: &str,
    source: &str,
    rules: &[Box<dyn Rule>],
    config: &RuntimeConfig,
) -> Result<FixResult, PipelineError> {
    logging::with_file_context(label, || {
        let result = run_pass(label, source, rules, config);
        if let Err(error) = &result {
            crate::log_error!(codes::fixing::PASS_ABORTED, "Fixing pass aborted, input left unmodified",
                "file" => label,
                "cause_code" => error.error_code(),
                "cause" => error
            );
        }
        result
    })
}

fn run_pass(
    label: &str,
    source: &str,
    rules: &[Box<dyn Rule>],
    config: &RuntimeConfig,
) -> Result<FixResult, PipelineError> {
    let start_time = Instant::now();

    if rules.len() > MAX_RULES_PER_PASS {
        return Err(PipelineError::TooManyRules { count: rules.len() });
    }

    crate::log_info!("Starting fixing pass",
        "file" => label,
        "bytes" => source.len(),
        "rules" => rules.len()
    );

    let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
    let raw_tokens = analyzer.tokenize(source)?;
    let token_count = raw_tokens.len();

    let mut chain = Chain::from_raw_tokens(raw_tokens)?;
    crate::log_success!(codes::success::CHAIN_CONSTRUCTED, "Chain constructed",
        "nodes" => chain.len()
    );

    let mut rule_reports = Vec::with_capacity(rules.len());
    for rule in rules {
        rule_reports.push(run_to_fixed_point(&mut chain, rule.as_ref(), &config.fixing)?);
    }

    let output = chain.render();
    let changed = output != source;

    if changed && config.fixing.verify_idempotence {
        verify_idempotence(&output, rules, config)?;
    }

    let result = FixResult {
        output,
        changed,
        rule_reports,
        lexical_metrics: analyzer.metrics().clone(),
        token_count,
        duration: start_time.elapsed(),
    };

    if result.changed || config.fixing.log_unchanged_files {
        result.log_success(label);
    }

    Ok(result)
}

/// Apply `rule` until an application makes no edit
fn run_to_fixed_point(
    chain: &mut Chain,
    rule: &dyn Rule,
    preferences: &FixingPreferences,
) -> Result<RuleReport, PipelineError> {
    let mut report = RuleReport::new(rule.name());

    for _ in 0..MAX_FIXED_POINT_ITERATIONS {
        let before = chain.edit_count();
        rule.apply(chain)?;
        let edits = chain.edit_count() - before;
        report.applications += 1;

        if edits == 0 {
            crate::log_success!(codes::success::RULE_FIXED_POINT_REACHED, "Rule reached fixed point",
                "rule" => rule.name(),
                "applications" => report.applications,
                "edits" => report.edits
            );
            return Ok(report);
        }

        report.edits += edits;
        if preferences.log_edit_details {
            crate::log_info!("Rule applied",
                "rule" => rule.name(),
                "application" => report.applications,
                "edits" => edits
            );
        }
    }

    Err(PipelineError::FixedPointNotReached { rule: rule.name() })
}

/// Re-analyze the rendered output from scratch; no rule may edit it again
fn verify_idempotence(
    output: &str,
    rules: &[Box<dyn Rule>],
    config: &RuntimeConfig,
) -> Result<(), PipelineError> {
    let raw_tokens = LexicalAnalyzer::with_preferences(config.lexical.clone()).tokenize(output)?;
    let mut chain = Chain::from_raw_tokens(raw_tokens)?;

    for rule in rules {
        let before = chain.edit_count();
        rule.apply(&mut chain)?;
        let edits = chain.edit_count() - before;
        if edits > 0 {
            return Err(PipelineError::NotIdempotent {
                rule: rule.name(),
                edits,
            });
        }
    }

    crate::log_debug!("Output verified idempotent", "rules" => rules.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainError, NodeId};
    use crate::lexical::LexerError;
    use crate::rules::default_rules;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;

    /// Appends a comment on every application
    struct EndlessRule;

    impl Rule for EndlessRule {
        fn name(&self) -> &'static str {
            "endless"
        }

        fn apply(&self, chain: &mut Chain) -> Result<(), ChainError> {
            let Some(last) = chain.last() else {
                return Ok(());
            };
            let node = chain.create(TokenKind::Comment, "/* again */")?;
            chain.insert_after(last, node)
        }
    }

    /// Edits any chain it has not edited yet, so a fresh chain of its own output edits again
    struct OncePerChain;

    impl Rule for OncePerChain {
        fn name(&self) -> &'static str {
            "once_per_chain"
        }

        fn apply(&self, chain: &mut Chain) -> Result<(), ChainError> {
            if chain.edit_count() > 0 {
                return Ok(());
            }
            let Some(last) = chain.last() else {
                return Ok(());
            };
            let node = chain.create(TokenKind::Whitespace, "\n")?;
            chain.insert_after(last, node)
        }
    }

    /// Tries to replace the chain anchor
    struct BoundaryBreaker;

    impl Rule for BoundaryBreaker {
        fn name(&self) -> &'static str {
            "boundary_breaker"
        }

        fn apply(&self, chain: &mut Chain) -> Result<(), ChainError> {
            let first = chain.first().unwrap_or(NodeId::from_index(0));
            let node = chain.create(TokenKind::OpenTag, "<?php")?;
            chain.replace_with(first, node)
        }
    }

    fn config(verify_idempotence: bool) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.fixing.verify_idempotence = verify_idempotence;
        config
    }

    const SAMPLE: &str = "<?php\nclass A\n{\n    private $items = [];\n}\n";

    #[test]
    fn test_default_rules_fix_sample() {
        let result = fix_source_with_preferences(SAMPLE, &default_rules(), &config(true)).unwrap();

        assert!(result.changed);
        assert_eq!(
            result.output,
            "<?php\nclass A\n{\n    private $items;\n\n    public function __construct()\n    {\n        $this->items = [];\n    }\n}\n"
        );
        assert_eq!(result.rule_reports.len(), 1);
        assert_eq!(result.rule_reports[0].rule, "default_values_in_constructor");
        assert_eq!(result.rule_reports[0].applications, 2);
        assert!(result.total_edits() > 0);
        assert!(result.token_count > 0);
    }

    #[test]
    fn test_fixing_output_again_changes_nothing() {
        let first = fix_source_with_preferences(SAMPLE, &default_rules(), &config(true)).unwrap();
        let second = fix_source_with_preferences(&first.output, &default_rules(), &config(true)).unwrap();

        assert!(!second.changed);
        assert_eq!(second.output, first.output);
        assert_eq!(second.total_edits(), 0);
    }

    #[test]
    fn test_round_trip_without_rules() {
        let source = "<?php\n// nothing to do\n$a = [1, 2];\n?>\n<p>tail</p>";
        let result = fix_source(source, &[]).unwrap();
        assert!(!result.changed);
        assert_eq!(result.output, source);
    }

    #[test]
    fn test_fixed_point_limit() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(EndlessRule)];
        let result = fix_source_with_preferences(SAMPLE, &rules, &config(false));
        assert_matches!(result, Err(PipelineError::FixedPointNotReached { rule: "endless" }));
    }

    #[test]
    fn test_idempotence_verification() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(OncePerChain)];
        let result = fix_source_with_preferences(SAMPLE, &rules, &config(true));
        assert_matches!(
            result,
            Err(PipelineError::NotIdempotent { rule: "once_per_chain", edits: 1 })
        );
    }

    #[test]
    fn test_chain_error_aborts_pass() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(BoundaryBreaker)];
        let source = SAMPLE.to_string();
        let result = fix_source_with_preferences(&source, &rules, &config(false));

        let error = result.unwrap_err();
        assert_matches!(error, PipelineError::Chain(ChainError::CannotReplaceBoundary { .. }));
        assert_eq!(error.error_code(), codes::chain::CANNOT_REPLACE_BOUNDARY);
        assert_eq!(source, SAMPLE);
    }

    #[test]
    fn test_lexer_error_aborts_pass() {
        let result = fix_source("<?php $a = 'unterminated", &default_rules());
        assert_matches!(
            result,
            Err(PipelineError::LexicalAnalysis(LexerError::UnterminatedString { .. }))
        );
    }

    #[test]
    fn test_too_many_rules() {
        let rules: Vec<Box<dyn Rule>> = (0..=MAX_RULES_PER_PASS)
            .map(|_| Box::new(EndlessRule) as Box<dyn Rule>)
            .collect();
        let result = fix_source(SAMPLE, &rules);
        assert_matches!(result, Err(PipelineError::TooManyRules { .. }));
    }

    #[test]
    fn test_labeled_source_clears_file_context() {
        fix_labeled_source("labeled.php", SAMPLE, &default_rules(), &config(false)).unwrap();
        assert!(logging::get_current_file_context().is_none());
    }

    #[test]
    fn test_pipeline_validation() {
        assert!(validate_pipeline().is_ok());
    }
}
