use crate::config::compile_time::fixing::MAX_RULES_PER_PASS;
use crate::logging::codes;

/// Check error code registration and the shipped rule set against pass limits
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating fixing pipeline configuration");

    crate::lexical::validate_error_codes()?;

    let pipeline_codes = [
        codes::chain::CANNOT_REPLACE_BOUNDARY,
        codes::chain::NO_SUCH_NEIGHBOR,
        codes::chain::INDENT_COMPUTATION_ERROR,
        codes::chain::ORPHANED_NODE,
        codes::chain::NODE_IN_USE,
        codes::chain::UNKNOWN_NODE,
        codes::chain::UNBALANCED_GROUP,
        codes::chain::CHAIN_TOO_LARGE,
        codes::chain::LINK_CYCLE,
        codes::fixing::FIXED_POINT_NOT_REACHED,
        codes::fixing::NOT_IDEMPOTENT,
        codes::fixing::TOO_MANY_RULES,
        codes::fixing::PASS_ABORTED,
    ];
    for code in &pipeline_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    let rule_count = crate::rules::default_rules().len();
    if rule_count > MAX_RULES_PER_PASS {
        return Err(format!(
            "{} default rules exceed max_rules_per_pass ({})",
            rule_count, MAX_RULES_PER_PASS
        ));
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Fixing pipeline validation succeeded",
        "codes_validated" => pipeline_codes.len(),
        "default_rules" => rule_count
    );

    Ok(())
}
