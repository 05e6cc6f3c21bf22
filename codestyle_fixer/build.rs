// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    chain: ChainLimits,
    lexical: LexicalLimits,
    fixing: FixingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct ChainLimits {
    max_chain_nodes: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_count: usize,
    max_comment_length: usize,
    max_string_size: usize,
}

#[derive(serde::Deserialize)]
struct FixingLimits {
    max_fixed_point_iterations: usize,
    max_rules_per_pass: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=FIXER_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=FIXER_CONFIG_DIR");

    let profile = env::var("FIXER_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("FIXER_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of codestyle_fixer directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_CHAIN_NODES: usize = 50_000_000;
    const ABSOLUTE_MAX_ITERATIONS: usize = 1_000;

    if config.chain.max_chain_nodes == 0 || config.chain.max_chain_nodes > ABSOLUTE_MAX_CHAIN_NODES {
        panic!("LIMITS: max_chain_nodes must be in 1..={}", ABSOLUTE_MAX_CHAIN_NODES);
    }

    // Node ids are u32 indices into the arena
    if config.chain.max_chain_nodes as u64 > u32::MAX as u64 {
        panic!("LIMITS: max_chain_nodes does not fit a u32 node id");
    }

    if config.fixing.max_fixed_point_iterations == 0
        || config.fixing.max_fixed_point_iterations > ABSOLUTE_MAX_ITERATIONS
    {
        panic!(
            "LIMITS: max_fixed_point_iterations must be in 1..={}",
            ABSOLUTE_MAX_ITERATIONS
        );
    }

    if config.lexical.max_token_count > config.chain.max_chain_nodes {
        panic!("LIMITS: max_token_count cannot exceed max_chain_nodes");
    }

    if profile == "production" && config.fixing.max_fixed_point_iterations > 64 {
        panic!("PRODUCTION: max_fixed_point_iterations too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod chain {{
        pub const MAX_CHAIN_NODES: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_COMMENT_LENGTH: usize = {};
        pub const MAX_STRING_SIZE: usize = {};
    }}

    pub mod fixing {{
        pub const MAX_FIXED_POINT_ITERATIONS: usize = {};
        pub const MAX_RULES_PER_PASS: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        config.chain.max_chain_nodes,
        config.lexical.max_token_count,
        config.lexical.max_comment_length,
        config.lexical.max_string_size,
        config.fixing.max_fixed_point_iterations,
        config.fixing.max_rules_per_pass,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
