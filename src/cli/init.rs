//! Init command implementation
//!
//! Writes a default `ares-research.toml` and a `.env.example` listing the
//! environment overrides.

use super::output::Output;
use crate::utils::toml_config::{AppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// ares-research.toml already exists
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing ares-research");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let toml_content = match generate_config_toml() {
        Ok(content) => content,
        Err(e) => {
            output.error(&format!("Failed to render configuration: {}", e));
            return InitResult::Error(e);
        }
    };
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    if env_example_path.exists() && !config.force {
        output.skipped(".env.example", "already exists");
    } else if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.warning(&format!("Failed to create .env.example: {}", e));
    } else {
        output.created("env", ".env.example");
    }

    output.complete("ares-research initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Start Ollama (if not running):");
    output.command("ollama serve");
    output.command("ollama pull llama3.1  # or the models set in [research.models]");
    output.newline();
    output.info("2. Run a research request:");
    output.command("ares-research run \"your research question\"");

    output.hint(&format!(
        "Any setting can be overridden with {}__<SECTION>__<KEY>",
        ENV_PREFIX
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(()); // Skip existing files unless force is true
    }
    fs::write(path, content)
}

fn generate_config_toml() -> Result<String, String> {
    let body = AppConfig::default().to_toml().map_err(|e| e.to_string())?;
    Ok(format!(
        "# ares-research configuration\n\
         #\n\
         # Every value below is the built-in default. Environment variables of the\n\
         # form {}__<SECTION>__<KEY> take precedence over this file.\n\n{}",
        ENV_PREFIX, body
    ))
}

fn generate_env_example() -> String {
    format!(
        r#"# ares-research environment overrides
# Copy to .env and uncomment what you need.

# Log filter (takes precedence over [logging].level)
# RUST_LOG=ares_research=debug

# {p}__LLM__BASE_URL=http://localhost:11434
# {p}__RESEARCH__ALLOW_CLARIFICATION=false
# {p}__RESEARCH__MAX_CONCURRENT_RESEARCH=3
# {p}__RESEARCH__MAX_RESEARCH_ITERATIONS=4
# {p}__RESEARCH__MAX_TOOL_CALLS=6
# {p}__RESEARCH__MODELS__FINAL_REPORT=llama3.1:70b
# {p}__TOOLS__WEB_SEARCH=false
"#,
        p = ENV_PREFIX
    )
}
