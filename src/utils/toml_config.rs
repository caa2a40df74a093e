//! TOML-based configuration for ares-research
//!
//! Settings are read from `ares-research.toml` and may be overridden by
//! environment variables of the form `ARES_RESEARCH__<SECTION>__<KEY>`, e.g.
//! `ARES_RESEARCH__RESEARCH__MAX_TOOL_CALLS=4`. A missing file is not an
//! error; every field has a default.

use crate::research::config::ResearchConfig;
use crate::tools::ToolRegistry;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "ares-research.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "ARES_RESEARCH";

/// Root configuration structure loaded from ares-research.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Provider type (only "ollama" is supported)
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub temperature: f32,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            temperature: 0.0,
        }
    }
}

// ============= Tool Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Timeout for a single tool execution
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Register the web_search and fetch_page tools
    #[serde(default = "default_true")]
    pub web_search: bool,
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout(),
            web_search: true,
        }
    }
}

impl ToolsConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl AppConfig {
    /// Load configuration from `path` (optional) and the environment, then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_err = |source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        };

        let config: AppConfig = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(load_err)?
            .try_deserialize()
            .map_err(load_err)?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|source| ConfigError::Load {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider != "ollama" {
            return Err(ConfigError::ValidationError(format!(
                "Unsupported LLM provider '{}' (expected 'ollama')",
                self.llm.provider
            )));
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.base_url must not be empty".to_string(),
            ));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.tools.tool_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.tool_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.research
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Render as a TOML document suitable for `ares-research.toml`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tool registry described by the `[tools]` section.
    pub fn build_tools(&self) -> ToolRegistry {
        #[cfg(feature = "web-search")]
        if self.tools.web_search {
            return ToolRegistry::with_default_tools();
        }
        ToolRegistry::with_research_tools()
    }
}
