//! Configuration loading for the research pipeline.

pub mod toml_config;

pub use toml_config::{AppConfig, ConfigError, LlmConfig, LogFormat, LoggingConfig, ToolsConfig};
