//! # ares-research - Bounded Multi-Agent Deep Research
//!
//! Turns one research request into a cited markdown report by clarifying
//! intent, writing a research brief, running concurrency-limited
//! tool-calling researchers under a planning supervisor, compressing their
//! findings and synthesizing a final report.
//!
//! ## Overview
//!
//! ares-research can be used in two ways:
//!
//! 1. **As a CLI** - Run the `ares-research` binary
//! 2. **As a library** - Embed the pipeline in your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use ares_research::research::{ResearchConfig, ResearchContext, ResearchOrchestrator};
//! use ares_research::{ClientSettings, Provider, ResearchModels, ToolRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.1".to_string(),
//!     };
//!     let client = provider.create_client(&ClientSettings::default())?;
//!
//!     let ctx = ResearchContext::new(
//!         ResearchConfig::default().with_clarification(false),
//!         ResearchModels::uniform(client),
//!         Arc::new(ToolRegistry::with_default_tools()),
//!     )?;
//!
//!     let report = ResearchOrchestrator::new(ctx)
//!         .conduct_research("What changed in the 2024 EU battery regulation?")
//!         .await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama chat client (default) |
//! | `web-search` | `web_search` and `fetch_page` tools via daedra (default) |
//!
//! ## Modules
//!
//! - [`research`] - Orchestrator, supervisor and researcher
//! - [`llm`] - LLM client trait, structured output and the Ollama client
//! - [`tools`] - Tool trait, registry and built-in research tools
//! - [`types`] - Conversation types and error handling
//! - [`utils`] - TOML and environment configuration
//! - [`cli`] - Command-line interface

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Multi-agent research orchestration.
pub mod research;
/// Research tools (ResearchComplete, think, web search).
pub mod tools;
/// Core types (messages, tool calls, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{ClientSettings, LLMClient, LLMResponse, OutputSchema, Provider, ResearchModels};
pub use research::{
    ResearchConfig, ResearchContext, ResearchOrchestrator, ResearchOutcome, ResearchReport,
};
pub use tools::registry::ToolRegistry;
pub use types::{AppError, Result};
pub use utils::toml_config::AppConfig;
