//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the model capabilities the
//! research pipeline consumes. Provider-specific code sits behind the
//! [`LLMClient`] trait so the orchestration logic works with any backend,
//! including the stub clients used in tests.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection
//! - [`ResearchModels`] - One client per research role (research, compression, final report)
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//!
//! # Example
//!
//! ```ignore
//! use ares_research::llm::{ResearchModels, Provider, ClientSettings};
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model: "llama3.1".into(),
//! }
//! .create_client(&ClientSettings::default())?;
//!
//! let models = ResearchModels::uniform(client);
//! ```

/// Core LLM client trait and structured-output helpers.
pub mod client;
/// Model clients per research role.
pub mod provider_registry;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{generate_object, ClientSettings, LLMClient, LLMResponse, OutputSchema, Provider};
pub use provider_registry::ResearchModels;
