//! LLM Client abstractions and provider management
//!
//! The research pipeline consumes three model capabilities through one trait:
//! - **Free text**: `generate` / `generate_with_system`
//! - **Tool calling**: `generate_with_tools_and_history`
//! - **Structured output**: `generate_structured`, usually through the typed
//!   [`generate_object`] helper
//!
//! Providers implement [`LLMClient`]; the pipeline never names a concrete
//! provider, so tests and embedders can inject their own clients.

use crate::types::{AppError, ConversationMessage, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing orchestration code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Ask the model for its next turn given a transcript and the tools it may call
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;

    /// Generate a JSON value conforming to `schema`.
    ///
    /// Implementations must fail rather than return a value they know to be
    /// malformed.
    async fn generate_structured(
        &self,
        messages: &[ConversationMessage],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Response from a tool-calling generation request
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// The text content of the response
    pub content: String,
    /// Any tool calls requested by the model
    pub tool_calls: Vec<ToolCall>,
    /// The reason generation stopped (e.g., "stop", "tool_calls", "length")
    pub finish_reason: String,
}

/// A named JSON schema handed to structured-output generation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema title, e.g. `ResearchPlan`
    pub name: String,
    /// JSON schema document
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derive the schema for `T` from its `JsonSchema` implementation.
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            name: T::schema_name().into_owned(),
            schema: schemars::schema_for!(T).to_value(),
        }
    }
}

/// Run a structured-output call and deserialize the result into `T`.
///
/// A response that does not deserialize is reported as an `LLM` error.
pub async fn generate_object<T>(client: &dyn LLMClient, messages: &[ConversationMessage]) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = OutputSchema::of::<T>();
    let value = client.generate_structured(messages, &schema).await?;
    serde_json::from_value(value).map_err(|e| {
        AppError::LLM(format!(
            "Model output did not match schema '{}': {}",
            schema.name, e
        ))
    })
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.1".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

/// Transport settings shared by every client a provider creates
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Retries for transient transport or server failures
    pub max_retries: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            request_timeout_secs: 120,
            temperature: 0.0,
        }
    }
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider was compiled out or its HTTP client
    /// could not be built.
    pub fn create_client(&self, settings: &ClientSettings) -> Result<Arc<dyn LLMClient>> {
        match self {
            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), settings)?,
            )),
            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => {
                let _ = settings;
                Err(AppError::Configuration(
                    "Ollama support not compiled in; enable the 'ollama' feature".to_string(),
                ))
            }
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model identifier this provider will serve
    pub fn model(&self) -> &str {
        match self {
            Provider::Ollama { model, .. } => model,
        }
    }
}
