//! Model clients for each research role.

use crate::llm::client::{ClientSettings, LLMClient, Provider};
use crate::research::config::{ModelSelection, ResearchConfig};
use crate::types::{AppError, Result};
use crate::utils::toml_config::LlmConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// The three model roles the pipeline calls.
///
/// Passed explicitly through every component so tests can inject stub
/// clients per role.
#[derive(Clone)]
pub struct ResearchModels {
    /// Clarification, brief, planning and the researcher tool loop
    pub research: Arc<dyn LLMClient>,
    /// Findings compression
    pub compression: Arc<dyn LLMClient>,
    /// Final report synthesis
    pub final_report: Arc<dyn LLMClient>,
}

impl ResearchModels {
    /// Use one client for every role.
    pub fn uniform(client: Arc<dyn LLMClient>) -> Self {
        Self {
            research: client.clone(),
            compression: client.clone(),
            final_report: client,
        }
    }

    /// Build clients for the configured model identifiers.
    ///
    /// Roles naming the same model share one client.
    pub fn from_config(llm: &LlmConfig, research: &ResearchConfig) -> Result<Self> {
        let settings = ClientSettings {
            max_retries: research.max_retries,
            request_timeout_secs: llm.request_timeout_secs,
            temperature: llm.temperature,
        };
        let ModelSelection {
            research: research_model,
            compression,
            final_report,
        } = &research.models;

        let mut cache: HashMap<String, Arc<dyn LLMClient>> = HashMap::new();
        let mut client_for = |model: &str| -> Result<Arc<dyn LLMClient>> {
            if model.trim().is_empty() {
                return Err(AppError::Configuration(
                    "Model identifier must not be empty".to_string(),
                ));
            }
            if let Some(client) = cache.get(model) {
                return Ok(client.clone());
            }
            let client = llm.provider_for(model).create_client(&settings)?;
            cache.insert(model.to_string(), client.clone());
            Ok(client)
        };

        Ok(Self {
            research: client_for(research_model)?,
            compression: client_for(compression)?,
            final_report: client_for(final_report)?,
        })
    }
}

impl LlmConfig {
    /// Provider serving `model` with this connection config.
    pub fn provider_for(&self, model: &str) -> Provider {
        Provider::Ollama {
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }
}
