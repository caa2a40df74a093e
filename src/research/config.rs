use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Limits and model choices for one research session.
///
/// A `max_research_iterations` of `0` permits only the initial plan and runs
/// no researchers. A `max_tool_calls` of `0` skips the tool loop entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchConfig {
    /// Ask a clarifying question before researching when the request is ambiguous
    #[serde(default = "default_allow_clarification")]
    pub allow_clarification: bool,

    /// Researchers started per supervisor iteration; extra tasks overflow
    #[serde(default = "default_max_concurrent_research")]
    pub max_concurrent_research: usize,

    /// Supervisor plan/execute iterations
    #[serde(default = "default_max_research_iterations")]
    pub max_research_iterations: usize,

    /// Tool-calling rounds per researcher
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,

    /// Retries the model clients may spend on a single call
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default)]
    pub models: ModelSelection,
}

/// Model identifier per research role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSelection {
    /// Clarification, brief, planning and the researcher tool loop
    #[serde(default = "default_model")]
    pub research: String,

    /// Findings compression
    #[serde(default = "default_model")]
    pub compression: String,

    /// Final report synthesis
    #[serde(default = "default_model")]
    pub final_report: String,
}

fn default_allow_clarification() -> bool {
    true
}

fn default_max_concurrent_research() -> usize {
    5
}

fn default_max_research_iterations() -> usize {
    6
}

fn default_max_tool_calls() -> usize {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_model() -> String {
    "llama3.1".to_string()
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            research: default_model(),
            compression: default_model(),
            final_report: default_model(),
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            allow_clarification: default_allow_clarification(),
            max_concurrent_research: default_max_concurrent_research(),
            max_research_iterations: default_max_research_iterations(),
            max_tool_calls: default_max_tool_calls(),
            max_retries: default_max_retries(),
            models: ModelSelection::default(),
        }
    }
}

impl ResearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_research == 0 {
            return Err(AppError::Configuration(
                "max_concurrent_research must be at least 1".to_string(),
            ));
        }
        for (role, model) in [
            ("research", &self.models.research),
            ("compression", &self.models.compression),
            ("final_report", &self.models.final_report),
        ] {
            if model.trim().is_empty() {
                return Err(AppError::Configuration(format!(
                    "models.{} must name a model",
                    role
                )));
            }
        }
        Ok(())
    }

    pub fn with_clarification(mut self, allow: bool) -> Self {
        self.allow_clarification = allow;
        self
    }

    pub fn with_max_concurrent_research(mut self, max: usize) -> Self {
        self.max_concurrent_research = max;
        self
    }

    pub fn with_max_research_iterations(mut self, max: usize) -> Self {
        self.max_research_iterations = max;
        self
    }

    pub fn with_max_tool_calls(mut self, max: usize) -> Self {
        self.max_tool_calls = max;
        self
    }
}
