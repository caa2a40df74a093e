//! Control tools every researcher gets: the completion sentinel and `think`.

use crate::tools::registry::{Tool, RESEARCH_COMPLETE_TOOL};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Sentinel the model calls when it has gathered enough information.
///
/// The researcher loop stops on this call; executing it does no external work.
pub struct ResearchComplete;

#[async_trait]
impl Tool for ResearchComplete {
    fn name(&self) -> &str {
        RESEARCH_COMPLETE_TOOL
    }

    fn description(&self) -> &str {
        "Call this tool to indicate that the research is complete"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(json!("Research marked complete"))
    }
}

/// Strategic reflection between searches.
///
/// Records the model's reasoning in the transcript without side effects.
pub struct ThinkTool;

impl ThinkTool {
    pub const NAME: &'static str = "think";
}

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Reflect on research progress: what was found, what is missing, and whether to continue searching"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reflection": {
                    "type": "string",
                    "description": "Your reflection on progress, gaps and next steps"
                }
            },
            "required": ["reflection"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let reflection = args
            .get("reflection")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'reflection' parameter".to_string()))?;

        Ok(json!(format!("Reflection recorded: {}", reflection)))
    }
}
