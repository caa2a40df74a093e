//! Individual researcher: a bounded tool-calling loop plus compression.
//!
//! 1. Seed a transcript with the tool-calling instructions and the topic
//! 2. Ask the model for a batch of tool calls and execute them concurrently
//! 3. Record the calls and their results, then repeat
//! 4. Stop on an empty batch, on `ResearchComplete`, or after `max_tool_calls` rounds
//! 5. Compress the raw tool output into a verbatim-preserving finding

use crate::research::cancel::checkpoint;
use crate::research::citations::append_missing_urls;
use crate::research::context::ResearchContext;
use crate::research::prompts;
use crate::research::state::{ResearchSession, SessionCompletion};
use crate::tools::RESEARCH_COMPLETE_TOOL;
use crate::types::{AppError, Result, ToolCall, ToolResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::time::timeout;

/// Compressed result of researching one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchFinding {
    pub topic: String,
    pub compressed: String,
    /// Successful raw tool outputs, in call order
    pub raw_notes: Vec<String>,
    pub tool_call_iterations: usize,
    pub completion: SessionCompletion,
}

#[derive(Clone)]
pub struct Researcher {
    ctx: ResearchContext,
}

impl Researcher {
    pub fn new(ctx: ResearchContext) -> Self {
        Self { ctx }
    }

    /// Research `topic` and return the compressed finding.
    pub async fn research(&self, topic: &str) -> Result<String> {
        Ok(self.investigate(topic).await?.compressed)
    }

    /// Research `topic`, keeping raw notes alongside the compressed finding.
    pub async fn investigate(&self, topic: &str) -> Result<ResearchFinding> {
        let session = self.research_with_tools(topic).await?;
        let compressed = self.compress_findings(&session).await?;

        Ok(ResearchFinding {
            topic: session.topic.clone(),
            raw_notes: raw_notes(&session),
            tool_call_iterations: session.tool_call_iterations,
            completion: session.completion,
            compressed,
        })
    }

    /// Run the tool-calling loop for `topic`.
    pub async fn research_with_tools(&self, topic: &str) -> Result<ResearchSession> {
        let max_rounds = self.ctx.config.max_tool_calls;
        let definitions = self.ctx.tools.get_tool_definitions();
        let mut session = ResearchSession::new(
            topic,
            prompts::researcher_system(&self.ctx.tools.tool_names(), max_rounds),
        );

        while session.tool_call_iterations < max_rounds {
            let response = checkpoint(
                &self.ctx.cancel,
                self.ctx
                    .models
                    .research
                    .generate_with_tools_and_history(&session.messages, &definitions),
            )
            .await?;

            if response.tool_calls.is_empty() {
                session.completion = SessionCompletion::Implicit;
                break;
            }

            let calls = assign_call_ids(response.tool_calls, session.tool_call_iterations);
            let signalled_complete = calls.iter().any(|c| c.name == RESEARCH_COMPLETE_TOOL);
            let results = self.execute_tool_calls(&calls).await?;
            let call_count = calls.len();

            session.record_round(response.content, calls, results);
            self.ctx
                .observer
                .on_tool_round(topic, session.tool_call_iterations, call_count);

            if signalled_complete {
                session.completion = SessionCompletion::Explicit;
                break;
            }
        }

        if session.completion == SessionCompletion::InProgress {
            session.completion = SessionCompletion::BudgetExhausted;
        }

        tracing::debug!(
            topic = %topic,
            rounds = session.tool_call_iterations,
            completion = ?session.completion,
            "Researcher tool loop finished"
        );

        Ok(session)
    }

    /// Compress a session's raw tool output into one finding.
    ///
    /// Makes no model call when no tool produced usable output.
    pub async fn compress_findings(&self, session: &ResearchSession) -> Result<String> {
        let notes = raw_notes(session);
        if notes.is_empty() {
            return Ok(prompts::INSUFFICIENT_INFORMATION.to_string());
        }

        let calls: Vec<String> = session
            .tool_calls
            .iter()
            .filter(|c| c.name != RESEARCH_COMPLETE_TOOL)
            .map(|c| format!("- {}({})", c.name, c.arguments))
            .collect();
        let raw = notes.join("\n\n");
        let prompt = prompts::compress_findings(&session.topic, &calls, &raw);

        let compressed = checkpoint(
            &self.ctx.cancel,
            self.ctx
                .models
                .compression
                .generate_with_system(prompts::COMPRESS_SYSTEM, &prompt),
        )
        .await?;

        Ok(append_missing_urls(&compressed, &raw))
    }

    /// Execute one batch concurrently. Only cancellation is an error.
    async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Result<Vec<ToolResult>> {
        let futures = calls.iter().map(|call| self.execute_single_tool(call));
        join_all(futures).await.into_iter().collect()
    }

    async fn execute_single_tool(&self, call: &ToolCall) -> Result<ToolResult> {
        if call.name == RESEARCH_COMPLETE_TOOL {
            return Ok(ToolResult::success(call, "Research marked complete"));
        }

        let run = async {
            Ok::<_, AppError>(timeout(
                self.ctx.tool_timeout,
                self.ctx
                    .tools
                    .execute_to_string(&call.name, call.arguments.clone()),
            )
            .await)
        };

        match checkpoint(&self.ctx.cancel, run).await? {
            Ok(Ok(output)) => Ok(ToolResult::success(call, output)),
            Ok(Err(e)) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                Ok(ToolResult::failure(call, e.to_string()))
            }
            Err(_) => {
                tracing::warn!(tool = %call.name, timeout = ?self.ctx.tool_timeout, "Tool call timed out");
                Ok(ToolResult::failure(
                    call,
                    format!("Tool execution timed out after {:?}", self.ctx.tool_timeout),
                ))
            }
        }
    }
}

/// Successful, non-sentinel tool outputs.
fn raw_notes(session: &ResearchSession) -> Vec<String> {
    session
        .tool_results
        .iter()
        .filter(|r| !r.is_error() && r.name != RESEARCH_COMPLETE_TOOL)
        .map(|r| r.result.clone())
        .collect()
}

/// Give every call in a round a unique id so results pair 1:1 with calls.
///
/// The first occurrence of each non-blank model id is kept. Blank and repeated
/// ids get `call_<round>_<index>`, suffixed further if the model already used it.
fn assign_call_ids(mut calls: Vec<ToolCall>, round: usize) -> Vec<ToolCall> {
    let mut taken = HashSet::new();
    let keep: Vec<bool> = calls
        .iter()
        .map(|call| !call.id.trim().is_empty() && taken.insert(call.id.clone()))
        .collect();

    for (i, call) in calls.iter_mut().enumerate() {
        if keep[i] {
            continue;
        }
        let base = format!("call_{}_{}", round + 1, i + 1);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        taken.insert(candidate.clone());
        call.id = candidate;
    }
    calls
}
