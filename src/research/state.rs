//! Session, researcher and supervisor state.

use crate::types::{AppError, ConversationMessage, Result, ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

/// State of one `conduct_research` call, owned by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchState {
    pub messages: Vec<ConversationMessage>,
    research_brief: Option<String>,
    pub findings: Vec<String>,
    pub raw_notes: Vec<String>,
    pub is_complete: bool,
}

impl ResearchState {
    pub fn new(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn research_brief(&self) -> Option<&str> {
        self.research_brief.as_deref()
    }

    /// Set the brief. It is immutable once set.
    pub fn set_research_brief(&mut self, brief: impl Into<String>) -> Result<()> {
        if self.research_brief.is_some() {
            return Err(AppError::Internal(
                "Research brief is already set for this session".to_string(),
            ));
        }
        self.research_brief = Some(brief.into());
        Ok(())
    }
}

/// How a researcher's tool loop ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionCompletion {
    InProgress,
    /// The model returned no tool calls.
    Implicit,
    /// The model called `ResearchComplete`.
    Explicit,
    /// `max_tool_calls` rounds were used up.
    BudgetExhausted,
}

/// Transcript and tool history of one researcher. Never shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSession {
    pub topic: String,
    pub messages: Vec<ConversationMessage>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub tool_call_iterations: usize,
    pub completion: SessionCompletion,
}

impl ResearchSession {
    pub fn new(topic: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            messages: vec![
                ConversationMessage::system(system_prompt),
                ConversationMessage::user(topic.clone()),
            ],
            topic,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            tool_call_iterations: 0,
            completion: SessionCompletion::InProgress,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            self.completion,
            SessionCompletion::Implicit | SessionCompletion::Explicit
        )
    }

    /// Record one round: the assistant turn with its calls, then each result.
    pub fn record_round(&mut self, content: String, calls: Vec<ToolCall>, results: Vec<ToolResult>) {
        self.messages
            .push(ConversationMessage::assistant(content, calls.clone()));
        for result in &results {
            self.messages.push(ConversationMessage::tool_result(
                result.tool_call_id.clone(),
                result.result.clone(),
            ));
        }
        self.tool_calls.extend(calls);
        self.tool_results.extend(results);
        self.tool_call_iterations += 1;
    }
}

/// Where the supervisor loop is. Only the supervisor loop driver transitions it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "phase", content = "detail")]
pub enum SupervisorPhase {
    Planning,
    Executing,
    /// The planner judged the brief answered.
    Converged,
    /// The iteration cap was reached before the planner converged.
    BudgetExhausted,
    /// The planner returned no tasks without declaring completion.
    NoFurtherTasks,
    /// The plan call failed; accumulated findings are still returned.
    PlanningFailed(String),
}

impl SupervisorPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SupervisorPhase::Planning | SupervisorPhase::Executing)
    }
}

/// Working state of one supervisor invocation.
#[derive(Debug, Clone)]
pub struct SupervisorState {
    pub research_brief: String,
    pub research_iterations: usize,
    pub findings: Vec<String>,
    pub raw_notes: Vec<String>,
    pub phase: SupervisorPhase,
    pub tasks_planned: usize,
    pub tasks_executed: usize,
    pub tasks_overflowed: usize,
}

impl SupervisorState {
    pub fn new(research_brief: impl Into<String>, initial_findings: Vec<String>) -> Self {
        Self {
            research_brief: research_brief.into(),
            research_iterations: 0,
            findings: initial_findings,
            raw_notes: Vec::new(),
            phase: SupervisorPhase::Planning,
            tasks_planned: 0,
            tasks_executed: 0,
            tasks_overflowed: 0,
        }
    }

    pub fn into_outcome(self) -> SupervisorOutcome {
        SupervisorOutcome {
            is_complete: self.phase == SupervisorPhase::Converged,
            findings: self.findings,
            raw_notes: self.raw_notes,
            stop_reason: self.phase,
            iterations: self.research_iterations,
            tasks_planned: self.tasks_planned,
            tasks_executed: self.tasks_executed,
            tasks_overflowed: self.tasks_overflowed,
        }
    }
}

/// What the supervisor hands back to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorOutcome {
    pub findings: Vec<String>,
    pub raw_notes: Vec<String>,
    /// True only when the planner converged, never on budget exhaustion.
    pub is_complete: bool,
    pub stop_reason: SupervisorPhase,
    pub iterations: usize,
    pub tasks_planned: usize,
    pub tasks_executed: usize,
    pub tasks_overflowed: usize,
}
