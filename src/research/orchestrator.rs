//! Top-level research controller.
//!
//! Runs clarify → brief → supervised research → final report for one request
//! and owns that request's [`ResearchState`].

use crate::llm::generate_object;
use crate::research::cancel::checkpoint;
use crate::research::citations::{ensure_sources_section, parse_sources};
use crate::research::context::ResearchContext;
use crate::research::prompts;
use crate::research::schema::{ClarifyWithUser, ResearchQuestion};
use crate::research::state::{ResearchState, SupervisorPhase};
use crate::research::supervisor::Supervisor;
use crate::types::{render_transcript, AppError, ConversationMessage, MessageRole, Result, Source};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Counters a budgeting collaborator can inspect after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchStats {
    pub supervisor_iterations: usize,
    pub tasks_planned: usize,
    pub tasks_executed: usize,
    pub tasks_overflowed: usize,
    pub stop_reason: SupervisorPhase,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub report: String,
    pub research_brief: String,
    pub findings: Vec<String>,
    pub raw_notes: Vec<String>,
    /// False when research stopped for any reason other than convergence
    pub is_complete: bool,
    pub sources: Vec<Source>,
    pub stats: ResearchStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResearchOutcome {
    /// The request was ambiguous; nothing was researched.
    Clarification { question: String },
    Report(ResearchReport),
}

impl ResearchOutcome {
    /// The string handed back to the user.
    pub fn into_text(self) -> String {
        match self {
            ResearchOutcome::Clarification { question } => question,
            ResearchOutcome::Report(report) => report.report,
        }
    }
}

pub struct ResearchOrchestrator {
    ctx: ResearchContext,
    supervisor: Supervisor,
}

impl ResearchOrchestrator {
    pub fn new(ctx: ResearchContext) -> Self {
        Self {
            supervisor: Supervisor::new(ctx.clone()),
            ctx,
        }
    }

    /// Research a single request; returns a clarifying question or the report.
    pub async fn conduct_research(&self, user_input: &str) -> Result<String> {
        self.conduct_research_with_history(vec![ConversationMessage::user(user_input)])
            .await
    }

    /// As [`conduct_research`](Self::conduct_research), continuing an existing conversation.
    pub async fn conduct_research_with_history(
        &self,
        messages: Vec<ConversationMessage>,
    ) -> Result<String> {
        Ok(self.run(messages).await?.into_text())
    }

    /// Run the full pipeline and return the structured outcome.
    ///
    /// Clarification and brief failures are fatal. Research failures are
    /// folded into the findings and never prevent the report.
    pub async fn run(&self, messages: Vec<ConversationMessage>) -> Result<ResearchOutcome> {
        let started = Instant::now();
        let has_user_input = messages
            .iter()
            .any(|m| m.role == MessageRole::User && !m.content.trim().is_empty());
        if !has_user_input {
            return Err(AppError::InvalidInput(
                "Research request must contain a non-empty user message".to_string(),
            ));
        }

        let mut state = ResearchState::new(messages);

        if self.ctx.config.allow_clarification {
            let decision = self.clarify(&state).await?;
            if decision.need_clarification && !decision.question.trim().is_empty() {
                tracing::info!("Request needs clarification; skipping research");
                return Ok(ResearchOutcome::Clarification {
                    question: decision.question,
                });
            }
            if !decision.verification.trim().is_empty() {
                state
                    .messages
                    .push(ConversationMessage::assistant(decision.verification, vec![]));
            }
        }

        let brief = self.write_research_brief(&state).await?;
        state.set_research_brief(brief.clone())?;
        tracing::info!(brief_len = brief.len(), "Research brief generated");

        let outcome = self
            .supervisor
            .conduct_supervised_research(&brief, Vec::new())
            .await?;
        state.findings = outcome.findings;
        state.raw_notes = outcome.raw_notes;
        state.is_complete = outcome.is_complete;

        let report = self.final_report(&state, &brief).await?;
        let sources = parse_sources(&report);

        tracing::info!(
            findings = state.findings.len(),
            sources = sources.len(),
            is_complete = state.is_complete,
            "Research report generated"
        );

        Ok(ResearchOutcome::Report(ResearchReport {
            report,
            research_brief: brief,
            findings: state.findings,
            raw_notes: state.raw_notes,
            is_complete: state.is_complete,
            sources,
            stats: ResearchStats {
                supervisor_iterations: outcome.iterations,
                tasks_planned: outcome.tasks_planned,
                tasks_executed: outcome.tasks_executed,
                tasks_overflowed: outcome.tasks_overflowed,
                stop_reason: outcome.stop_reason,
                duration_ms: started.elapsed().as_millis() as u64,
            },
        }))
    }

    async fn clarify(&self, state: &ResearchState) -> Result<ClarifyWithUser> {
        let messages = vec![ConversationMessage::user(prompts::clarify_with_user(
            &render_transcript(&state.messages),
        ))];
        checkpoint(
            &self.ctx.cancel,
            generate_object(self.ctx.models.research.as_ref(), &messages),
        )
        .await
    }

    async fn write_research_brief(&self, state: &ResearchState) -> Result<String> {
        let messages = vec![ConversationMessage::user(prompts::research_brief(
            &render_transcript(&state.messages),
        ))];
        let question: ResearchQuestion = checkpoint(
            &self.ctx.cancel,
            generate_object(self.ctx.models.research.as_ref(), &messages),
        )
        .await?;

        let brief = question.research_brief.trim().to_string();
        if brief.is_empty() {
            return Err(AppError::LLM("Model returned an empty research brief".to_string()));
        }
        Ok(brief)
    }

    async fn final_report(&self, state: &ResearchState, brief: &str) -> Result<String> {
        let prompt = prompts::final_report(
            brief,
            &render_transcript(&state.messages),
            &state.findings,
        );
        let report = checkpoint(
            &self.ctx.cancel,
            self.ctx
                .models
                .final_report
                .generate_with_system(prompts::FINAL_REPORT_SYSTEM, &prompt),
        )
        .await?;

        if report.trim().is_empty() {
            return Err(AppError::LLM("Model returned an empty report".to_string()));
        }
        Ok(ensure_sources_section(&report, &state.findings))
    }
}
