//! Run command implementation
//!
//! Wires configuration, model clients and tools into a research session,
//! prints progress to stderr and the outcome to stdout.

use super::output::Output;
use crate::llm::ResearchModels;
use crate::research::{
    ResearchContext, ResearchObserver, ResearchOrchestrator, ResearchOutcome, SupervisorPhase,
};
use crate::types::{AppError, ConversationMessage, Result};
use crate::utils::toml_config::AppConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Options for the run command
pub struct RunOptions {
    pub query: String,
    pub no_clarify: bool,
    pub json: bool,
}

/// Observer that reports pipeline progress on the terminal.
pub struct ProgressObserver {
    output: Output,
}

impl ProgressObserver {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl ResearchObserver for ProgressObserver {
    fn on_plan(&self, iteration: usize, task_count: usize, is_complete: bool) {
        let message = if is_complete {
            "research judged complete".to_string()
        } else {
            format!("{} task(s) planned", task_count)
        };
        self.output
            .progress(&format!("plan {}", iteration + 1), &message);
    }

    fn on_dispatch(&self, iteration: usize, executed: usize, overflowed: usize) {
        self.output.progress(
            &format!("plan {}", iteration + 1),
            &format!("running {} researcher(s)", executed),
        );
        if overflowed > 0 {
            self.output.warning(&format!(
                "{} task(s) exceeded the concurrency limit and were skipped",
                overflowed
            ));
        }
    }

    fn on_tool_round(&self, topic: &str, round: usize, calls: usize) {
        tracing::debug!(topic = %topic, round, calls, "Tool round finished");
    }

    fn on_supervisor_finished(&self, phase: &SupervisorPhase, iterations: usize) {
        let reason = match phase {
            SupervisorPhase::Converged => "converged".to_string(),
            SupervisorPhase::BudgetExhausted => "iteration budget exhausted".to_string(),
            SupervisorPhase::NoFurtherTasks => "planner proposed no further tasks".to_string(),
            SupervisorPhase::PlanningFailed(e) => format!("planning failed: {}", e),
            other => format!("{:?}", other),
        };
        self.output.progress(
            "supervisor",
            &format!("stopped after {} iteration(s): {}", iterations, reason),
        );
    }
}

/// Execute one research request.
pub async fn run(
    config: AppConfig,
    options: RunOptions,
    output: Output,
    cancel: CancellationToken,
) -> Result<()> {
    let mut research = config.research.clone();
    if options.no_clarify {
        research.allow_clarification = false;
    }

    let models = ResearchModels::from_config(&config.llm, &research)?;
    let tools = Arc::new(config.build_tools());
    if !tools.has_research_actions() {
        output.warning("No research tools are enabled; findings will rely on the model alone");
        output.hint("Enable the web-search feature and set tools.web_search = true");
    }
    tracing::info!(
        tools = ?tools.tool_names(),
        model = %research.models.research,
        "Starting research session"
    );

    let ctx = ResearchContext::new(research, models, tools)?
        .with_tool_timeout(config.tools.tool_timeout())
        .with_observer(Arc::new(ProgressObserver::new(output)))
        .with_cancellation(cancel);

    let outcome = ResearchOrchestrator::new(ctx)
        .run(vec![ConversationMessage::user(options.query)])
        .await?;

    if options.json {
        let rendered = serde_json::to_string_pretty(&outcome)
            .map_err(|e| AppError::Internal(format!("Failed to serialize outcome: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    match outcome {
        ResearchOutcome::Clarification { question } => {
            output.question(&question);
            output.hint("Re-run with more detail, or pass --no-clarify");
        }
        ResearchOutcome::Report(report) => {
            if !report.is_complete {
                output.warning(&format!(
                    "Research stopped before convergence ({:?}); the report may be partial",
                    report.stats.stop_reason
                ));
            }
            output.report(&report.report);
            output.progress(
                "done",
                &format!(
                    "{} finding(s), {} source(s) in {} ms",
                    report.findings.len(),
                    report.sources.len(),
                    report.stats.duration_ms
                ),
            );
            output.sources(&report.sources);
        }
    }

    Ok(())
}
