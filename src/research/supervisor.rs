//! Research supervisor: plans tasks and fans them out to researchers.
//!
//! Each iteration asks the planner for a [`ResearchPlan`], checks whether to
//! stop, dispatches at most `max_concurrent_research` tasks in parallel, turns
//! the rest into overflow findings, and merges the batch into its state once
//! every researcher has settled.

use crate::llm::generate_object;
use crate::research::cancel::checkpoint;
use crate::research::context::ResearchContext;
use crate::research::prompts;
use crate::research::researcher::{ResearchFinding, Researcher};
use crate::research::schema::{ResearchPlan, ResearchTask};
use crate::research::state::{SupervisorOutcome, SupervisorPhase, SupervisorState};
use crate::types::{AppError, ConversationMessage, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;

/// Finding recorded for a task that was planned beyond the concurrency cap.
pub fn overflow_message(topic: &str, max_concurrent: usize) -> String {
    format!(
        "Research task \"{}\" was not executed because it exceeded the maximum number of concurrent research units ({}). Please try again with fewer tasks.",
        topic, max_concurrent
    )
}

/// Finding recorded for a researcher that failed.
pub fn worker_error_message(topic: &str, error: &str) -> String {
    format!("Error researching \"{}\": {}", topic, error)
}

struct WorkerOutcome {
    finding: String,
    raw_notes: Vec<String>,
}

pub struct Supervisor {
    ctx: ResearchContext,
    researcher: Researcher,
}

impl Supervisor {
    pub fn new(ctx: ResearchContext) -> Self {
        Self {
            researcher: Researcher::new(ctx.clone()),
            ctx,
        }
    }

    /// Plan and run research until the planner converges or the budget is spent.
    ///
    /// Worker and planning failures are absorbed into the outcome; only
    /// cancellation is returned as an error.
    pub async fn conduct_supervised_research(
        &self,
        brief: &str,
        initial_findings: Vec<String>,
    ) -> Result<SupervisorOutcome> {
        let max_iterations = self.ctx.config.max_research_iterations;
        let mut state = SupervisorState::new(brief, initial_findings);

        while !state.phase.is_terminal() {
            state.phase = SupervisorPhase::Planning;

            let plan = match self.plan(&state).await {
                Ok(plan) => plan,
                Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        iteration = state.research_iterations,
                        error = %e,
                        "Research planning failed; stopping with findings so far"
                    );
                    state.raw_notes.push(format!("Research planning failed: {}", e));
                    state.phase = SupervisorPhase::PlanningFailed(e.to_string());
                    break;
                }
            };

            self.ctx.observer.on_plan(
                state.research_iterations,
                plan.tasks.len(),
                plan.is_complete,
            );

            state.phase = if plan.is_complete {
                SupervisorPhase::Converged
            } else if state.research_iterations >= max_iterations {
                SupervisorPhase::BudgetExhausted
            } else if plan.tasks.is_empty() {
                SupervisorPhase::NoFurtherTasks
            } else {
                SupervisorPhase::Executing
            };

            if state.phase == SupervisorPhase::Executing {
                self.execute_round(&mut state, plan.tasks).await?;
            }
        }

        tracing::info!(
            phase = ?state.phase,
            iterations = state.research_iterations,
            findings = state.findings.len(),
            "Supervised research finished"
        );
        self.ctx
            .observer
            .on_supervisor_finished(&state.phase, state.research_iterations);

        Ok(state.into_outcome())
    }

    async fn plan(&self, state: &SupervisorState) -> Result<ResearchPlan> {
        let config = &self.ctx.config;
        let messages = vec![
            ConversationMessage::system(prompts::supervisor_system(
                config.max_concurrent_research,
                config.max_research_iterations,
            )),
            ConversationMessage::user(prompts::supervisor_plan(
                &state.research_brief,
                &state.findings,
                state.research_iterations,
            )),
        ];

        let plan: ResearchPlan = checkpoint(
            &self.ctx.cancel,
            generate_object(self.ctx.models.research.as_ref(), &messages),
        )
        .await?;

        Ok(plan.normalized())
    }

    async fn execute_round(&self, state: &mut SupervisorState, mut tasks: Vec<ResearchTask>) -> Result<()> {
        let max_concurrent = self.ctx.config.max_concurrent_research;
        let overflow = if tasks.len() > max_concurrent {
            tasks.split_off(max_concurrent)
        } else {
            Vec::new()
        };

        tracing::info!(
            iteration = state.research_iterations + 1,
            executing = tasks.len(),
            overflow = overflow.len(),
            "Dispatching research tasks"
        );
        self.ctx
            .observer
            .on_dispatch(state.research_iterations, tasks.len(), overflow.len());

        let outcomes = self.run_researchers(&tasks).await?;

        for outcome in outcomes {
            state.findings.push(outcome.finding);
            state.raw_notes.extend(outcome.raw_notes);
        }
        for task in &overflow {
            tracing::warn!(task = %task.id, "Research task exceeded concurrency limit");
            state
                .findings
                .push(overflow_message(&task.topic, max_concurrent));
        }

        state.tasks_planned += tasks.len() + overflow.len();
        state.tasks_executed += tasks.len();
        state.tasks_overflowed += overflow.len();
        state.research_iterations += 1;
        Ok(())
    }

    /// Run one researcher per task and wait for all of them.
    ///
    /// Outcomes are returned in task order. A researcher's error or panic is
    /// converted into its finding; siblings keep running.
    async fn run_researchers(&self, tasks: &[ResearchTask]) -> Result<Vec<WorkerOutcome>> {
        let mut set = JoinSet::new();
        for (index, task) in tasks.iter().enumerate() {
            let researcher = self.researcher.clone();
            let topic = task.topic.clone();
            set.spawn(async move {
                let result = AssertUnwindSafe(researcher.investigate(&topic))
                    .catch_unwind()
                    .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<WorkerOutcome>> = (0..tasks.len()).map(|_| None).collect();

        // Dropping the set on cancellation aborts every researcher still running.
        let joined = checkpoint(&self.ctx.cancel, async {
            let mut joined = Vec::with_capacity(tasks.len());
            while let Some(next) = set.join_next().await {
                joined.push(next);
            }
            Ok(joined)
        })
        .await?;

        for next in joined {
            let (index, result) = match next {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "Researcher task could not be joined");
                    continue;
                }
            };
            let topic = &tasks[index].topic;
            let outcome = match result {
                Ok(Ok(finding)) => finding_outcome(finding),
                Ok(Err(AppError::Cancelled)) => return Err(AppError::Cancelled),
                Ok(Err(e)) => {
                    tracing::warn!(topic = %topic, error = %e, "Researcher failed");
                    error_outcome(topic, &e.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(topic = %topic, panic = %message, "Researcher panicked");
                    error_outcome(topic, &format!("researcher panicked: {}", message))
                }
            };
            slots[index] = Some(outcome);
        }

        Ok(slots
            .into_iter()
            .zip(tasks)
            .map(|(slot, task)| {
                slot.unwrap_or_else(|| error_outcome(&task.topic, "researcher task was aborted"))
            })
            .collect())
    }
}

fn finding_outcome(finding: ResearchFinding) -> WorkerOutcome {
    WorkerOutcome {
        finding: finding.compressed,
        raw_notes: finding.raw_notes,
    }
}

fn error_outcome(topic: &str, error: &str) -> WorkerOutcome {
    WorkerOutcome {
        finding: worker_error_message(topic, error),
        raw_notes: Vec::new(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
