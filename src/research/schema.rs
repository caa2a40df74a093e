//! Structured outputs requested from the model.
//!
//! Field doc comments become JSON-schema descriptions the model sees.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Decision on whether the request needs a clarifying question.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClarifyWithUser {
    /// Whether the user needs to be asked a clarifying question.
    pub need_clarification: bool,
    /// A question to ask the user to clarify the report scope.
    #[serde(default)]
    pub question: String,
    /// Message confirming research will start, used when no clarification is needed.
    #[serde(default)]
    pub verification: String,
}

/// Research brief distilled from the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResearchQuestion {
    /// A research question that will be used to guide the research.
    pub research_brief: String,
}

/// One supervisor iteration's decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResearchPlan {
    /// True when the existing findings fully answer the brief and no more research is needed.
    pub is_complete: bool,
    /// Research tasks to run next. Must be empty when is_complete is true.
    #[serde(default)]
    pub tasks: Vec<ResearchTask>,
}

/// A topic handed to a single researcher.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResearchTask {
    /// Short unique identifier for this task within the plan.
    #[serde(default)]
    pub id: String,
    /// Self-contained description of what to research, with full context.
    pub topic: String,
    /// Urgency hint, lower is more urgent. Advisory only: plan order decides
    /// which tasks run when the plan exceeds the concurrency limit.
    #[serde(default)]
    pub priority: i32,
}

impl ResearchTask {
    pub fn new(id: impl Into<String>, topic: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            priority,
        }
    }
}

impl ResearchPlan {
    pub fn complete() -> Self {
        Self {
            is_complete: true,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(tasks: Vec<ResearchTask>) -> Self {
        Self {
            is_complete: false,
            tasks,
        }
    }

    /// Enforce plan invariants on model output.
    ///
    /// A complete plan carries no tasks. Blank topics are dropped and missing or
    /// duplicate ids are reassigned. Task order is left as planned.
    pub fn normalized(mut self) -> Self {
        if self.is_complete {
            if !self.tasks.is_empty() {
                tracing::debug!(
                    discarded = self.tasks.len(),
                    "Plan marked complete; discarding its tasks"
                );
            }
            self.tasks.clear();
            return self;
        }

        self.tasks.retain(|task| !task.topic.trim().is_empty());

        let mut taken = HashSet::new();
        let keep: Vec<bool> = self
            .tasks
            .iter()
            .map(|task| !task.id.trim().is_empty() && taken.insert(task.id.clone()))
            .collect();

        for (index, task) in self.tasks.iter_mut().enumerate() {
            if keep[index] {
                continue;
            }
            let base = format!("task-{}", index + 1);
            let mut candidate = base.clone();
            let mut suffix = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            taken.insert(candidate.clone());
            task.id = candidate;
        }

        self
    }
}
