//! Progress hooks for budgeting and monitoring collaborators.
//!
//! Observers only watch. To stop a session, cancel its token.

use crate::research::state::SupervisorPhase;

pub trait ResearchObserver: Send + Sync {
    /// A plan was produced for supervisor iteration `iteration` (0-based).
    fn on_plan(&self, _iteration: usize, _task_count: usize, _is_complete: bool) {}

    /// Researchers are about to start for this iteration.
    fn on_dispatch(&self, _iteration: usize, _executed: usize, _overflowed: usize) {}

    /// A researcher finished tool round `round` (1-based) for `topic`.
    fn on_tool_round(&self, _topic: &str, _round: usize, _calls: usize) {}

    /// The supervisor loop stopped.
    fn on_supervisor_finished(&self, _phase: &SupervisorPhase, _iterations: usize) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResearchObserver for NoopObserver {}
