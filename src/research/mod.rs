//! Multi-Agent Research Orchestration
//!
//! Turns one research request into a cited report using three nested
//! components:
//!
//! - [`orchestrator::ResearchOrchestrator`] - clarify, brief, supervise, report
//! - [`supervisor::Supervisor`] - plans tasks and fans them out with a concurrency cap
//! - [`researcher::Researcher`] - tool-calling loop and verbatim compression for one topic
//!
//! # Usage
//!
//! ```ignore
//! use ares_research::research::{ResearchConfig, ResearchContext, ResearchOrchestrator};
//! use ares_research::{ResearchModels, ToolRegistry};
//! use std::sync::Arc;
//!
//! let ctx = ResearchContext::new(
//!     ResearchConfig::default(),
//!     ResearchModels::uniform(client),
//!     Arc::new(ToolRegistry::with_default_tools()),
//! )?;
//!
//! let report = ResearchOrchestrator::new(ctx)
//!     .conduct_research("How do European heat pump subsidies compare?")
//!     .await?;
//! println!("{}", report);
//! ```
//!
//! # Research Workflow
//!
//! 1. **Clarify** - Optionally ask one question when the request is ambiguous
//! 2. **Brief** - Restate the request as a specific, first-person brief
//! 3. **Supervise** - Plan tasks, run researchers in parallel, merge findings
//! 4. **Compress** - Each researcher cleans its raw tool output without paraphrasing
//! 5. **Report** - Synthesize findings with sequential `[n]` citations and Sources
//!
//! # Failure isolation
//!
//! Tool failures become tool results, researcher failures become findings and
//! overflow tasks become explicit error findings. Only clarification, brief
//! and report failures (or cancellation) surface as errors.

/// Citation extraction and Sources section handling.
pub mod citations;
/// Session limits and model selection.
pub mod config;
/// Shared dependencies for one research session.
pub mod context;
/// End-to-end phase sequencing.
pub mod orchestrator;
/// Progress hooks.
pub mod observer;
/// Prompt templates.
pub mod prompts;
/// Tool-calling researcher.
pub mod researcher;
/// Structured model outputs.
pub mod schema;
/// Session, researcher and supervisor state.
pub mod state;
/// Planning and fan-out.
pub mod supervisor;

mod cancel;

pub use config::{ModelSelection, ResearchConfig};
pub use context::ResearchContext;
pub use observer::{NoopObserver, ResearchObserver};
pub use orchestrator::{ResearchOrchestrator, ResearchOutcome, ResearchReport, ResearchStats};
pub use researcher::{ResearchFinding, Researcher};
pub use schema::{ResearchPlan, ResearchTask};
pub use state::{ResearchSession, SessionCompletion, SupervisorOutcome, SupervisorPhase};
pub use supervisor::Supervisor;
