use crate::llm::ResearchModels;
use crate::research::config::ResearchConfig;
use crate::research::observer::{NoopObserver, ResearchObserver};
use crate::tools::ToolRegistry;
use crate::types::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Dependencies shared by the orchestrator, supervisor and researchers.
///
/// Cloning is cheap; every clone observes the same cancellation token.
#[derive(Clone)]
pub struct ResearchContext {
    pub config: Arc<ResearchConfig>,
    pub models: ResearchModels,
    pub tools: Arc<ToolRegistry>,
    /// Timeout for a single tool execution
    pub tool_timeout: Duration,
    pub observer: Arc<dyn ResearchObserver>,
    pub cancel: CancellationToken,
}

impl ResearchContext {
    /// Validate `config` and build a context with default timeout and no observer.
    pub fn new(config: ResearchConfig, models: ResearchModels, tools: Arc<ToolRegistry>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            models,
            tools,
            tool_timeout: Duration::from_secs(30),
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ResearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Tie the session to a caller-owned token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
