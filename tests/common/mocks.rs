//! Mock implementations for testing.
//!
//! Scripted LLM clients and simple tools shared by the integration tests.

use ares_research::llm::{LLMClient, LLMResponse, OutputSchema};
use ares_research::research::{ResearchConfig, ResearchContext};
use ares_research::tools::Tool;
use ares_research::types::{AppError, ConversationMessage, MessageRole, Result, ToolCall, ToolDefinition};
use ares_research::{ResearchModels, ToolRegistry};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type ToolScript = dyn Fn(&str, usize) -> Result<LLMResponse> + Send + Sync;
type TextScript = dyn Fn(&str, &str) -> Result<String> + Send + Sync;

/// Mock LLM client driven by per-schema queues and closures.
///
/// - Structured calls pop from the queue named after the schema; the last
///   entry repeats once the queue is down to one.
/// - Tool-calling turns are answered by a closure of `(topic, round)`, where
///   `round` counts the tool rounds already in the transcript.
/// - Free-text calls are answered by a closure of `(system, prompt)`.
pub struct ScriptedLLMClient {
    structured: Mutex<HashMap<String, VecDeque<std::result::Result<Value, String>>>>,
    tool_script: Box<ToolScript>,
    text_script: Box<TextScript>,
    tool_delay: Duration,
    structured_calls: Mutex<HashMap<String, usize>>,
    tool_turns: AtomicUsize,
    text_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLLMClient {
    /// A client whose researchers finish immediately and whose text calls echo a marker.
    pub fn new() -> Self {
        Self {
            structured: Mutex::new(HashMap::new()),
            tool_script: Box::new(|_, _| Ok(LLMResponse::default())),
            text_script: Box::new(|_, _| Ok("mock text".to_string())),
            tool_delay: Duration::ZERO,
            structured_calls: Mutex::new(HashMap::new()),
            tool_turns: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a structured response for schema `name`.
    pub fn push_structured(self, name: &str, value: Value) -> Self {
        self.structured
            .lock()
            .entry(name.to_string())
            .or_default()
            .push_back(Ok(value));
        self
    }

    /// Queue a structured failure for schema `name`.
    pub fn push_structured_error(self, name: &str, message: &str) -> Self {
        self.structured
            .lock()
            .entry(name.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn with_tool_script<F>(mut self, script: F) -> Self
    where
        F: Fn(&str, usize) -> Result<LLMResponse> + Send + Sync + 'static,
    {
        self.tool_script = Box::new(script);
        self
    }

    pub fn with_text_script<F>(mut self, script: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String> + Send + Sync + 'static,
    {
        self.text_script = Box::new(script);
        self
    }

    /// Sleep inside every tool-calling turn so concurrent researchers overlap.
    pub fn with_tool_delay(mut self, delay: Duration) -> Self {
        self.tool_delay = delay;
        self
    }

    pub fn structured_calls(&self, name: &str) -> usize {
        self.structured_calls.lock().get(name).copied().unwrap_or(0)
    }

    pub fn tool_turns(&self) -> usize {
        self.tool_turns.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    /// Most tool-calling turns observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every user prompt sent to structured or text calls, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl Default for ScriptedLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        (self.text_script)(system, prompt)
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        _tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        self.tool_turns.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.tool_delay.is_zero() {
            tokio::time::sleep(self.tool_delay).await;
        }

        let topic = messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let round = messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant && !m.tool_calls.is_empty())
            .count();

        let response = (self.tool_script)(&topic, round);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    async fn generate_structured(
        &self,
        messages: &[ConversationMessage],
        schema: &OutputSchema,
    ) -> Result<Value> {
        *self
            .structured_calls
            .lock()
            .entry(schema.name.clone())
            .or_insert(0) += 1;
        if let Some(last) = messages.last() {
            self.prompts.lock().push(last.content.clone());
        }

        let mut queues = self.structured.lock();
        let queue = queues
            .get_mut(&schema.name)
            .ok_or_else(|| AppError::LLM(format!("No scripted response for {}", schema.name)))?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(AppError::LLM(message)),
            None => Err(AppError::LLM(format!("Script for {} is empty", schema.name))),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// A tool call with a fixed id.
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

/// A model turn requesting `calls`.
pub fn calls(calls: Vec<ToolCall>) -> LLMResponse {
    LLMResponse {
        content: String::new(),
        finish_reason: if calls.is_empty() { "stop" } else { "tool_calls" }.to_string(),
        tool_calls: calls,
    }
}

/// Search tool returning canned, URL-bearing results per query.
pub struct CannedSearchTool {
    pub executions: AtomicUsize,
}

impl CannedSearchTool {
    pub fn new() -> Self {
        Self {
            executions: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Tool for CannedSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Canned web search"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let query = args["query"].as_str().unwrap_or("unknown").to_string();
        let slug: String = query
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        Ok(json!(format!(
            "--- SOURCE 1: {} ---\nURL: https://search.example/{}\n\nSUMMARY:\nFacts about {}.",
            query, slug, query
        )))
    }
}

/// Tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky_api"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Err(AppError::Tool("upstream returned 502".to_string()))
    }
}

/// Tool that never finishes on its own.
pub struct HangingTool;

#[async_trait]
impl Tool for HangingTool {
    fn name(&self) -> &str {
        "slow_api"
    }

    fn description(&self) -> &str {
        "Never returns"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        futures::future::pending::<()>().await;
        Ok(json!("unreachable"))
    }
}

/// Registry with the research tools plus `extra`.
pub fn registry_with(extra: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::with_research_tools();
    for tool in extra {
        registry.register(tool);
    }
    Arc::new(registry)
}

/// Context using `client` for every role.
pub fn context(
    client: Arc<ScriptedLLMClient>,
    config: ResearchConfig,
    tools: Arc<ToolRegistry>,
) -> ResearchContext {
    ResearchContext::new(config, ResearchModels::uniform(client), tools).expect("valid config")
}
