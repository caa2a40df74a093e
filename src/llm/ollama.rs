use crate::llm::client::{ClientSettings, LLMClient, LLMResponse, OutputSchema};
use crate::types::{AppError, ConversationMessage, MessageRole, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Ollama client speaking the `/api/chat` endpoint directly.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: usize,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, settings: &ClientSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_retries: settings.max_retries,
            temperature: settings.temperature,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn request_body(&self, messages: &[ConversationMessage]) -> Value {
        json!({
            "model": self.model,
            "messages": messages.iter().map(to_ollama_message).collect::<Vec<_>>(),
            "stream": false,
            "options": {
                "temperature": self.temperature
            }
        })
    }

    /// POST a chat request, retrying transport failures and 5xx responses.
    async fn send_chat(&self, body: &Value) -> Result<Value> {
        let url = self.chat_url();
        let mut attempt = 0;

        loop {
            let outcome = match self.http_client.post(&url).json(body).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<Value>()
                        .await
                        .map_err(|e| AppError::LLM(format!("Failed to parse response: {}", e)));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let error = format!("Ollama request failed ({}): {}", status, text);
                    if !status.is_server_error() {
                        return Err(AppError::LLM(error));
                    }
                    error
                }
                Err(e) => format!("HTTP request failed: {}", e),
            };

            if attempt >= self.max_retries {
                return Err(AppError::LLM(outcome));
            }

            let backoff = Duration::from_millis(250 * (1u64 << attempt.min(6)));
            tracing::warn!(
                model = %self.model,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                "{}; retrying in {:?}",
                outcome,
                backoff
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn chat(&self, messages: &[ConversationMessage]) -> Result<String> {
        let response = self.send_chat(&self.request_body(messages)).await?;
        Ok(parse_ollama_response(&response)?.content)
    }
}

fn to_ollama_message(message: &ConversationMessage) -> Value {
    match message.role {
        MessageRole::Assistant if !message.tool_calls.is_empty() => {
            let tool_calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|tc| {
                    json!({
                        "function": {
                            "name": tc.name,
                            "arguments": tc.arguments
                        }
                    })
                })
                .collect();
            json!({
                "role": "assistant",
                "content": message.content,
                "tool_calls": tool_calls
            })
        }
        role => json!({
            "role": role.as_str(),
            "content": message.content
        }),
    }
}

fn to_ollama_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters
        }
    })
}

/// Parse Ollama response JSON
fn parse_ollama_response(json: &Value) -> Result<LLMResponse> {
    let message = json
        .get("message")
        .ok_or_else(|| AppError::LLM("No message in response".into()))?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut tool_calls = Vec::new();
    let mut finish_reason = "stop".to_string();

    if let Some(tc_array) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for tc in tc_array {
            if let Some(func) = tc.get("function") {
                let name = func
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let arguments = func.get("arguments").cloned().unwrap_or(json!({}));
                // Ollama does not assign call ids
                let id = tc
                    .get("id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

                tool_calls.push(ToolCall { id, name, arguments });
            }
        }
        if !tool_calls.is_empty() {
            finish_reason = "tool_calls".to_string();
        }
    }

    if tool_calls.is_empty() {
        if let Some(reason) = json.get("done_reason").and_then(|v| v.as_str()) {
            finish_reason = reason.to_string();
        }
    }

    Ok(LLMResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(&[ConversationMessage::user(prompt)]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(&[
            ConversationMessage::system(system),
            ConversationMessage::user(prompt),
        ])
        .await
    }

    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let mut body = self.request_body(messages);
        body["tools"] = Value::Array(tools.iter().map(to_ollama_tool).collect());

        let response = self.send_chat(&body).await?;
        parse_ollama_response(&response)
    }

    async fn generate_structured(
        &self,
        messages: &[ConversationMessage],
        schema: &OutputSchema,
    ) -> Result<Value> {
        let mut body = self.request_body(messages);
        body["format"] = schema.schema.clone();

        let response = self.send_chat(&body).await?;
        let content = parse_ollama_response(&response)?.content;

        serde_json::from_str(content.trim()).map_err(|e| {
            AppError::LLM(format!(
                "Model returned invalid JSON for schema '{}': {}",
                schema.name, e
            ))
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
