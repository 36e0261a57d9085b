//! Language model abstraction and the gateway client.
//!
//! `LanguageModel` exposes two invocation shapes: `complete` returns one
//! finished completion (which may carry tool-call directives), and
//! `stream` returns a finite, single-pass, pull-based sequence of text
//! fragments. Dropping the stream cancels the turn; nothing is retried
//! automatically on failure.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::error::{ParleyError, Result};
use crate::message::{Message, Role, ToolCall};
use crate::settings::{ChatSettings, ModelId, ReasoningLevel, Temperature};
use crate::tool::ToolDescription;

/// Per-call timeout on the gateway; expiry surfaces as `ServiceUnavailable`.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One request to the inference endpoint.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: ModelId,
    pub messages: Vec<Message>,
    pub temperature: Temperature,
    pub reasoning: ReasoningLevel,
    pub max_tokens: Option<u32>,
    pub tools: Vec<ToolDescription>,
}

impl ChatRequest {
    pub fn from_settings(settings: &ChatSettings, messages: Vec<Message>) -> Self {
        Self {
            model: settings.model,
            messages,
            temperature: settings.temperature,
            reasoning: settings.reasoning,
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescription>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Result of a completed (non-streaming) request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// A finite, single-pass stream of response text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ModelCompletion>;

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream>;
}

fn coalesce_error(status: reqwest::StatusCode, body: &str) -> ParleyError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ParleyError::Authentication(format!("gateway rejected the API key: {body}"));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return ParleyError::RateLimited(format!("gateway throttled the request: {body}"));
    }
    if status.is_server_error() {
        return ParleyError::ServiceUnavailable(format!(
            "gateway returned {status}: {body}"
        ));
    }
    ParleyError::Protocol(format!("gateway request failed with {status}: {body}"))
}

fn transport_error(err: reqwest::Error) -> ParleyError {
    if err.is_timeout() {
        ParleyError::ServiceUnavailable(format!("gateway request timed out: {err}"))
    } else {
        ParleyError::ServiceUnavailable(format!("gateway unreachable: {err}"))
    }
}

fn serialize_tool_arguments(args: &Value) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| args.to_string())
}

/// Client for the hosted inference gateway (OpenAI-compatible chat API).
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .map_err(|err| ParleyError::Protocol(format!("http client error: {err}")))?,
            api_key: api_key.into(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ParleyError::Authentication("no gateway API key configured".into())
        })?;
        let mut client = Self::new(api_key)?;
        if let Some(base_url) = &cfg.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(client)
    }

    fn payload(&self, request: &ChatRequest, stream: bool) -> Value {
        let mut body = json!({
            "model": request.model.wire_id(),
            "messages": wire_messages(&request.messages),
            "temperature": request.temperature.as_f32(),
            "reasoning_effort": request.reasoning.as_str(),
            "stream": stream,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_completion_tokens"] = json!(max_tokens);
        }
        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters.clone()
                                .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }
        body
    }

    async fn send(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.payload(request, stream))
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body));
        }
        Ok(resp)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ModelCompletion> {
        let resp = self.send(request, false).await?;

        let body: GroqResponse = resp
            .json()
            .await
            .map_err(|err| ParleyError::Protocol(format!("gateway response parse error: {err}")))?;

        let first = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::Protocol("gateway returned no choices".into()))?;

        let mut tool_calls = Vec::new();
        if let Some(calls) = first.message.tool_calls {
            for call in calls {
                let args: Value = serde_json::from_str(&call.function.arguments).map_err(|err| {
                    ParleyError::ToolCall(format!(
                        "tool `{}` arguments `{}` are not valid JSON: {err}",
                        call.function.name, call.function.arguments
                    ))
                })?;
                tool_calls.push(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: args,
                });
            }
        }

        Ok(ModelCompletion {
            content: first.message.content,
            tool_calls,
        })
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream> {
        let resp = self.send(request, true).await?;
        let body = resp.bytes_stream().boxed();

        let state = (body, String::new(), VecDeque::new(), false);
        let fragments =
            futures::stream::unfold(state, |(mut body, mut carry, mut pending, mut done)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (body, carry, pending, done)));
                    }
                    if done {
                        return None;
                    }
                    match body.next().await {
                        Some(Ok(chunk)) => {
                            carry.push_str(&String::from_utf8_lossy(chunk.as_ref()));
                            drain_sse_lines(&mut carry, &mut pending, &mut done);
                        }
                        Some(Err(err)) => {
                            done = true;
                            pending.push_back(Err(transport_error(err)));
                        }
                        None => done = true,
                    }
                }
            });

        Ok(Box::pin(fragments))
    }
}

/// Split buffered SSE bytes into complete `data:` lines and queue the text
/// deltas they carry. Partial lines stay in `carry` until the next chunk.
fn drain_sse_lines(
    carry: &mut String,
    pending: &mut VecDeque<Result<String>>,
    done: &mut bool,
) {
    while let Some(pos) = carry.find('\n') {
        let line: String = carry.drain(..=pos).collect();
        let line = line.trim();
        let Some(data) = line.strip_prefix("data: ") else {
            continue;
        };
        let data = data.trim();
        if data.is_empty() {
            continue;
        }
        if data == "[DONE]" {
            *done = true;
            continue;
        }
        match serde_json::from_str::<GroqStreamChunk>(data) {
            Ok(parsed) => {
                for choice in parsed.choices {
                    if let Some(text) = choice.delta.content {
                        if !text.is_empty() {
                            pending.push_back(Ok(text));
                        }
                    }
                }
            }
            Err(err) => {
                *done = true;
                pending.push_back(Err(ParleyError::Protocol(format!(
                    "gateway stream parse error `{data}`: {err}"
                ))));
            }
        }
    }
}

fn wire_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            };

            let mut msg = json!({
                "role": role,
                "content": m.content.clone(),
            });

            if m.role == Role::Tool {
                if let Some(result) = &m.tool_result {
                    if let Some(call_id) = &result.tool_call_id {
                        msg["tool_call_id"] = json!(call_id);
                    }
                }
            }

            if m.role == Role::Assistant {
                if let Some(call) = &m.tool_call {
                    msg["tool_calls"] = json!([{
                        "id": call.id.clone().unwrap_or_default(),
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": serialize_tool_arguments(&call.arguments),
                        }
                    }]);
                    msg["content"] = json!(null);
                }
            }

            msg
        })
        .collect()
}

/// A deterministic model used for tests and demos.
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }

    fn next_directive(&self) -> Result<StubDirective> {
        let mut locked = self.responses.lock().expect("stub model poisoned");
        let raw = locked.pop_front().ok_or_else(|| {
            ParleyError::Protocol("StubModel ran out of scripted responses".into())
        })?;
        Ok(serde_json::from_str::<StubDirective>(&raw)
            .unwrap_or(StubDirective::Respond { content: raw }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StubDirective {
    Respond { content: String },
    CallTool { name: String, arguments: Value },
    Stream { fragments: Vec<String> },
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, _request: &ChatRequest) -> Result<ModelCompletion> {
        match self.next_directive()? {
            StubDirective::Respond { content } => Ok(ModelCompletion {
                content: Some(content),
                tool_calls: Vec::new(),
            }),
            StubDirective::CallTool { name, arguments } => Ok(ModelCompletion {
                content: None,
                tool_calls: vec![ToolCall {
                    id: None,
                    name,
                    arguments,
                }],
            }),
            StubDirective::Stream { fragments } => Ok(ModelCompletion {
                content: Some(fragments.concat()),
                tool_calls: Vec::new(),
            }),
        }
    }

    async fn stream(&self, _request: &ChatRequest) -> Result<TextStream> {
        let fragments = match self.next_directive()? {
            StubDirective::Stream { fragments } => fragments,
            StubDirective::Respond { content } => vec![content],
            StubDirective::CallTool { name, .. } => {
                return Err(ParleyError::Protocol(format!(
                    "scripted tool call `{name}` cannot be streamed as text"
                )));
            }
        };
        let items: Vec<Result<String>> = fragments.into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::from_settings(&ChatSettings::default(), vec![Message::user("hi")])
    }

    #[tokio::test]
    async fn stub_replays_directives_in_order() {
        let model = StubModel::new(vec![
            r#"{"action":"call_tool","name":"echo","arguments":{"text":"ping"}}"#.into(),
            r#"{"action":"respond","content":"done"}"#.into(),
        ]);

        let first = model.complete(&request()).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "echo");
        assert!(first.content.is_none());

        let second = model.complete(&request()).await.unwrap();
        assert_eq!(second.content.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn stub_streams_fragments_in_order() {
        let model = StubModel::new(vec![
            r#"{"action":"stream","fragments":["Hello"," world"]}"#.into(),
        ]);

        let mut stream = model.stream(&request()).await.unwrap();
        let mut collected = Vec::new();
        while let Some(fragment) = stream.next().await {
            collected.push(fragment.unwrap());
        }
        assert_eq!(collected, vec!["Hello".to_string(), " world".to_string()]);
    }

    #[test]
    fn status_codes_map_to_the_error_taxonomy() {
        assert!(matches!(
            coalesce_error(reqwest::StatusCode::UNAUTHORIZED, "bad key"),
            ParleyError::Authentication(_)
        ));
        assert!(matches!(
            coalesce_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ParleyError::RateLimited(_)
        ));
        assert!(matches!(
            coalesce_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "down"),
            ParleyError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            coalesce_error(reqwest::StatusCode::BAD_REQUEST, "nope"),
            ParleyError::Protocol(_)
        ));
    }

    #[test]
    fn sse_lines_survive_chunk_boundaries() {
        let mut carry = String::new();
        let mut pending = VecDeque::new();
        let mut done = false;

        carry.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"Hel");
        drain_sse_lines(&mut carry, &mut pending, &mut done);
        assert!(pending.is_empty());

        carry.push_str("lo\"}}]}\n\ndata: [DONE]\n");
        drain_sse_lines(&mut carry, &mut pending, &mut done);
        assert_eq!(pending.pop_front().unwrap().unwrap(), "Hello");
        assert!(done);
    }

    #[test]
    fn assistant_tool_call_is_reencoded_on_the_wire() {
        let mut message = Message::assistant("Calling tool `echo`");
        message.tool_call = Some(ToolCall {
            id: Some("call-1".into()),
            name: "echo".into(),
            arguments: json!({"text": "ping"}),
        });
        let wire = wire_messages(&[message]);
        assert_eq!(wire[0]["tool_calls"][0]["function"]["name"], "echo");
        assert!(wire[0]["content"].is_null());
    }
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct GroqChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<GroqToolCall>>,
}

#[derive(Debug, Deserialize)]
struct GroqToolCall {
    #[serde(default)]
    id: Option<String>,
    function: GroqFunctionCall,
}

#[derive(Debug, Deserialize)]
struct GroqFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct GroqStreamChunk {
    choices: Vec<GroqDeltaChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqDeltaChoice {
    delta: GroqDelta,
}

#[derive(Debug, Deserialize)]
struct GroqDelta {
    #[serde(default)]
    content: Option<String>,
}
