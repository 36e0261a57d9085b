use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ParleyError, Result};
use crate::llm::{ChatRequest, LanguageModel};
use crate::memory::ConversationMemory;
use crate::message::{Message, Role, ToolCall};
use crate::settings::ChatSettings;
use crate::tool::ToolRegistry;

/// Upper bound on model↔tool round trips for a single user turn.
pub const DEFAULT_MAX_STEPS: usize = 15;

/// An agent that alternates between the model and registered tools.
///
/// Each user turn runs a bounded dispatch loop: invoke the model; if the
/// completion carries a tool call, run that one tool, feed its formatted
/// result back as a synthetic turn, and re-invoke. One tool is in flight
/// per step; there is no parallel fan-out. Exceeding the step budget ends
/// the turn with `ParleyError::StepLimit` instead of looping forever.
pub struct Agent<M: LanguageModel> {
    model: Arc<M>,
    system_prompt: String,
    tools: ToolRegistry,
    memory: ConversationMemory,
    settings: ChatSettings,
    max_steps: usize,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            system_prompt: "You are a helpful agent.".to_string(),
            tools: ToolRegistry::new(),
            memory: ConversationMemory::default(),
            settings: ChatSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    /// Run a single exchange. Returns the final assistant reply.
    pub async fn respond(&mut self, user_input: impl Into<String>) -> Result<String> {
        self.memory.push(Message::user(user_input));

        for step in 0..self.max_steps {
            let mut request_messages = vec![Message::system(&self.system_prompt)];
            request_messages.extend(self.memory.iter().cloned());
            let request = ChatRequest::from_settings(&self.settings, request_messages)
                .with_tools(self.tools.describe());

            let completion = self.model.complete(&request).await?;

            if let Some(call) = completion.tool_calls.into_iter().next() {
                debug!(step, tool = %call.name, "dispatching tool call");
                self.dispatch(call).await?;
                continue;
            }

            match completion.content {
                Some(content) => {
                    self.memory.push(Message::assistant(&content));
                    return Ok(content);
                }
                None => {
                    return Err(ParleyError::Protocol(
                        "model response carried neither content nor a tool call".into(),
                    ));
                }
            }
        }

        warn!(max_steps = self.max_steps, "dispatch loop hit the step limit");
        Err(ParleyError::StepLimit(self.max_steps))
    }

    /// Execute one tool call and append both the call and its result to the
    /// transcript. A name that matches no registered tool produces an
    /// explicit "unknown tool" result, and a tool failure produces a
    /// textual error result; either way the model sees what happened and
    /// the turn continues.
    async fn dispatch(&mut self, mut call: ToolCall) -> Result<()> {
        if call.id.is_none() {
            call.id = Some(format!("call-{}", self.memory.len()));
        }
        let call_id = call.id.clone();
        let name = call.name.clone();
        let arguments = call.arguments.clone();

        self.memory.push(Message {
            role: Role::Assistant,
            content: format!("Calling tool `{name}`"),
            tool_call: Some(call),
            tool_result: None,
        });

        let output = if !self.tools.contains(&name) {
            warn!(tool = %name, "model requested an unknown tool");
            Value::String(format!(
                "unknown tool `{name}`; available tools: {}",
                self.tools.names().join(", ")
            ))
        } else {
            match self.tools.call(&name, arguments).await {
                Ok(value) => value,
                Err(err) => {
                    info!(tool = %name, error = %err, "tool invocation failed");
                    Value::String(format!("tool `{name}` failed: {err}"))
                }
            }
        };

        self.memory.push(Message::tool(&name, output, call_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::llm::StubModel;
    use crate::tool::Tool;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the `text` field back"
        }

        async fn call(&self, input: Value) -> Result<Value> {
            Ok(input)
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        async fn call(&self, _input: Value) -> Result<Value> {
            Err(ParleyError::Protocol("synthetic breakage".into()))
        }
    }

    #[tokio::test]
    async fn returns_model_response_without_tools() {
        let model = StubModel::new(vec![r#"{"action":"respond","content":"Hello!"}"#.into()]);
        let mut agent = Agent::new(model);

        let reply = agent.respond("hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        assert_eq!(agent.memory().len(), 2);
    }

    #[tokio::test]
    async fn executes_tool_then_replies() {
        let model = StubModel::new(vec![
            r#"{"action":"call_tool","name":"echo","arguments":{"text":"ping"}}"#.into(),
            r#"{"action":"respond","content":"Echoed your request."}"#.into(),
        ]);
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);

        let mut agent = Agent::new(model).with_tools(tools);

        let reply = agent.respond("say ping").await.unwrap();

        assert_eq!(reply, "Echoed your request.");
        assert_eq!(agent.memory().len(), 4);
    }

    #[tokio::test]
    async fn unknown_tool_surfaces_as_a_result_not_a_crash() {
        let model = StubModel::new(vec![
            r#"{"action":"call_tool","name":"teleport","arguments":{}}"#.into(),
            r#"{"action":"respond","content":"I cannot do that."}"#.into(),
        ]);
        let mut agent = Agent::new(model);

        let reply = agent.respond("beam me up").await.unwrap();

        assert_eq!(reply, "I cannot do that.");
        let tool_turn = agent
            .memory()
            .iter()
            .find(|m| m.role == Role::Tool)
            .expect("tool result recorded");
        assert!(tool_turn.content.contains("unknown tool `teleport`"));
    }

    #[tokio::test]
    async fn tool_failure_is_fed_back_to_the_model() {
        let model = StubModel::new(vec![
            r#"{"action":"call_tool","name":"flaky","arguments":{}}"#.into(),
            r#"{"action":"respond","content":"The tool had a problem."}"#.into(),
        ]);
        let mut tools = ToolRegistry::new();
        tools.register(FailingTool);

        let mut agent = Agent::new(model).with_tools(tools);

        let reply = agent.respond("try the tool").await.unwrap();

        assert_eq!(reply, "The tool had a problem.");
        let tool_turn = agent
            .memory()
            .iter()
            .find(|m| m.role == Role::Tool)
            .expect("tool result recorded");
        assert!(tool_turn.content.contains("tool `flaky` failed"));
    }

    #[tokio::test]
    async fn step_budget_bounds_the_loop() {
        // Script more tool calls than the budget allows; the loop must stop
        // with a step-limit error instead of draining the script.
        let script: Vec<String> = (0..6)
            .map(|_| r#"{"action":"call_tool","name":"echo","arguments":{"text":"again"}}"#.into())
            .collect();
        let model = StubModel::new(script);
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);

        let mut agent = Agent::new(model).with_tools(tools).with_max_steps(4);

        let err = agent.respond("loop forever").await.unwrap_err();
        assert!(matches!(err, ParleyError::StepLimit(4)));
    }
}
