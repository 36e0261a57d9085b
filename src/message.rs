use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A structured directive emitted by the model requesting a local tool run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    pub arguments: Value,
}

/// The formatted outcome of a tool run, fed back into the next model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub output: Value,
    pub tool_call_id: Option<String>,
}

/// A single transcript entry. Immutable once appended to memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// A synthetic tool turn carrying the formatted result text.
    pub fn tool(name: impl Into<String>, output: Value, tool_call_id: Option<String>) -> Self {
        let name = name.into();
        let content = match &output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Self {
            role: Role::Tool,
            content,
            tool_call: None,
            tool_result: Some(ToolResult {
                name,
                output,
                tool_call_id,
            }),
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call: None,
            tool_result: None,
        }
    }
}
