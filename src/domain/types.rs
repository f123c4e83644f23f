use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single content block inside a message. Only `Text` blocks carry
/// extractable text; everything else is opaque to the answer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentItem {
    Text { text: String },
    ToolUse { tool: String, input: Value },
    ToolOutput { output: Value },
    Other(Value),
}

impl ContentItem {
    pub fn text(content: impl Into<String>) -> Self {
        ContentItem::Text {
            text: content.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentItem>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentItem>) -> Self {
        Self { role, content }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentItem::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentItem::text(text)])
    }

    pub fn tool_output(output: Value) -> Self {
        Self::new(Role::Tool, vec![ContentItem::ToolOutput { output }])
    }
}

/// Full agent transcript, oldest message first.
pub type Conversation = Vec<Message>;
