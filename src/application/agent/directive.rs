use super::errors::AgentError;
use serde_json::Value;

/// One parsed agent action: either a tool request or the final answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    CallTool { tool: String, input: Value },
    Final { response: String },
}

impl Directive {
    /// Parse a raw model reply into a directive. Models wrap the action
    /// object in prose or code fences often enough that this is lenient
    /// about where the JSON sits, but strict about its contents.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let value = lenient_json(content).ok_or_else(|| {
            AgentError::InvalidResponse("expected JSON action object in model reply".into())
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, AgentError> {
        match value {
            Value::Object(map) => {
                let action = map.get("action").and_then(Value::as_str).ok_or_else(|| {
                    AgentError::InvalidResponse("missing action field in model reply".into())
                })?;
                match action {
                    "call_tool" => {
                        let tool = map.get("tool").and_then(Value::as_str).ok_or_else(|| {
                            AgentError::InvalidResponse("call_tool action missing tool field".into())
                        })?;
                        Ok(Directive::CallTool {
                            tool: tool.to_string(),
                            input: map.get("input").cloned().unwrap_or(Value::Null),
                        })
                    }
                    "final" => {
                        let response =
                            map.get("response").and_then(Value::as_str).ok_or_else(|| {
                                AgentError::InvalidResponse(
                                    "final action missing response field".into(),
                                )
                            })?;
                        Ok(Directive::Final {
                            response: response.to_string(),
                        })
                    }
                    other => Err(AgentError::InvalidResponse(format!(
                        "unknown action value: {other}"
                    ))),
                }
            }
            Value::String(text) => Self::parse(&text),
            other => Err(AgentError::InvalidResponse(format!(
                "unsupported action payload: {other}"
            ))),
        }
    }
}

/// Best-effort location of the action object: whole reply, fenced block,
/// or first-to-last brace span, in that order.
fn lenient_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            if let Ok(value) = serde_json::from_str::<Value>(stripped[..end].trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    None
}
