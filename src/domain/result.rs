use serde_json::{Map, Value};

/// Shape of a query answer, decided once when the pipeline hands the
/// answer to the renderer. Downstream code matches on this instead of
/// re-inspecting `Value` at every step.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Free-form text that did not parse as JSON.
    Text(String),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// A JSON scalar (string, number, bool, null).
    Scalar(Value),
}

impl QueryResult {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) => QueryResult::Object(map),
            Value::Array(items) => QueryResult::Array(items),
            other => QueryResult::Scalar(other),
        }
    }

    /// Classify an answer given as raw text: a successful whole-text JSON
    /// parse wins, otherwise the text is kept verbatim.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::classify(value),
            Err(_) => QueryResult::Text(text),
        }
    }

    /// Raw view of the input, used as the degraded fallback display.
    pub fn raw(&self) -> String {
        match self {
            QueryResult::Text(text) => text.clone(),
            QueryResult::Object(map) => {
                serde_json::to_string_pretty(&Value::Object(map.clone())).unwrap_or_default()
            }
            QueryResult::Array(items) => {
                serde_json::to_string_pretty(&Value::Array(items.clone())).unwrap_or_default()
            }
            QueryResult::Scalar(value) => match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        }
    }
}
