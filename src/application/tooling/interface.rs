use super::error::ToolSessionError;
use super::session::ToolDescriptor;
use async_trait::async_trait;
use serde_json::Value;

/// What the agent needs from a tool connection. `ToolSession` is the real
/// implementation; tests substitute recording fakes.
#[async_trait]
pub trait ToolInterface: Send + Sync {
    async fn tools(&self) -> Vec<ToolDescriptor>;

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolSessionError>;
}
