use super::directive::Directive;
use super::errors::AgentError;
use crate::application::tooling::{ToolDescriptor, ToolInterface};
use crate::domain::types::{ContentItem, Conversation, Message, Role};
use crate::infrastructure::model::{ModelProvider, ModelRequest, ModelTurn, TurnRole};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_MAX_STEPS: usize = 8;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
}

impl AgentOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Turn loop over a model provider and a tool connection. The loop records
/// every exchange into a transcript and returns the whole thing; answer
/// extraction is the caller's concern.
pub struct Agent<P: ModelProvider> {
    provider: Arc<P>,
    options: AgentOptions,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: Arc<P>, options: AgentOptions) -> Self {
        Self { provider, options }
    }

    pub async fn run<T>(&self, query: String, tools: &T) -> Result<Conversation, AgentError>
    where
        T: ToolInterface + ?Sized,
    {
        let catalogue = tools.tools().await;
        info!(tools = catalogue.len(), "agent run started");

        let system = self.compose_system_prompt(&catalogue);
        let mut conversation: Conversation = vec![Message::user(query)];
        let mut remaining_steps = self.options.max_steps;

        loop {
            let request = ModelRequest {
                model: self.options.model.clone(),
                turns: flatten(&system, &conversation),
            };
            let reply = self.provider.chat(request).await?;

            match Directive::parse(&reply)? {
                Directive::Final { response } => {
                    info!("agent returned final response");
                    conversation.push(Message::assistant(response));
                    return Ok(conversation);
                }
                Directive::CallTool { tool, input } => {
                    if remaining_steps == 0 {
                        warn!("agent exceeded max tool interactions");
                        return Err(AgentError::StepLimit(self.options.max_steps));
                    }
                    remaining_steps -= 1;
                    info!(tool = %tool, "agent requested tool execution");

                    conversation.push(Message::new(
                        Role::Assistant,
                        vec![
                            ContentItem::text(reply.clone()),
                            ContentItem::ToolUse {
                                tool: tool.clone(),
                                input: input.clone(),
                            },
                        ],
                    ));

                    let output = match tools.call_tool(&tool, input).await {
                        Ok(value) => json!({ "tool": tool, "success": true, "output": value }),
                        Err(err) => {
                            debug!(tool = %tool, %err, "tool call failed; reporting to model");
                            json!({ "tool": tool, "success": false, "error": err.to_string() })
                        }
                    };
                    conversation.push(Message::tool_output(output));
                }
            }
        }
    }

    fn compose_system_prompt(&self, tools: &[ToolDescriptor]) -> String {
        let mut prompt = String::from(
            "You answer questions about application logs. You may call the listed tools to \
             inspect log groups and events.\n\n",
        );

        if tools.is_empty() {
            prompt.push_str("No tools are currently available; answer from the question alone.\n");
        } else {
            prompt.push_str("Available tools:\n");
            for tool in tools {
                let description = tool.description.as_deref().unwrap_or("No description.");
                prompt.push_str(&format!("- {}: {}\n", tool.name, description));
            }
        }

        prompt.push_str(
            "\nReply with exactly one JSON object per turn. To call a tool:\n\
             {\"action\": \"call_tool\", \"tool\": \"<name>\", \"input\": { ... }}\n\
             To finish:\n\
             {\"action\": \"final\", \"response\": \"<answer>\"}\n\
             When the answer contains structured records, embed them in the response inside \
             a ```json fenced block.",
        );

        if let Some(custom) = &self.options.system_prompt {
            if !custom.trim().is_empty() {
                prompt.push_str("\n\n");
                prompt.push_str(custom.trim());
            }
        }

        prompt
    }
}

/// Project the rich transcript onto the flat turn list providers accept.
fn flatten(system: &str, conversation: &[Message]) -> Vec<ModelTurn> {
    let mut turns = Vec::with_capacity(conversation.len() + 1);
    turns.push(ModelTurn::new(TurnRole::System, system));
    for message in conversation {
        let role = match message.role {
            Role::User => TurnRole::User,
            Role::Assistant => TurnRole::Assistant,
            Role::Tool => TurnRole::Tool,
        };
        let content = match message.role {
            Role::Tool => message
                .content
                .iter()
                .filter_map(|item| match item {
                    ContentItem::ToolOutput { output } => Some(output.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            _ => message
                .content
                .iter()
                .filter_map(|item| item.as_text())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        turns.push(ModelTurn::new(role, content));
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tooling::ToolSessionError;
    use crate::infrastructure::model::ModelError;
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Mutex;

    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn chat(&self, _request: ModelRequest) -> Result<String, ModelError> {
            self.replies
                .lock()
                .await
                .pop()
                .ok_or_else(|| ModelError::InvalidResponse("script exhausted".into()))
        }
    }

    #[derive(Default)]
    struct RecordingTools {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ToolInterface for RecordingTools {
        async fn tools(&self) -> Vec<ToolDescriptor> {
            vec![ToolDescriptor {
                name: "describe_log_groups".into(),
                description: Some("List log groups".into()),
                input_schema: None,
            }]
        }

        async fn call_tool(
            &self,
            tool: &str,
            arguments: Value,
        ) -> Result<Value, ToolSessionError> {
            self.calls
                .lock()
                .await
                .push((tool.to_string(), arguments));
            Ok(json!({"logGroups": [{"logGroupName": "g1"}]}))
        }
    }

    #[tokio::test]
    async fn tool_turn_then_final_builds_full_transcript() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"{"action": "call_tool", "tool": "describe_log_groups", "input": {}}"#,
            r#"{"action": "final", "response": "found one group"}"#,
        ]));
        let tools = RecordingTools::default();
        let agent = Agent::new(provider, AgentOptions::new("llama3"));

        let conversation = agent
            .run("what groups exist?".into(), &tools)
            .await
            .expect("agent run succeeds");

        // user, assistant tool turn, tool output, assistant final
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation[0].role, Role::User);
        assert_eq!(conversation[1].role, Role::Assistant);
        assert_eq!(conversation[2].role, Role::Tool);
        assert_eq!(conversation[3].role, Role::Assistant);
        assert_eq!(
            conversation[3].content[0].as_text(),
            Some("found one group")
        );

        let calls = tools.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "describe_log_groups");
    }

    #[tokio::test]
    async fn step_limit_is_enforced() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            r#"{"action": "call_tool", "tool": "describe_log_groups", "input": {}}"#,
            r#"{"action": "call_tool", "tool": "describe_log_groups", "input": {}}"#,
        ]));
        let tools = RecordingTools::default();
        let mut options = AgentOptions::new("llama3");
        options.max_steps = 1;
        let agent = Agent::new(provider, options);

        let err = agent
            .run("keep digging".into(), &tools)
            .await
            .expect_err("limit should trip");
        assert!(matches!(err, AgentError::StepLimit(1)));
    }

    #[test]
    fn flatten_prepends_system_turn() {
        let conversation = vec![Message::user("hello")];
        let turns = flatten("be terse", &conversation);
        assert_eq!(turns[0].role, TurnRole::System);
        assert_eq!(turns[1].role, TurnRole::User);
        assert_eq!(turns[1].content, "hello");
    }

    #[test]
    fn flatten_serializes_tool_output_as_json() {
        let conversation = vec![Message::tool_output(json!({"ok": true}))];
        let turns = flatten("", &conversation);
        assert_eq!(turns[1].role, TurnRole::Tool);
        assert_eq!(turns[1].content, "{\"ok\":true}");
    }
}
