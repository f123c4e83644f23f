use super::Extracted;
use crate::domain::types::{Message, Role};
use tracing::{debug, warn};

/// Why no answer text could be pulled out of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptGap {
    NoAssistantMessage,
    NoTextContent,
}

/// Pull the agent's final answer out of a full transcript: the text of the
/// last text-bearing content item of the last assistant message. The last
/// item wins because later text reflects the answer after any intermediate
/// tool-call commentary.
pub fn extract_last_assistant_content(
    conversation: &[Message],
) -> Extracted<String, TranscriptGap> {
    let last_assistant = match conversation
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
    {
        Some(message) => message,
        None => {
            warn!("no assistant messages found in transcript");
            return Extracted::Missing(TranscriptGap::NoAssistantMessage);
        }
    };

    let last_text = last_assistant
        .content
        .iter()
        .filter_map(|item| item.as_text())
        .last();

    match last_text {
        Some(text) => {
            debug!(chars = text.len(), "extracted last assistant content");
            Extracted::Found(text.to_string())
        }
        None => {
            warn!("assistant message has no text content");
            Extracted::Missing(TranscriptGap::NoTextContent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContentItem;
    use serde_json::json;

    #[test]
    fn missing_when_no_assistant_message() {
        let conversation = vec![Message::user("anything broken?")];
        assert_eq!(
            extract_last_assistant_content(&conversation),
            Extracted::Missing(TranscriptGap::NoAssistantMessage)
        );
    }

    #[test]
    fn missing_when_assistant_has_no_text() {
        let conversation = vec![
            Message::user("check the logs"),
            Message::new(
                Role::Assistant,
                vec![ContentItem::ToolUse {
                    tool: "filter_log_events".into(),
                    input: json!({"pattern": "ERROR"}),
                }],
            ),
        ];
        assert_eq!(
            extract_last_assistant_content(&conversation),
            Extracted::Missing(TranscriptGap::NoTextContent)
        );
    }

    #[test]
    fn takes_last_text_item_not_first() {
        let conversation = vec![
            Message::user("check the logs"),
            Message::new(
                Role::Assistant,
                vec![
                    ContentItem::text("let me look at the groups first"),
                    ContentItem::ToolUse {
                        tool: "describe_log_groups".into(),
                        input: json!({}),
                    },
                    ContentItem::text("found 3 matching events"),
                ],
            ),
        ];
        assert_eq!(
            extract_last_assistant_content(&conversation),
            Extracted::Found("found 3 matching events".into())
        );
    }

    #[test]
    fn takes_last_assistant_message_not_earlier_ones() {
        let conversation = vec![
            Message::user("check the logs"),
            Message::assistant("working on it"),
            Message::tool_output(json!({"events": []})),
            Message::assistant("no events matched"),
        ];
        assert_eq!(
            extract_last_assistant_content(&conversation),
            Extracted::Found("no events matched".into())
        );
    }
}
