//! Transcript and JSON-block extraction behavior

use logscope::application::Extracted;
use logscope::application::jsonblock::{BlockGap, extract_json_from_text};
use logscope::application::transcript::{TranscriptGap, extract_last_assistant_content};
use logscope::domain::types::{ContentItem, Message, Role};
use serde_json::json;

#[test]
fn conversation_without_assistant_yields_missing() {
    let conversation = vec![
        Message::user("any errors overnight?"),
        Message::tool_output(json!({"events": []})),
    ];
    assert_eq!(
        extract_last_assistant_content(&conversation),
        Extracted::Missing(TranscriptGap::NoAssistantMessage)
    );
}

#[test]
fn multiple_text_items_resolve_to_the_last_one() {
    let conversation = vec![
        Message::user("any errors overnight?"),
        Message::new(
            Role::Assistant,
            vec![
                ContentItem::text("checking the api log group"),
                ContentItem::text("one 500 at 02:14, otherwise clean"),
            ],
        ),
    ];
    assert_eq!(
        extract_last_assistant_content(&conversation),
        Extracted::Found("one 500 at 02:14, otherwise clean".into())
    );
}

#[test]
fn transcript_from_wire_json_round_trips() {
    let raw = json!([
        {"role": "user", "content": [{"text": "list groups"}]},
        {"role": "assistant", "content": [
            {"text": "calling the tool"},
            {"tool": "describe_log_groups", "input": {}}
        ]},
        {"role": "tool", "content": [{"output": {"logGroups": []}}]},
        {"role": "assistant", "content": [{"text": "no groups found"}]}
    ]);
    let conversation: Vec<Message> = serde_json::from_value(raw).expect("transcript deserializes");
    assert_eq!(
        extract_last_assistant_content(&conversation),
        Extracted::Found("no groups found".into())
    );
}

#[test]
fn fenced_json_object_is_extracted() {
    let text = "Summary below.\n```json\n{\"a\": 1}\n```";
    assert_eq!(
        extract_json_from_text(text),
        Extracted::Found(json!({"a": 1}))
    );
}

#[test]
fn absent_block_and_malformed_block_have_distinct_reasons() {
    assert_eq!(
        extract_json_from_text("just prose"),
        Extracted::Missing(BlockGap::NoBlock)
    );
    assert_eq!(
        extract_json_from_text("```json\n{\"a\": }\n```"),
        Extracted::Missing(BlockGap::Malformed)
    );
}
