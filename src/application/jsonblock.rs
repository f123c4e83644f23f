use super::Extracted;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// Why no JSON payload came out of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockGap {
    /// No ```json fence in the text at all. Common for free-form answers.
    NoBlock,
    /// A fence was there but its body did not parse.
    Malformed,
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("fence pattern compiles"))
}

/// Find the first ```json fenced block in `text` and parse its body.
/// Absence of a block is expected and logged as a warning; a block that
/// fails to parse is logged as an error. Both collapse to `Missing`, with
/// the reason preserved for the caller.
pub fn extract_json_from_text(text: &str) -> Extracted<Value, BlockGap> {
    let captures = match fence_pattern().captures(text) {
        Some(captures) => captures,
        None => {
            warn!("no json block found in content");
            return Extracted::Missing(BlockGap::NoBlock);
        }
    };

    let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            debug!("found json block in content");
            Extracted::Found(value)
        }
        Err(source) => {
            error!(%source, "json block failed to parse");
            Extracted::Missing(BlockGap::Malformed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fenced_object() {
        let text = "Here are the results:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(
            extract_json_from_text(text),
            Extracted::Found(json!({"a": 1}))
        );
    }

    #[test]
    fn missing_when_no_fence() {
        assert_eq!(
            extract_json_from_text("no structured data here"),
            Extracted::Missing(BlockGap::NoBlock)
        );
    }

    #[test]
    fn malformed_body_is_distinguished_from_absence() {
        let text = "```json\n{\"a\": }\n```";
        assert_eq!(
            extract_json_from_text(text),
            Extracted::Missing(BlockGap::Malformed)
        );
    }

    #[test]
    fn first_block_wins() {
        let text = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        assert_eq!(
            extract_json_from_text(text),
            Extracted::Found(json!({"first": true}))
        );
    }

    #[test]
    fn matches_across_line_boundaries() {
        let text = "```json\n{\n  \"events\": [\n    1,\n    2\n  ]\n}\n```";
        assert_eq!(
            extract_json_from_text(text),
            Extracted::Found(json!({"events": [1, 2]}))
        );
    }

    #[test]
    fn unlabeled_fence_does_not_count() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(
            extract_json_from_text(text),
            Extracted::Missing(BlockGap::NoBlock)
        );
    }
}
