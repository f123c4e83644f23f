mod timestamp;

pub use timestamp::format_timestamp;

use crate::domain::result::QueryResult;
use serde_json::{Map, Value};
use tracing::debug;

/// One renderable block: a labelled group of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: Option<String>,
    pub entries: Vec<Entry>,
}

/// One renderable item inside a section.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Expandable item: title row plus body lines shown when expanded.
    Collapsible { title: String, lines: Vec<String> },
    Text(String),
}

impl Section {
    fn untitled(entries: Vec<Entry>) -> Self {
        Self {
            title: None,
            entries,
        }
    }

    fn titled(title: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            title: Some(title.into()),
            entries,
        }
    }
}

/// Build the display tree for a query result. Total: every input shape maps
/// to some tree, so the painting layer has nothing to catch.
pub fn build_display(result: &QueryResult) -> Vec<Section> {
    match result {
        QueryResult::Text(text) => vec![Section::untitled(vec![Entry::Text(text.clone())])],
        QueryResult::Object(map) => build_object(map),
        QueryResult::Array(items) => vec![build_array(items)],
        QueryResult::Scalar(value) => {
            vec![Section::untitled(vec![Entry::Text(coerce_text(value))])]
        }
    }
}

fn build_object(map: &Map<String, Value>) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut handled: Vec<&str> = Vec::new();

    if let Some(events) = map.get("logEvents").and_then(Value::as_array) {
        debug!(count = events.len(), "rendering log events");
        handled.push("logEvents");
        let entries = events.iter().map(event_entry).collect();
        sections.push(Section::titled("Log Events", entries));
    }

    if let Some(groups) = map.get("logGroups").and_then(Value::as_array) {
        debug!(count = groups.len(), "rendering log groups");
        handled.push("logGroups");
        let entries = groups.iter().map(group_entry).collect();
        sections.push(Section::titled("Log Groups", entries));
    }

    for (key, value) in map {
        if handled.contains(&key.as_str()) {
            continue;
        }
        let entry = match value {
            Value::Object(_) | Value::Array(_) => Entry::Text(pretty(value)),
            scalar => Entry::Text(coerce_text(scalar)),
        };
        sections.push(Section::titled(humanize_key(key), vec![entry]));
    }

    sections
}

fn event_entry(event: &Value) -> Entry {
    let timestamp = event.get("timestamp").cloned().unwrap_or(Value::String(String::new()));
    let formatted = format_timestamp(&timestamp);

    let mut lines = vec![
        format!(
            "Message: {}",
            coerce_text(event.get("message").unwrap_or(&Value::String(String::new())))
        ),
        format!("Timestamp: {formatted}"),
    ];
    if let Some(id) = event.get("eventId") {
        lines.push(format!("Event ID: {}", coerce_text(id)));
    }

    Entry::Collapsible {
        title: format!("Event at {formatted}"),
        lines,
    }
}

fn group_entry(group: &Value) -> Entry {
    let title = group
        .get("logGroupName")
        .and_then(Value::as_str)
        .unwrap_or("Unnamed Group")
        .to_string();
    Entry::Collapsible {
        title,
        lines: pretty(group).lines().map(String::from).collect(),
    }
}

fn build_array(items: &[Value]) -> Section {
    let entries = items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(_) => Entry::Collapsible {
                title: format!("Item {}", index + 1),
                lines: pretty(item).lines().map(String::from).collect(),
            },
            other => Entry::Text(coerce_text(other)),
        })
        .collect();
    Section::titled("Results", entries)
}

/// `query_stats` -> `Query Stats`.
fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> QueryResult {
        match value {
            Value::Object(map) => QueryResult::Object(map),
            other => panic!("expected object literal, got {other}"),
        }
    }

    #[test]
    fn log_events_render_as_collapsible_entries() {
        let result = object(json!({
            "logEvents": [{"timestamp": 1700000000000i64, "message": "m1"}]
        }));
        let sections = build_display(&result);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Log Events"));
        match &sections[0].entries[0] {
            Entry::Collapsible { title, lines } => {
                assert!(title.starts_with("Event at 2023-11-1"));
                assert!(lines[0].contains("m1"));
            }
            other => panic!("expected collapsible entry, got {other:?}"),
        }
    }

    #[test]
    fn event_id_shown_only_when_present() {
        let result = object(json!({
            "logEvents": [
                {"timestamp": 1700000000000i64, "message": "m1", "eventId": "e-1"},
                {"timestamp": 1700000000000i64, "message": "m2"}
            ]
        }));
        let sections = build_display(&result);
        match (&sections[0].entries[0], &sections[0].entries[1]) {
            (
                Entry::Collapsible { lines: first, .. },
                Entry::Collapsible { lines: second, .. },
            ) => {
                assert!(first.iter().any(|line| line == "Event ID: e-1"));
                assert!(!second.iter().any(|line| line.starts_with("Event ID")));
            }
            other => panic!("expected collapsible entries, got {other:?}"),
        }
    }

    #[test]
    fn log_groups_titled_by_name_with_placeholder() {
        let result = object(json!({
            "logGroups": [{"logGroupName": "g1"}, {"storedBytes": 10}]
        }));
        let sections = build_display(&result);
        let titles: Vec<_> = sections[0]
            .entries
            .iter()
            .map(|entry| match entry {
                Entry::Collapsible { title, .. } => title.as_str(),
                Entry::Text(_) => panic!("expected collapsible entry"),
            })
            .collect();
        assert_eq!(titles, vec!["g1", "Unnamed Group"]);
    }

    #[test]
    fn remaining_keys_get_humanized_sections() {
        let result = object(json!({
            "logEvents": [],
            "query_stats": {"scanned": 12},
            "status": "Complete"
        }));
        let sections = build_display(&result);
        let titles: Vec<_> = sections
            .iter()
            .filter_map(|section| section.title.as_deref())
            .collect();
        assert!(titles.contains(&"Log Events"));
        assert!(titles.contains(&"Query Stats"));
        assert!(titles.contains(&"Status"));
    }

    #[test]
    fn plain_text_renders_verbatim() {
        let sections = build_display(&QueryResult::Text("nothing unusual found".into()));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, None);
        assert_eq!(
            sections[0].entries[0],
            Entry::Text("nothing unusual found".into())
        );
    }

    #[test]
    fn sequence_mixes_structured_and_plain_entries() {
        let sections = build_display(&QueryResult::Array(vec![json!({"k": "v"}), json!("plain")]));
        assert_eq!(sections[0].title.as_deref(), Some("Results"));
        assert!(matches!(
            &sections[0].entries[0],
            Entry::Collapsible { title, .. } if title == "Item 1"
        ));
        assert_eq!(sections[0].entries[1], Entry::Text("plain".into()));
    }

    #[test]
    fn humanize_key_title_cases_underscored_words() {
        assert_eq!(humanize_key("query_stats"), "Query Stats");
        assert_eq!(humanize_key("queryStats"), "Querystats");
        assert_eq!(humanize_key("status"), "Status");
    }
}
