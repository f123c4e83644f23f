use chrono::{Local, TimeZone};
use serde_json::Value;

/// Render a millisecond epoch timestamp as local `YYYY-MM-DD HH:MM:SS`.
/// Anything that does not convert comes back unchanged.
pub fn format_timestamp(value: &Value) -> String {
    if let Some(millis) = as_millis(value) {
        if let Some(datetime) = Local.timestamp_millis_opt(millis).single() {
            return datetime.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    raw(value)
}

fn as_millis(value: &Value) -> Option<i64> {
    if let Some(int) = value.as_i64() {
        return Some(int);
    }
    if let Some(float) = value.as_f64() {
        if float.is_finite() {
            return Some(float as i64);
        }
    }
    None
}

fn raw(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
