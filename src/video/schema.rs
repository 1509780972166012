//! Structural validation of collaborator payloads.
//!
//! List payloads drop incomplete items. Single-record payloads keep whatever
//! descriptive fields are present and leave placeholder policy to the caller.

use super::VideoRecord;
use crate::error::{Result, TunegrabError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// One raw search hit as returned by the collaborator.
#[derive(Debug, Default, Deserialize)]
struct RawSearchItem {
    #[serde(default, alias = "identifier")]
    id: Option<Value>,
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    channel: Option<Value>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    url: Option<Value>,
}

/// Descriptive fields for a single video. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub channel: Option<String>,
    pub duration: Option<String>,
}

/// Parse a search payload into complete records, in collaborator order.
///
/// Items missing any of id, title, channel, duration or url are dropped, as are
/// repeated identifiers. A payload that is not a list at all is an error.
pub fn parse_search_payload(text: &str) -> Result<Vec<VideoRecord>> {
    let value = parse_json(text)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("videos").or_else(|| map.remove("results")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(TunegrabError::Schema(
                    "Expected a list of videos in the search response".to_string(),
                ))
            }
        },
        _ => {
            return Err(TunegrabError::Schema(
                "Expected a list of videos in the search response".to_string(),
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let raw: RawSearchItem = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Dropping search item {}: {}", index, e);
                continue;
            }
        };

        let fields = (
            text_field(raw.id),
            text_field(raw.title),
            text_field(raw.channel),
            text_field(raw.duration),
            text_field(raw.url),
        );

        let (Some(id), Some(title), Some(channel), Some(duration), Some(url)) = fields else {
            debug!("Dropping search item {}: missing required field", index);
            continue;
        };

        if !seen.insert(id.clone()) {
            debug!("Dropping search item {}: duplicate id {}", index, id);
            continue;
        }

        records.push(VideoRecord::new(id, title, channel, duration, url));
    }

    Ok(records)
}

/// Parse a single-record payload into its descriptive fields.
///
/// The payload must be a JSON object; individual fields may be missing.
pub fn parse_info_payload(text: &str) -> Result<VideoInfo> {
    match parse_json(text)? {
        Value::Object(mut map) => Ok(VideoInfo {
            title: text_field(map.remove("title")),
            channel: text_field(map.remove("channel")),
            duration: text_field(map.remove("duration")),
        }),
        other => Err(TunegrabError::Schema(format!(
            "Expected an object in the video info response, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse JSON, tolerating prose or code fences around the payload.
fn parse_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TunegrabError::Schema("Empty response".to_string()));
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find(['[', '{']);
    let end = trimmed.rfind([']', '}']);

    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| TunegrabError::Schema(format!("Malformed JSON response: {}", e))),
        _ => Err(TunegrabError::Schema(format!(
            "No JSON found in response: {}",
            preview(trimmed)
        ))),
    }
}

/// Accept strings (trimmed, non-empty) and numbers as field values.
fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
