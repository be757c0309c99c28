use super::model::{NormalizedResult, StreamEntry};
use serde_json::Value;

const NAME_KEYS: &[&str] = &["name", "title", "filename", "file_name"];
const SIZE_KEYS: &[&str] = &["size", "size_formatted", "file_size"];
const THUMBNAIL_KEYS: &[&str] = &["thumbnail", "cover"];
const FILES_KEYS: &[&str] = &["files", "list"];

const UNKNOWN_NAME: &str = "unknown";
const DIRECT_QUALITY: &str = "direct";

/// A list field of the payload whose elements describe streams.
struct StreamSource {
    field: &'static str,
    quality_keys: &'static [&'static str],
    url_keys: &'static [&'static str],
}

/// List sources in precedence order. The first non-empty list wins, even if
/// none of its elements carries a URL.
const STREAM_SOURCES: &[StreamSource] = &[
    StreamSource {
        field: "streams",
        quality_keys: &["quality", "label", "name"],
        url_keys: &["url", "play_url", "playback", "src", "fast_stream_url"],
    },
    StreamSource {
        field: "playlist",
        quality_keys: &["quality", "label"],
        url_keys: &["url", "src"],
    },
];

/// Top-level single-link fields, tried when no list source is present.
const DIRECT_SOURCES: &[&[&str]] = &[&["fast_stream_url"], &["download_url", "url"]];

impl StreamSource {
    fn entry(&self, raw: &Value) -> Option<StreamEntry> {
        let url = first_truthy(raw, self.url_keys)?;
        Some(StreamEntry {
            quality: first_truthy(raw, self.quality_keys).map(as_text),
            url: as_text(url),
            raw: raw.clone(),
        })
    }
}

/// Reshapes an upstream payload into the stable response schema.
pub fn normalize(payload: &Value) -> NormalizedResult {
    NormalizedResult {
        status: payload.get("status").map_or(true, is_truthy),
        name: first_truthy(payload, NAME_KEYS)
            .map(as_text)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        size: first_truthy(payload, SIZE_KEYS)
            .map(as_text)
            .unwrap_or_default(),
        thumbnail: first_truthy(payload, THUMBNAIL_KEYS).map(as_text),
        streams: collect_streams(payload),
        files: first_truthy(payload, FILES_KEYS).cloned(),
        raw: payload.clone(),
    }
}

fn collect_streams(payload: &Value) -> Vec<StreamEntry> {
    for source in STREAM_SOURCES {
        let entries = payload
            .get(source.field)
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty());

        if let Some(entries) = entries {
            return entries
                .iter()
                .filter_map(|entry| source.entry(entry))
                .collect();
        }
    }

    DIRECT_SOURCES
        .iter()
        .find_map(|keys| first_truthy(payload, keys))
        .map(|url| {
            vec![StreamEntry {
                quality: Some(DIRECT_QUALITY.to_string()),
                url: as_text(url),
                raw: payload.clone(),
            }]
        })
        .unwrap_or_default()
}

/// Value of the first key in `keys` holding a truthy value.
fn first_truthy<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|candidate| is_truthy(candidate))
}

/// `null`, `false`, `0` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
