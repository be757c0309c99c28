use poem_openapi::Object;
use serde::Serialize;
use serde_json::Value;

/// Extraction request
#[derive(Debug, Object, Clone, Eq, PartialEq)]
pub struct ExtractionRequest {
    /// Share link of the hosted file (a non-empty string)
    pub url: Value,
}

impl ExtractionRequest {
    /// The share link, if `url` is a non-empty string. Numbers and other
    /// JSON values are not coerced.
    pub fn link(&self) -> Option<&str> {
        self.url.as_str().filter(|url| !url.is_empty())
    }
}

/// One playable or downloadable variant of the file
#[derive(Debug, Object, Clone, PartialEq, Serialize)]
pub struct StreamEntry {
    /// Quality label reported by the upstream ("direct" for single links)
    pub quality: Option<String>,
    /// Resolved stream or download URL
    pub url: String,
    /// Upstream object this entry was built from
    pub raw: Value,
}

/// Normalized extraction result
#[derive(Debug, Object, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    /// false only when the upstream reported a falsy status
    pub status: bool,
    /// File name, "unknown" when the upstream did not report one
    pub name: String,
    /// Human readable size, empty when unknown
    pub size: String,
    /// Thumbnail or cover image
    pub thumbnail: Option<String>,
    /// Streams in upstream order
    pub streams: Vec<StreamEntry>,
    /// Folder listing, passed through untouched
    pub files: Option<Value>,
    /// Full upstream payload
    pub raw: Value,
}
