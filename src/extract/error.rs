use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Every way a single extraction can fail. All of them end the request.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing or invalid 'url' in body")]
    InvalidInput,

    #[error("Upstream error")]
    Upstream { code: u16, raw: Value },

    #[error("Upstream returned invalid JSON")]
    UpstreamMalformed { text: String },

    #[error("{0}")]
    Internal(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Internal(err.to_string())
    }
}
