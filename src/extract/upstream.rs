use super::error::{ExtractError, Result};
use anyhow::anyhow;
use chrono::Utc;
use serde_json::{json, Value};
use std::{env, str::FromStr};
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://teraboxdl.tixte.co/extract";

/// Where the upstream access token goes on the outbound request.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum TokenPlacement {
    /// `token` field in the JSON body
    #[default]
    Body,
    /// `Authorization: Bearer` header
    Header,
}

impl FromStr for TokenPlacement {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(TokenPlacement::Body),
            "header" => Ok(TokenPlacement::Header),
            other => Err(anyhow!(
                "API_TOKEN_PLACEMENT must be 'body' or 'header', got '{}'",
                other
            )),
        }
    }
}

/// Which upstream extractor is live and how to authenticate against it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub token_placement: TokenPlacement,
}

impl UpstreamConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            token_placement: TokenPlacement::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, placement: TokenPlacement) -> Self {
        self.token = Some(token.into());
        self.token_placement = placement;
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = env::var("API_ENDPOINT")
            .ok()
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let token_placement = match env::var("API_TOKEN_PLACEMENT") {
            Ok(placement) => placement.parse()?,
            Err(_) => TokenPlacement::default(),
        };

        let config = Self::new(endpoint);
        match env::var("API_TOKEN") {
            Ok(token) if !token.is_empty() => Ok(config.with_token(token, token_placement)),
            _ => Ok(config),
        }
    }

    /// JSON body sent upstream. With a token configured the body also carries
    /// the current Unix time in `t`.
    fn payload(&self, url: &str) -> Value {
        let mut payload = json!({ "url": url });
        if let Some(token) = &self.token {
            if self.token_placement == TokenPlacement::Body {
                payload["token"] = json!(token);
            }
            payload["t"] = json!(Utc::now().timestamp());
        }
        payload
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Sends one extraction request upstream and returns its parsed payload.
    pub async fn fetch(&self, url: &str) -> Result<Value> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(&self.config.payload(url));

        if let (Some(token), TokenPlacement::Header) =
            (&self.config.token, self.config.token_placement)
        {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(url = %url, status = %status, bytes = text.len(), "Upstream responded");

        let payload = parse_payload(&text)?;

        if !status.is_success() {
            warn!(url = %url, status = %status, "Upstream returned an error status");
            return Err(ExtractError::Upstream {
                code: status.as_u16(),
                raw: payload,
            });
        }

        if payload.is_null() {
            return Err(ExtractError::UpstreamMalformed { text });
        }

        Ok(payload)
    }
}

/// Empty text parses as `null`.
fn parse_payload(text: &str) -> Result<Value> {
    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|_| ExtractError::UpstreamMalformed {
        text: text.to_string(),
    })
}
