use std::time::Duration;

use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;

use crate::error::{Result, SuggestError};

// ─── SuggestClient ────────────────────────────────────────────────────────────

/// JSON GET client for the suggestion endpoint.
///
/// One attempt per request: a slow or failed response is superseded by the
/// next keystroke, so there is nothing to retry.
pub struct SuggestClient {
    client: reqwest::Client,
}

impl SuggestClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get_json(&self, url: Url) -> Result<Value> {
        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(SuggestError::ApiError(
                url.to_string(),
                format!("HTTP {status}"),
            ));
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| SuggestError::Parse(e.to_string()))
    }
}

/// Parse the configured endpoint, which may already carry query parameters.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    Url::parse(endpoint.trim())
        .map_err(|e| SuggestError::InvalidEndpoint(endpoint.to_string(), e.to_string()))
}
