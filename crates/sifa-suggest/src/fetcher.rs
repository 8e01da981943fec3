use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use sifa_core::{FormProfile, Provider, Suggestion, SuggestConfig, parse_results};

use crate::error::Result;
use crate::http::{SuggestClient, parse_endpoint};

/// Anything that can turn a query into suggestions.
///
/// Implementations never fail: whatever goes wrong degrades to "no
/// suggestions".
#[async_trait]
pub trait SuggestionFetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Vec<Suggestion>;
}

/// Fetcher backed by the `GET <endpoint>?q=...` JSON endpoint.
pub struct HttpSuggestionFetcher {
    client: SuggestClient,
    endpoint: Url,
    provider: Option<Provider>,
    limit: Option<usize>,
}

impl HttpSuggestionFetcher {
    pub fn new(
        endpoint: &str,
        provider: Option<Provider>,
        limit: Option<usize>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        Ok(Self {
            client: SuggestClient::new(timeout, user_agent)?,
            endpoint: parse_endpoint(endpoint)?,
            provider,
            limit,
        })
    }

    pub fn from_config(config: &SuggestConfig, profile: FormProfile) -> Result<Self> {
        Self::new(
            &config.endpoint,
            config.provider_for(profile),
            Some(config.limit).filter(|l| *l > 0),
            Duration::from_millis(config.timeout_ms),
            &config.user_agent,
        )
    }

    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if let Some(provider) = self.provider {
                pairs.append_pair("provider", provider.as_query_value());
            }
        }
        url
    }

    /// Like [`SuggestionFetcher::fetch`] but keeps the failure.
    pub async fn try_fetch(&self, query: &str) -> Result<Vec<Suggestion>> {
        let body = self.client.get_json(self.request_url(query)).await?;
        Ok(parse_results(&body, self.limit))
    }
}

#[async_trait]
impl SuggestionFetcher for HttpSuggestionFetcher {
    async fn fetch(&self, query: &str) -> Vec<Suggestion> {
        match self.try_fetch(query).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(%query, error = %e, "suggestion fetch failed, showing none");
                Vec::new()
            }
        }
    }
}
