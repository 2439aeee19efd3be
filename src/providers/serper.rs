use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::SearchConfig;
use crate::core::error::HunterError;
use crate::core::types::RawSearchPayload;
use crate::providers::SearchService;

/// Serper.dev Google search client. Re-sends on 429/5xx before reporting failure.
pub struct SerperClient {
    client: Client,
    endpoint: String,
    transport_retries: u32,
    transport_backoff: Duration,
}

impl SerperClient {
    pub fn new(cfg: &SearchConfig, api_key: &str, user_agent: &str) -> Result<Self, HunterError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| HunterError::Config("SERPER_API_KEY is not a valid header value".into()))?;
        headers.insert("X-API-KEY", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(cfg.timeout())
            .build()
            .map_err(HunterError::from)?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            transport_retries: cfg.transport_retries,
            transport_backoff: cfg.transport_backoff(),
        })
    }

    /// Wait before transport retry `retry` (0-based): 1, 2, 4 ... backoff units.
    fn transport_delay(&self, retry: u32) -> Duration {
        self.transport_backoff * 2u32.saturating_pow(retry)
    }
}

#[async_trait]
impl SearchService for SerperClient {
    async fn post(&self, query: &str, result_count: u32) -> Result<RawSearchPayload, HunterError> {
        let body = json!({ "q": query, "num": result_count });
        let mut retry = 0u32;
        loop {
            let resp = self.client.post(&self.endpoint).json(&body).send().await?;
            let status = resp.status();
            if status.is_success() {
                let value: Value = resp.json().await?;
                return Ok(value.into());
            }

            let code = status.as_u16();
            if HunterError::is_retryable_status(code) && retry < self.transport_retries {
                let delay = self.transport_delay(retry);
                warn!(
                    "search returned {}; transport retry {} in {:?}",
                    code,
                    retry + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry += 1;
                continue;
            }

            let text = resp.text().await.unwrap_or_default();
            return Err(HunterError::Http {
                status: code,
                body: text.chars().take(300).collect(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_delay_doubles_per_retry() {
        let cfg = SearchConfig {
            transport_backoff_ms: 250,
            ..SearchConfig::default()
        };
        let client = SerperClient::new(&cfg, "k", "ua").unwrap();
        assert_eq!(client.transport_delay(0), Duration::from_millis(250));
        assert_eq!(client.transport_delay(1), Duration::from_millis(500));
        assert_eq!(client.transport_delay(2), Duration::from_millis(1_000));
    }
}
