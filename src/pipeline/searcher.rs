use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::core::error::HunterError;
use crate::core::types::{DorkQuery, RawSearchPayload};
use crate::providers::SharedSearch;

/// Runs dork queries one at a time with a call-level retry budget.
pub struct SearchExecutor {
    service: SharedSearch,
    result_count: u32,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl SearchExecutor {
    pub fn new(service: SharedSearch, cfg: &SearchConfig) -> Self {
        Self {
            service,
            result_count: cfg.result_count,
            max_attempts: cfg.max_attempts.max(1),
            backoff_unit: cfg.backoff_unit(),
        }
    }

    /// Wait before the attempt after `attempt` (0-based): 2, 4, 6 ... units.
    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * ((attempt + 1) * 2)
    }

    /// Never fails: an exhausted budget yields an empty payload.
    pub async fn search(&self, query: &DorkQuery) -> RawSearchPayload {
        for attempt in 0..self.max_attempts {
            match self.service.post(query.as_str(), self.result_count).await {
                Ok(payload) => return payload,
                Err(HunterError::Timeout) => {
                    let wait = self.backoff(attempt);
                    warn!("search timed out; retrying in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                Err(err) => {
                    if err.is_transient() {
                        warn!("search failed: {}", err);
                    } else {
                        warn!("search failed with a non-transient error: {}", err);
                    }
                    if attempt + 1 >= self.max_attempts {
                        return RawSearchPayload::empty();
                    }
                    let wait = self.backoff(attempt);
                    debug!("retrying in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
        warn!("max retries exceeded; skipping query: {}", query);
        RawSearchPayload::empty()
    }

    /// Searches each query in order and keeps the non-empty payloads.
    pub async fn execute_all(&self, queries: &[DorkQuery]) -> Vec<RawSearchPayload> {
        let mut payloads = Vec::new();
        let total = queries.len();
        for (i, query) in queries.iter().enumerate() {
            info!("query {}/{}: {}", i + 1, total, query);
            let payload = self.search(query).await;
            if payload.is_empty() {
                info!("no results for query {}", i + 1);
            } else {
                payloads.push(payload);
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio::time::Instant;

    use super::*;
    use crate::providers::testing::ScriptedSearch;

    fn cfg() -> SearchConfig {
        SearchConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_exhaust_three_attempts_with_growing_waits() {
        let svc = Arc::new(ScriptedSearch::new(vec![
            Err(HunterError::Timeout),
            Err(HunterError::Timeout),
            Err(HunterError::Timeout),
            Ok(RawSearchPayload(json!({"organic": [{"title": "late"}]}))),
        ]));
        let exec = SearchExecutor::new(svc.clone(), &cfg());

        let started = Instant::now();
        let payload = exec.search(&DorkQuery::new("site:x -site:y")).await;

        assert!(payload.is_empty());
        assert_eq!(svc.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 6));
    }

    #[tokio::test(start_paused = true)]
    async fn other_failures_skip_the_final_wait() {
        let http = || HunterError::Http {
            status: 500,
            body: String::new(),
        };
        let svc = Arc::new(ScriptedSearch::new(vec![Err(http()), Err(http()), Err(http())]));
        let exec = SearchExecutor::new(svc.clone(), &cfg());

        let started = Instant::now();
        assert!(exec.search(&DorkQuery::new("site:x -site:y")).await.is_empty());
        assert_eq!(svc.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4));
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failure() {
        let svc = Arc::new(ScriptedSearch::new(vec![
            Err(HunterError::Network("reset".into())),
            Ok(RawSearchPayload(json!({"organic": []}))),
        ]));
        let exec = SearchExecutor::new(svc.clone(), &cfg());
        let payload = exec.search(&DorkQuery::new("site:x -site:y")).await;
        assert_eq!(payload, RawSearchPayload(json!({"organic": []})));
        assert_eq!(svc.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn execute_all_is_ordered_and_drops_empty() {
        let svc = Arc::new(ScriptedSearch::new(vec![
            Ok(RawSearchPayload(json!({"organic": [{"title": "A"}]}))),
            Ok(RawSearchPayload::empty()),
            Ok(RawSearchPayload(json!({"organic": [{"title": "C"}]}))),
        ]));
        let exec = SearchExecutor::new(svc.clone(), &cfg());
        let queries = vec![
            DorkQuery::new("site:a -site:z"),
            DorkQuery::new("site:b -site:z"),
            DorkQuery::new("site:c -site:z"),
        ];

        let payloads = exec.execute_all(&queries).await;
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].0["organic"][0]["title"], "A");
        assert_eq!(payloads[1].0["organic"][0]["title"], "C");
        assert_eq!(
            *svc.queries.lock().unwrap(),
            vec!["site:a -site:z", "site:b -site:z", "site:c -site:z"]
        );
    }
}
