use tracing::{debug, info};

use crate::config::ClassifierConfig;
use crate::core::types::{Brand, SearchResultRecord};
use crate::dork::prompts::{relevancy_user_prompt, RELEVANCY_SYSTEM_PROMPT};
use crate::providers::{complete_with_fallback, CompletionRequest, SharedGeneration};

/// Yes/no relevance judgement per search result.
pub struct RelevancyClassifier {
    service: SharedGeneration,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl RelevancyClassifier {
    pub fn new(service: SharedGeneration, model: impl Into<String>, cfg: &ClassifierConfig) -> Self {
        Self {
            service,
            model: model.into(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            top_p: cfg.top_p,
        }
    }

    /// Anything but a bare "yes" (including a failed call) counts as not relevant.
    pub async fn classify(&self, brand: &Brand, record: &SearchResultRecord) -> bool {
        let request = CompletionRequest {
            system_prompt: RELEVANCY_SYSTEM_PROMPT.to_string(),
            user_prompt: relevancy_user_prompt(brand, record),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            incremental: false,
        };
        match complete_with_fallback(self.service.as_ref(), &request, None).await {
            Some(reply) => parse_verdict(&reply),
            None => false,
        }
    }

    /// Keeps the records judged relevant, in input order.
    pub async fn filter(
        &self,
        brand: &Brand,
        records: &[SearchResultRecord],
    ) -> Vec<SearchResultRecord> {
        let total = records.len();
        info!("analyzing {} results for {} relevancy", total, brand);
        let mut relevant = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let verdict = self.classify(brand, record).await;
            debug!(
                "result {}/{} [{}] {} -> {}",
                i + 1,
                total,
                record.title,
                record.link,
                if verdict { "yes" } else { "no" }
            );
            if verdict {
                relevant.push(record.clone());
            }
        }
        info!(
            "relevancy done: {} analyzed, {} relevant, {} filtered out",
            total,
            relevant.len(),
            total - relevant.len()
        );
        relevant
    }
}

pub fn parse_verdict(reply: &str) -> bool {
    reply.trim().to_lowercase() == "yes"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::core::error::HunterError;
    use crate::providers::testing::ScriptedGeneration;

    fn record(title: &str) -> SearchResultRecord {
        SearchResultRecord {
            title: title.into(),
            link: format!("https://{}.glitch.me", title.to_lowercase()),
            snippet: "Sign in to continue".into(),
            position: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn verdict_is_strict() {
        assert!(parse_verdict("Yes"));
        assert!(parse_verdict("  YES\n"));
        assert!(!parse_verdict("No"));
        assert!(!parse_verdict("Yes."));
        assert!(!parse_verdict("maybe"));
        assert!(!parse_verdict(""));
    }

    #[tokio::test]
    async fn classify_uses_single_shot_low_temperature() {
        let svc = Arc::new(ScriptedGeneration::new(vec![Ok("yes".into())]));
        let clf = RelevancyClassifier::new(svc.clone(), "llama3-70b-8192", &ClassifierConfig::default());
        let brand = Brand::new("Acme").unwrap();

        assert!(clf.classify(&brand, &record("Login")).await);
        let seen = svc.requests();
        assert!(!seen[0].incremental);
        assert!((seen[0].temperature - 0.1).abs() < f32::EPSILON);
        assert!(seen[0].user_prompt.contains("https://login.glitch.me"));
    }

    #[tokio::test]
    async fn sampling_comes_from_config() {
        let svc = Arc::new(ScriptedGeneration::new(vec![Ok("no".into())]));
        let cfg = ClassifierConfig {
            temperature: 0.0,
            max_tokens: 4,
            top_p: 0.9,
        };
        let clf = RelevancyClassifier::new(svc.clone(), "llama3-70b-8192", &cfg);

        assert!(!clf.classify(&Brand::new("Acme").unwrap(), &record("News")).await);
        let seen = svc.requests();
        assert_eq!(seen[0].max_tokens, 4);
        assert!((seen[0].top_p - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn filter_keeps_order_and_contains_failures() {
        let svc = Arc::new(ScriptedGeneration::new(vec![
            Ok("Yes".into()),
            Err(HunterError::Timeout),
            Ok("No".into()),
            Ok("I think so".into()),
            Ok("yes".into()),
        ]));
        let clf = RelevancyClassifier::new(svc, "llama3-70b-8192", &ClassifierConfig::default());
        let brand = Brand::new("Acme").unwrap();
        let input: Vec<_> = ["A", "B", "C", "D", "E"].into_iter().map(record).collect();

        let kept = clf.filter(&brand, &input).await;
        let titles: Vec<&str> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "E"]);
    }
}
