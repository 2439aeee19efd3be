use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::core::error::HunterError;
use crate::core::types::{Brand, DorkQuery};
use crate::dork::parser::parse_queries;
use crate::dork::prompts::{dork_user_prompt, DORK_SYSTEM_PROMPT};
use crate::providers::{complete_with_fallback, CompletionRequest, Fallback, SharedGeneration};

/// Sampling used for query generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub incremental: bool,
    pub fallback: Fallback,
}

impl From<&GenerationConfig> for Sampling {
    fn from(cfg: &GenerationConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            top_p: cfg.top_p,
            incremental: cfg.incremental,
            fallback: Fallback {
                temperature: cfg.fallback_temperature,
                max_tokens: cfg.fallback_max_tokens,
            },
        }
    }
}

pub struct QueryGenerator {
    service: SharedGeneration,
    sampling: Sampling,
}

impl QueryGenerator {
    pub fn new(service: SharedGeneration, sampling: Sampling) -> Self {
        Self { service, sampling }
    }

    /// Asks the model for dorks targeting `brand`.
    ///
    /// `GenerationEmpty` means the service produced no text; `MalformedResponse`
    /// means text arrived but held no usable query.
    pub async fn try_generate(
        &self,
        brand: &Brand,
        model: &str,
    ) -> Result<Vec<DorkQuery>, HunterError> {
        let request = CompletionRequest {
            system_prompt: DORK_SYSTEM_PROMPT.to_string(),
            user_prompt: dork_user_prompt(brand),
            model: model.to_string(),
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
            top_p: self.sampling.top_p,
            incremental: self.sampling.incremental,
        };

        let text = complete_with_fallback(self.service.as_ref(), &request, Some(self.sampling.fallback))
            .await
            .ok_or_else(|| HunterError::GenerationEmpty(format!("no reply from {}", model)))?;
        debug!("generation reply: {} chars", text.len());

        let queries = parse_queries(&text).map_err(|err| {
            debug!("unparseable reply: {}", text);
            HunterError::MalformedResponse(err.to_string())
        })?;
        info!("extracted {} queries for {}", queries.len(), brand);
        Ok(queries)
    }

    /// Like [`try_generate`](Self::try_generate) but every failure collapses to an empty list.
    pub async fn generate(&self, brand: &Brand, model: &str) -> Vec<DorkQuery> {
        match self.try_generate(brand, model).await {
            Ok(queries) => queries,
            Err(err) => {
                warn!("query generation for {} produced nothing: {}", brand, err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::providers::testing::ScriptedGeneration;

    fn sampling() -> Sampling {
        Sampling::from(&GenerationConfig::default())
    }

    fn brand() -> Brand {
        Brand::new("Acme").unwrap()
    }

    #[tokio::test]
    async fn fenced_reply_is_parsed() {
        let reply = "```json\n[{\"category\":\"Login\",\"query\":\"intext:\\\"Acme\\\" site:glitch.me -site:acme.com\",\"purpose\":\"p\"}]\n```";
        let svc = Arc::new(ScriptedGeneration::new(vec![Ok(reply.into())]));
        let generator = QueryGenerator::new(svc.clone(), sampling());

        let queries = generator.try_generate(&brand(), "llama3-70b-8192").await.unwrap();
        assert_eq!(queries, vec![DorkQuery::new(r#"intext:"Acme" site:glitch.me -site:acme.com"#)]);

        let seen = svc.requests();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].incremental);
        assert_eq!(seen[0].system_prompt, DORK_SYSTEM_PROMPT);
        assert!(seen[0].user_prompt.contains("Acme"));
    }

    #[tokio::test]
    async fn service_failure_is_generation_empty() {
        let svc = Arc::new(ScriptedGeneration::new(vec![
            Err(HunterError::Timeout),
            Err(HunterError::Timeout),
        ]));
        let generator = QueryGenerator::new(svc, sampling());
        let err = generator.try_generate(&brand(), "llama3-70b-8192").await.unwrap_err();
        assert!(matches!(err, HunterError::GenerationEmpty(_)));
    }

    #[tokio::test]
    async fn unusable_reply_is_malformed() {
        let svc = Arc::new(ScriptedGeneration::new(vec![Ok("I cannot help with that.".into())]));
        let generator = QueryGenerator::new(svc, sampling());
        let err = generator.try_generate(&brand(), "llama3-70b-8192").await.unwrap_err();
        assert!(matches!(err, HunterError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn generate_collapses_failures_to_empty() {
        let svc = Arc::new(ScriptedGeneration::new(vec![Ok("[{\"query\": \"intext:acme\"}]".into())]));
        let generator = QueryGenerator::new(svc, sampling());
        assert!(generator.generate(&brand(), "llama3-70b-8192").await.is_empty());
    }
}
