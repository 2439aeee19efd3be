//! Adapters for the external generation and search services.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::{AppConfig, Credentials, Provider};
use crate::core::error::HunterError;
use crate::core::types::RawSearchPayload;

pub mod gemini;
pub mod groq;
pub mod serper;
pub mod sse;

/// One generation call: a system/user prompt pair plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Stream fragments and assemble them instead of a single response.
    pub incremental: bool,
}

/// Sampling used when a streamed call is retried single-shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fallback {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn single_shot(&self, fallback: Fallback) -> Self {
        Self {
            temperature: fallback.temperature,
            max_tokens: fallback.max_tokens,
            incremental: false,
            ..self.clone()
        }
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Full text of the model reply. Streamed replies are assembled before returning.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HunterError>;
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn post(&self, query: &str, result_count: u32) -> Result<RawSearchPayload, HunterError>;
}

pub type SharedGeneration = Arc<dyn GenerationService>;
pub type SharedSearch = Arc<dyn SearchService>;

/// Runs `request`, retrying a failed streamed call once single-shot.
/// Failures and blank replies come back as `None`.
pub async fn complete_with_fallback(
    service: &dyn GenerationService,
    request: &CompletionRequest,
    fallback: Option<Fallback>,
) -> Option<String> {
    let first = service.complete(request).await;
    let outcome = match (first, request.incremental) {
        (Ok(text), _) => Ok(text),
        (Err(err), true) => {
            warn!("streamed generation failed: {}; retrying single-shot", err);
            let retry = match fallback {
                Some(fb) => request.single_shot(fb),
                None => CompletionRequest {
                    incremental: false,
                    ..request.clone()
                },
            };
            service.complete(&retry).await
        }
        (Err(err), false) => Err(err),
    };

    match outcome {
        Ok(text) if text.trim().is_empty() => {
            warn!("generation returned empty text");
            None
        }
        Ok(text) => Some(text),
        Err(err) => {
            warn!("generation failed: {}", err);
            None
        }
    }
}

/// Builds the generation adapter selected by configuration.
pub fn generation_service(
    cfg: &AppConfig,
    creds: &Credentials,
) -> Result<SharedGeneration, HunterError> {
    let gcfg = &cfg.generation;
    let service: SharedGeneration = match gcfg.provider {
        Provider::Groq => Arc::new(groq::GroqClient::new(
            gcfg.endpoint(),
            &creds.generation_key,
            &cfg.user_agent,
            gcfg.timeout(),
        )?),
        Provider::Gemini => Arc::new(gemini::GeminiClient::new(
            gcfg.endpoint(),
            &creds.generation_key,
            &cfg.user_agent,
            gcfg.timeout(),
        )?),
    };
    Ok(service)
}

pub fn search_service(cfg: &AppConfig, creds: &Credentials) -> Result<SharedSearch, HunterError> {
    Ok(Arc::new(serper::SerperClient::new(
        &cfg.search,
        &creds.search_key,
        &cfg.user_agent,
    )?))
}

/// Turns a non-2xx response into `HunterError::Http`, keeping a short body excerpt.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
) -> Result<reqwest::Response, HunterError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(HunterError::Http {
        status: status.as_u16(),
        body: body.chars().take(300).collect(),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    const FALLBACK: Fallback = Fallback {
        temperature: 0.5,
        max_tokens: 8192,
    };

    #[tokio::test]
    async fn streamed_failure_retries_once_single_shot() {
        let svc = ScriptedGeneration::new(vec![Err(HunterError::Timeout), Ok("[]".into())]);
        let out = complete_with_fallback(&svc, &request(true), Some(FALLBACK)).await;
        assert_eq!(out.as_deref(), Some("[]"));

        let seen = svc.requests();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].incremental);
        assert!(!seen[1].incremental);
        assert_eq!(seen[1].max_tokens, 8192);
        assert!((seen[1].temperature - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn single_shot_failure_is_not_retried() {
        let svc = ScriptedGeneration::new(vec![Err(HunterError::Timeout), Ok("late".into())]);
        assert!(complete_with_fallback(&svc, &request(false), Some(FALLBACK)).await.is_none());
        assert_eq!(svc.requests().len(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_gives_none() {
        let svc = ScriptedGeneration::new(vec![
            Err(HunterError::Network("reset".into())),
            Err(HunterError::Timeout),
        ]);
        assert!(complete_with_fallback(&svc, &request(true), None).await.is_none());
        assert_eq!(svc.requests().len(), 2);
    }

    #[tokio::test]
    async fn blank_reply_is_none() {
        let svc = ScriptedGeneration::new(vec![Ok("  \n".into())]);
        assert!(complete_with_fallback(&svc, &request(true), None).await.is_none());
    }
}
