//! OpenAI-compatible chat completions, as served by Groq.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::HunterError;
use crate::providers::{ensure_success, sse, CompletionRequest, GenerationService};

pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, HunterError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(HunterError::from)?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Default)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Default)]
struct Choice {
    #[serde(default)]
    message: Message,
}

#[derive(Deserialize, Default)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize, Default)]
struct ChunkChoice {
    #[serde(default)]
    delta: Message,
}

#[async_trait]
impl GenerationService for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HunterError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stream: request.incremental,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        if request.incremental {
            let mut text = String::new();
            sse::read_events(resp, |data| {
                if data.trim() == "[DONE]" {
                    return Ok(false);
                }
                let chunk: ChatChunk = serde_json::from_str(data)?;
                if let Some(fragment) = chunk
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.as_deref())
                {
                    tracing::trace!("fragment: {}", fragment);
                    text.push_str(fragment);
                }
                Ok(true)
            })
            .await?;
            return Ok(text);
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HunterError::GenerationEmpty("no choices in completion".into()))
    }
}
