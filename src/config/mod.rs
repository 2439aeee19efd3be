use std::{fmt, fs, path::Path, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::core::error::HunterError;

pub const DEFAULT_CONFIG_PATH: &str = "config/brand-hunter.toml";

/// Generation backends with a concrete adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    Gemini,
}

impl Provider {
    /// Models accepted for this provider with a short capability label.
    pub fn models(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Provider::Groq => &[
                ("llama3-70b-8192", "Best balance (Recommended)"),
                ("mixtral-8x7b-32768", "Large context"),
                ("llama-3.1-8b-instant", "Fast"),
                ("llama-3.1-70b-versatile", "High quality"),
            ],
            Provider::Gemini => &[
                ("gemini-1.5-pro", "Best balance (Recommended)"),
                ("gemini-1.5-flash", "Large context"),
                ("gemini-1.5-flash-8b", "Fast"),
                ("gemini-2.0-flash-exp", "High quality"),
            ],
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.models()[0].0
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }

    pub fn validate_model(&self, model: &str) -> Result<(), HunterError> {
        if self.models().iter().any(|(name, _)| *name == model) {
            return Ok(());
        }
        let names: Vec<&str> = self.models().iter().map(|(name, _)| *name).collect();
        Err(HunterError::Config(format!(
            "invalid model '{}' for {}; choose from: {}",
            model,
            self,
            names.join(", ")
        )))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => f.write_str("groq"),
            Provider::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = HunterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "gemini" | "google" => Ok(Provider::Gemini),
            other => Err(HunterError::Config(format!("unknown provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: Provider,
    /// Empty means the provider's public endpoint.
    pub endpoint: String,
    /// Empty means the provider's default model.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub incremental: bool,
    pub fallback_temperature: f32,
    pub fallback_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            endpoint: String::new(),
            model: String::new(),
            temperature: 0.7,
            max_tokens: 4096,
            top_p: 1.0,
            incremental: true,
            fallback_temperature: 0.5,
            fallback_max_tokens: 8192,
            timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    pub fn endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            self.provider.default_endpoint()
        } else {
            &self.endpoint
        }
    }

    pub fn model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub result_count: u32,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_unit_ms: u64,
    pub transport_retries: u32,
    pub transport_backoff_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            result_count: 100,
            timeout_secs: 30,
            max_attempts: 3,
            backoff_unit_ms: 1_000,
            transport_retries: 3,
            transport_backoff_ms: 1_000,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn transport_backoff(&self) -> Duration {
        Duration::from_millis(self.transport_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 16,
            top_p: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_agent: String,
    pub generation: GenerationConfig,
    pub search: SearchConfig,
    pub classifier: ClassifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("brand-hunter/{}", env!("CARGO_PKG_VERSION")),
            generation: GenerationConfig::default(),
            search: SearchConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, HunterError> {
    let path = Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH));

    if !path.exists() {
        tracing::debug!("no config at {}; using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, HunterError> {
    toml::from_str(content).map_err(|e| HunterError::Config(e.to_string()))
}

/// Command-line overrides applied on top of the file.
pub fn apply_overrides(
    mut cfg: AppConfig,
    provider: Option<Provider>,
    model: Option<&str>,
) -> Result<AppConfig, HunterError> {
    if let Some(provider) = provider {
        if provider != cfg.generation.provider {
            cfg.generation.provider = provider;
            cfg.generation.endpoint.clear();
            cfg.generation.model.clear();
        }
    }
    if let Some(model) = model {
        cfg.generation.model = model.trim().to_string();
    }
    cfg.generation.provider.validate_model(cfg.generation.model())?;
    Ok(cfg)
}

/// API keys for both external services.
#[derive(Clone)]
pub struct Credentials {
    pub generation_key: String,
    pub search_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("generation_key", &"<redacted>")
            .field("search_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads keys from the process environment, after loading `.env` if present.
    pub fn from_env(provider: Provider) -> Result<Self, HunterError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(provider: Provider, lookup: F) -> Result<Self, HunterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    HunterError::Config(format!("{} not found in environment variables", name))
                })
        };
        Ok(Self {
            generation_key: fetch(provider.api_key_var())?,
            search_key: fetch("SERPER_API_KEY")?,
        })
    }
}
