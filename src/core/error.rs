use std::io;

/// HTTP statuses re-sent by the transport layer and treated as transient.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(thiserror::Error, Debug)]
pub enum HunterError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("generation produced nothing usable: {0}")]
    GenerationEmpty(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl HunterError {
    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            HunterError::Timeout | HunterError::Network(_) => true,
            HunterError::Http { status, .. } => Self::is_retryable_status(*status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for HunterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HunterError::Timeout
        } else if err.is_connect() || err.is_request() {
            HunterError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            HunterError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            HunterError::MalformedResponse(err.to_string())
        } else {
            HunterError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HunterError {
    fn from(err: serde_json::Error) -> Self {
        HunterError::MalformedResponse(err.to_string())
    }
}
