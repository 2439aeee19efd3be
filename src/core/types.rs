use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dork::validator::is_valid;

/// Target brand, substituted verbatim into prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand(String);

impl Brand {
    /// Trims surrounding whitespace; `None` for an empty name.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A search-engine query expression produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DorkQuery(String);

impl DorkQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }
}

impl fmt::Display for DorkQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Undecoded search response. Anything other than a non-empty JSON object counts as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSearchPayload(pub Value);

impl RawSearchPayload {
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// The `organic` array, if this payload is a mapping that carries one.
    pub fn organic(&self) -> Option<&Vec<Value>> {
        self.0.as_object()?.get("organic")?.as_array()
    }
}

impl From<Value> for RawSearchPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One organic hit, flattened from a search payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Ordinal within the response of the query that produced it.
    pub position: i64,
    pub timestamp: DateTime<Utc>,
}

/// Per-run progress of the hunt pipeline. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Stage {
    #[default]
    Idle,
    Generating,
    Searching,
    Normalizing,
    Classifying,
    Done,
}

/// How many items entered and survived each stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub generated: usize,
    pub valid: usize,
    pub executed: usize,
    pub payloads: usize,
    pub normalized: usize,
    pub classified: usize,
    pub relevant: usize,
}
