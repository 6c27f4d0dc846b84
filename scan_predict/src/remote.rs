//! Optional external word predictor.
//!
//! The engine never depends on it: any error here is logged and the local
//! model answers alone.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::{PredictError, Result};

/// What is sent to a remote predictor. Words are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteQuery {
    pub context: Vec<String>,
    pub prefix: String,
    pub limit: usize,
}

/// Anything that can propose words for a query, best first.
pub trait SuggestionSource: Send + Sync {
    fn fetch(&self, query: &RemoteQuery) -> Result<Vec<String>>;
}

/// Accepts `{"words": [...]}` or a bare `[...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteReply {
    Bare(Vec<String>),
    Wrapped { words: Vec<String> },
}

impl RemoteReply {
    fn into_words(self) -> Vec<String> {
        match self {
            RemoteReply::Bare(words) | RemoteReply::Wrapped { words } => words,
        }
    }
}

fn parse_reply(body: &str) -> Result<Vec<String>> {
    serde_json::from_str::<RemoteReply>(body)
        .map(RemoteReply::into_words)
        .map_err(|e| PredictError::Malformed(e.to_string()))
}

/// JSON-over-HTTP predictor: `POST url` with a [`RemoteQuery`] body.
pub struct HttpSuggestionSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSuggestionSource {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl SuggestionSource for HttpSuggestionSource {
    fn fetch(&self, query: &RemoteQuery) -> Result<Vec<String>> {
        let response = self.client.post(&self.url).json(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Status(status.as_u16()));
        }
        let body = response.text()?;
        let words = parse_reply(&body)?;
        debug!(url = %self.url, count = words.len(), "remote suggestions");
        Ok(words)
    }
}
