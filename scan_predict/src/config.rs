use serde::{Deserialize, Serialize};

/// `[prediction]` table of the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    /// Maximum suggestions returned.
    pub limit: usize,
    /// Caret marker some surfaces embed in their text; stripped before analysis.
    pub cursor_marker: String,
    /// Shown for empty input when the model has too little to offer.
    pub default_words: Vec<String>,
    /// Entries used within this window get the recency bonus.
    pub recent_window_secs: u64,
    /// Shorter n-gram continuations are not suggested.
    pub min_candidate_len: usize,
    pub remote: Option<RemoteConfig>,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            limit: 6,
            cursor_marker: "|".to_string(),
            default_words: ["I", "you", "yes", "no", "the", "what"]
                .into_iter()
                .map(String::from)
                .collect(),
            recent_window_secs: 3_600,
            min_candidate_len: 2,
            remote: None,
        }
    }
}

/// External word predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    2_000
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
