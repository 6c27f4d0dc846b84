use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[store]` table of the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Longer tokens are kept out of the single-word model.
    pub max_word_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_word_len: 20,
        }
    }
}

/// `<data dir>/switchscan/ngrams.json`, or the working directory when the
/// platform has no data dir.
fn default_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("switchscan"))
        .unwrap_or_default()
        .join("ngrams.json")
}
