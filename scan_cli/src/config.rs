use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scan_core::ScanConfig;
use scan_ngram::StoreConfig;
use scan_predict::{PredictConfig, RemoteConfig};
use serde::Deserialize;

/// The whole TOML file: `[scan]`, `[prediction]`, `[store]`. Every table
/// and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub prediction: PredictConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.scan.validate()?;
        Ok(config)
    }

    pub fn store_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.store.path = path;
        }
        self
    }

    pub fn remote_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            let timeout_ms = self.prediction.remote.as_ref().map(|r| r.timeout_ms);
            let mut remote = RemoteConfig::new(url);
            if let Some(ms) = timeout_ms {
                remote.timeout_ms = ms;
            }
            self.prediction.remote = Some(remote);
        }
        self
    }
}
