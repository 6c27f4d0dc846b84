//! `engine`: the prediction pipeline.
//!
//! Flow:
//! 1. analyse raw text into context words + prefix
//! 2. n-gram continuations; when there are any they are the whole answer
//! 3. otherwise frequent-word completions padded from the rest of the vocabulary
//!    and the default words
//! 4. remote words (if configured and reachable) go in front
//!
//! `suggest*` never fails; all suggestions come back lowercase.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use scan_ngram::{NgramStore, SharedNgramStore};
use tracing::{debug, warn};

use crate::analysis::Analysis;
use crate::config::PredictConfig;
use crate::error::Result;
use crate::filter::{pad, DedupSortTruncate, Filter};
use crate::model::{Candidate, Source};
use crate::remote::{HttpSuggestionSource, RemoteQuery, SuggestionSource};
use crate::translator::{FrequentTranslator, NgramTranslator, Translator};

pub struct PredictionEngine {
    store: SharedNgramStore,
    remote: Option<Box<dyn SuggestionSource>>,
    config: PredictConfig,
    ngram: NgramTranslator,
    frequent: FrequentTranslator,
    filter: DedupSortTruncate,
}

impl PredictionEngine {
    /// Local model only; `config.remote` is ignored.
    pub fn new(store: SharedNgramStore, config: PredictConfig) -> Self {
        let ngram = NgramTranslator {
            recent_window_secs: config.recent_window_secs,
            min_len: config.min_candidate_len,
        };
        let frequent = FrequentTranslator {
            recent_window_secs: config.recent_window_secs,
        };
        let filter = DedupSortTruncate {
            limit: config.limit,
        };
        Self {
            store,
            remote: None,
            config,
            ngram,
            frequent,
            filter,
        }
    }

    /// Like [`PredictionEngine::new`], plus an HTTP source when `config.remote` is set.
    pub fn from_config(store: SharedNgramStore, config: PredictConfig) -> Result<Self> {
        let remote = config.remote.as_ref().map(HttpSuggestionSource::new).transpose()?;
        let engine = Self::new(store, config);
        Ok(match remote {
            Some(source) => engine.with_remote(Box::new(source)),
            None => engine,
        })
    }

    pub fn with_remote(mut self, source: Box<dyn SuggestionSource>) -> Self {
        self.remote = Some(source);
        self
    }

    pub fn store(&self) -> &SharedNgramStore {
        &self.store
    }

    pub fn config(&self) -> &PredictConfig {
        &self.config
    }

    pub fn suggest(&self, raw: &str) -> Vec<String> {
        self.suggest_at(raw, Utc::now())
    }

    pub fn suggest_at(&self, raw: &str, now: DateTime<Utc>) -> Vec<String> {
        let analysis = Analysis::parse(raw, &self.config.cursor_marker);
        let local = self
            .store
            .read(|store| self.local_candidates(store, &analysis, now));
        let remote = self.fetch_remote(&analysis);

        let mut seen = HashSet::new();
        let words: Vec<String> = remote
            .into_iter()
            .chain(local)
            .map(|c| c.text.to_lowercase())
            .filter(|w| seen.insert(w.clone()))
            .take(self.config.limit)
            .collect();
        debug!(
            prefix = %analysis.prefix,
            context = analysis.context.len(),
            count = words.len(),
            "suggestions"
        );
        words
    }

    /// Ranked local candidates (uppercase), at most `limit`.
    pub fn local_candidates(
        &self,
        store: &NgramStore,
        analysis: &Analysis,
        now: DateTime<Utc>,
    ) -> Vec<Candidate> {
        let limit = self.config.limit;
        if analysis.is_empty() {
            let top = self.filter.apply(self.frequent.any_word(store, now));
            return pad(top, self.default_candidates(""), limit);
        }

        let ngram = self.ngram.translate(store, analysis, now);
        if !ngram.is_empty() {
            return self.filter.apply(ngram);
        }

        let prefix = analysis.prefix.as_str();
        let chosen = self.filter.apply(self.frequent.translate(store, analysis, now));
        let chosen = pad(chosen, self.ranked(self.frequent.with_prefix(store, prefix, now)), limit);
        let chosen = pad(chosen, self.ranked(self.frequent.any_word(store, now)), limit);
        pad(chosen, self.default_candidates(prefix), limit)
    }

    /// Counts the committed text into the store and saves it.
    pub fn record_usage(&self, raw: &str) -> Result<()> {
        let text = if self.config.cursor_marker.is_empty() {
            raw.to_string()
        } else {
            raw.replace(&self.config.cursor_marker, "")
        };
        if text.trim().is_empty() {
            return Ok(());
        }
        self.store.record_and_save(&text)?;
        Ok(())
    }

    fn ranked(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.text.cmp(&b.text)));
        candidates
    }

    fn default_candidates(&self, prefix: &str) -> Vec<Candidate> {
        self.config
            .default_words
            .iter()
            .map(|w| w.to_uppercase())
            .filter(|w| w.starts_with(prefix))
            .map(|w| Candidate::new(w, 0.0, Source::Default))
            .collect()
    }

    /// Remote words in the order given; their score only records that order.
    fn fetch_remote(&self, analysis: &Analysis) -> Vec<Candidate> {
        let Some(source) = &self.remote else {
            return Vec::new();
        };
        let query = RemoteQuery {
            context: analysis.context.iter().map(|w| w.to_lowercase()).collect(),
            prefix: analysis.prefix.to_lowercase(),
            limit: self.config.limit,
        };
        match source.fetch(&query) {
            Ok(words) => words
                .iter()
                .map(|w| w.trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .enumerate()
                .map(|(rank, w)| Candidate::new(w, -(rank as f64), Source::Remote))
                .collect(),
            Err(err) => {
                warn!(error = %err, "remote prediction unavailable, using local model");
                Vec::new()
            }
        }
    }
}
