use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::entry::NgramEntry;
use crate::error::{Result, StoreError};

/// Which table a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NgramKind {
    Word,
    Bigram,
    Trigram,
}

/// File format (UTF-8 JSON):
///
/// ```json
/// {
///   "frequent_words": { "HELLO": { "count": 5, "last_used": "2026-03-01T09:00:00Z" } },
///   "bigrams":        { "HOW ARE": { ... } },
///   "trigrams":       { "HOW ARE YOU": { ... } }
/// }
/// ```
///
/// Tables are `BTreeMap`s so prefix lookups are a range scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgramStore {
    #[serde(default)]
    frequent_words: BTreeMap<String, NgramEntry>,
    #[serde(default)]
    bigrams: BTreeMap<String, NgramEntry>,
    #[serde(default)]
    trigrams: BTreeMap<String, NgramEntry>,
    #[serde(skip, default = "default_max_word_len")]
    max_word_len: usize,
}

fn default_max_word_len() -> usize {
    20
}

impl Default for NgramStore {
    fn default() -> Self {
        Self {
            frequent_words: BTreeMap::new(),
            bigrams: BTreeMap::new(),
            trigrams: BTreeMap::new(),
            max_word_len: default_max_word_len(),
        }
    }
}

impl NgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps single-word length (minimum 1). Existing entries are kept.
    pub fn max_word_len(mut self, n: usize) -> Self {
        self.max_word_len = n.max(1);
        self
    }

    /// Loads `path`; a missing or unreadable file gives an empty store.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(Some(store)) => {
                debug!(
                    path = %path.display(),
                    words = store.frequent_words.len(),
                    bigrams = store.bigrams.len(),
                    trigrams = store.trigrams.len(),
                    "ngram store loaded"
                );
                store
            }
            Ok(None) => {
                debug!(path = %path.display(), "no ngram store yet, starting empty");
                Self::new()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ngram store unreadable, starting empty");
                Self::new()
            }
        }
    }

    /// Like `load`, but reports why. `Ok(None)` when the file does not exist.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_json_str(&raw).map(Some)
    }

    /// Parses the file format, upper-casing keys. Keys that collide after
    /// case folding are merged.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: NgramStore = serde_json::from_str(raw)?;
        Ok(Self {
            frequent_words: normalize_keys(parsed.frequent_words),
            bigrams: normalize_keys(parsed.bigrams),
            trigrams: normalize_keys(parsed.trigrams),
            max_word_len: default_max_word_len(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes atomically: temp file in the same directory, then rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let io_err = |source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        let json = serde_json::to_vec_pretty(self)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| StoreError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        debug!(path = %path.display(), bytes = json.len(), "ngram store saved");
        Ok(())
    }

    pub fn record(&mut self, text: &str) {
        self.record_at(text, Utc::now());
    }

    /// Counts every word (up to the length cap), adjacent pair, and adjacent
    /// triple in `text`.
    pub fn record_at(&mut self, text: &str, now: DateTime<Utc>) {
        let words = tokenize(text);
        for w in &words {
            if w.chars().count() <= self.max_word_len {
                upsert(&mut self.frequent_words, w.clone(), now);
            }
        }
        for pair in words.windows(2) {
            upsert(&mut self.bigrams, pair.join(" "), now);
        }
        for triple in words.windows(3) {
            upsert(&mut self.trigrams, triple.join(" "), now);
        }
    }

    pub fn table(&self, kind: NgramKind) -> &BTreeMap<String, NgramEntry> {
        match kind {
            NgramKind::Word => &self.frequent_words,
            NgramKind::Bigram => &self.bigrams,
            NgramKind::Trigram => &self.trigrams,
        }
    }

    pub fn get(&self, kind: NgramKind, key: &str) -> Option<&NgramEntry> {
        self.table(kind).get(&key.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.frequent_words.is_empty() && self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    /// Every stored word starting with `prefix` (uppercase), including `prefix` itself.
    pub fn words_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a NgramEntry)> + 'a {
        prefixed(&self.frequent_words, prefix)
    }

    /// For keys of `kind` that start with `context + " "`, yields the token
    /// right after the context together with the key's entry.
    ///
    /// `context` is uppercase and space-joined (one word for bigrams, two for
    /// trigrams).
    pub fn continuations<'a>(
        &'a self,
        kind: NgramKind,
        context: &str,
    ) -> impl Iterator<Item = (&'a str, &'a NgramEntry)> + use<'a> {
        let lead = format!("{context} ");
        let skip = lead.len();
        self.table(kind)
            .range(lead.clone()..)
            .take_while(move |(key, _)| key.starts_with(&lead))
            .filter_map(move |(key, entry)| {
                let next = key[skip..].split(' ').next()?;
                (!next.is_empty()).then_some((next, entry))
            })
    }
}

fn prefixed<'a>(
    table: &'a BTreeMap<String, NgramEntry>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a str, &'a NgramEntry)> + 'a {
    table
        .range(prefix.to_string()..)
        .take_while(move |(key, _)| key.starts_with(prefix))
        .map(|(key, entry)| (key.as_str(), entry))
}

fn upsert(table: &mut BTreeMap<String, NgramEntry>, key: String, now: DateTime<Utc>) {
    table
        .entry(key)
        .and_modify(|e| e.touch(now))
        .or_insert_with(|| NgramEntry::new(now));
}

fn normalize_keys(table: BTreeMap<String, NgramEntry>) -> BTreeMap<String, NgramEntry> {
    let mut out: BTreeMap<String, NgramEntry> = BTreeMap::new();
    for (key, entry) in table {
        let key = key.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        if key.is_empty() {
            continue;
        }
        match out.get_mut(&key) {
            Some(existing) => existing.absorb(entry),
            None => {
                out.insert(key, entry);
            }
        }
    }
    out
}

/// Uppercase words of `text` with leading/trailing punctuation removed
/// ("Hello, world!" -> ["HELLO", "WORLD"]; inner apostrophes stay).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect()
}
