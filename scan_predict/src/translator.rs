//! `translator`: store -> scored candidates.

use chrono::{DateTime, Utc};
use scan_ngram::{NgramEntry, NgramKind, NgramStore};

use crate::analysis::Analysis;
use crate::model::{Candidate, Source};

const TRIGRAM_FACTOR: f64 = 10.0;
const BIGRAM_FACTOR: f64 = 5.0;
const NGRAM_RECENT_BONUS: f64 = 1_000.0;
const LENGTH_WEIGHT: f64 = 20.0;
const LONG_COMPLETION_BONUS: f64 = 40.0;
const LONG_COMPLETION_CHARS: usize = 3;

const FREQUENT_RECENCY_WEIGHT: f64 = 20.0;
const FREQUENT_RECENT_BONUS: f64 = 5_000.0;

/// Turns the analysed input into candidates from one part of the model.
pub trait Translator: Send + Sync {
    fn translate(&self, store: &NgramStore, analysis: &Analysis, now: DateTime<Utc>) -> Vec<Candidate>;
}

/// Continuations of the last one or two context words.
pub struct NgramTranslator {
    pub recent_window_secs: u64,
    pub min_len: usize,
}

impl NgramTranslator {
    fn score(&self, factor: f64, entry: &NgramEntry, extra_chars: usize, now: DateTime<Utc>) -> f64 {
        let mut score = factor * (entry.count as f64 + entry.recency(now));
        if entry.used_within(now, self.recent_window_secs) {
            score += NGRAM_RECENT_BONUS;
        }
        score += LENGTH_WEIGHT * extra_chars as f64;
        if extra_chars > LONG_COMPLETION_CHARS {
            score += LONG_COMPLETION_BONUS;
        }
        score
    }

    fn collect(
        &self,
        store: &NgramStore,
        kind: NgramKind,
        context: &str,
        prefix: &str,
        now: DateTime<Utc>,
        out: &mut Vec<Candidate>,
    ) {
        let (factor, source) = match kind {
            NgramKind::Trigram => (TRIGRAM_FACTOR, Source::Trigram),
            _ => (BIGRAM_FACTOR, Source::Bigram),
        };
        let prefix_chars = prefix.chars().count();
        for (next, entry) in store.continuations(kind, context) {
            if entry.count == 0 || !next.starts_with(prefix) {
                continue;
            }
            let chars = next.chars().count();
            if chars < self.min_len {
                continue;
            }
            let score = self.score(factor, entry, chars - prefix_chars, now);
            out.push(Candidate::new(next, score, source));
        }
    }
}

impl Translator for NgramTranslator {
    fn translate(&self, store: &NgramStore, analysis: &Analysis, now: DateTime<Utc>) -> Vec<Candidate> {
        let mut out = Vec::new();
        if let Some(context) = analysis.trigram_context() {
            self.collect(store, NgramKind::Trigram, &context, &analysis.prefix, now, &mut out);
        }
        if let Some(context) = analysis.bigram_context() {
            self.collect(store, NgramKind::Bigram, &context, &analysis.prefix, now, &mut out);
        }
        out
    }
}

/// Completions of the prefix from the single-word table, ignoring context.
pub struct FrequentTranslator {
    pub recent_window_secs: u64,
}

impl FrequentTranslator {
    fn score(&self, entry: &NgramEntry, now: DateTime<Utc>) -> f64 {
        let mut score = entry.count as f64 + FREQUENT_RECENCY_WEIGHT * entry.recency(now);
        if entry.used_within(now, self.recent_window_secs) {
            score += FREQUENT_RECENT_BONUS;
        }
        score
    }

    /// Every stored word starting with `prefix`, the prefix itself included.
    pub fn with_prefix(&self, store: &NgramStore, prefix: &str, now: DateTime<Utc>) -> Vec<Candidate> {
        store
            .words_with_prefix(prefix)
            .map(|(word, entry)| Candidate::new(word, self.score(entry, now), Source::Frequent))
            .collect()
    }

    /// Every stored word.
    pub fn any_word(&self, store: &NgramStore, now: DateTime<Utc>) -> Vec<Candidate> {
        self.with_prefix(store, "", now)
    }
}

impl Translator for FrequentTranslator {
    fn translate(&self, store: &NgramStore, analysis: &Analysis, now: DateTime<Utc>) -> Vec<Candidate> {
        let prefix = analysis.prefix.as_str();
        let mut out = self.with_prefix(store, prefix, now);
        out.retain(|c| c.text != prefix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ngram() -> NgramTranslator {
        NgramTranslator {
            recent_window_secs: 3_600,
            min_len: 2,
        }
    }

    fn texts(c: &[Candidate]) -> Vec<&str> {
        c.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn trigram_beats_bigram_for_same_counts() {
        let now = Utc::now();
        let mut store = NgramStore::new();
        store.record_at("how are you", now - Duration::hours(2));
        store.record_at("are we", now - Duration::hours(2));
        let a = Analysis::parse("how are ", "|");

        let mut out = ngram().translate(&store, &a, now);
        out.sort_by(|a, b| b.score.total_cmp(&a.score));
        assert_eq!(out[0].text, "YOU");
        assert_eq!(out[0].source, Source::Trigram);
        assert!(texts(&out).contains(&"WE"));
    }

    #[test]
    fn continuation_must_match_prefix() {
        let now = Utc::now();
        let mut store = NgramStore::new();
        store.record_at("good morning", now);
        store.record_at("good night", now);
        let a = Analysis::parse("good mo", "|");

        let out = ngram().translate(&store, &a, now);
        assert_eq!(texts(&out), vec!["MORNING"]);
    }

    #[test]
    fn single_letter_continuations_are_dropped() {
        let now = Utc::now();
        let mut store = NgramStore::new();
        store.record_at("i am a cat", now);
        assert!(ngram().translate(&store, &Analysis::parse("am ", "|"), now).is_empty());
        assert!(ngram().translate(&store, &Analysis::parse("am a", "|"), now).is_empty());

        let out = ngram().translate(&store, &Analysis::parse("am a ", "|"), now);
        let sources: Vec<_> = out.iter().map(|c| (c.text.as_str(), c.source)).collect();
        assert_eq!(sources, vec![("CAT", Source::Trigram), ("CAT", Source::Bigram)]);
    }

    #[test]
    fn zero_count_continuations_are_ignored() {
        let now = Utc::now();
        let store = NgramStore::from_json_str(
            r#"{
                "frequent_words": {
                    "YES": { "count": 9, "last_used": "2026-03-01T09:00:00Z" },
                    "YOUNG": { "count": 9, "last_used": "2026-03-01T09:00:00Z" }
                },
                "bigrams": {
                    "ARE YOU": { "count": 0, "last_used": "2026-03-01T09:00:00Z" },
                    "ARE YOUR": { "count": 2, "last_used": "2026-03-01T09:00:00Z" }
                }
            }"#,
        )
        .unwrap();
        let out = ngram().translate(&store, &Analysis::parse("are y", "|"), now);
        assert_eq!(texts(&out), vec!["YOUR"]);

        let only_zero = NgramStore::from_json_str(
            r#"{ "bigrams": { "ARE YOU": { "count": 0, "last_used": "2026-03-01T09:00:00Z" } } }"#,
        )
        .unwrap();
        assert!(ngram().translate(&only_zero, &Analysis::parse("are y", "|"), now).is_empty());
    }

    #[test]
    fn recent_use_and_length_raise_ngram_score() {
        let now = Utc::now();
        let mut store = NgramStore::new();
        store.record_at("the dog", now - Duration::days(2));
        store.record_at("the elephant", now);
        let a = Analysis::parse("the ", "|");

        let out = ngram().translate(&store, &a, now);
        let score = |t: &str| out.iter().find(|c| c.text == t).map(|c| c.score).unwrap();
        assert!(score("ELEPHANT") > NGRAM_RECENT_BONUS);
        assert!(score("DOG") < NGRAM_RECENT_BONUS);
    }

    #[test]
    fn frequent_excludes_exact_prefix() {
        let now = Utc::now();
        let mut store = NgramStore::new();
        store.record_at("he hello help", now);
        let frequent = FrequentTranslator {
            recent_window_secs: 3_600,
        };
        let a = Analysis::parse("he", "|");
        let mut out = frequent.translate(&store, &a, now);
        out.sort_by(|a, b| a.text.cmp(&b.text));
        assert_eq!(texts(&out), vec!["HELLO", "HELP"]);
        assert_eq!(frequent.any_word(&store, now).len(), 3);
    }
}
