//! `filter`: candidate post-processing (dedup, ranking, padding, truncation).

use std::collections::HashSet;

use crate::model::Candidate;

pub trait Filter: Send + Sync {
    fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Sorts by score (descending, ties by text), keeps each text once at its
/// best score, truncates to `limit`.
pub struct DedupSortTruncate {
    pub limit: usize,
}

impl Filter for DedupSortTruncate {
    fn apply(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.text.cmp(&b.text)));
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.text.clone()));
        candidates.truncate(self.limit);
        candidates
    }
}

/// Tops `chosen` up to `limit` from `pool`, in pool order, skipping texts
/// already present.
pub fn pad(mut chosen: Vec<Candidate>, pool: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    let mut seen: HashSet<String> = chosen.iter().map(|c| c.text.clone()).collect();
    for candidate in pool {
        if chosen.len() >= limit {
            break;
        }
        if seen.insert(candidate.text.clone()) {
            chosen.push(candidate);
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn c(text: &str, score: f64) -> Candidate {
        Candidate::new(text, score, Source::Frequent)
    }

    #[test]
    fn dedup_keeps_best_score_even_when_not_adjacent() {
        let f = DedupSortTruncate { limit: 6 };
        let out = f.apply(vec![c("YOU", 5.0), c("YES", 7.0), c("YOU", 9.0), c("YAK", 1.0)]);
        let texts: Vec<_> = out.iter().map(|c| (c.text.as_str(), c.score)).collect();
        assert_eq!(texts, vec![("YOU", 9.0), ("YES", 7.0), ("YAK", 1.0)]);
    }

    #[test]
    fn ties_break_alphabetically_and_truncate() {
        let f = DedupSortTruncate { limit: 2 };
        let out = f.apply(vec![c("C", 1.0), c("B", 1.0), c("A", 1.0)]);
        let texts: Vec<_> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[test]
    fn pad_skips_duplicates_and_stops_at_limit() {
        let out = pad(
            vec![c("HELLO", 3.0)],
            vec![c("HELLO", 1.0), c("HELP", 1.0), c("HI", 1.0), c("HEY", 1.0)],
            3,
        );
        let texts: Vec<_> = out.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["HELLO", "HELP", "HI"]);
    }
}
