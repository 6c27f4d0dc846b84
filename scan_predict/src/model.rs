/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Trigram,
    Bigram,
    Frequent,
    Default,
}

/// A ranked suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Uppercase, as stored; lowercased only when handed to the surface.
    pub text: String,
    /// Higher ranks first.
    pub score: f64,
    pub source: Source,
}

impl Candidate {
    pub fn new(text: impl Into<String>, score: f64, source: Source) -> Self {
        Self {
            text: text.into(),
            score,
            source,
        }
    }
}
