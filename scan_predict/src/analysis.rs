use scan_ngram::tokenize;

/// Raw input split for prediction.
///
/// - trailing whitespace: predict the next whole word (`prefix` empty)
/// - trailing punctuation-only token (`"hi ,"`): also the next whole word
/// - otherwise: complete the last word (`prefix` = last word)
///
/// All words are uppercase, matching the store's keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Analysis {
    pub context: Vec<String>,
    pub prefix: String,
}

impl Analysis {
    pub fn parse(raw: &str, cursor_marker: &str) -> Self {
        let text = if cursor_marker.is_empty() {
            raw.to_string()
        } else {
            raw.replace(cursor_marker, "")
        };
        let mut words = tokenize(&text);
        let partial = match text.split_whitespace().last() {
            Some(token) if !text.ends_with(char::is_whitespace) => !tokenize(token).is_empty(),
            _ => false,
        };
        let prefix = if partial {
            words.pop().unwrap_or_default()
        } else {
            String::new()
        };
        Self {
            context: words,
            prefix,
        }
    }

    /// Nothing typed at all.
    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.prefix.is_empty()
    }

    /// Context key for bigram lookups: the last context word.
    pub fn bigram_context(&self) -> Option<String> {
        self.context.last().cloned()
    }

    /// Context key for trigram lookups: the last two context words.
    pub fn trigram_context(&self) -> Option<String> {
        match self.context.as_slice() {
            [.., a, b] => Some(format!("{a} {b}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Analysis {
        Analysis::parse(raw, "|")
    }

    #[test]
    fn trailing_space_predicts_next_word() {
        let a = parse("how are ");
        assert_eq!(a.context, vec!["HOW", "ARE"]);
        assert_eq!(a.prefix, "");
        assert_eq!(a.trigram_context().as_deref(), Some("HOW ARE"));
        assert_eq!(a.bigram_context().as_deref(), Some("ARE"));
    }

    #[test]
    fn partial_word_becomes_prefix() {
        let a = parse("how are yo");
        assert_eq!(a.context, vec!["HOW", "ARE"]);
        assert_eq!(a.prefix, "YO");

        let single = parse("he");
        assert!(single.context.is_empty());
        assert_eq!(single.prefix, "HE");
        assert_eq!(single.bigram_context(), None);
    }

    #[test]
    fn cursor_marker_is_stripped() {
        let a = parse("see you|");
        assert_eq!(a.context, vec!["SEE"]);
        assert_eq!(a.prefix, "YOU");

        let spaced = parse("see you |");
        assert_eq!(spaced.prefix, "");
        assert_eq!(spaced.context, vec!["SEE", "YOU"]);
    }

    #[test]
    fn trailing_punctuation_keeps_context_and_empties_prefix() {
        let a = parse("hi ,");
        assert_eq!(a.context, vec!["HI"]);
        assert_eq!(a.prefix, "");

        let stop = parse("see you.");
        assert_eq!(stop.context, vec!["SEE"]);
        assert_eq!(stop.prefix, "YOU");

        let quoted = parse("it's ?|");
        assert_eq!(quoted.context, vec!["IT'S"]);
        assert_eq!(quoted.prefix, "");
        assert!(parse("...").is_empty());
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
        assert!(parse("|").is_empty());
        assert!(!parse("a").is_empty());
    }

    #[test]
    fn trigram_context_uses_last_two_words() {
        let a = parse("well how are ");
        assert_eq!(a.trigram_context().as_deref(), Some("HOW ARE"));
        assert_eq!(parse("are ").trigram_context(), None);
    }
}
