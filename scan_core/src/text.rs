/// Text composition collaborator used by keyboard surfaces.
pub trait TextBuffer: Send {
    fn get_text(&self) -> String;
    fn append(&mut self, text: &str);
    fn delete_last_char(&mut self);
    /// Removes the last word and any whitespace after it, keeping the space
    /// before it ("how are yo" -> "how are ").
    fn delete_last_word(&mut self);
    fn clear(&mut self);
}

/// In-memory `TextBuffer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    text: String,
}

impl StringBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the partial word being typed with `word` and a trailing space.
    /// A trailing punctuation-only token is kept and `word` follows it.
    pub fn complete_word(&mut self, word: &str) {
        if !self.text.is_empty() && !self.text.ends_with(char::is_whitespace) {
            let last = self.text.split_whitespace().last().unwrap_or_default();
            if last.chars().any(char::is_alphanumeric) {
                self.delete_last_word();
            } else {
                self.text.push(' ');
            }
        }
        self.text.push_str(word);
        self.text.push(' ');
    }
}

impl TextBuffer for StringBuffer {
    fn get_text(&self) -> String {
        self.text.clone()
    }

    fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn delete_last_char(&mut self) {
        self.text.pop();
    }

    fn delete_last_word(&mut self) {
        let trimmed = self.text.trim_end().len();
        self.text.truncate(trimmed);
        let start = self
            .text
            .rfind(char::is_whitespace)
            .map(|i| i + self.text[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.text.truncate(start);
    }

    fn clear(&mut self) {
        self.text.clear();
    }
}
