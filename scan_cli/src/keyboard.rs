//! The scanning keyboard: message field, suggestion row, letter rows and an
//! edit row, all writing into one shared `StringBuffer`.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use scan_core::{AfterActivate, ScanGroup, ScanItem, StringBuffer, TextBuffer};

pub const TEXT_GROUP: &str = "text";
pub const PREDICT_GROUP: &str = "predict";

const LETTER_ROWS: &[(&str, &str)] = &[
    ("row1", "abcdef"),
    ("row2", "ghijkl"),
    ("row3", "mnopqr"),
    ("row4", "stuvwx"),
    ("row5", "yz.,?'"),
];

/// Requests an item makes of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// Say the message aloud and learn from it.
    Speak(String),
}

pub struct Keyboard {
    text: Arc<Mutex<StringBuffer>>,
    events_tx: Sender<KeyboardEvent>,
    events_rx: Receiver<KeyboardEvent>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            text: Arc::new(Mutex::new(StringBuffer::new())),
            events_tx,
            events_rx,
        }
    }

    pub fn text(&self) -> String {
        self.text.lock().get_text()
    }

    pub fn groups(&self) -> Vec<ScanGroup> {
        let reader = Arc::clone(&self.text);
        let mut groups = vec![
            ScanGroup::new(TEXT_GROUP, "empty message").text(move || reader.lock().get_text()),
            ScanGroup::new(PREDICT_GROUP, "suggestions").predictive(),
        ];
        groups.extend(
            LETTER_ROWS
                .iter()
                .map(|(id, letters)| self.letter_row(id, letters)),
        );
        groups.push(self.edit_row());
        groups
    }

    /// Items for the suggestion row; choosing one completes the current word.
    pub fn suggestion_items(&self, words: &[String]) -> Vec<ScanItem> {
        words
            .iter()
            .map(|word| {
                let text = Arc::clone(&self.text);
                let word = word.clone();
                ScanItem::new(word.clone(), move || text.lock().complete_word(&word))
            })
            .collect()
    }

    pub fn drain_events(&self) -> Vec<KeyboardEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Stays on its letters after each one so a word can be typed without
    /// rescanning the rows; a select hold leaves.
    fn letter_row(&self, id: &str, letters: &str) -> ScanGroup {
        let items = letters
            .chars()
            .map(|c| {
                let text = Arc::clone(&self.text);
                let item = ScanItem::new(c.to_string(), move || text.lock().append(&c.to_string()));
                match spoken_name(c) {
                    Some(name) => item.speech(name),
                    None => item,
                }
            })
            .collect();
        ScanGroup::new(id, letters)
            .items(items)
            .after_activate(AfterActivate::StayInItems)
    }

    fn edit_row(&self) -> ScanGroup {
        let edit = |label: &str, f: fn(&mut StringBuffer)| {
            let text = Arc::clone(&self.text);
            ScanItem::new(label, move || f(&mut *text.lock()))
        };
        let speak = {
            let text = Arc::clone(&self.text);
            let events = self.events_tx.clone();
            ScanItem::new("speak", move || {
                let message = text.lock().get_text();
                // The receiver lives as long as the keyboard.
                let _ = events.send(KeyboardEvent::Speak(message));
            })
        };
        ScanGroup::new("edit", "edit").items(vec![
            edit("_", |t| t.append(" ")).speech("space"),
            edit("<", |t| t.delete_last_char()).speech("delete"),
            edit("<<", |t| t.delete_last_word()).speech("delete word"),
            edit("clear", |t| t.clear()),
            speak,
        ])
    }
}

fn spoken_name(c: char) -> Option<&'static str> {
    match c {
        '.' => Some("period"),
        ',' => Some("comma"),
        '?' => Some("question mark"),
        '\'' => Some("apostrophe"),
        _ => None,
    }
}
