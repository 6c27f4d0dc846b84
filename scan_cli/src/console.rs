//! Terminal rendering of focus changes and speech.

use std::io::{self, Write};

use scan_core::{Focus, Interrupt, ScanGroup, ScanMode, ScanObserver, SpeechSink};

/// Collects one batch of controller actions as printable lines plus the
/// texts to hand to the announcer.
pub struct Transcript<'a> {
    groups: &'a [ScanGroup],
    pub lines: Vec<String>,
    pub speech: Vec<String>,
}

impl<'a> Transcript<'a> {
    pub fn new(groups: &'a [ScanGroup]) -> Self {
        Self {
            groups,
            lines: Vec::new(),
            speech: Vec::new(),
        }
    }
}

impl ScanObserver for Transcript<'_> {
    fn on_focus_changed(&mut self, focus: Focus) {
        self.lines.push(describe_focus(self.groups, focus));
    }

    fn on_announce(&mut self, text: &str) {
        self.speech.push(text.to_string());
    }

    fn on_activated(&mut self, group_index: usize, item_index: usize) {
        if let Some(item) = self
            .groups
            .get(group_index)
            .and_then(|g| g.items.get(item_index))
        {
            self.lines.push(format!("activated [{}]", item.label));
        }
    }
}

pub fn describe_focus(groups: &[ScanGroup], focus: Focus) -> String {
    let group = groups.get(focus.group_index);
    let group_label = group.map_or("?", |g| g.label.as_str());
    match (focus.mode, focus.item_index) {
        (ScanMode::Idle, _) => "idle".to_string(),
        (ScanMode::Item, Some(i)) => {
            let item = group
                .and_then(|g| g.items.get(i))
                .map_or("?", |item| item.label.as_str());
            format!("item   {group_label} > [{item}]")
        }
        _ => format!("group  [{group_label}]"),
    }
}

/// Prints utterances instead of synthesizing them.
pub struct ConsoleSpeech;

impl SpeechSink for ConsoleSpeech {
    fn speak(&mut self, text: &str, interrupt: &Interrupt) {
        if interrupt.is_superseded() {
            return;
        }
        let mut out = io::stdout().lock();
        // Nothing to recover if the terminal went away.
        let _ = writeln!(out, "  (says) {text}");
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scan_core::{Action, ScanItem, deliver};

    fn groups() -> Vec<ScanGroup> {
        vec![
            ScanGroup::new("row1", "abc").items(vec![ScanItem::inert("a"), ScanItem::inert("b")]),
            ScanGroup::new("edit", "edit").items(vec![ScanItem::inert("clear")]),
        ]
    }

    #[test]
    fn renders_group_and_item_focus() {
        let groups = groups();
        let item_focus = Focus {
            mode: ScanMode::Item,
            group_index: 0,
            item_index: Some(1),
        };
        assert_eq!(describe_focus(&groups, item_focus), "item   abc > [b]");
        let group_focus = Focus {
            mode: ScanMode::Group,
            group_index: 1,
            item_index: None,
        };
        assert_eq!(describe_focus(&groups, group_focus), "group  [edit]");
    }

    #[test]
    fn transcript_splits_lines_and_speech() {
        let groups = groups();
        let mut t = Transcript::new(&groups);
        deliver(
            vec![
                Action::Activated {
                    group_index: 0,
                    item_index: 0,
                },
                Action::Announce("a".into()),
            ],
            &mut t,
        );
        assert_eq!(t.lines, vec!["activated [a]"]);
        assert_eq!(t.speech, vec!["a"]);
    }
}
