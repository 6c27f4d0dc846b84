//! `ScanState`: the single state container shared by the processor chain.
//!
//! Conventions:
//! - `mode == Group` implies `group_index < groups.len()`
//! - `mode == Item` implies `item_index < groups[group_index].items.len()`
//! - every index move is modulo the current length, so neither bound is ever
//!   checked after the fact
//! - each transition returns the `Action`s the host must perform
use tracing::debug;

use crate::{
    config::{AfterActivate, ItemWrap, ScanConfig},
    key_event::Action,
    model::{Focus, GroupRole, ScanGroup, ScanMode},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub mode: ScanMode,
    pub group_index: usize,
    pub item_index: usize,
    /// Virtual time of the last signal that produced actions.
    pub last_signal_ms: Option<u64>,
    /// A hold sequence is in progress on either key.
    pub hold_active: bool,
}

impl ScanState {
    /// Fresh state for a new session.
    pub fn start(config: &ScanConfig, groups: &[ScanGroup]) -> Self {
        let mode = if config.start_idle || groups.is_empty() {
            ScanMode::Idle
        } else {
            ScanMode::Group
        };
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn focus(&self) -> Focus {
        Focus {
            mode: self.mode,
            group_index: self.group_index,
            item_index: (self.mode == ScanMode::Item).then_some(self.item_index),
        }
    }

    /// Idle -> Group on the first signal, focusing group 0.
    pub fn wake(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        let Some(first) = groups.first() else {
            return vec![Action::Announce(config.no_items_text.clone())];
        };
        self.mode = ScanMode::Group;
        self.group_index = 0;
        self.item_index = 0;
        vec![
            Action::FocusChanged(self.focus()),
            Action::Announce(first.focus_announcement(&config.no_items_text)),
        ]
    }

    pub fn advance(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        self.step(groups, config, true)
    }

    pub fn retreat(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        self.step(groups, config, false)
    }

    fn step(&mut self, groups: &[ScanGroup], config: &ScanConfig, forward: bool) -> Vec<Action> {
        match self.mode {
            ScanMode::Idle => self.wake(groups, config),
            ScanMode::Group => {
                if groups.is_empty() {
                    return vec![Action::Announce(config.no_items_text.clone())];
                }
                self.group_index = wrap(self.group_index, groups.len(), forward);
                self.announce_group(groups, config)
            }
            ScanMode::Item => {
                let len = groups[self.group_index].items.len();
                let at_edge = if forward {
                    self.item_index + 1 == len
                } else {
                    self.item_index == 0
                };
                if at_edge && config.item_wrap == ItemWrap::FlowIntoNextGroup {
                    if let Some(next) = neighbour_with_items(groups, self.group_index, forward) {
                        self.group_index = next;
                        self.item_index = if forward {
                            0
                        } else {
                            groups[next].items.len() - 1
                        };
                        return self.announce_item(groups);
                    }
                }
                self.item_index = wrap(self.item_index, len, forward);
                self.announce_item(groups)
            }
        }
    }

    /// Select tap in group mode.
    pub fn enter(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        let Some(group) = groups.get(self.group_index) else {
            return Vec::new();
        };
        if group.role == GroupRole::Text {
            // a text field has nothing to scan; read it instead
            return vec![Action::Announce(group.read_aloud(&config.no_items_text))];
        }
        if group.is_empty() {
            return vec![Action::Announce(config.no_items_text.clone())];
        }
        debug!(group = %group.id, "enter items");
        self.mode = ScanMode::Item;
        self.item_index = 0;
        self.announce_item(groups)
    }

    /// Select tap in item mode: run the item, then return to groups unless
    /// the group or config asks to stay.
    pub fn activate(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        let group = &groups[self.group_index];
        let Some(item) = group.items.get(self.item_index) else {
            self.mode = ScanMode::Group;
            return vec![
                Action::FocusChanged(self.focus()),
                Action::Announce(config.no_items_text.clone()),
            ];
        };
        debug!(group = %group.id, item = %item.label, "activate");
        item.activate();
        let mut actions = vec![Action::Activated {
            group_index: self.group_index,
            item_index: self.item_index,
        }];
        let behavior = group.after_activate.unwrap_or(config.after_activate);
        if behavior == AfterActivate::ReturnToGroups {
            self.mode = ScanMode::Group;
            actions.push(Action::FocusChanged(self.focus()));
        }
        actions
    }

    /// Select hold in item mode: back to groups without activating.
    pub fn escape(&mut self, config: &ScanConfig) -> Vec<Action> {
        self.mode = ScanMode::Group;
        vec![
            Action::FocusChanged(self.focus()),
            Action::Announce(config.groups_text.clone()),
        ]
    }

    /// Select hold in group mode: focus the predictive group and read it.
    pub fn jump_to_predictive(&mut self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        let Some(index) = groups.iter().position(|g| g.role == GroupRole::Predictive) else {
            debug!("no predictive group to jump to");
            return Vec::new();
        };
        self.mode = ScanMode::Group;
        self.group_index = index;
        vec![
            Action::FocusChanged(self.focus()),
            Action::Announce(groups[index].read_aloud(&config.no_items_text)),
        ]
    }

    fn announce_group(&self, groups: &[ScanGroup], config: &ScanConfig) -> Vec<Action> {
        vec![
            Action::FocusChanged(self.focus()),
            Action::Announce(groups[self.group_index].focus_announcement(&config.no_items_text)),
        ]
    }

    fn announce_item(&self, groups: &[ScanGroup]) -> Vec<Action> {
        let item = &groups[self.group_index].items[self.item_index];
        vec![
            Action::FocusChanged(self.focus()),
            Action::Announce(item.spoken().to_string()),
        ]
    }
}

fn wrap(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

/// Nearest group after (or before) `from`, wrapping, that has items.
fn neighbour_with_items(groups: &[ScanGroup], from: usize, forward: bool) -> Option<usize> {
    let len = groups.len();
    let mut index = from;
    for _ in 1..len {
        index = wrap(index, len, forward);
        if groups[index].role != GroupRole::Text && !groups[index].is_empty() {
            return Some(index);
        }
    }
    None
}
