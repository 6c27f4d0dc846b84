use std::fmt;
use std::sync::Arc;

use crate::config::AfterActivate;

/// Capability invoked when an item is selected (button-press semantics).
pub type Activation = Arc<dyn Fn() + Send + Sync>;

/// Reads live content for spoken output (text field contents, suggestions).
pub type ContentFn = Arc<dyn Fn() -> String + Send + Sync>;

/// A leaf choice. Carries no state of its own.
#[derive(Clone)]
pub struct ScanItem {
    /// Shown and, unless `speech` is set, spoken.
    pub label: String,
    /// Spoken text when it differs from the label (e.g. "space" for " ").
    pub speech: Option<String>,
    activate: Activation,
}

impl ScanItem {
    pub fn new(label: impl Into<String>, activate: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            speech: None,
            activate: Arc::new(activate),
        }
    }

    /// An item whose activation does nothing (placeholders, tests).
    pub fn inert(label: impl Into<String>) -> Self {
        Self::new(label, || {})
    }

    pub fn speech(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    pub fn spoken(&self) -> &str {
        self.speech.as_deref().unwrap_or(&self.label)
    }

    pub fn activate(&self) {
        (self.activate)()
    }
}

impl fmt::Debug for ScanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanItem")
            .field("label", &self.label)
            .field("speech", &self.speech)
            .finish_non_exhaustive()
    }
}

/// How a group reacts to "enter" and how it is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupRole {
    /// A row of items.
    #[default]
    Items,
    /// A text field: announced and read by content, never entered.
    Text,
    /// Suggestions; target of the select-hold shortcut.
    Predictive,
}

/// A top-level bucket in the hierarchy (a keyboard row, a menu section).
///
/// Items must not change while a session addresses them by index; use
/// `ScanController::replace_items` between sessions.
#[derive(Clone)]
pub struct ScanGroup {
    pub id: String,
    pub label: String,
    pub role: GroupRole,
    pub items: Vec<ScanItem>,
    content: Option<ContentFn>,
    /// Per-group override of `ScanConfig::after_activate`.
    pub after_activate: Option<AfterActivate>,
}

impl ScanGroup {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            role: GroupRole::Items,
            items: Vec::new(),
            content: None,
            after_activate: None,
        }
    }

    pub fn items(mut self, items: Vec<ScanItem>) -> Self {
        self.items = items;
        self
    }

    pub fn item(mut self, item: ScanItem) -> Self {
        self.items.push(item);
        self
    }

    /// Marks this group as a text field read through `content`.
    pub fn text(mut self, content: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.role = GroupRole::Text;
        self.content = Some(Arc::new(content));
        self
    }

    pub fn predictive(mut self) -> Self {
        self.role = GroupRole::Predictive;
        self
    }

    pub fn after_activate(mut self, behavior: AfterActivate) -> Self {
        self.after_activate = Some(behavior);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// What to say when this group gains focus.
    pub fn focus_announcement(&self, no_items_text: &str) -> String {
        match self.role {
            GroupRole::Items => self.label.clone(),
            GroupRole::Text | GroupRole::Predictive => self.read_aloud(no_items_text),
        }
    }

    /// Current contents for read-aloud: live text for text groups, the
    /// joined item labels otherwise.
    pub fn read_aloud(&self, no_items_text: &str) -> String {
        if let Some(content) = &self.content {
            let text = content();
            let text = text.trim();
            return if text.is_empty() {
                self.label.clone()
            } else {
                text.to_string()
            };
        }
        if self.items.is_empty() {
            return no_items_text.to_string();
        }
        self.items
            .iter()
            .map(ScanItem::spoken)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Debug for ScanGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanGroup")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("role", &self.role)
            .field("items", &self.items)
            .field("after_activate", &self.after_activate)
            .finish_non_exhaustive()
    }
}

/// Scan level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Nothing focused yet; the first signal wakes into `Group`.
    #[default]
    Idle,
    Group,
    Item,
}

/// Read-only focus snapshot handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub mode: ScanMode,
    pub group_index: usize,
    /// Only set in `Item` mode.
    pub item_index: Option<usize>,
}
