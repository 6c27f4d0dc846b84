/// The two physical switches.
///
/// - `Scan` (spacebar in practice): tap = advance, hold = retreat with repeat
/// - `Select` (enter in practice): tap = enter/activate, hold = escape/jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Scan,
    Select,
}

impl Key {
    pub fn name(self) -> &'static str {
        match self {
            Key::Scan => "scan",
            Key::Select => "select",
        }
    }
}

/// Classified input (output of `ScanTimingModel`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Press released inside the tap window.
    ShortActivation,
    /// Key held past the hold threshold (fires once per press).
    HoldStart,
    /// Repeat while the key stays down after `HoldStart`.
    HoldTick,
}

/// A classified signal together with the key that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchSignal {
    pub key: Key,
    pub signal: Signal,
}

impl SwitchSignal {
    pub fn new(key: Key, signal: Signal) -> Self {
        Self { key, signal }
    }
}

/// Side effects requested from the host (renderer, speech, text surface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Focus moved; render it.
    FocusChanged(crate::model::Focus),
    /// Speak this text (latest wins, see `announce`).
    Announce(String),
    /// An item's `activate()` capability was invoked.
    Activated {
        group_index: usize,
        item_index: usize,
    },
}
