//! Scan session configuration (deserialized from the host's `[scan]` table).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::key_event::Key;

/// Timing thresholds for one key, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyTiming {
    /// Presses shorter than this are bounce.
    pub short_min_ms: u64,
    /// Presses at least this long become a hold.
    pub hold_start_ms: u64,
    /// Interval between hold ticks.
    pub hold_repeat_ms: u64,
}

impl Default for KeyTiming {
    fn default() -> Self {
        Self {
            short_min_ms: 50,
            hold_start_ms: 800,
            hold_repeat_ms: 600,
        }
    }
}

impl KeyTiming {
    fn validate(&self, key: Key) -> Result<()> {
        if self.short_min_ms >= self.hold_start_ms {
            return Err(ConfigError::TapWindowEmpty {
                key: key.name(),
                short_min_ms: self.short_min_ms,
                hold_start_ms: self.hold_start_ms,
            });
        }
        if self.hold_repeat_ms == 0 {
            return Err(ConfigError::ZeroRepeat { key: key.name() });
        }
        Ok(())
    }
}

/// Where focus goes after an item is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfterActivate {
    /// Back to group scanning, same group.
    #[default]
    ReturnToGroups,
    /// Stay on the activated item (typing several letters from one row).
    StayInItems,
}

/// What item advance does at the end of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemWrap {
    #[default]
    WithinGroup,
    /// Continue into the next (or previous) non-empty group.
    FlowIntoNextGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan_key: KeyTiming,
    pub select_key: KeyTiming,
    /// Signals inside this window after an acted-on signal are dropped.
    pub cooldown_ms: u64,
    /// Start with nothing focused; the first signal only wakes the scanner.
    pub start_idle: bool,
    pub after_activate: AfterActivate,
    pub item_wrap: ItemWrap,
    pub no_items_text: String,
    /// Spoken when escaping from items back to groups.
    pub groups_text: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_key: KeyTiming::default(),
            select_key: KeyTiming::default(),
            cooldown_ms: 500,
            start_idle: true,
            after_activate: AfterActivate::default(),
            item_wrap: ItemWrap::default(),
            no_items_text: "no items".to_string(),
            groups_text: "rows".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn timing(&self, key: Key) -> KeyTiming {
        match key {
            Key::Scan => self.scan_key,
            Key::Select => self.select_key,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.scan_key.validate(Key::Scan)?;
        self.select_key.validate(Key::Select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ScanConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_tap_window() {
        let mut config = ScanConfig::default();
        config.select_key.short_min_ms = 900;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TapWindowEmpty { key: "select", .. })
        ));
    }

    #[test]
    fn rejects_zero_repeat() {
        let mut config = ScanConfig::default();
        config.scan_key.hold_repeat_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroRepeat { key: "scan" })
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ScanConfig = toml::from_str(
            r#"
            cooldown_ms = 300
            after_activate = "stay_in_items"

            [scan_key]
            hold_start_ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.cooldown_ms, 300);
        assert_eq!(config.after_activate, AfterActivate::StayInItems);
        assert_eq!(config.scan_key.hold_start_ms, 1000);
        assert_eq!(config.scan_key.short_min_ms, 50);
        assert_eq!(config.item_wrap, ItemWrap::WithinGroup);
        assert!(config.start_idle);
    }
}
