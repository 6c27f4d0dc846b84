//! Errors raised before a scan session starts.

use thiserror::Error;

/// Result type for scan configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `short_min_ms` must be below `hold_start_ms`, or no tap can ever register.
    #[error("{key} key: short_min_ms ({short_min_ms}) must be below hold_start_ms ({hold_start_ms})")]
    TapWindowEmpty {
        key: &'static str,
        short_min_ms: u64,
        hold_start_ms: u64,
    },

    #[error("{key} key: hold_repeat_ms must be greater than zero")]
    ZeroRepeat { key: &'static str },

    /// Two groups share an id, so `replace_items` would be ambiguous.
    #[error("duplicate scan group id: {0}")]
    DuplicateGroup(String),
}
