//! `scan_core`: single-switch scanning logic. No file or network I/O.
//!
//! Layers:
//! - **timing**: press/release/hold timers -> `Signal`
//! - **processor**: ordered chain that turns a `SwitchSignal` into state changes on `ScanState`
//! - **session**: `ScanController`, the object a host drives (keys in, `Action`s out)
//! - **announce** / **text**: collaborators shared by every scanning surface
pub mod announce;
pub mod config;
pub mod context;
pub mod error;
pub mod feedback;
pub mod key_event;
pub mod model;
pub mod processor;
pub mod scheduler;
pub mod session;
pub mod text;
pub mod timing;

pub use announce::{Announcer, Interrupt, LatestSlot, SpeechSink};
pub use config::{AfterActivate, ItemWrap, KeyTiming, ScanConfig};
pub use error::{ConfigError, Result};
pub use feedback::{ScanObserver, deliver};
pub use key_event::{Action, Key, Signal, SwitchSignal};
pub use model::{Focus, GroupRole, ScanGroup, ScanItem, ScanMode};
pub use scheduler::{Fired, Scheduler, TimerId, TimerKind, VirtualScheduler};
pub use session::ScanController;
pub use text::{StringBuffer, TextBuffer};
