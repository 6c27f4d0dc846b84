//! `processor`: the signal handling chain.
//!
//! Each processor looks at one `SwitchSignal`, may change `ScanState`, and
//! may produce `Action`s. The first processor that returns `Consume` ends the
//! chain.
//!
//! Chain assembled by `ScanController::new`:
//! - `CooldownProcessor`: drops signals that follow an acted-on signal too closely
//! - `IdleWakeProcessor`: the first signal of an idle session only wakes it
//! - `ScanKeyProcessor`: tap = advance, hold = retreat (repeating)
//! - `SelectKeyProcessor`: tap = enter/activate, hold = escape/jump
use tracing::debug;

use crate::{
    config::ScanConfig,
    context::ScanState,
    key_event::{Action, Key, Signal, SwitchSignal},
    model::{ScanGroup, ScanMode},
};

/// Read-only view of the session handed to processors.
pub struct ScanEnv<'a> {
    pub groups: &'a [ScanGroup],
    pub config: &'a ScanConfig,
    pub now_ms: u64,
}

/// Whether a processor handled the signal.
///
/// - `Consume`: handled; later processors do not run
/// - `Continue`: not for this processor; pass it on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Consume,
    Continue,
}

pub trait Processor: Send + Sync {
    fn process(
        &mut self,
        env: &ScanEnv<'_>,
        state: &mut ScanState,
        signal: &SwitchSignal,
    ) -> (ProcessStatus, Vec<Action>);
}

/// Absorbs accidental double presses. Hold ticks are the intended repeat
/// cadence and pass through.
pub struct CooldownProcessor;

impl Processor for CooldownProcessor {
    fn process(
        &mut self,
        env: &ScanEnv<'_>,
        state: &mut ScanState,
        signal: &SwitchSignal,
    ) -> (ProcessStatus, Vec<Action>) {
        if signal.signal == Signal::HoldTick {
            return (ProcessStatus::Continue, Vec::new());
        }
        match state.last_signal_ms {
            Some(last) if env.now_ms.saturating_sub(last) < env.config.cooldown_ms => {
                debug!(
                    key = signal.key.name(),
                    since_ms = env.now_ms - last,
                    "signal inside cooldown dropped"
                );
                (ProcessStatus::Consume, Vec::new())
            }
            _ => (ProcessStatus::Continue, Vec::new()),
        }
    }
}

pub struct IdleWakeProcessor;

impl Processor for IdleWakeProcessor {
    fn process(
        &mut self,
        env: &ScanEnv<'_>,
        state: &mut ScanState,
        _signal: &SwitchSignal,
    ) -> (ProcessStatus, Vec<Action>) {
        if state.mode != ScanMode::Idle {
            return (ProcessStatus::Continue, Vec::new());
        }
        debug!("scanner woke");
        (ProcessStatus::Consume, state.wake(env.groups, env.config))
    }
}

pub struct ScanKeyProcessor;

impl Processor for ScanKeyProcessor {
    fn process(
        &mut self,
        env: &ScanEnv<'_>,
        state: &mut ScanState,
        signal: &SwitchSignal,
    ) -> (ProcessStatus, Vec<Action>) {
        if signal.key != Key::Scan {
            return (ProcessStatus::Continue, Vec::new());
        }
        let actions = match signal.signal {
            Signal::ShortActivation => state.advance(env.groups, env.config),
            Signal::HoldStart | Signal::HoldTick => state.retreat(env.groups, env.config),
        };
        (ProcessStatus::Consume, actions)
    }
}

pub struct SelectKeyProcessor;

impl Processor for SelectKeyProcessor {
    fn process(
        &mut self,
        env: &ScanEnv<'_>,
        state: &mut ScanState,
        signal: &SwitchSignal,
    ) -> (ProcessStatus, Vec<Action>) {
        if signal.key != Key::Select {
            return (ProcessStatus::Continue, Vec::new());
        }
        let actions = match (signal.signal, state.mode) {
            (Signal::ShortActivation, ScanMode::Group) => state.enter(env.groups, env.config),
            (Signal::ShortActivation, ScanMode::Item) => state.activate(env.groups, env.config),
            (Signal::HoldStart, ScanMode::Item) => state.escape(env.config),
            (Signal::HoldStart, ScanMode::Group) => {
                state.jump_to_predictive(env.groups, env.config)
            }
            // select has no repeat meaning; idle is handled earlier in the chain
            (Signal::HoldTick, _) | (_, ScanMode::Idle) => Vec::new(),
        };
        (ProcessStatus::Consume, actions)
    }
}
