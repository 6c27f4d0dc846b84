//! `timing`: classify one key's press/release/hold into `Signal`s.
//!
//! Per press/release cycle the model emits exactly one of:
//! - nothing (bounce, or a press that outlived the tap window without a hold timer firing)
//! - one `ShortActivation`
//! - `HoldStart` followed by a `HoldTick` every `hold_repeat_ms` until release
use tracing::trace;

use crate::config::KeyTiming;
use crate::key_event::{Key, Signal};
use crate::scheduler::{Fired, Scheduler, TimerId, TimerKind};

#[derive(Debug, Clone)]
pub struct ScanTimingModel {
    key: Key,
    timing: KeyTiming,
    pressed_at_ms: Option<u64>,
    hold_active: bool,
    /// Either the one-shot hold-start timer or the repeat timer, never both.
    timer: Option<TimerId>,
}

impl ScanTimingModel {
    pub fn new(key: Key, timing: KeyTiming) -> Self {
        Self {
            key,
            timing,
            pressed_at_ms: None,
            hold_active: false,
            timer: None,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn is_down(&self) -> bool {
        self.pressed_at_ms.is_some()
    }

    pub fn hold_active(&self) -> bool {
        self.hold_active
    }

    /// Records the press and arms the hold-start timer. OS auto-repeat
    /// (press while already down) is ignored.
    pub fn on_press(&mut self, scheduler: &mut dyn Scheduler) {
        if self.pressed_at_ms.is_some() {
            return;
        }
        let now = scheduler.now_ms();
        self.pressed_at_ms = Some(now);
        self.hold_active = false;
        self.timer = Some(
            scheduler.schedule_once(self.timing.hold_start_ms, TimerKind::HoldStart(self.key)),
        );
    }

    /// Handles a fired timer that belongs to this key.
    pub fn on_timer(&mut self, fired: &Fired, scheduler: &mut dyn Scheduler) -> Option<Signal> {
        if self.timer != Some(fired.id) {
            // cancelled before delivery
            return None;
        }
        match fired.kind {
            TimerKind::HoldStart(_) => {
                if self.pressed_at_ms.is_none() {
                    self.timer = None;
                    return None;
                }
                self.hold_active = true;
                self.timer = Some(scheduler.schedule_repeating(
                    self.timing.hold_repeat_ms,
                    TimerKind::HoldRepeat(self.key),
                ));
                trace!(key = self.key.name(), at_ms = fired.at_ms, "hold start");
                Some(Signal::HoldStart)
            }
            TimerKind::HoldRepeat(_) => self.hold_active.then_some(Signal::HoldTick),
        }
    }

    pub fn on_release(&mut self, scheduler: &mut dyn Scheduler) -> Option<Signal> {
        self.cancel_timer(scheduler);
        let pressed_at = self.pressed_at_ms.take()?;
        if std::mem::take(&mut self.hold_active) {
            // the hold sequence already acted
            return None;
        }
        let held = scheduler.now_ms().saturating_sub(pressed_at);
        if held >= self.timing.short_min_ms && held < self.timing.hold_start_ms {
            Some(Signal::ShortActivation)
        } else {
            trace!(key = self.key.name(), held_ms = held, "press ignored");
            None
        }
    }

    /// Stops repeating but keeps the hold latched, so the eventual release is
    /// still swallowed.
    pub fn stop_repeat(&mut self, scheduler: &mut dyn Scheduler) {
        if self.hold_active {
            self.cancel_timer(scheduler);
        }
    }

    /// Forgets the press entirely (focus lost mid-press).
    pub fn reset(&mut self, scheduler: &mut dyn Scheduler) {
        self.cancel_timer(scheduler);
        self.pressed_at_ms = None;
        self.hold_active = false;
    }

    fn cancel_timer(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
    }
}
