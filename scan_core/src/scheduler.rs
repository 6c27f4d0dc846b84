//! `scheduler`: timer abstraction for hold detection.
//!
//! Conventions:
//! - time is a millisecond counter owned by the scheduler (`now_ms`)
//! - timers carry a `TimerKind` token instead of a callback; the host hands a
//!   `Fired` back to `ScanController::on_timer`
//! - `VirtualScheduler` advances only when told to, so tests never sleep
use std::collections::{BTreeMap, HashMap};

use crate::key_event::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-shot: the key has been down for `hold_start_ms`.
    HoldStart(Key),
    /// Repeating: one hold tick.
    HoldRepeat(Key),
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub at_ms: u64,
}

pub trait Scheduler {
    fn now_ms(&self) -> u64;
    fn schedule_once(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId;
    fn schedule_repeating(&mut self, interval_ms: u64, kind: TimerKind) -> TimerId;
    /// Cancelling an unknown or already-fired one-shot is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone)]
struct Pending {
    kind: TimerKind,
    repeat_ms: Option<u64>,
}

/// Deterministic scheduler driven by an explicit clock.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_id: u64,
    /// (due, id) -> timer; ordered so equal deadlines fire in scheduling order.
    queue: BTreeMap<(u64, u64), Pending>,
    due_by_id: HashMap<u64, u64>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pops the earliest timer due at or before `until_ms`, moving the clock
    /// to its deadline. Repeating timers are re-armed before returning.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > until_ms {
            return None;
        }
        let timer = self.queue.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        self.now_ms = self.now_ms.max(due);
        if let Some(interval) = timer.repeat_ms {
            self.insert(id, due + interval, timer.clone());
        }
        Some(Fired {
            id: TimerId(id),
            kind: timer.kind,
            at_ms: due,
        })
    }

    /// Moves the clock forward without firing anything. Never goes backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn insert(&mut self, id: u64, due: u64, timer: Pending) {
        self.queue.insert((due, id), timer);
        self.due_by_id.insert(id, due);
    }

    fn push(&mut self, delay_ms: u64, kind: TimerKind, repeat_ms: Option<u64>) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.insert(id, self.now_ms + delay_ms, Pending { kind, repeat_ms });
        TimerId(id)
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule_once(&mut self, delay_ms: u64, kind: TimerKind) -> TimerId {
        self.push(delay_ms, kind, None)
    }

    fn schedule_repeating(&mut self, interval_ms: u64, kind: TimerKind) -> TimerId {
        self.push(interval_ms, kind, Some(interval_ms.max(1)))
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(due) = self.due_by_id.remove(&id.0) {
            self.queue.remove(&(due, id.0));
        }
    }
}
