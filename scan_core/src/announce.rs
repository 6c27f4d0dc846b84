//! `announce`: latest-wins speech delivery.
//!
//! A single-slot mailbox sits between the scanner and a background speaker
//! thread. Putting a new utterance replaces whatever is pending and marks the
//! utterance being spoken as superseded; nothing is ever queued behind it.
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

struct Slot<T> {
    pending: Option<T>,
    /// Bumped on every `put`.
    generation: u64,
    closed: bool,
}

/// Single-slot mailbox: a new value always replaces the pending one.
pub struct LatestSlot<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(Slot {
                pending: None,
                generation: 0,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, dropping any value not yet taken. Returns its generation.
    pub fn put(&self, value: T) -> u64 {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if slot.pending.replace(value).is_some() {
            debug!(generation = slot.generation, "pending announcement replaced");
        }
        self.ready.notify_one();
        slot.generation
    }

    /// Waits for a value. `None` once closed and drained.
    pub fn take(&self) -> Option<(T, u64)> {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.pending.take() {
                return Some((value, slot.generation));
            }
            if slot.closed {
                return None;
            }
            self.ready.wait(&mut slot);
        }
    }

    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    pub fn has_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.ready.notify_all();
    }
}

/// Lets a speaking sink notice that a newer utterance arrived.
pub struct Interrupt {
    slot: Arc<LatestSlot<String>>,
    generation: u64,
}

impl Interrupt {
    pub fn is_superseded(&self) -> bool {
        self.slot.generation() != self.generation
    }
}

/// Speech collaborator (TTS engine, screen reader bridge, stdout).
///
/// Long utterances should poll `interrupt` and stop early once superseded.
pub trait SpeechSink: Send + 'static {
    fn speak(&mut self, text: &str, interrupt: &Interrupt);
}

/// Owns the speaker thread. Dropping it stops the thread after the current
/// utterance.
pub struct Announcer {
    slot: Arc<LatestSlot<String>>,
    worker: Option<JoinHandle<()>>,
}

impl Announcer {
    pub fn spawn(mut sink: impl SpeechSink) -> std::io::Result<Self> {
        let slot = Arc::new(LatestSlot::new());
        let inbox = Arc::clone(&slot);
        let worker = thread::Builder::new()
            .name("announcer".into())
            .spawn(move || {
                while let Some((text, generation)) = inbox.take() {
                    let interrupt = Interrupt {
                        slot: Arc::clone(&inbox),
                        generation,
                    };
                    sink.speak(&text, &interrupt);
                }
            })?;
        Ok(Self {
            slot,
            worker: Some(worker),
        })
    }

    pub fn announce(&self, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.slot.put(text);
    }
}

impl Drop for Announcer {
    fn drop(&mut self) {
        self.slot.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("announcer thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn put_replaces_pending_value() {
        let slot = LatestSlot::new();
        slot.put("one");
        slot.put("two");
        let generation = slot.put("three");
        assert_eq!(slot.take(), Some(("three", generation)));
        assert!(!slot.has_pending());
    }

    #[test]
    fn take_returns_none_after_close() {
        let slot: LatestSlot<u8> = LatestSlot::new();
        slot.close();
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn close_still_drains_pending() {
        let slot = LatestSlot::new();
        slot.put(7);
        slot.close();
        assert_eq!(slot.take().map(|(v, _)| v), Some(7));
        assert_eq!(slot.take(), None);
    }

    /// Blocks on the first utterance until released, recording what it spoke
    /// and whether it saw itself superseded.
    struct GatedSink {
        gate: mpsc::Receiver<()>,
        spoken: mpsc::Sender<(String, bool)>,
        first: bool,
    }

    impl SpeechSink for GatedSink {
        fn speak(&mut self, text: &str, interrupt: &Interrupt) {
            if self.first {
                self.first = false;
                let _ = self.gate.recv();
            }
            let _ = self.spoken.send((text.to_string(), interrupt.is_superseded()));
        }
    }

    #[test]
    fn only_newest_announcement_follows_in_flight_one() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (spoken_tx, spoken_rx) = mpsc::channel();
        let announcer = Announcer::spawn(GatedSink {
            gate: gate_rx,
            spoken: spoken_tx,
            first: true,
        })
        .unwrap();

        announcer.announce("row a");
        // wait until the speaker has taken "row a" off the slot
        while announcer.slot.has_pending() {
            std::thread::yield_now();
        }
        announcer.announce("row b");
        announcer.announce("row c");
        announcer.announce("row d");
        gate_tx.send(()).unwrap();

        let first = spoken_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first, ("row a".to_string(), true));
        let second = spoken_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(second, ("row d".to_string(), false));
        drop(announcer);
        assert!(spoken_rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn blank_announcements_are_skipped() {
        let (_gate_tx, gate_rx) = mpsc::channel();
        let (spoken_tx, _spoken_rx) = mpsc::channel();
        let announcer = Announcer::spawn(GatedSink {
            gate: gate_rx,
            spoken: spoken_tx,
            first: false,
        })
        .unwrap();
        announcer.announce("   ");
        assert_eq!(announcer.slot.generation(), 0);
    }
}
