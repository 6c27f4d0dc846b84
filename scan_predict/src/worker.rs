//! Background prediction.
//!
//! Requests are numbered; only the newest one is worth answering. The worker
//! collapses a backlog to its newest request before computing, and `poll`
//! drops any result that is no longer the latest.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use tracing::{debug, warn};

use crate::engine::PredictionEngine;
use crate::error::{PredictError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Answer to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub id: RequestId,
    pub text: String,
    pub words: Vec<String>,
}

enum Job {
    Predict { id: RequestId, text: String },
    Record { text: String },
}

pub struct PredictionWorker {
    jobs: Option<Sender<Job>>,
    results: Receiver<Suggestions>,
    latest: Arc<AtomicU64>,
    next_id: u64,
    handle: Option<JoinHandle<()>>,
}

impl PredictionWorker {
    pub fn spawn(engine: PredictionEngine) -> Result<Self> {
        let (job_tx, job_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let worker_latest = Arc::clone(&latest);
        let handle = thread::Builder::new()
            .name("prediction".into())
            .spawn(move || run(engine, job_rx, result_tx, worker_latest))
            .map_err(PredictError::Spawn)?;
        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            latest,
            next_id: 0,
            handle: Some(handle),
        })
    }

    /// Queues a prediction for `text`; supersedes every earlier request.
    pub fn request(&mut self, text: impl Into<String>) -> Result<RequestId> {
        let id = self.bump();
        self.send(Job::Predict {
            id,
            text: text.into(),
        })?;
        Ok(id)
    }

    /// Queues `text` to be counted into the store.
    pub fn record(&self, text: impl Into<String>) -> Result<()> {
        self.send(Job::Record { text: text.into() })
    }

    /// Any outstanding request becomes stale.
    pub fn cancel(&mut self) {
        self.bump();
    }

    pub fn latest(&self) -> Option<RequestId> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(RequestId(n)),
        }
    }

    /// The current request's result, if it has arrived.
    pub fn poll(&self) -> Option<Suggestions> {
        loop {
            match self.results.try_recv() {
                Ok(s) if self.is_current(&s) => return Some(s),
                Ok(s) => debug!(id = s.id.0, "dropping stale suggestions"),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Waits up to `timeout` for the current request's result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Suggestions> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(left) {
                Ok(s) if self.is_current(&s) => return Some(s),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn is_current(&self, s: &Suggestions) -> bool {
        s.id.0 == self.latest.load(Ordering::Acquire)
    }

    fn bump(&mut self) -> RequestId {
        self.next_id += 1;
        self.latest.store(self.next_id, Ordering::Release);
        RequestId(self.next_id)
    }

    fn send(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or(PredictError::WorkerClosed)?
            .send(job)
            .map_err(|_| PredictError::WorkerClosed)
    }
}

impl Drop for PredictionWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("prediction worker panicked");
            }
        }
    }
}

fn run(
    engine: PredictionEngine,
    jobs: Receiver<Job>,
    results: Sender<Suggestions>,
    latest: Arc<AtomicU64>,
) {
    while let Ok(job) = jobs.recv() {
        let mut pending = None;
        let mut next = Some(job);
        while let Some(job) = next {
            match job {
                Job::Record { text } => {
                    if let Err(err) = engine.record_usage(&text) {
                        warn!(error = %err, "recording usage failed");
                    }
                }
                Job::Predict { id, text } => pending = Some((id, text)),
            }
            next = jobs.try_recv().ok();
        }

        let Some((id, text)) = pending else {
            continue;
        };
        if id.0 != latest.load(Ordering::Acquire) {
            continue;
        }
        let words = engine.suggest(&text);
        if id.0 != latest.load(Ordering::Acquire) {
            continue;
        }
        if results.send(Suggestions { id, text, words }).is_err() {
            break;
        }
    }
    debug!("prediction worker stopped");
}
