//! Single-algorithm run controller.
//!
//! Each controller owns its array and sorts it on a dedicated thread. After
//! every step the thread publishes a [`Frame`] into a shared slot and then
//! sleeps for the step delay on a cancellation channel, so dropping or
//! cancelling the controller wakes it immediately. Observers never touch the
//! array itself: they pull the latest frame and read an atomic duration that
//! stays zero until the sort completes.

use crate::engine::{self, Interrupted, StepSink};
use crate::model::{AlgorithmKind, ConfigError, Frame, RunResult};
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// `tokio::time::interval` panics on a zero period.
pub(crate) const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Latest frame of one lane, replaced after every step.
#[derive(Debug)]
pub struct FrameSlot {
    current: Mutex<Arc<Frame>>,
}

impl FrameSlot {
    fn new(frame: Frame) -> Self {
        Self {
            current: Mutex::new(Arc::new(frame)),
        }
    }

    fn publish(&self, frame: Frame) {
        *self.lock() = Arc::new(frame);
    }

    pub fn snapshot(&self) -> Arc<Frame> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Frame>> {
        // A panicking writer cannot leave a half-written Arc behind.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Counters shared between the sort thread and its observers.
#[derive(Debug, Default)]
pub struct Progress {
    /// Elapsed nanoseconds; zero means "not complete".
    duration_ns: AtomicU64,
    frames: AtomicU64,
    started: AtomicBool,
    cancelled: AtomicBool,
}

impl Progress {
    pub fn duration(&self) -> Option<Duration> {
        match self.duration_ns.load(Ordering::Acquire) {
            0 => None,
            ns => Some(Duration::from_nanos(ns)),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> RunStatus {
        if self.duration().is_some() {
            RunStatus::Complete
        } else if self.is_cancelled() {
            RunStatus::Cancelled
        } else if self.started.load(Ordering::Relaxed) {
            RunStatus::Running
        } else {
            RunStatus::Idle
        }
    }

    /// Write the duration once. Later calls leave the first value in place.
    fn publish_duration(&self, d: Duration) {
        let _ = self.duration_ns.compare_exchange(
            0,
            nanos_nonzero(d),
            Ordering::Release,
            Ordering::Relaxed,
        );
    }
}

/// Zero is the "in progress" sentinel, so a measured zero is recorded as 1 ns.
fn nanos_nonzero(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Complete,
    Cancelled,
}

/// Read-only handle on one lane for presentation layers.
#[derive(Debug, Clone)]
pub struct LaneView {
    kind: AlgorithmKind,
    slot: Arc<FrameSlot>,
    progress: Arc<Progress>,
}

impl LaneView {
    pub fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    pub fn frame(&self) -> Arc<Frame> {
        self.slot.snapshot()
    }

    pub fn frames(&self) -> u64 {
        self.progress.frames()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.progress.duration()
    }

    pub fn status(&self) -> RunStatus {
        self.progress.status()
    }
}

/// Step sink used on the sort thread: publish, count, then wait out the delay.
struct Pacer {
    slot: Arc<FrameSlot>,
    progress: Arc<Progress>,
    delay: Duration,
    cancel_rx: Receiver<()>,
}

impl StepSink<i64> for Pacer {
    fn emit(&mut self, values: &[i64], highlight: usize) -> Result<(), Interrupted> {
        if !matches!(self.cancel_rx.try_recv(), Err(TryRecvError::Empty)) {
            return Err(Interrupted);
        }
        self.slot
            .publish(Frame::new(values.to_vec(), Some(highlight)));
        self.progress.frames.fetch_add(1, Ordering::Relaxed);

        match self.cancel_rx.recv_timeout(self.delay) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(Interrupted),
        }
    }
}

pub struct RunController {
    kind: AlgorithmKind,
    /// The array until `start` hands it to the sort thread.
    pending: Option<Vec<i64>>,
    slot: Arc<FrameSlot>,
    progress: Arc<Progress>,
    cancel_tx: Option<Sender<()>>,
    result_rx: Option<Receiver<RunResult>>,
    result: Option<RunResult>,
    handle: Option<JoinHandle<()>>,
}

impl RunController {
    pub fn new(kind: AlgorithmKind, values: Vec<i64>) -> Self {
        let slot = Arc::new(FrameSlot::new(Frame::new(values.clone(), None)));
        Self {
            kind,
            pending: Some(values),
            slot,
            progress: Arc::new(Progress::default()),
            cancel_tx: None,
            result_rx: None,
            result: None,
            handle: None,
        }
    }

    /// Spawn the sort thread. Idle -> Running.
    pub fn start(&mut self, step_delay: Duration) -> Result<()> {
        let kind = self.kind;
        let Some(mut values) = self.pending.take() else {
            return Err(ConfigError::AlreadyStarted(kind).into());
        };

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<RunResult>(1);
        let slot = self.slot.clone();
        let progress = self.progress.clone();
        let mut pacer = Pacer {
            slot: slot.clone(),
            progress: progress.clone(),
            delay: step_delay,
            cancel_rx,
        };

        let handle = std::thread::Builder::new()
            .name(format!("sort-{}", kind.slug()))
            .spawn(move || {
                let started = Instant::now();
                let outcome = engine::sort_steps(kind, &mut values, &mut pacer);
                let elapsed = started.elapsed();

                match outcome {
                    Ok(()) => {
                        let duration = Duration::from_nanos(nanos_nonzero(elapsed));
                        let frames = progress.frames();
                        slot.publish(Frame::new(values.clone(), None));
                        // Result first, then the duration: a reader that sees the
                        // duration is guaranteed to find the result waiting.
                        let _ = result_tx.send(RunResult {
                            algorithm: kind,
                            duration,
                            frames,
                            sorted: values,
                        });
                        progress.publish_duration(duration);
                        info!(algorithm = %kind, ?duration, frames, "sort complete");
                    }
                    Err(Interrupted) => {
                        debug!(algorithm = %kind, frames = progress.frames(), "sort interrupted");
                    }
                }
            })
            .with_context(|| format!("failed to spawn {kind} thread"))?;

        debug!(algorithm = %kind, ?step_delay, "sort started");
        self.progress.started.store(true, Ordering::Relaxed);
        self.cancel_tx = Some(cancel_tx);
        self.result_rx = Some(result_rx);
        self.handle = Some(handle);
        Ok(())
    }

    pub fn view(&self) -> LaneView {
        LaneView {
            kind: self.kind,
            slot: self.slot.clone(),
            progress: self.progress.clone(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.progress.status()
    }

    /// Non-blocking completion check. Returns the result once the sort has finished.
    pub fn poll(&mut self) -> Option<&RunResult> {
        if self.result.is_none() && self.progress.duration().is_some() {
            if let Some(rx) = self.result_rx.as_ref() {
                self.result = rx.try_recv().ok();
            }
        }
        self.result.as_ref()
    }

    /// Poll on a fixed interval until the sort finishes. `None` if it was never
    /// started or was cancelled.
    pub async fn wait(&mut self, poll_interval: Duration) -> Option<RunResult> {
        let mut ticker = tokio::time::interval(poll_interval.max(MIN_POLL_INTERVAL));
        loop {
            ticker.tick().await;
            if let Some(r) = self.poll() {
                return Some(r.clone());
            }
            if matches!(self.status(), RunStatus::Idle | RunStatus::Cancelled) {
                return None;
            }
        }
    }

    /// Interrupt the step delay and join the sort thread. No result is produced
    /// for a sort that had not finished yet.
    pub fn cancel(&mut self) {
        let Some(tx) = self.cancel_tx.take() else {
            return;
        };
        if self.progress.duration().is_none() {
            self.progress.cancelled.store(true, Ordering::Relaxed);
        }
        let _ = tx.try_send(());
        drop(tx);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(algorithm = %self.kind, "sort thread panicked");
            }
        }
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        self.cancel();
    }
}
