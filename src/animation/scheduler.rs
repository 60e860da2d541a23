use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;

use crate::animation::loops::LoopEngine;
use crate::config::store::ConfigStore;
use crate::foundation::error::{DepthflowError, DepthflowResult};

/// Interactive tick rate of the loop engine.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

fn check_interval(interval: Duration) -> DepthflowResult<Duration> {
    if interval.is_zero() {
        return Err(DepthflowError::config("loop tick interval must be non-zero"));
    }
    Ok(interval)
}

/// Deterministic tick accumulator for offline rendering.
///
/// Converts elapsed time into whole ticks and carries the remainder, so a 30 fps sequence
/// at the default interval advances loops by two ticks per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopClock {
    interval: Duration,
    carry: Duration,
}

impl Default for LoopClock {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            carry: Duration::ZERO,
        }
    }
}

impl LoopClock {
    pub fn new(interval: Duration) -> DepthflowResult<Self> {
        Ok(Self {
            interval: check_interval(interval)?,
            carry: Duration::ZERO,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of whole ticks due after `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        let interval = self.interval.as_nanos();
        let total = self.carry.as_nanos() + elapsed.as_nanos();
        self.carry = Duration::from_nanos(u64::try_from(total % interval).unwrap_or(u64::MAX));
        u64::try_from(total / interval).unwrap_or(u64::MAX)
    }
}

/// Background thread ticking every active loop once per interval.
///
/// One scheduler serves the whole engine. Dropping the handle stops and joins the thread.
pub struct LoopScheduler {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl LoopScheduler {
    pub fn spawn(
        engine: Arc<Mutex<LoopEngine>>,
        store: Arc<ConfigStore>,
        interval: Duration,
    ) -> DepthflowResult<Self> {
        let interval = check_interval(interval)?;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);

        let thread = std::thread::Builder::new()
            .name("depthflow-loops".to_string())
            .spawn(move || {
                tracing::debug!(?interval, "loop scheduler started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Err(err) = engine.tick(&store) {
                        tracing::warn!(%err, "loop tick rejected");
                    }
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                tracing::debug!("loop scheduler stopped");
            })
            .context("spawn loop scheduler thread")?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            ticks,
        })
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("loop scheduler thread panicked");
        }
    }
}

impl Drop for LoopScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
