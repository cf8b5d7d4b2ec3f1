// ============================================================================
// spectrumizer-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Fan-Out Counters and the Periodic Reporter
//
// The fan-out workers only ever touch two atomic counters. A separate
// reporter thread samples them on a fixed interval and hands each snapshot to
// a ProgressSink, so rendering never blocks a worker and no lock is held while
// drawing.
//
// KEY COMPONENTS:
// - ProgressState: run-scoped atomics (completed, failed) plus total and start
// - ProgressSnapshot: consistent copy used for rendering
// - ProgressSink: trait implemented by the terminal bar and the log sink
// - ProgressReporter: background sampling thread with an explicit finish()

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::utils::{format_duration, format_rate};

/// Interval between two progress samples.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// SHARED STATE
// ============================================================================

/// Counters shared by the fan-out workers and the reporter.
#[derive(Debug)]
pub struct ProgressState {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    started: Instant,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Records a task whose primary conversion succeeded.
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a task whose primary conversion failed.
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed(),
            failed: self.failed(),
            total: self.total,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Point-in-time copy of [`ProgressState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Share of tasks finished (either way), 0.0 to 100.0.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed + self.failed) as f64 * 100.0 / self.total as f64
    }

    /// Converted frames per second since the start.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%) | {} | {}",
            self.completed,
            self.total,
            self.percent(),
            format_duration(self.elapsed.as_secs_f64()),
            format_rate(self.rate()),
        )?;
        if self.failed > 0 {
            write!(f, " | {} failed", self.failed)?;
        }
        Ok(())
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives progress snapshots from the reporter thread.
pub trait ProgressSink: Send {
    fn update(&mut self, snapshot: &ProgressSnapshot);

    /// Called once with the final snapshot after the fan-out drained.
    fn finish(&mut self, snapshot: &ProgressSnapshot) {
        self.update(snapshot);
    }
}

/// Writes one `Progress:` log line per sample.
///
/// Used when stderr is not a terminal.
#[derive(Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn update(&mut self, snapshot: &ProgressSnapshot) {
        log::info!("Progress: {snapshot}");
    }
}

// ============================================================================
// REPORTER
// ============================================================================

/// Background thread sampling a [`ProgressState`] on a fixed interval.
///
/// Dropping the reporter stops it too, but the driver calls
/// [`ProgressReporter::finish`] explicitly after the scheduler has drained so
/// the final snapshot is rendered before the summary.
pub struct ProgressReporter {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn start(
        state: Arc<ProgressState>,
        interval: Duration,
        mut sink: Box<dyn ProgressSink>,
    ) -> Self {
        let (stop, stopped) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("progress".to_string())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => sink.update(&state.snapshot()),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                sink.finish(&state.snapshot());
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Progress reporting disabled: {e}");
                None
            }
        };

        Self {
            stop: Some(stop),
            handle,
        }
    }

    /// Stops sampling, renders the final snapshot and waits for the thread.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Progress reporter thread panicked");
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
