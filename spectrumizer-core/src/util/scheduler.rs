//! Bounded fan-out over a slice of tasks.
//!
//! Each task runs exactly once. Outcomes are tallied into a [`FanOutReport`]
//! and mirrored into the shared [`ProgressState`] as they happen.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use super::gate::AdmissionGate;
use crate::error::{CoreError, CoreResult};
use crate::progress::ProgressState;

/// Result of one fan-out task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<E> {
    /// Every step succeeded.
    Completed,
    /// The primary step succeeded but a follow-up step failed. Counts as
    /// completed; the failure is still recorded.
    Degraded(E),
    /// The primary step failed.
    Failed(E),
}

/// Aggregate result of a fan-out run.
#[derive(Debug)]
pub struct FanOutReport<E> {
    pub total: usize,
    /// Tasks whose primary step succeeded
    pub completed: usize,
    /// Tasks whose primary step failed
    pub failed: usize,
    /// Every recorded failure, primary and follow-up, in completion order
    pub failures: Vec<E>,
    /// Highest number of tasks admitted at the same time
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

/// Runs a job once per task with at most `limit` jobs in flight.
///
/// The scheduler never cancels: a failing task is recorded and every other
/// task still runs.
///
/// The bound comes from the dedicated rayon pool, which has exactly `limit`
/// threads. Every job also holds an [`AdmissionGate`] permit of the same
/// capacity while it runs; with one job per pool thread the gate never
/// blocks and only measures `peak_in_flight`.
#[derive(Debug, Clone, Copy)]
pub struct FanOutScheduler {
    limit: usize,
}

impl FanOutScheduler {
    /// Creates a scheduler. A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `job` for every task and waits for all of them.
    ///
    /// `progress` is updated as tasks finish: `Completed` and `Degraded`
    /// increment the completed counter, `Failed` increments the failed
    /// counter.
    pub fn run<T, E, F>(
        &self,
        tasks: &[T],
        progress: &ProgressState,
        job: F,
    ) -> CoreResult<FanOutReport<E>>
    where
        T: Sync,
        E: Send,
        F: Fn(&T) -> TaskOutcome<E> + Sync,
    {
        let started = Instant::now();
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.limit)
            .thread_name(|i| format!("fanout-{i}"))
            .build()
            .map_err(|e| CoreError::OperationFailed(format!("Failed to build worker pool: {e}")))?;

        let gate = AdmissionGate::new(self.limit);
        let failures: Mutex<Vec<E>> = Mutex::new(Vec::new());
        let completed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        debug!(
            "Fan-out of {} tasks with {} workers",
            tasks.len(),
            self.limit
        );

        pool.install(|| {
            tasks.par_iter().with_max_len(1).for_each(|task| {
                let outcome = {
                    let _permit = gate.acquire();
                    job(task)
                };

                let failure = match outcome {
                    TaskOutcome::Completed => {
                        completed.fetch_add(1, Ordering::SeqCst);
                        progress.record_completed();
                        None
                    }
                    TaskOutcome::Degraded(failure) => {
                        completed.fetch_add(1, Ordering::SeqCst);
                        progress.record_completed();
                        Some(failure)
                    }
                    TaskOutcome::Failed(failure) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        progress.record_failed();
                        Some(failure)
                    }
                };

                if let Some(failure) = failure {
                    failures
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(failure);
                }
            });
        });

        let failures = failures
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(FanOutReport {
            total: tasks.len(),
            completed: completed.into_inner(),
            failed: failed.into_inner(),
            failures,
            peak_in_flight: gate.peak(),
            elapsed: started.elapsed(),
        })
    }
}
