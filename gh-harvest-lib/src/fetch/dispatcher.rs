//! Fixed-size worker pool draining a shared queue of identifiers.
//!
//! Each worker repeatedly pops one identifier, runs it through the [`Processor`] to
//! completion, hands the outcome to the [`OutcomeSink`], and pops the next one. A worker
//! that finds the queue empty exits; the remaining work already belongs to other
//! in-flight workers. [`Dispatcher::run`] returns once every worker has exited.

use super::outcome::FetchOutcome;
use super::pipeline::Processor;
use super::work_tracker::{WorkSnapshot, WorkTracker};
use crate::Result;
use core::num::NonZeroUsize;
use core::panic::AssertUnwindSafe;
use futures_util::FutureExt;
use futures_util::future::join_all;
use ohno::app_err;
use std::sync::{Arc, Mutex};

const LOG_TARGET: &str = "dispatcher";

/// Default cap on the number of concurrent workers.
pub const DEFAULT_MAX_CONCURRENT_WORKERS: usize = 16;

/// Receives terminal outcomes from any worker, in any order.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, outcome: FetchOutcome) -> Result<()>;
}

/// Number of workers to start: the available parallelism, capped at `max_workers`, and never zero.
#[must_use]
pub fn worker_count(max_workers: usize) -> usize {
    std::thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(max_workers)
        .max(1)
}

/// Final tallies of a dispatcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl From<WorkSnapshot> for DispatchSummary {
    fn from(snapshot: WorkSnapshot) -> Self {
        Self {
            total: snapshot.total,
            succeeded: snapshot.succeeded(),
            failed: snapshot.failed,
        }
    }
}

#[derive(Debug)]
struct WorkQueue {
    pending: Mutex<Vec<String>>,
}

impl WorkQueue {
    const fn new(identifiers: Vec<String>) -> Self {
        Self {
            pending: Mutex::new(identifiers),
        }
    }

    /// Take the next identifier, or `None` once the queue is drained.
    fn pop(&self) -> Result<Option<String>> {
        let mut guard = self.pending.lock().map_err(|e| app_err!("work queue lock poisoned: {e}"))?;
        Ok(guard.pop())
    }
}

/// Distributes identifiers across a fixed pool of concurrent workers.
#[derive(Debug)]
pub struct Dispatcher<P, S> {
    processor: Arc<P>,
    sink: Arc<S>,
    tracker: WorkTracker,
    worker_count: usize,
}

impl<P, S> Dispatcher<P, S>
where
    P: Processor + 'static,
    S: OutcomeSink + 'static,
{
    /// Create a dispatcher that runs exactly `worker_count` workers (at least one).
    #[must_use]
    pub fn new(processor: Arc<P>, sink: Arc<S>, tracker: WorkTracker, worker_count: usize) -> Self {
        Self {
            processor,
            sink,
            tracker,
            worker_count: worker_count.max(1),
        }
    }

    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Process every identifier exactly once and return the final tallies.
    ///
    /// Per-identifier failures are recorded through the sink and never abort the run.
    /// A sink error stops the worker that hit it; the other workers drain the queue and
    /// the first such error is returned.
    pub async fn run(self, identifiers: Vec<String>) -> Result<DispatchSummary> {
        let total = identifiers.len() as u64;
        self.tracker.set_total(total);
        let queue = Arc::new(WorkQueue::new(identifiers));

        log::info!(target: LOG_TARGET, "Starting {} workers for {total} users", self.worker_count);

        let handles: Vec<_> = (0..self.worker_count)
            .map(|slot| {
                tokio::spawn(worker(
                    slot,
                    Arc::clone(&queue),
                    Arc::clone(&self.processor),
                    Arc::clone(&self.sink),
                    self.tracker.clone(),
                ))
            })
            .collect();

        let mut first_error = None;
        for joined in join_all(handles).await {
            let result = joined.map_err(|e| app_err!("worker task failed: {e}")).and_then(|r| r);
            if let Err(e) = result {
                log::error!(target: LOG_TARGET, "{e:#}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let snapshot = self.tracker.snapshot();
        debug_assert_eq!(snapshot.completed, snapshot.total, "every identifier yields one outcome");
        log::info!(target: LOG_TARGET, "All tasks completed.");

        Ok(snapshot.into())
    }
}

async fn worker<P: Processor, S: OutcomeSink>(
    slot: usize,
    queue: Arc<WorkQueue>,
    processor: Arc<P>,
    sink: Arc<S>,
    tracker: WorkTracker,
) -> Result<()> {
    while let Some(identifier) = queue.pop()? {
        log::debug!(target: LOG_TARGET, "Worker {slot} assigned '{identifier}'");

        let outcome = match AssertUnwindSafe(processor.process(identifier.clone())).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => FetchOutcome::failure(identifier, "internal error while processing user"),
        };

        if let FetchOutcome::Failure { identifier, reason } = &outcome {
            log::error!(target: LOG_TARGET, "Error processing {identifier}: {reason}");
            if !log::log_enabled!(log::Level::Error) {
                tracker.println(&format!("Error processing {identifier}: {reason}"));
            }
        }

        let succeeded = outcome.is_success();
        sink.record(outcome)?;

        let completed = tracker.complete(succeeded);
        log::info!(target: LOG_TARGET, "Processed {completed}/{} users", tracker.snapshot().total);
    }

    log::debug!(target: LOG_TARGET, "Worker {slot} drained");
    Ok(())
}
