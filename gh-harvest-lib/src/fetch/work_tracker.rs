//! Completion tracking for the worker pool.

use super::progress::Progress;
use core::sync::atomic::{AtomicU64, Ordering};
use owo_colors::OwoColorize;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the tracker's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSnapshot {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
}

impl WorkSnapshot {
    #[must_use]
    pub const fn succeeded(&self) -> u64 {
        self.completed.saturating_sub(self.failed)
    }
}

/// Counts terminal outcomes and feeds them to the progress display.
///
/// Every outcome, success or failure, counts toward `completed`.
#[derive(Clone)]
pub struct WorkTracker {
    counters: Arc<Counters>,
    progress: Arc<dyn Progress>,
}

impl core::fmt::Debug for WorkTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkTracker")
            .field("counters", &self.counters)
            .field("progress", &"<dyn Progress>")
            .finish()
    }
}

impl WorkTracker {
    /// Create a tracker and register its progress callback.
    #[must_use]
    pub fn new(progress: &Arc<dyn Progress>) -> Self {
        let counters: Arc<Counters> = Arc::default();

        let counters_clone = Arc::clone(&counters);
        let use_colors = progress.use_colors();
        progress.set_determinate(Box::new(move || Self::progress_reporter_callback(&counters_clone, use_colors)));

        Self {
            counters,
            progress: Arc::clone(progress),
        }
    }

    /// Print a message line without disrupting the progress indicator.
    pub fn println(&self, msg: &str) {
        self.progress.println(msg);
    }

    /// Set the number of identifiers this run will process.
    pub fn set_total(&self, total: u64) {
        self.counters.total.store(total, Ordering::Relaxed);
    }

    /// Record one terminal outcome and return the new completed count.
    pub fn complete(&self, succeeded: bool) -> u64 {
        if !succeeded {
            let _ = self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.counters.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[must_use]
    pub fn snapshot(&self) -> WorkSnapshot {
        WorkSnapshot {
            total: self.counters.total.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Compute current progress state from counters.
    ///
    /// Returns (`total_length`, `current_position`, `message_string`).
    fn progress_reporter_callback(counters: &Counters, use_colors: bool) -> (u64, u64, String) {
        let total = counters.total.load(Ordering::Relaxed);
        let completed = counters.completed.load(Ordering::Relaxed);
        let failed = counters.failed.load(Ordering::Relaxed);

        let done = format!("{completed}/{total} users");
        let done = if use_colors && total > 0 && completed >= total {
            format!("{}", done.green())
        } else {
            done
        };

        let message = if failed == 0 {
            done
        } else {
            let failures = format!("{failed} failed");
            if use_colors {
                format!("{done}, {}", failures.red())
            } else {
                format!("{done}, {failures}")
            }
        };

        (total, completed, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingProgress {
        callback: Mutex<Option<Box<dyn Fn() -> (u64, u64, String) + Send + Sync>>>,
        lines: Mutex<Vec<String>>,
    }

    impl CapturingProgress {
        fn poll(&self) -> (u64, u64, String) {
            let guard = self.callback.lock().unwrap();
            guard.as_ref().unwrap()()
        }
    }

    impl Progress for CapturingProgress {
        fn set_phase(&self, _phase: &str) {}
        fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
            *self.callback.lock().unwrap() = Some(callback);
        }
        fn println(&self, msg: &str) {
            self.lines.lock().unwrap().push(msg.to_string());
        }
        fn done(&self) {}
        fn use_colors(&self) -> bool {
            false
        }
    }

    fn tracker() -> (WorkTracker, Arc<CapturingProgress>) {
        let progress = Arc::new(CapturingProgress::default());
        let dyn_progress: Arc<dyn Progress> = Arc::clone(&progress) as Arc<dyn Progress>;
        (WorkTracker::new(&dyn_progress), progress)
    }

    #[test]
    fn test_complete_counts_successes_and_failures() {
        let (tracker, _) = tracker();
        tracker.set_total(3);

        assert_eq!(tracker.complete(true), 1);
        assert_eq!(tracker.complete(false), 2);
        assert_eq!(tracker.complete(true), 3);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.completed, 3);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.succeeded(), 2);
    }

    #[test]
    fn test_progress_message_without_failures() {
        let (tracker, progress) = tracker();
        tracker.set_total(4);
        let _ = tracker.complete(true);

        assert_eq!(progress.poll(), (4, 1, "1/4 users".to_string()));
    }

    #[test]
    fn test_progress_message_with_failures() {
        let (tracker, progress) = tracker();
        tracker.set_total(2);
        let _ = tracker.complete(false);

        assert_eq!(progress.poll(), (2, 1, "1/2 users, 1 failed".to_string()));
    }

    #[test]
    fn test_println_forwards_to_progress() {
        let (tracker, progress) = tracker();
        tracker.println("hello");
        assert_eq!(progress.lines.lock().unwrap().as_slice(), ["hello".to_string()]);
    }

    #[test]
    fn test_clones_share_counters() {
        let (tracker, _) = tracker();
        let other = tracker.clone();
        let _ = other.complete(true);
        assert_eq!(tracker.snapshot().completed, 1);
    }
}
