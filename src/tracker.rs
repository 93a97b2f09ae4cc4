//! The shared, thread-safe progress tracker (§3, §4.2, §5).
//!
//! Per §9 "Ownership of the tracker", this is a reference-counted handle
//! (`Arc`) around interior atomic synchronization, not a whole-struct
//! read-write lock: the two control flags are independent atomics, and only
//! the best-solution slot itself is guarded by a lock, held for the duration
//! of a pointer swap. This mirrors the `Arc<AtomicBool>` stop-flag idiom used
//! for cooperative search cancellation in `SH11235-rshogi`'s
//! `engine-cli/src/worker.rs` and `state.rs`, generalized here to also guard
//! the best-known candidate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::info;
use parking_lot::Mutex;

use crate::pair::SolutionCostPair;

struct BestEntry<T> {
    solution: T,
    cost: f64,
    timestamp: Instant,
}

struct Inner<T> {
    best: Mutex<Option<BestEntry<T>>>,
    found_best: AtomicBool,
    stopped: AtomicBool,
}

/// A shared record of the best-found solution and cooperative stop/found-best
/// flags, cloneable cheaply (an `Arc` clone) and safe to hand to every worker
/// of one parallel search.
pub struct ProgressTracker<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ProgressTracker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ProgressTracker<T> {
    /// A fresh tracker: no best solution yet, `best_cost` effectively `+∞`,
    /// neither flag set.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                best: Mutex::new(None),
                found_best: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    /// Whether `self` and `other` are the same shared tracker (used by
    /// parallel orchestrators to validate that a manually supplied worker
    /// collection all reports into one tracker).
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// `didFindBest`: whether some update supplied `is_min_cost = true`.
    pub fn did_find_best(&self) -> bool {
        self.inner.found_best.load(Ordering::Acquire)
    }

    /// `isStopped`: whether cooperative cancellation has been requested.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Request cooperative cancellation. Idempotent.
    pub fn stop(&self) {
        if !self.inner.stopped.swap(true, Ordering::Release) {
            info!("tracker stop requested; workers observe it at their next check");
        }
    }

    /// Clear the stop flag, used by the timed orchestrator to reset between
    /// runs. Does not clear `found_best`.
    pub fn start(&self) {
        self.inner.stopped.store(false, Ordering::Release);
    }

    /// The current best cost, or `+∞` if nothing has been recorded yet.
    pub fn cost(&self) -> f64 {
        self.inner
            .best
            .lock()
            .as_ref()
            .map(|e| e.cost)
            .unwrap_or(f64::INFINITY)
    }

    /// Alias of [`ProgressTracker::cost`] (spec.md's `getCostDouble`).
    pub fn cost_double(&self) -> f64 {
        self.cost()
    }

    /// The timestamp at which the current best was recorded, if any.
    pub fn timestamp_of_best(&self) -> Option<Instant> {
        self.inner.best.lock().as_ref().map(|e| e.timestamp)
    }
}

impl<T: Clone> ProgressTracker<T> {
    /// If `cost` improves on the current best, atomically replace it (taking a
    /// defensive copy of `solution`), record the timestamp, and, if
    /// `is_min_cost`, set `found_best`. Returns the tracker's best cost after
    /// the call (unchanged if `cost` did not improve).
    ///
    /// Concurrent calls linearize through the internal lock: whichever caller
    /// observes the lower `best_cost` at acquisition time wins, so two
    /// simultaneous discoveries of a better solution always leave the
    /// strictly lower cost installed.
    pub fn update(&self, cost: f64, solution: &T, is_min_cost: bool) -> f64 {
        let mut guard = self.inner.best.lock();
        let improved = match guard.as_ref() {
            None => true,
            Some(entry) => cost < entry.cost,
        };
        if improved {
            *guard = Some(BestEntry {
                solution: solution.clone(),
                cost,
                timestamp: Instant::now(),
            });
            if is_min_cost && !self.inner.found_best.swap(true, Ordering::Release) {
                info!("tracker observed the theoretical optimum (cost={cost})");
            }
        }
        guard.as_ref().map(|e| e.cost).unwrap_or(f64::INFINITY)
    }

    /// A defensive copy of the current best solution, if any.
    pub fn solution(&self) -> Option<T> {
        self.inner.best.lock().as_ref().map(|e| e.solution.clone())
    }

    /// A defensive copy of the current best solution as a `SolutionCostPair`.
    pub fn current_pair(&self) -> Option<SolutionCostPair<T>> {
        let guard = self.inner.best.lock();
        guard
            .as_ref()
            .map(|e| SolutionCostPair::new(e.solution.clone(), e.cost, self.did_find_best()))
    }
}

impl<T> Default for ProgressTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn update_only_replaces_on_strict_improvement() {
        let tracker: ProgressTracker<i32> = ProgressTracker::new();
        assert_eq!(tracker.cost(), f64::INFINITY);
        tracker.update(5.0, &1, false);
        assert_eq!(tracker.cost(), 5.0);
        tracker.update(7.0, &2, false);
        assert_eq!(tracker.cost(), 5.0);
        tracker.update(3.0, &3, false);
        assert_eq!(tracker.cost(), 3.0);
        assert_eq!(tracker.solution(), Some(3));
    }

    #[test]
    fn found_best_is_set_only_on_the_improving_branch() {
        let tracker: ProgressTracker<i32> = ProgressTracker::new();
        tracker.update(5.0, &1, true);
        assert!(tracker.did_find_best());
        // A later, worse, "is_min_cost" update must not un-set found_best,
        // nor should it replace the recorded best.
        tracker.update(6.0, &2, true);
        assert!(tracker.did_find_best());
        assert_eq!(tracker.cost(), 5.0);
    }

    #[test]
    fn stop_is_idempotent_and_start_clears_it() {
        let tracker: ProgressTracker<i32> = ProgressTracker::new();
        assert!(!tracker.is_stopped());
        tracker.stop();
        tracker.stop();
        assert!(tracker.is_stopped());
        tracker.start();
        assert!(!tracker.is_stopped());
    }

    #[test]
    fn concurrent_updates_preserve_the_strictly_lower_cost() {
        let tracker: ProgressTracker<&'static str> = ProgressTracker::new();
        let barrier = Arc::new(Barrier::new(2));

        let t1 = tracker.clone();
        let b1 = Arc::clone(&barrier);
        let h1 = thread::spawn(move || {
            b1.wait();
            t1.update(5.0, &"A", false);
        });

        let t2 = tracker.clone();
        let b2 = Arc::clone(&barrier);
        let h2 = thread::spawn(move || {
            b2.wait();
            t2.update(3.0, &"B", false);
        });

        h1.join().unwrap();
        h2.join().unwrap();

        assert_eq!(tracker.cost(), 3.0);
        assert_eq!(tracker.solution(), Some("B"));
    }

    #[test]
    fn clones_share_the_same_backing_state() {
        let a: ProgressTracker<i32> = ProgressTracker::new();
        let b = a.clone();
        assert!(a.is_same(&b));
        b.update(1.0, &10, false);
        assert_eq!(a.cost(), 1.0);

        let fresh: ProgressTracker<i32> = ProgressTracker::new();
        assert!(!a.is_same(&fresh));
    }
}
