//! Parallel orchestrators (L6, §4.6): fixed-size worker pools running many
//! independent copies of a search concurrently against one shared problem and
//! tracker.
//!
//! All three orchestrators share the same lifecycle shape: built from either
//! one template worker (split `num_threads - 1` times) or an explicit worker
//! collection (validated to share one problem and one tracker, §4.6 "violation
//! is rejected at construction"), held open across repeated `optimize` calls,
//! and torn down exactly once by `close()`. Every subsequent call on a closed
//! orchestrator fails with [`AnnealError::Closed`] rather than panicking —
//! this is the one place in the crate where a running-search entry point
//! returns a `Result` rather than being infallible (§7 "Lifecycle error").
//!
//! Grounded on the worker-pool idiom in `peterrrock2-frcw` and `xgillard-ddo`
//! (crossbeam channels fanning work out to a fixed thread set and collecting
//! results) and on `SH11235-rshogi`'s `engine-cli/src/worker.rs` stop-flag
//! shape for cancellation, generalized here to the tracker-driven cooperative
//! cancellation of §5.

mod worker_pool;

use std::cmp::Ordering;
use std::time::Duration;

use crate::error::AnnealError;
use crate::pair::SolutionCostPair;
use crate::problem::Problem;
use crate::restart::{Multistarter, RestartSchedule};
use crate::sa::Metaheuristic;
use crate::splittable::Splittable;
use crate::tracker::ProgressTracker;

use worker_pool::WorkerPool;

/// Default `timeUnit` for [`TimedParallelMultistarter`] when none is supplied
/// (§6 configuration knobs: "timeUnit >= 1 ms").
const DEFAULT_TIME_UNIT_MS: u64 = 1000;

/// The data-pointer half of a `&dyn Problem<T>` fat pointer, used to check
/// that a manually supplied worker collection all references the same
/// problem instance (§4.6 "same problem reference and same tracker
/// reference — violation is rejected at construction").
fn problem_identity<T>(problem: &dyn Problem<T>) -> *const () {
    problem as *const dyn Problem<T> as *const ()
}

/// Among possibly-missing, possibly-absent per-worker results (outer `None`:
/// the worker thread panicked and its result is dropped, §7 "Worker failure";
/// inner `None`: that worker's search legitimately ran zero iterations),
/// return the pair with the lowest cost, or `None` if nobody produced one.
fn best_of<T>(results: Vec<Option<Option<SolutionCostPair<T>>>>) -> Option<SolutionCostPair<T>> {
    results
        .into_iter()
        .flatten()
        .flatten()
        .min_by(|a, b| a.cost().partial_cmp(&b.cost()).unwrap_or(Ordering::Equal))
}

/// Runs `num_threads` independent copies of a [`Metaheuristic`] against one
/// shared problem and tracker (§4.6 `ParallelMetaheuristic`).
pub struct ParallelMetaheuristic<T, W> {
    pool: Option<WorkerPool<W>>,
    tracker: ProgressTracker<T>,
    num_workers: usize,
    closed: bool,
}

impl<T, W> ParallelMetaheuristic<T, W>
where
    T: Clone + Send + 'static,
    W: Metaheuristic<T> + Send + 'static,
{
    /// Build a pool of `num_threads` workers, the first being `template`
    /// itself and the rest independent splits of it, all reporting into
    /// `template`'s tracker.
    pub fn new(template: W, num_threads: usize) -> Result<Self, AnnealError> {
        if num_threads < 1 {
            return Err(AnnealError::InvalidThreadCount(num_threads));
        }
        let tracker = template.tracker().clone();
        let mut workers = Vec::with_capacity(num_threads);
        workers.push(template);
        for _ in 1..num_threads {
            let mut split = workers[0].split();
            split.set_tracker(tracker.clone());
            workers.push(split);
        }
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers: num_threads,
            closed: false,
        })
    }

    /// Build a pool from an explicit worker collection. Every worker must
    /// share the same problem reference and the same tracker reference.
    pub fn from_workers(workers: Vec<W>) -> Result<Self, AnnealError> {
        if workers.is_empty() {
            return Err(AnnealError::InvalidThreadCount(0));
        }
        let tracker = workers[0].tracker().clone();
        let problem_id = problem_identity(workers[0].problem());
        for worker in &workers[1..] {
            if !worker.tracker().is_same(&tracker) || problem_identity(worker.problem()) != problem_id
            {
                return Err(AnnealError::InconsistentWorkers);
            }
        }
        let num_workers = workers.len();
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            closed: false,
        })
    }

    /// The shared tracker every worker reports into.
    pub fn tracker(&self) -> &ProgressTracker<T> {
        &self.tracker
    }

    /// The number of workers in the pool.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Submit `optimize(run_length)` to every worker in parallel and return
    /// the best pair across all of them (§4.6 `ParallelMetaheuristic.optimize`).
    pub fn optimize(&self, run_length: u64) -> Result<Option<SolutionCostPair<T>>, AnnealError> {
        let pool = self.pool.as_ref().ok_or(AnnealError::Closed)?;
        let results: Vec<Option<Option<SolutionCostPair<T>>>> =
            pool.broadcast(|_| Box::new(move |w: &mut W| w.optimize(run_length)));
        Ok(best_of(results))
    }

    /// Initiate an orderly shutdown: join every worker thread. Idempotent.
    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        self.closed = true;
    }
}

impl<T, W> Splittable for ParallelMetaheuristic<T, W>
where
    T: Clone + Send + 'static,
    W: Metaheuristic<T> + Send + 'static,
{
    /// A fresh pool of splits of every live worker, sharing one new tracker.
    /// A split of a closed orchestrator stays closed (§9 Open Question:
    /// "the spec's behavior (closed-stays-closed on split) matches the newer
    /// variant").
    fn split(&self) -> Self {
        if self.closed {
            return Self {
                pool: None,
                tracker: ProgressTracker::new(),
                num_workers: self.num_workers,
                closed: true,
            };
        }
        let pool = self.pool.as_ref().expect("an open orchestrator always holds a pool");
        let splits: Vec<Option<W>> = pool.broadcast(|_| Box::new(|w: &mut W| w.split()));
        let tracker = ProgressTracker::new();
        let workers: Vec<W> = splits
            .into_iter()
            .flatten()
            .map(|mut w| {
                w.set_tracker(tracker.clone());
                w
            })
            .collect();
        let num_workers = workers.len();
        Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            closed: false,
        }
    }
}

/// Runs `num_threads` independent [`Multistarter`]s against one shared
/// problem and tracker (§4.6 `ParallelMultistarter`).
pub struct ParallelMultistarter<T, SEARCH, R> {
    pool: Option<WorkerPool<Multistarter<T, SEARCH, R>>>,
    tracker: ProgressTracker<T>,
    num_workers: usize,
    closed: bool,
}

impl<T, SEARCH, R> ParallelMultistarter<T, SEARCH, R>
where
    T: Clone + Send + 'static,
    SEARCH: Metaheuristic<T> + Send + 'static,
    R: RestartSchedule + Send + 'static,
{
    /// Build a pool of `num_threads` workers from one template multistarter,
    /// mirroring [`ParallelMetaheuristic::new`].
    pub fn new(template: Multistarter<T, SEARCH, R>, num_threads: usize) -> Result<Self, AnnealError> {
        if num_threads < 1 {
            return Err(AnnealError::InvalidThreadCount(num_threads));
        }
        let tracker = template.tracker().clone();
        let mut workers = Vec::with_capacity(num_threads);
        workers.push(template);
        for _ in 1..num_threads {
            let mut split = workers[0].split();
            split.set_tracker(tracker.clone());
            workers.push(split);
        }
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers: num_threads,
            closed: false,
        })
    }

    /// Build a pool from an explicit worker collection, validated the same
    /// way as [`ParallelMetaheuristic::from_workers`].
    pub fn from_workers(workers: Vec<Multistarter<T, SEARCH, R>>) -> Result<Self, AnnealError> {
        if workers.is_empty() {
            return Err(AnnealError::InvalidThreadCount(0));
        }
        let tracker = workers[0].tracker().clone();
        let problem_id = problem_identity(workers[0].problem());
        for worker in &workers[1..] {
            if !worker.tracker().is_same(&tracker) || problem_identity(worker.problem()) != problem_id
            {
                return Err(AnnealError::InconsistentWorkers);
            }
        }
        let num_workers = workers.len();
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            closed: false,
        })
    }

    pub fn tracker(&self) -> &ProgressTracker<T> {
        &self.tracker
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Delegate `optimize(num_restarts)` to every worker's `Multistarter` in
    /// parallel and return the best pair across all of them.
    pub fn optimize(&self, num_restarts: u64) -> Result<Option<SolutionCostPair<T>>, AnnealError> {
        let pool = self.pool.as_ref().ok_or(AnnealError::Closed)?;
        let results: Vec<Option<Option<SolutionCostPair<T>>>> = pool.broadcast(|_| {
            Box::new(move |w: &mut Multistarter<T, SEARCH, R>| w.optimize(num_restarts))
        });
        Ok(best_of(results))
    }

    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        self.closed = true;
    }
}

impl<T, SEARCH, R> Splittable for ParallelMultistarter<T, SEARCH, R>
where
    T: Clone + Send + 'static,
    SEARCH: Metaheuristic<T> + Send + 'static,
    R: RestartSchedule + Send + 'static,
{
    fn split(&self) -> Self {
        if self.closed {
            return Self {
                pool: None,
                tracker: ProgressTracker::new(),
                num_workers: self.num_workers,
                closed: true,
            };
        }
        let pool = self.pool.as_ref().expect("an open orchestrator always holds a pool");
        let splits: Vec<Option<Multistarter<T, SEARCH, R>>> =
            pool.broadcast(|_| Box::new(|w: &mut Multistarter<T, SEARCH, R>| w.split()));
        let tracker = ProgressTracker::new();
        let workers: Vec<Multistarter<T, SEARCH, R>> = splits
            .into_iter()
            .flatten()
            .map(|mut w| {
                w.set_tracker(tracker.clone());
                w
            })
            .collect();
        let num_workers = workers.len();
        Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            closed: false,
        }
    }
}

/// A [`ParallelMultistarter`] bounded by wall-clock time instead of a restart
/// count, with a periodic history sampler (§4.6 `TimedParallelMultistarter`).
///
/// `optimize(time_units)` submits every worker an effectively unbounded
/// number of restarts (`u64::MAX`) and lets the calling thread itself act as
/// the timing coordinator (§5: "the calling thread sleeping for `timeUnit`
/// intervals"), waking every `time_unit_ms` milliseconds to snapshot the
/// tracker into the history list, until `time_units` ticks elapse or
/// `found_best` is observed — at which point it calls `tracker.stop()` and
/// joins every worker's result.
pub struct TimedParallelMultistarter<T, SEARCH, R> {
    pool: Option<WorkerPool<Multistarter<T, SEARCH, R>>>,
    tracker: ProgressTracker<T>,
    num_workers: usize,
    time_unit_ms: u64,
    history: Vec<Option<SolutionCostPair<T>>>,
    closed: bool,
}

impl<T, SEARCH, R> TimedParallelMultistarter<T, SEARCH, R>
where
    T: Clone + Send + 'static,
    SEARCH: Metaheuristic<T> + Send + 'static,
    R: RestartSchedule + Send + 'static,
{
    /// Build with the default 1000ms time unit.
    pub fn new(template: Multistarter<T, SEARCH, R>, num_threads: usize) -> Result<Self, AnnealError> {
        Self::with_time_unit(template, num_threads, DEFAULT_TIME_UNIT_MS)
    }

    /// Build with an explicit `time_unit_ms`, which must be at least 1.
    pub fn with_time_unit(
        template: Multistarter<T, SEARCH, R>,
        num_threads: usize,
        time_unit_ms: u64,
    ) -> Result<Self, AnnealError> {
        if num_threads < 1 {
            return Err(AnnealError::InvalidThreadCount(num_threads));
        }
        if time_unit_ms < 1 {
            return Err(AnnealError::InvalidTimeUnit(time_unit_ms));
        }
        let tracker = template.tracker().clone();
        let mut workers = Vec::with_capacity(num_threads);
        workers.push(template);
        for _ in 1..num_threads {
            let mut split = workers[0].split();
            split.set_tracker(tracker.clone());
            workers.push(split);
        }
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers: num_threads,
            time_unit_ms,
            history: Vec::new(),
            closed: false,
        })
    }

    /// Build from an explicit worker collection, validated the same way as
    /// [`ParallelMetaheuristic::from_workers`].
    pub fn from_workers(
        workers: Vec<Multistarter<T, SEARCH, R>>,
        time_unit_ms: u64,
    ) -> Result<Self, AnnealError> {
        if workers.is_empty() {
            return Err(AnnealError::InvalidThreadCount(0));
        }
        if time_unit_ms < 1 {
            return Err(AnnealError::InvalidTimeUnit(time_unit_ms));
        }
        let tracker = workers[0].tracker().clone();
        let problem_id = problem_identity(workers[0].problem());
        for worker in &workers[1..] {
            if !worker.tracker().is_same(&tracker) || problem_identity(worker.problem()) != problem_id
            {
                return Err(AnnealError::InconsistentWorkers);
            }
        }
        let num_workers = workers.len();
        Ok(Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            time_unit_ms,
            history: Vec::new(),
            closed: false,
        })
    }

    pub fn tracker(&self) -> &ProgressTracker<T> {
        &self.tracker
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// The tracker snapshots recorded at each tick of the most recent
    /// `optimize` call.
    pub fn search_history(&self) -> &[Option<SolutionCostPair<T>>] {
        &self.history
    }

    /// Run every worker for up to `time_units` ticks of `time_unit_ms`
    /// milliseconds each, sampling the tracker once per tick, and returning
    /// the best pair across all workers once time runs out or the optimum is
    /// found.
    pub fn optimize(&mut self, time_units: u64) -> Result<Option<SolutionCostPair<T>>, AnnealError> {
        let pool = self.pool.as_ref().ok_or(AnnealError::Closed)?;
        self.tracker.start();

        pool.submit(|_| {
            Box::new(move |w: &mut Multistarter<T, SEARCH, R>| w.optimize(u64::MAX))
        });

        let mut history = Vec::with_capacity(time_units as usize);
        for _ in 0..time_units {
            if self.tracker.did_find_best() || self.tracker.is_stopped() {
                break;
            }
            std::thread::sleep(Duration::from_millis(self.time_unit_ms));
            history.push(self.tracker.current_pair());
            if self.tracker.did_find_best() {
                break;
            }
        }
        self.tracker.stop();

        let results: Vec<Option<Option<SolutionCostPair<T>>>> = pool.collect();
        self.history = history;
        Ok(best_of(results))
    }

    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close();
        }
        self.closed = true;
    }
}

impl<T, SEARCH, R> Splittable for TimedParallelMultistarter<T, SEARCH, R>
where
    T: Clone + Send + 'static,
    SEARCH: Metaheuristic<T> + Send + 'static,
    R: RestartSchedule + Send + 'static,
{
    fn split(&self) -> Self {
        if self.closed {
            return Self {
                pool: None,
                tracker: ProgressTracker::new(),
                num_workers: self.num_workers,
                time_unit_ms: self.time_unit_ms,
                history: Vec::new(),
                closed: true,
            };
        }
        let pool = self.pool.as_ref().expect("an open orchestrator always holds a pool");
        let splits: Vec<Option<Multistarter<T, SEARCH, R>>> =
            pool.broadcast(|_| Box::new(|w: &mut Multistarter<T, SEARCH, R>| w.split()));
        let tracker = ProgressTracker::new();
        let workers: Vec<Multistarter<T, SEARCH, R>> = splits
            .into_iter()
            .flatten()
            .map(|mut w| {
                w.set_tracker(tracker.clone());
                w
            })
            .collect();
        let num_workers = workers.len();
        Self {
            pool: Some(WorkerPool::new(workers)),
            tracker,
            num_workers,
            time_unit_ms: self.time_unit_ms,
            history: Vec::new(),
            closed: false,
        }
    }
}
