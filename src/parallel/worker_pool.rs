//! A persistent, generic thread pool: one OS thread per worker, holding that
//! worker's own state for the pool's entire lifetime and accepting one job
//! closure at a time over a `crossbeam_channel` (§5 "a fixed pool of
//! OS-level worker threads"; enrichment grounded on `peterrrock2-frcw` and
//! `xgillard-ddo`, both of which depend on `crossbeam`/`crossbeam-channel`
//! for worker/result aggregation of this shape).
//!
//! A panicking job is caught with [`std::panic::catch_unwind`] and reported
//! to the pool as `None` rather than propagated (§4.6, §7 "Worker failure":
//! logged, omitted from aggregation, the orchestrator call still returns the
//! best across survivors).

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use log::warn;

/// The wire type every job result travels as, regardless of which concrete
/// `R` a given call site asks for — this is what lets one pool serve both
/// `optimize`-shaped jobs (`R = Option<SolutionCostPair<T>>`) and
/// `split`-shaped jobs (`R = W`) over the same pair of channels.
type BoxedResult = Box<dyn Any + Send>;
type Job<W> = Box<dyn FnOnce(&mut W) -> BoxedResult + Send>;

/// A fixed-size pool of worker threads, each owning one `W` for its whole
/// lifetime and computing jobs on demand.
pub(crate) struct WorkerPool<W> {
    job_txs: Vec<Sender<Job<W>>>,
    result_rxs: Vec<Receiver<Option<BoxedResult>>>,
    threads: Vec<JoinHandle<()>>,
}

impl<W> WorkerPool<W>
where
    W: Send + 'static,
{
    /// Spawn one thread per element of `workers`, each looping on its own job
    /// channel until the pool is closed.
    pub(crate) fn new(workers: Vec<W>) -> Self {
        let mut job_txs = Vec::with_capacity(workers.len());
        let mut result_rxs = Vec::with_capacity(workers.len());
        let mut threads = Vec::with_capacity(workers.len());

        for mut worker in workers {
            let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job<W>>();
            let (result_tx, result_rx) = crossbeam_channel::unbounded::<Option<BoxedResult>>();
            let thread = std::thread::spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let outcome = catch_unwind(AssertUnwindSafe(|| job(&mut worker)));
                    let sent = match outcome {
                        Ok(result) => Some(result),
                        Err(_) => {
                            warn!("worker panicked; its result is omitted from aggregation");
                            None
                        }
                    };
                    if result_tx.send(sent).is_err() {
                        break;
                    }
                }
            });
            job_txs.push(job_tx);
            result_rxs.push(result_rx);
            threads.push(thread);
        }

        Self {
            job_txs,
            result_rxs,
            threads,
        }
    }

    pub(crate) fn num_workers(&self) -> usize {
        self.job_txs.len()
    }

    /// Send one job to every worker without waiting for results. `R` is
    /// chosen by the caller at each call site; a worker panic during a
    /// previous job type never poisons later calls with a different `R`.
    pub(crate) fn submit<R: Send + 'static>(
        &self,
        mut make_job: impl FnMut(usize) -> Box<dyn FnOnce(&mut W) -> R + Send>,
    ) {
        for (i, tx) in self.job_txs.iter().enumerate() {
            let job = make_job(i);
            let boxed: Job<W> = Box::new(move |w: &mut W| -> BoxedResult { Box::new(job(w)) });
            let _ = tx.send(boxed);
        }
    }

    /// Block until every worker has produced a result for its most recently
    /// submitted job, downcasting back to `R`.
    pub(crate) fn collect<R: Send + 'static>(&self) -> Vec<Option<R>> {
        self.result_rxs
            .iter()
            .map(|rx| {
                rx.recv()
                    .ok()
                    .flatten()
                    .and_then(|boxed| boxed.downcast::<R>().ok())
                    .map(|boxed| *boxed)
            })
            .collect()
    }

    /// Submit one job per worker and block until all results are in.
    pub(crate) fn broadcast<R: Send + 'static>(
        &self,
        make_job: impl FnMut(usize) -> Box<dyn FnOnce(&mut W) -> R + Send>,
    ) -> Vec<Option<R>> {
        self.submit(make_job);
        self.collect()
    }

    /// Drop every job sender (so worker loops exit) and join all threads.
    pub(crate) fn close(self) {
        drop(self.job_txs);
        for thread in self.threads {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_collects_one_result_per_worker() {
        let pool = WorkerPool::new(vec![1i32, 2, 3]);
        let results: Vec<Option<i32>> = pool.broadcast(|_| Box::new(|w: &mut i32| *w * 10));
        assert_eq!(results, vec![Some(10), Some(20), Some(30)]);
        pool.close();
    }

    #[test]
    fn a_panicking_job_yields_none_for_that_worker_only() {
        let pool = WorkerPool::new(vec![1i32, 2]);
        let results: Vec<Option<i32>> = pool.broadcast(|i| {
            Box::new(move |w: &mut i32| {
                if i == 0 {
                    panic!("boom");
                }
                *w
            })
        });
        assert_eq!(results, vec![None, Some(2)]);
        pool.close();
    }

    #[test]
    fn submit_then_collect_can_be_separated_in_time() {
        let pool = WorkerPool::new(vec![7i32]);
        pool.submit(|_| Box::new(|w: &mut i32| *w + 1));
        let results: Vec<Option<i32>> = pool.collect();
        assert_eq!(results, vec![Some(8)]);
        pool.close();
    }

    #[test]
    fn different_call_sites_can_use_different_result_types() {
        let pool = WorkerPool::new(vec![5i32]);
        let as_string: Vec<Option<String>> = pool.broadcast(|_| Box::new(|w: &mut i32| w.to_string()));
        assert_eq!(as_string, vec![Some("5".to_string())]);
        let as_int: Vec<Option<i32>> = pool.broadcast(|_| Box::new(|w: &mut i32| *w));
        assert_eq!(as_int, vec![Some(5)]);
        pool.close();
    }
}
