//! Errors surfaced synchronously from constructors and lifecycle-sensitive calls.
//!
//! Everything in this crate that can fail does so at construction time or at a
//! single well-defined lifecycle boundary (a closed orchestrator). There are no
//! user-visible errors from inside a running search loop: mutation/cost functions
//! are assumed total, and a panicking worker is logged and dropped from
//! aggregation rather than surfaced as an `Err` (see `parallel`).

use thiserror::Error;

/// Failure modes for configuring or driving the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnealError {
    /// An initial temperature must be strictly positive.
    #[error("initial temperature must be positive, got {0}")]
    InvalidTemperature(f64),

    /// A geometric cooling rate must lie in the open interval (0, 1).
    #[error("cooling rate alpha must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    /// A linear cooling decrement must be strictly positive.
    #[error("temperature decrement delta_t must be positive, got {0}")]
    InvalidDelta(f64),

    /// The number of evaluations held at one temperature must be at least 1.
    #[error("steps per temperature change must be at least 1, got {0}")]
    InvalidSteps(u64),

    /// A run length, restart count, or thread count that must be at least 1 was 0.
    #[error("run length must be at least 1, got {0}")]
    InvalidRunLength(u64),

    /// `numThreads` must be at least 1.
    #[error("thread count must be at least 1, got {0}")]
    InvalidThreadCount(usize),

    /// A timed orchestrator's `timeUnit` must be at least 1 millisecond.
    #[error("time unit must be at least 1ms, got {0}")]
    InvalidTimeUnit(u64),

    /// A parallel orchestrator was built from a worker collection whose members
    /// do not all share the same problem and tracker.
    #[error("workers supplied to a parallel orchestrator must share one problem and one tracker")]
    InconsistentWorkers,

    /// `optimize` (or an equivalent call) was attempted on an orchestrator that
    /// already had `close()` called on it.
    #[error("operation attempted on a closed orchestrator")]
    Closed,
}
