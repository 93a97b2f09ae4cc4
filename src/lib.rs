//! # anneal: adaptive simulated annealing and multistart metaheuristics
//!
//! This crate provides the search-engine layer for stochastic local search over
//! arbitrary candidate solutions (permutations, real-valued vectors, bit
//! vectors, or any other domain type `T`). Callers supply a [`Problem`] (a cost
//! function) and reusable operators ([`Mutation`], [`Initializer`], optionally
//! a [`HillClimber`]); the crate drives simulated-annealing searches, restart
//! sequences, and parallel worker pools against a shared [`ProgressTracker`].
//!
//! ## Layers
//!
//! - [`splittable`]: the [`Splittable`] contract every stateful component
//!   exposes so it can be cloned into an independent worker.
//! - [`tracker`]: the thread-safe [`ProgressTracker`] recording the
//!   best-so-far solution and cooperative stop/found-best flags.
//! - [`schedules`]: eight [`AnnealingSchedule`] variants sharing one
//!   `init`/`accept` contract.
//! - [`sa`]: the [`SimulatedAnnealing`] driver implementing
//!   [`Metaheuristic`]/[`ReoptimizableMetaheuristic`].
//! - [`restart`]: [`RestartSchedule`] and [`Multistarter`], wrapping any
//!   search with a sequence of restarts.
//! - [`parallel`]: [`ParallelMetaheuristic`], [`ParallelMultistarter`], and
//!   [`TimedParallelMultistarter`], coordinating many independent searches
//!   against one shared problem and tracker.
//!
//! ## Quick example
//!
//! ```
//! use std::sync::Arc;
//! use anneal::operators::{Initializer, Mutation};
//! use anneal::problem::Problem;
//! use anneal::rng::SplittableRng;
//! use anneal::sa::{Metaheuristic, SimulatedAnnealing};
//! use anneal::schedules::ExponentialCooling;
//! use anneal::splittable::Splittable;
//! use rand::Rng;
//!
//! struct AbsDistance;
//! impl Problem<i64> for AbsDistance {
//!     fn cost(&self, candidate: &i64) -> f64 {
//!         candidate.unsigned_abs() as f64
//!     }
//!     fn min_cost(&self) -> Option<f64> {
//!         Some(0.0)
//!     }
//! }
//!
//! struct StepMutation {
//!     rng: SplittableRng,
//!     last_step: i64,
//! }
//! impl Splittable for StepMutation {
//!     fn split(&self) -> Self {
//!         Self { rng: self.rng.split(), last_step: 0 }
//!     }
//! }
//! impl Mutation<i64> for StepMutation {
//!     fn mutate(&mut self, candidate: &mut i64) {
//!         self.last_step = if self.rng.random::<bool>() { 1 } else { -1 };
//!         *candidate += self.last_step;
//!     }
//!     fn undo(&mut self, candidate: &mut i64) {
//!         *candidate -= self.last_step;
//!     }
//! }
//!
//! struct FixedStart(i64);
//! impl Splittable for FixedStart {
//!     fn split(&self) -> Self {
//!         Self(self.0)
//!     }
//! }
//! impl Initializer<i64> for FixedStart {
//!     fn create_candidate(&mut self) -> i64 {
//!         self.0
//!     }
//! }
//!
//! let mut search = SimulatedAnnealing::new(
//!     Arc::new(AbsDistance),
//!     StepMutation { rng: SplittableRng::new_random(), last_step: 0 },
//!     FixedStart(1000),
//!     ExponentialCooling::new(50.0, 0.9, 5).unwrap(),
//! );
//! let best = search.optimize(10_000);
//! assert!(best.is_some());
//! ```
//!
//! ## Scope
//!
//! Out of scope (external collaborators consumed via the interfaces in
//! [`problem`] and [`operators`]): concrete cost functions and problem
//! instances, candidate-solution data containers, random-number algorithms and
//! distribution sampling, concrete mutation/crossover operators, constructive
//! heuristics, file I/O, and concrete hill climbers. Not a general optimization
//! DSL; no distributed coordination across machines; no persistence of search
//! state across process restarts; no guarantee of reproducibility across
//! splits (each split draws an independent random stream).

pub mod error;
pub mod operators;
pub mod pair;
pub mod parallel;
pub mod problem;
pub mod restart;
pub mod rng;
pub mod sa;
pub mod schedules;
pub mod splittable;
pub mod tracker;

pub use error::AnnealError;
pub use operators::{HillClimber, Initializer, Mutation, NeighborIterator};
pub use pair::SolutionCostPair;
pub use parallel::{ParallelMetaheuristic, ParallelMultistarter, TimedParallelMultistarter};
pub use problem::Problem;
pub use restart::{ConstantRestartSchedule, LubyRestartSchedule, Multistarter, RestartSchedule};
pub use rng::SplittableRng;
pub use sa::{Metaheuristic, ReoptimizableMetaheuristic, SimulatedAnnealing};
pub use schedules::{
    AnnealingSchedule, ExponentialCooling, LinearCooling, LogarithmicCooling, ModifiedLam,
    OptimizedModifiedLam, ParameterFreeExponentialCooling, ParameterFreeLinearCooling, Schedule,
    SelfTuningLam,
};
pub use splittable::Splittable;
pub use tracker::ProgressTracker;
