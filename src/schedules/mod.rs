//! Annealing schedules (L3, §4.3): the seven variants named in spec.md, all
//! implementing a uniform `init`/`accept` contract. The controller in
//! [`crate::sa`] never inspects which variant it holds — per §9 "Sum types
//! for schedule variants", the [`Schedule`] enum below is the dispatch-friendly
//! default for callers who want one concrete type to store, but any type
//! implementing [`AnnealingSchedule`] works equally well generically.

mod common;
mod exponential;
mod linear;
mod logarithmic;
mod modified_lam;
mod optimized_modified_lam;
mod parameter_free;
mod self_tuning_lam;

pub use exponential::ExponentialCooling;
pub use linear::LinearCooling;
pub use logarithmic::LogarithmicCooling;
pub use modified_lam::ModifiedLam;
pub use optimized_modified_lam::OptimizedModifiedLam;
pub use parameter_free::{ParameterFreeExponentialCooling, ParameterFreeLinearCooling};
pub use self_tuning_lam::SelfTuningLam;

use crate::splittable::Splittable;

/// The contract every annealing schedule implements (§4.3).
pub trait AnnealingSchedule: Splittable {
    /// Reset all state for a fresh run of at most `max_evals` evaluations.
    fn init(&mut self, max_evals: u64);

    /// Decide whether to accept a proposed neighbor, and advance this
    /// schedule's internal state by one iteration. Must be called exactly
    /// once per proposed neighbor.
    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool;
}

/// A tagged union over the eight schedule variants, so a caller can store
/// "some annealing schedule" as one concrete, non-generic type.
pub enum Schedule {
    Exponential(ExponentialCooling),
    Linear(LinearCooling),
    Logarithmic(LogarithmicCooling),
    ParameterFreeExponential(ParameterFreeExponentialCooling),
    ParameterFreeLinear(ParameterFreeLinearCooling),
    ModifiedLam(ModifiedLam),
    OptimizedModifiedLam(OptimizedModifiedLam),
    SelfTuningLam(SelfTuningLam),
}

impl AnnealingSchedule for Schedule {
    fn init(&mut self, max_evals: u64) {
        match self {
            Schedule::Exponential(s) => s.init(max_evals),
            Schedule::Linear(s) => s.init(max_evals),
            Schedule::Logarithmic(s) => s.init(max_evals),
            Schedule::ParameterFreeExponential(s) => s.init(max_evals),
            Schedule::ParameterFreeLinear(s) => s.init(max_evals),
            Schedule::ModifiedLam(s) => s.init(max_evals),
            Schedule::OptimizedModifiedLam(s) => s.init(max_evals),
            Schedule::SelfTuningLam(s) => s.init(max_evals),
        }
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        match self {
            Schedule::Exponential(s) => s.accept(neighbor_cost, current_cost),
            Schedule::Linear(s) => s.accept(neighbor_cost, current_cost),
            Schedule::Logarithmic(s) => s.accept(neighbor_cost, current_cost),
            Schedule::ParameterFreeExponential(s) => s.accept(neighbor_cost, current_cost),
            Schedule::ParameterFreeLinear(s) => s.accept(neighbor_cost, current_cost),
            Schedule::ModifiedLam(s) => s.accept(neighbor_cost, current_cost),
            Schedule::OptimizedModifiedLam(s) => s.accept(neighbor_cost, current_cost),
            Schedule::SelfTuningLam(s) => s.accept(neighbor_cost, current_cost),
        }
    }
}

impl Splittable for Schedule {
    fn split(&self) -> Self {
        match self {
            Schedule::Exponential(s) => Schedule::Exponential(s.split()),
            Schedule::Linear(s) => Schedule::Linear(s.split()),
            Schedule::Logarithmic(s) => Schedule::Logarithmic(s.split()),
            Schedule::ParameterFreeExponential(s) => {
                Schedule::ParameterFreeExponential(s.split())
            }
            Schedule::ParameterFreeLinear(s) => Schedule::ParameterFreeLinear(s.split()),
            Schedule::ModifiedLam(s) => Schedule::ModifiedLam(s.split()),
            Schedule::OptimizedModifiedLam(s) => Schedule::OptimizedModifiedLam(s.split()),
            Schedule::SelfTuningLam(s) => Schedule::SelfTuningLam(s.split()),
        }
    }
}
