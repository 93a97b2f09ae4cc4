//! Parameter-free exponential and linear cooling (§4.3): both begin with an
//! estimation phase that accepts every proposed neighbor while collecting
//! cost-difference samples, then derive the remaining parameters and switch
//! to ordinary exponential/linear cooling for the rest of the run.

use super::common::{
    accept_metropolis, derive_exponential_steps_alpha, derive_linear_steps_delta, ExpState,
    LinState,
};
use super::AnnealingSchedule;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

/// Number of differing-cost pairs the estimation phase collects before
/// deriving `t0` (§4.3).
const ESTIMATION_SAMPLES: usize = 10;
/// Desired acceptance probability for a typical worsening move at the
/// estimated `t0` (§4.3: `t0 = -mean_delta / ln(0.95)`).
const ESTIMATION_ACCEPT_PROB: f64 = 0.95;
/// Floor on the estimated initial temperature (§4.3).
const T0_FLOOR: f64 = 0.002;

enum ExpPhase {
    Estimating {
        max_evals: u64,
        iters: u64,
        deltas: Vec<f64>,
    },
    Running(ExpState),
}

/// Estimates `t0` and derives `(alpha, steps)` instead of taking them as
/// constructor arguments, then runs ordinary exponential cooling.
pub struct ParameterFreeExponentialCooling {
    phase: ExpPhase,
    rng: SplittableRng,
}

impl ParameterFreeExponentialCooling {
    pub fn new() -> Self {
        Self {
            phase: ExpPhase::Estimating {
                max_evals: 0,
                iters: 0,
                deltas: Vec::with_capacity(ESTIMATION_SAMPLES),
            },
            rng: SplittableRng::new_random(),
        }
    }

    /// The current temperature; `None` while still in the estimation phase.
    pub fn temperature(&self) -> Option<f64> {
        match &self.phase {
            ExpPhase::Estimating { .. } => None,
            ExpPhase::Running(state) => Some(state.t),
        }
    }
}

impl Default for ParameterFreeExponentialCooling {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ParameterFreeExponentialCooling {
    fn init(&mut self, max_evals: u64) {
        self.phase = ExpPhase::Estimating {
            max_evals,
            iters: 0,
            deltas: Vec::with_capacity(ESTIMATION_SAMPLES),
        };
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        match &mut self.phase {
            ExpPhase::Estimating {
                max_evals,
                iters,
                deltas,
            } => {
                *iters += 1;
                if neighbor_cost != current_cost {
                    deltas.push((current_cost - neighbor_cost).abs());
                }
                if deltas.len() >= ESTIMATION_SAMPLES {
                    let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
                    let t0 = (-mean_delta / ESTIMATION_ACCEPT_PROB.ln()).max(T0_FLOOR);
                    let remaining = max_evals.saturating_sub(*iters);
                    let (steps, alpha) = derive_exponential_steps_alpha(t0, remaining);
                    self.phase = ExpPhase::Running(ExpState::new(t0, alpha, steps));
                }
                true
            }
            ExpPhase::Running(state) => {
                let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, state.t);
                state.advance();
                accepted
            }
        }
    }
}

impl Splittable for ParameterFreeExponentialCooling {
    fn split(&self) -> Self {
        let phase = match &self.phase {
            ExpPhase::Estimating {
                max_evals,
                iters,
                deltas,
            } => ExpPhase::Estimating {
                max_evals: *max_evals,
                iters: *iters,
                deltas: deltas.clone(),
            },
            ExpPhase::Running(state) => ExpPhase::Running(*state),
        };
        Self {
            phase,
            rng: self.rng.split(),
        }
    }
}

enum LinPhase {
    Estimating {
        max_evals: u64,
        iters: u64,
        deltas: Vec<f64>,
    },
    Running(LinState),
}

/// Estimates `t0` and derives `(delta_t, steps)` instead of taking them as
/// constructor arguments, then runs ordinary linear cooling.
pub struct ParameterFreeLinearCooling {
    phase: LinPhase,
    rng: SplittableRng,
}

impl ParameterFreeLinearCooling {
    pub fn new() -> Self {
        Self {
            phase: LinPhase::Estimating {
                max_evals: 0,
                iters: 0,
                deltas: Vec::with_capacity(ESTIMATION_SAMPLES),
            },
            rng: SplittableRng::new_random(),
        }
    }

    /// The current temperature; `None` while still in the estimation phase.
    pub fn temperature(&self) -> Option<f64> {
        match &self.phase {
            LinPhase::Estimating { .. } => None,
            LinPhase::Running(state) => Some(state.t),
        }
    }
}

impl Default for ParameterFreeLinearCooling {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ParameterFreeLinearCooling {
    fn init(&mut self, max_evals: u64) {
        self.phase = LinPhase::Estimating {
            max_evals,
            iters: 0,
            deltas: Vec::with_capacity(ESTIMATION_SAMPLES),
        };
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        match &mut self.phase {
            LinPhase::Estimating {
                max_evals,
                iters,
                deltas,
            } => {
                *iters += 1;
                if neighbor_cost != current_cost {
                    deltas.push((current_cost - neighbor_cost).abs());
                }
                if deltas.len() >= ESTIMATION_SAMPLES {
                    let mean_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;
                    let t0 = (-mean_delta / ESTIMATION_ACCEPT_PROB.ln()).max(T0_FLOOR);
                    let remaining = max_evals.saturating_sub(*iters);
                    let (steps, delta_t) = derive_linear_steps_delta(t0, remaining);
                    self.phase = LinPhase::Running(LinState::new(t0, delta_t, steps));
                }
                true
            }
            LinPhase::Running(state) => {
                let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, state.t);
                state.advance();
                accepted
            }
        }
    }
}

impl Splittable for ParameterFreeLinearCooling {
    fn split(&self) -> Self {
        let phase = match &self.phase {
            LinPhase::Estimating {
                max_evals,
                iters,
                deltas,
            } => LinPhase::Estimating {
                max_evals: *max_evals,
                iters: *iters,
                deltas: deltas.clone(),
            },
            LinPhase::Running(state) => LinPhase::Running(*state),
        };
        Self {
            phase,
            rng: self.rng.split(),
        }
    }
}
