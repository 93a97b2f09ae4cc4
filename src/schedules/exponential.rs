//! Exponential (geometric) cooling (§4.3).

use super::common::{accept_metropolis, ExpState};
use super::AnnealingSchedule;
use crate::error::AnnealError;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

/// Cools by a constant factor `alpha` every `steps` evaluations, floored at
/// `0.001`.
pub struct ExponentialCooling {
    state: ExpState,
    rng: SplittableRng,
}

impl ExponentialCooling {
    /// `t0` must be positive, `alpha` must lie in `(0, 1)`, and `steps` must
    /// be at least 1.
    pub fn new(t0: f64, alpha: f64, steps: u64) -> Result<Self, AnnealError> {
        if !(t0 > 0.0) {
            return Err(AnnealError::InvalidTemperature(t0));
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(AnnealError::InvalidAlpha(alpha));
        }
        if steps < 1 {
            return Err(AnnealError::InvalidSteps(steps));
        }
        Ok(Self {
            state: ExpState::new(t0, alpha, steps),
            rng: SplittableRng::new_random(),
        })
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.state.t
    }
}

impl AnnealingSchedule for ExponentialCooling {
    fn init(&mut self, _max_evals: u64) {
        self.state.reset();
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, self.state.t);
        self.state.advance();
        accepted
    }
}

impl Splittable for ExponentialCooling {
    fn split(&self) -> Self {
        Self {
            state: self.state,
            rng: self.rng.split(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cools_geometrically_every_step() {
        // Scenario from §8: exp(t0=100, alpha=0.5, steps=1); ten always-accept
        // calls must drive the temperature through this exact sequence.
        let mut sched = ExponentialCooling::new(100.0, 0.5, 1).unwrap();
        sched.init(1000);
        let expected = [
            50.0,
            25.0,
            12.5,
            6.25,
            3.125,
            1.5625,
            0.78125,
            0.390625,
            0.1953125,
            0.09765625,
        ];
        for expected_t in expected {
            assert!(sched.accept(0.0, 0.0));
            assert!((sched.temperature() - expected_t).abs() < 1e-12);
        }
    }

    #[test]
    fn worsening_moves_are_sometimes_accepted_and_undone() {
        let mut sched = ExponentialCooling::new(10.0, 0.9, 5).unwrap();
        sched.init(100);
        let mut accepted_any = false;
        let mut rejected_any = false;
        for _ in 0..500 {
            if sched.accept(5.0, 0.0) {
                accepted_any = true;
            } else {
                rejected_any = true;
            }
        }
        assert!(accepted_any && rejected_any);
    }

    #[test]
    fn improving_moves_are_always_accepted() {
        let mut sched = ExponentialCooling::new(0.01, 0.5, 1).unwrap();
        sched.init(10);
        assert!(sched.accept(1.0, 1.0));
        assert!(sched.accept(0.0, 1.0));
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(ExponentialCooling::new(0.0, 0.5, 1).is_err());
        assert!(ExponentialCooling::new(1.0, 1.0, 1).is_err());
        assert!(ExponentialCooling::new(1.0, 0.5, 0).is_err());
    }
}
