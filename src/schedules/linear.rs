//! Linear cooling (§4.3).

use super::common::{accept_metropolis, LinState};
use super::AnnealingSchedule;
use crate::error::AnnealError;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

/// Cools by a constant decrement `delta_t` every `steps` evaluations, floored
/// at `0.001`.
pub struct LinearCooling {
    state: LinState,
    rng: SplittableRng,
}

impl LinearCooling {
    /// `t0` must be positive, `delta_t` must be positive, and `steps` must be
    /// at least 1.
    pub fn new(t0: f64, delta_t: f64, steps: u64) -> Result<Self, AnnealError> {
        if !(t0 > 0.0) {
            return Err(AnnealError::InvalidTemperature(t0));
        }
        if !(delta_t > 0.0) {
            return Err(AnnealError::InvalidDelta(delta_t));
        }
        if steps < 1 {
            return Err(AnnealError::InvalidSteps(steps));
        }
        Ok(Self {
            state: LinState::new(t0, delta_t, steps),
            rng: SplittableRng::new_random(),
        })
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.state.t
    }
}

impl AnnealingSchedule for LinearCooling {
    fn init(&mut self, _max_evals: u64) {
        self.state.reset();
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, self.state.t);
        self.state.advance();
        accepted
    }
}

impl Splittable for LinearCooling {
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
    fn the_floor_clamps_the_final_decrement() {
        // Scenario from §8: lin(t0=1.0, delta_t=0.5, steps=1); three
        // always-accept calls produce {0.5, 0.001, 0.001}.
        let mut sched = LinearCooling::new(1.0, 0.5, 1).unwrap();
        sched.init(100);
        for expected_t in [0.5, 0.001, 0.001] {
            assert!(sched.accept(0.0, 0.0));
            assert!((sched.temperature() - expected_t).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(LinearCooling::new(0.0, 0.5, 1).is_err());
        assert!(LinearCooling::new(1.0, 0.0, 1).is_err());
        assert!(LinearCooling::new(1.0, 0.5, 0).is_err());
    }
}
