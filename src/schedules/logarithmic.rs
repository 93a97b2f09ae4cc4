//! Logarithmic cooling (§4.3): `t ← c / ln(e + k)`, decided before `k`
//! advances each call.

use super::common::accept_metropolis;
use super::AnnealingSchedule;
use crate::error::AnnealError;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

pub struct LogarithmicCooling {
    c: f64,
    t: f64,
    k: u64,
    rng: SplittableRng,
}

impl LogarithmicCooling {
    /// `c` must be positive.
    pub fn new(c: f64) -> Result<Self, AnnealError> {
        if !(c > 0.0) {
            return Err(AnnealError::InvalidTemperature(c));
        }
        Ok(Self {
            c,
            t: c,
            k: 0,
            rng: SplittableRng::new_random(),
        })
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.t
    }
}

impl AnnealingSchedule for LogarithmicCooling {
    fn init(&mut self, _max_evals: u64) {
        self.t = self.c;
        self.k = 0;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, self.t);
        self.k += 1;
        self.t = self.c / (std::f64::consts::E + self.k as f64).ln();
        accepted
    }
}

impl Splittable for LogarithmicCooling {
    fn split(&self) -> Self {
        Self {
            c: self.c,
            t: self.t,
            k: self.k,
            rng: self.rng.split(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_follows_the_logarithmic_curve() {
        let mut sched = LogarithmicCooling::new(10.0).unwrap();
        sched.init(100);
        assert!(sched.accept(0.0, 0.0));
        let expected_t1 = 10.0 / (std::f64::consts::E + 1.0).ln();
        assert!((sched.temperature() - expected_t1).abs() < 1e-12);

        assert!(sched.accept(0.0, 0.0));
        let expected_t2 = 10.0 / (std::f64::consts::E + 2.0).ln();
        assert!((sched.temperature() - expected_t2).abs() < 1e-12);
    }

    #[test]
    fn temperature_monotonically_decreases() {
        let mut sched = LogarithmicCooling::new(5.0).unwrap();
        sched.init(1000);
        let mut prev = sched.temperature();
        for _ in 0..50 {
            sched.accept(0.0, 0.0);
            assert!(sched.temperature() < prev);
            prev = sched.temperature();
        }
    }

    #[test]
    fn rejects_non_positive_c() {
        assert!(LogarithmicCooling::new(0.0).is_err());
        assert!(LogarithmicCooling::new(-1.0).is_err());
    }
}
