//! Modified Lam annealing, Boyan form (§4.3): adapts temperature to track a
//! target acceptance-rate curve rather than following a fixed cooling curve.

use super::common::accept_metropolis;
use super::AnnealingSchedule;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

/// Phase-1 target-rate base (§4.3 table).
const PHASE1_BASE: f64 = 560.0;
/// Phase-3 target-rate base (§4.3 table).
const PHASE3_BASE: f64 = 440.0;
/// Plateau target acceptance rate during phase 2 (§4.3 table).
const PLATEAU_RATE: f64 = 0.44;
/// EMA weight applied to each new observation of acceptance (§4.3 table).
const ACCEPT_RATE_EMA: f64 = 0.002;
/// Multiplicative temperature step (§4.3 table).
const TEMP_STEP: f64 = 0.999;

/// The target acceptance-rate curve shared by all three Lam-family schedules:
/// rising from 1.0 towards 0.44 through the first 15% of the run, held flat at
/// 0.44 through the next 50%, then decaying from 0.44 towards 0 over the final
/// 35%.
pub(crate) fn target_rate(iter: f64, n: f64, phase1: f64, phase2: f64) -> f64 {
    if iter <= phase1 {
        PLATEAU_RATE + (1.0 - PLATEAU_RATE) * PHASE1_BASE.powf(-iter / phase1)
    } else if iter <= phase2 {
        PLATEAU_RATE
    } else {
        PLATEAU_RATE * PHASE3_BASE.powf(-((iter / n) - 0.65) / 0.35)
    }
}

pub(crate) fn phase_bounds(max_evals: u64) -> (f64, f64, f64) {
    let n = (max_evals.max(1)) as f64;
    let phase1 = (0.15 * n).max(1.0);
    let phase2 = (0.65 * n).max(phase1 + 1.0);
    (n, phase1, phase2)
}

/// The original ("classic") Modified Lam schedule, recomputing `targetRate`
/// from scratch (via `powf`) on every call.
pub struct ModifiedLam {
    t: f64,
    accept_rate: f64,
    iter: f64,
    n: f64,
    phase1: f64,
    phase2: f64,
    rng: SplittableRng,
}

impl ModifiedLam {
    pub fn new() -> Self {
        Self {
            t: 0.5,
            accept_rate: 0.5,
            iter: 0.0,
            n: 1.0,
            phase1: 1.0,
            phase2: 2.0,
            rng: SplittableRng::new_random(),
        }
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.t
    }

    /// The current target acceptance rate (exposed for testing against
    /// §8 invariant 6 / scenario 3).
    pub fn target_rate(&self) -> f64 {
        target_rate(self.iter, self.n, self.phase1, self.phase2)
    }
}

impl Default for ModifiedLam {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ModifiedLam {
    fn init(&mut self, max_evals: u64) {
        let (n, phase1, phase2) = phase_bounds(max_evals);
        self.t = 0.5;
        self.accept_rate = 0.5;
        self.iter = 0.0;
        self.n = n;
        self.phase1 = phase1;
        self.phase2 = phase2;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, self.t);
        self.accept_rate = (1.0 - ACCEPT_RATE_EMA) * self.accept_rate
            + ACCEPT_RATE_EMA * if accepted { 1.0 } else { 0.0 };
        self.iter += 1.0;
        let target = target_rate(self.iter, self.n, self.phase1, self.phase2);
        if self.accept_rate > target {
            self.t *= TEMP_STEP;
        } else {
            self.t /= TEMP_STEP;
        }
        accepted
    }
}

impl Splittable for ModifiedLam {
    fn split(&self) -> Self {
        Self {
            t: self.t,
            accept_rate: self.accept_rate,
            iter: self.iter,
            n: self.n,
            phase1: self.phase1,
            phase2: self.phase2,
            rng: self.rng.split(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_rate_matches_the_literal_table_scenario() {
        // Scenario from §8: init(100), target rate after 15/16/65/100 calls.
        let (n, phase1, phase2) = phase_bounds(100);
        assert!((target_rate(15.0, n, phase1, phase2) - 0.441).abs() < 1e-3);
        assert!((target_rate(16.0, n, phase1, phase2) - 0.44).abs() < 1e-9);
        assert!((target_rate(65.0, n, phase1, phase2) - 0.44).abs() < 1e-9);
        assert!((target_rate(100.0, n, phase1, phase2) - 0.001).abs() < 1e-9);
    }

    #[test]
    fn target_rate_is_pinned_at_the_plateau_through_the_interior_of_phase_two() {
        let (n, phase1, phase2) = phase_bounds(1000);
        let mut iter = phase1 + 1.0;
        while iter < phase2 {
            assert!((target_rate(iter, n, phase1, phase2) - 0.44).abs() < 1e-9);
            iter += 37.0;
        }
    }

    #[test]
    fn always_accepts_non_worsening_moves() {
        let mut sched = ModifiedLam::new();
        sched.init(1000);
        for _ in 0..200 {
            assert!(sched.accept(1.0, 2.0));
            assert!(sched.accept(2.0, 2.0));
        }
    }
}
