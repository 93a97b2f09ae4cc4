//! Optimized Modified Lam annealing (§4.3): computes the same target-rate
//! curve as [`super::modified_lam::ModifiedLam`] but incrementally, replacing
//! a `powf` call on every iteration with one multiplication against a
//! precomputed per-phase ratio.

use super::common::accept_metropolis;
use super::modified_lam::phase_bounds;
use super::AnnealingSchedule;
use crate::rng::SplittableRng;
use crate::splittable::Splittable;

const PLATEAU_RATE: f64 = 0.44;
const ACCEPT_RATE_EMA: f64 = 0.002;
/// `1.0 / 0.999`, precomputed so cooling down can be a multiply rather than a
/// division on every iteration.
const INV_TEMP_STEP: f64 = 1.001_001_001_001_001;
const TEMP_STEP: f64 = 0.999;

/// Incremental target-rate tracker shared by construction and `split`.
#[derive(Debug, Clone, Copy)]
struct TargetRateTracker {
    n: f64,
    phase1: f64,
    phase2: f64,
    /// `560^(-iter/phase1)`, updated by one multiplication per phase-1 call.
    term1: f64,
    mult1: f64,
    /// `440^(-(iter-phase2)/(n-phase2))`, updated the same way in phase 3.
    term3: f64,
    mult3: f64,
}

impl TargetRateTracker {
    fn new(n: f64, phase1: f64, phase2: f64) -> Self {
        Self {
            n,
            phase1,
            phase2,
            term1: 1.0,
            mult1: 560f64.powf(-1.0 / phase1),
            term3: 1.0,
            mult3: 440f64.powf(-1.0 / (n - phase2).max(1.0)),
        }
    }

    /// Advances the tracker by one iteration (`iter` is the new, post-advance
    /// iteration count) and returns the target rate at that iteration.
    fn advance(&mut self, iter: f64) -> f64 {
        if iter <= self.phase1 {
            self.term1 *= self.mult1;
            PLATEAU_RATE + (1.0 - PLATEAU_RATE) * self.term1
        } else if iter <= self.phase2 {
            PLATEAU_RATE
        } else {
            self.term3 *= self.mult3;
            PLATEAU_RATE * self.term3
        }
    }
}

/// Functionally equivalent to [`super::modified_lam::ModifiedLam`], but tracks
/// the target-rate curve with precomputed multipliers instead of recomputing
/// `powf` from scratch every call.
pub struct OptimizedModifiedLam {
    t: f64,
    accept_rate: f64,
    iter: f64,
    tracker: TargetRateTracker,
    rng: SplittableRng,
}

impl OptimizedModifiedLam {
    pub fn new() -> Self {
        Self {
            t: 0.5,
            accept_rate: 0.5,
            iter: 0.0,
            tracker: TargetRateTracker::new(1.0, 1.0, 2.0),
            rng: SplittableRng::new_random(),
        }
    }

    /// The current temperature.
    pub fn temperature(&self) -> f64 {
        self.t
    }
}

impl Default for OptimizedModifiedLam {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for OptimizedModifiedLam {
    fn init(&mut self, max_evals: u64) {
        let (n, phase1, phase2) = phase_bounds(max_evals);
        self.t = 0.5;
        self.accept_rate = 0.5;
        self.iter = 0.0;
        self.tracker = TargetRateTracker::new(n, phase1, phase2);
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64) -> bool {
        let accepted = accept_metropolis(&mut self.rng, neighbor_cost, current_cost, self.t);
        self.accept_rate = (1.0 - ACCEPT_RATE_EMA) * self.accept_rate
            + ACCEPT_RATE_EMA * if accepted { 1.0 } else { 0.0 };
        self.iter += 1.0;
        let target = self.tracker.advance(self.iter);
        if self.accept_rate > target {
            self.t *= TEMP_STEP;
        } else {
            self.t *= INV_TEMP_STEP;
        }
        accepted
    }
}

impl Splittable for OptimizedModifiedLam {
    fn split(&self) -> Self {
        Self {
            t: self.t,
            accept_rate: self.accept_rate,
            iter: self.iter,
            tracker: self.tracker,
            rng: self.rng.split(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::modified_lam::target_rate as closed_form_target_rate;
    use super::*;

    #[test]
    fn incremental_target_rate_matches_the_closed_form_every_step() {
        let (n, phase1, phase2) = phase_bounds(100);
        let mut tracker = TargetRateTracker::new(n, phase1, phase2);
        for i in 1..=100u64 {
            let incremental = tracker.advance(i as f64);
            let closed_form = closed_form_target_rate(i as f64, n, phase1, phase2);
            assert!(
                (incremental - closed_form).abs() < 1e-9,
                "iter {i}: incremental={incremental} closed_form={closed_form}"
            );
        }
    }

    #[test]
    fn inverse_temp_step_is_the_reciprocal_of_temp_step() {
        assert!((INV_TEMP_STEP * TEMP_STEP - 1.0).abs() < 1e-12);
    }

    #[test]
    fn always_accepts_non_worsening_moves() {
        let mut sched = OptimizedModifiedLam::new();
        sched.init(1000);
        for _ in 0..200 {
            assert!(sched.accept(1.0, 2.0));
            assert!(sched.accept(2.0, 2.0));
        }
    }
}
