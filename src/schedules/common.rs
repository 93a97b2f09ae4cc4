//! State and acceptance math shared by more than one schedule variant.

use rand::Rng;

use crate::rng::SplittableRng;

/// Below this temperature, geometric/linear cooling stops lowering `t` further
/// (but per §9's redesign-flag note, per-temperature step counters keep
/// advancing regardless — preserved here exactly as specified).
pub(crate) const FLOOR_TEMP: f64 = 0.001;

/// The acceptance rule common to every schedule (§4.3): accept unconditionally
/// on improvement or tie, otherwise accept with the Boltzmann probability
/// `exp((current - neighbor) / t)`.
pub(crate) fn accept_metropolis(
    rng: &mut SplittableRng,
    neighbor_cost: f64,
    current_cost: f64,
    t: f64,
) -> bool {
    if neighbor_cost <= current_cost {
        return true;
    }
    if t <= 0.0 {
        return false;
    }
    let p = ((current_cost - neighbor_cost) / t).exp();
    rng.random::<f64>() < p
}

/// Geometric (exponential) cooling state, reused by [`super::exponential`]
/// directly and by the running phase of [`super::parameter_free`]'s
/// exponential variant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpState {
    pub t: f64,
    pub t0: f64,
    pub alpha: f64,
    pub steps: u64,
    pub step: u64,
}

impl ExpState {
    pub fn new(t0: f64, alpha: f64, steps: u64) -> Self {
        Self {
            t: t0,
            t0,
            alpha,
            steps,
            step: 0,
        }
    }

    pub fn reset(&mut self) {
        self.t = self.t0;
        self.step = 0;
    }

    pub fn advance(&mut self) {
        self.step += 1;
        if self.step == self.steps && self.t > FLOOR_TEMP {
            self.t *= self.alpha;
            self.step = 0;
        }
    }
}

/// Linear cooling state, reused by [`super::linear`] directly and by the
/// running phase of [`super::parameter_free`]'s linear variant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinState {
    pub t: f64,
    pub t0: f64,
    pub delta: f64,
    pub steps: u64,
    pub step: u64,
}

impl LinState {
    pub fn new(t0: f64, delta: f64, steps: u64) -> Self {
        Self {
            t: t0,
            t0,
            delta,
            steps,
            step: 0,
        }
    }

    pub fn reset(&mut self) {
        self.t = self.t0;
        self.step = 0;
    }

    pub fn advance(&mut self) {
        self.step += 1;
        if self.step == self.steps && self.t > FLOOR_TEMP {
            self.t = (self.t - self.delta).max(FLOOR_TEMP);
            self.step = 0;
        }
    }
}

/// Smallest power-of-two `steps` such that
/// `alpha = (0.001 / t0) ^ (1 / ceil(remaining / steps)) <= 0.999`, as
/// required when an exponential schedule's parameters are estimated rather
/// than supplied (§4.3 parameter-free exponential cooling).
pub(crate) fn derive_exponential_steps_alpha(t0: f64, remaining: u64) -> (u64, f64) {
    let remaining = remaining.max(1);
    let mut steps: u64 = 1;
    loop {
        let num_steps = (remaining as f64 / steps as f64).ceil().max(1.0);
        let alpha = (0.001_f64 / t0).powf(1.0 / num_steps);
        if alpha <= 0.999 || steps >= remaining {
            return (steps, alpha.clamp(f64::MIN_POSITIVE, 0.999));
        }
        steps *= 2;
    }
}

/// Smallest power-of-two `steps` such that
/// `delta_t = (t0 - 0.001) / ceil(remaining / steps) >= 1e-6`, the linear
/// analogue of [`derive_exponential_steps_alpha`] (§4.3 parameter-free linear
/// cooling).
pub(crate) fn derive_linear_steps_delta(t0: f64, remaining: u64) -> (u64, f64) {
    let remaining = remaining.max(1);
    let mut steps: u64 = 1;
    loop {
        let num_steps = (remaining as f64 / steps as f64).ceil().max(1.0);
        let delta = (t0 - 0.001) / num_steps;
        if delta >= 1e-6 || steps >= remaining {
            return (steps, delta.max(1e-6));
        }
        steps *= 2;
    }
}
