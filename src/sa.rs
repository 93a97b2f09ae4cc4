//! The simulated-annealing driver (L4, §4.4): one SA loop wired up generically
//! over a problem, a mutation operator, an initializer, and an annealing
//! schedule.
//!
//! Grounded on `solver-core/src/algorithms/simulated_annealing.rs`'s overall
//! loop shape (propose → evaluate → accept/undo → track best → check stop
//! conditions) and on `algorithms/mod.rs`'s `Solver` trait, generalized here
//! to the engine-wide [`Metaheuristic`] contract so the driver is one
//! implementor among several (multistarters and parallel orchestrators
//! implement it too).

use std::sync::Arc;

use log::{debug, trace};

use crate::operators::{HillClimber, Initializer, Mutation};
use crate::pair::SolutionCostPair;
use crate::problem::Problem;
use crate::splittable::Splittable;
use crate::tracker::ProgressTracker;

/// The engine-wide search interface (§6): `optimize`, the shared collaborators
/// it reports through, and `split`.
pub trait Metaheuristic<T>: Splittable {
    /// Run at most `max_evals` proposed neighbors, returning the best pair
    /// found (or the in-flight candidate if cooperatively stopped early), or
    /// `None` if the tracker had already signalled completion before this
    /// call started.
    fn optimize(&mut self, max_evals: u64) -> Option<SolutionCostPair<T>>;

    /// The problem this search evaluates candidates against.
    fn problem(&self) -> &dyn Problem<T>;

    /// The tracker this search reports into.
    fn tracker(&self) -> &ProgressTracker<T>;

    /// Attach a (possibly shared) tracker, replacing whichever one this
    /// search previously held.
    fn set_tracker(&mut self, tracker: ProgressTracker<T>);

    /// Total neighbor evaluations consumed across this search's lifetime.
    fn total_run_length(&self) -> u64;
}

/// A [`Metaheuristic`] that can also resume from the tracker's current best
/// solution rather than always starting from a fresh initial candidate.
pub trait ReoptimizableMetaheuristic<T>: Metaheuristic<T> {
    /// Like [`Metaheuristic::optimize`], but starts from a copy of
    /// `tracker.best_solution()` when one exists, falling back to a freshly
    /// constructed candidate otherwise.
    fn reoptimize(&mut self, max_evals: u64) -> Option<SolutionCostPair<T>>;
}

/// One simulated-annealing search: `(problem, mutation, initializer, schedule,
/// tracker, optional post-processing hill climber, elapsed_evals)` (§4.4).
pub struct SimulatedAnnealing<T, P, M, I, S> {
    problem: Arc<P>,
    mutation: M,
    initializer: I,
    schedule: S,
    tracker: ProgressTracker<T>,
    hill_climber: Option<Box<dyn HillClimber<T> + Send>>,
    elapsed_evals: u64,
}

impl<T, P, M, I, S> SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone,
    P: Problem<T>,
    M: Mutation<T>,
    I: Initializer<T>,
    S: crate::schedules::AnnealingSchedule,
{
    /// Build a driver over a fresh tracker.
    pub fn new(problem: Arc<P>, mutation: M, initializer: I, schedule: S) -> Self {
        Self::with_tracker(problem, mutation, initializer, schedule, ProgressTracker::new())
    }

    /// Build a driver reporting into an existing (possibly shared) tracker.
    pub fn with_tracker(
        problem: Arc<P>,
        mutation: M,
        initializer: I,
        schedule: S,
        tracker: ProgressTracker<T>,
    ) -> Self {
        Self {
            problem,
            mutation,
            initializer,
            schedule,
            tracker,
            hill_climber: None,
            elapsed_evals: 0,
        }
    }

    /// Attach a post-processing hill climber, sharing this driver's tracker
    /// with it (§6: "Must share the same tracker as the SA driver").
    pub fn with_hill_climber(mut self, mut hill_climber: Box<dyn HillClimber<T> + Send>) -> Self {
        hill_climber.set_tracker(self.tracker.clone());
        self.hill_climber = Some(hill_climber);
        self
    }

    fn run(&mut self, max_evals: u64, current: T) -> Option<SolutionCostPair<T>> {
        if self.tracker.did_find_best() || self.tracker.is_stopped() {
            return None;
        }

        let mut current = current;
        let mut current_cost = self.problem.cost(&current);
        self.tracker
            .update(current_cost, &current, self.problem.is_min_cost(current_cost));
        if self.problem.is_min_cost(current_cost) {
            debug!("initial candidate is already the theoretical optimum");
            return Some(SolutionCostPair::new(current, current_cost, true));
        }

        self.schedule.init(max_evals);
        debug!("schedule re-initialized for a run of {max_evals} evaluations");

        for i in 1..=max_evals {
            if self.tracker.is_stopped() {
                self.elapsed_evals += i - 1;
                trace!("stop observed after {} of {} evaluations", i - 1, max_evals);
                let is_min = self.problem.is_min_cost(current_cost);
                return Some(SolutionCostPair::new(current, current_cost, is_min));
            }

            self.mutation.mutate(&mut current);
            let neighbor_cost = self.problem.cost(&current);

            if self.schedule.accept(neighbor_cost, current_cost) {
                current_cost = neighbor_cost;
                self.tracker
                    .update(current_cost, &current, self.problem.is_min_cost(current_cost));
                if self.problem.is_min_cost(current_cost) {
                    self.elapsed_evals += i;
                    debug!("theoretical optimum reached after {i} evaluations");
                    return Some(SolutionCostPair::new(current, current_cost, true));
                }
            } else {
                self.mutation.undo(&mut current);
            }
        }
        self.elapsed_evals += max_evals;

        if let Some(hill_climber) = &mut self.hill_climber {
            let start = current.clone();
            if let Some(pair) = hill_climber.optimize(start) {
                return Some(pair);
            }
        }
        let is_min = self.problem.is_min_cost(current_cost);
        Some(SolutionCostPair::new(current, current_cost, is_min))
    }
}

impl<T, P, M, I, S> Metaheuristic<T> for SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone,
    P: Problem<T>,
    M: Mutation<T>,
    I: Initializer<T>,
    S: crate::schedules::AnnealingSchedule,
{
    fn optimize(&mut self, max_evals: u64) -> Option<SolutionCostPair<T>> {
        if self.tracker.did_find_best() || self.tracker.is_stopped() {
            return None;
        }
        let current = self.initializer.create_candidate();
        self.run(max_evals, current)
    }

    fn problem(&self) -> &dyn Problem<T> {
        &*self.problem
    }

    fn tracker(&self) -> &ProgressTracker<T> {
        &self.tracker
    }

    fn set_tracker(&mut self, tracker: ProgressTracker<T>) {
        self.tracker = tracker;
    }

    fn total_run_length(&self) -> u64 {
        self.elapsed_evals
    }
}

impl<T, P, M, I, S> ReoptimizableMetaheuristic<T> for SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone,
    P: Problem<T>,
    M: Mutation<T>,
    I: Initializer<T>,
    S: crate::schedules::AnnealingSchedule,
{
    fn reoptimize(&mut self, max_evals: u64) -> Option<SolutionCostPair<T>> {
        if self.tracker.did_find_best() || self.tracker.is_stopped() {
            return None;
        }
        let current = self
            .tracker
            .solution()
            .unwrap_or_else(|| self.initializer.create_candidate());
        self.run(max_evals, current)
    }
}

/// Splitting a driver yields a worker with independent mutation, initializer,
/// and schedule streams, a fresh (unshared) tracker, and no hill climber —
/// every split copy starts from the same problem (shared read-only, §5) and
/// is expected to have its tracker replaced via [`Metaheuristic::set_tracker`]
/// before being handed to a parallel orchestrator.
impl<T, P, M, I, S> Splittable for SimulatedAnnealing<T, P, M, I, S>
where
    M: Mutation<T>,
    I: Initializer<T>,
    S: crate::schedules::AnnealingSchedule,
{
    fn split(&self) -> Self {
        Self {
            problem: Arc::clone(&self.problem),
            mutation: self.mutation.split(),
            initializer: self.initializer.split(),
            schedule: self.schedule.split(),
            tracker: ProgressTracker::new(),
            hill_climber: None,
            elapsed_evals: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SplittableRng;
    use crate::schedules::ExponentialCooling;
    use rand::Rng;

    struct AbsDistance;

    impl Problem<i64> for AbsDistance {
        fn cost(&self, candidate: &i64) -> f64 {
            candidate.unsigned_abs() as f64
        }

        fn min_cost(&self) -> Option<f64> {
            Some(0.0)
        }
    }

    struct StepMutation {
        rng: SplittableRng,
        last_step: i64,
    }

    impl Splittable for StepMutation {
        fn split(&self) -> Self {
            Self {
                rng: self.rng.split(),
                last_step: 0,
            }
        }
    }

    impl Mutation<i64> for StepMutation {
        fn mutate(&mut self, candidate: &mut i64) {
            let step = if self.rng.random::<bool>() { 1 } else { -1 };
            self.last_step = step;
            *candidate += step;
        }

        fn undo(&mut self, candidate: &mut i64) {
            *candidate -= self.last_step;
        }
    }

    struct FixedStart(i64);

    impl Splittable for FixedStart {
        fn split(&self) -> Self {
            Self(self.0)
        }
    }

    impl Initializer<i64> for FixedStart {
        fn create_candidate(&mut self) -> i64 {
            self.0
        }
    }

    fn make_driver(
    ) -> SimulatedAnnealing<i64, AbsDistance, StepMutation, FixedStart, ExponentialCooling> {
        SimulatedAnnealing::new(
            Arc::new(AbsDistance),
            StepMutation {
                rng: SplittableRng::new_random(),
                last_step: 0,
            },
            FixedStart(1000),
            ExponentialCooling::new(50.0, 0.9, 5).unwrap(),
        )
    }

    #[test]
    fn elapsed_evals_grows_by_exactly_max_evals_on_a_full_run() {
        let mut driver = make_driver();
        driver.optimize(200);
        assert_eq!(driver.total_run_length(), 200);
    }

    #[test]
    fn tracker_best_cost_never_increases_across_a_run() {
        let mut driver = make_driver();
        driver.optimize(500);
        let final_cost = driver.tracker().cost();
        assert!(final_cost <= 1000.0);
    }

    #[test]
    fn a_driver_whose_tracker_already_found_the_optimum_returns_none() {
        let mut driver = make_driver();
        driver.tracker().update(0.0, &0, true);
        assert!(driver.optimize(100).is_none());
        assert_eq!(driver.total_run_length(), 0);
    }

    #[test]
    fn split_produces_an_independent_driver_with_its_own_tracker() {
        let driver = make_driver();
        let split = driver.split();
        assert!(!driver.tracker().is_same(split.tracker()));
    }

    #[test]
    fn reaching_the_optimum_returns_immediately_with_is_min_cost_set() {
        let mut driver = SimulatedAnnealing::new(
            Arc::new(AbsDistance),
            StepMutation {
                rng: SplittableRng::new_random(),
                last_step: 0,
            },
            FixedStart(0),
            ExponentialCooling::new(1.0, 0.5, 1).unwrap(),
        );
        let pair = driver.optimize(10).unwrap();
        assert_eq!(pair.cost(), 0.0);
        assert!(pair.is_min_cost());
    }
}
