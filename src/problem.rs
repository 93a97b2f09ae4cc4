//! The `Problem` interface consumed by the engine (§3, §6).
//!
//! A problem is a pure function from candidate to cost. It carries no
//! process-wide mutable state and must be safe to call concurrently from every
//! worker thread (§5 "The problem instance is shared read-only").
//!
//! Both the "integer-valued" and "real-valued" problem variants named in §3 are
//! represented by the same trait: every schedule's acceptance math (§4.3) is
//! defined over a real-valued Boltzmann factor regardless of whether the
//! underlying cost domain is integral, so an integer-cost problem is simply one
//! whose `cost` happens to always return an integral `f64`.

/// A cost function and its associated theoretical-optimum predicate.
pub trait Problem<T>: Send + Sync {
    /// The cost of a candidate solution (lower is better).
    fn cost(&self, candidate: &T) -> f64;

    /// The objective value of a candidate, possibly negated relative to
    /// `cost` so that "bigger is better" for callers that want a maximization
    /// view. Defaults to `-cost`.
    fn value(&self, candidate: &T) -> f64 {
        -self.cost(candidate)
    }

    /// Whether `cost` equals the problem's theoretical minimum.
    ///
    /// The default implementation compares against [`Problem::min_cost`] when
    /// one is known, and otherwise always returns `false` (a problem with no
    /// known optimum never short-circuits a search).
    fn is_min_cost(&self, cost: f64) -> bool {
        self.min_cost().is_some_and(|m| cost <= m)
    }

    /// The theoretical minimum cost, when known.
    fn min_cost(&self) -> Option<f64> {
        None
    }
}
