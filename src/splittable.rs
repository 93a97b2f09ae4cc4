//! The contract shared by every stateful search component (§4.1): mutation,
//! initializer, schedule, search, multistarter, orchestrator all expose
//! `split()`.

/// A functionally equivalent, independently-stateful copy for use by another
/// worker.
///
/// Implementations must guarantee:
/// - the returned instance shares no mutable state with `self`;
/// - if the component owns a random stream, the split's stream is independent
///   of (but deterministically derived from) the original's;
/// - after splitting, further operations on either side are not observable
///   from the other.
///
/// A stateless, already-thread-safe operator may implement this by returning
/// `self.clone()` — each implementor below documents which case it is.
pub trait Splittable {
    /// Produce an independent copy of `self`. Must not fail.
    fn split(&self) -> Self;
}
