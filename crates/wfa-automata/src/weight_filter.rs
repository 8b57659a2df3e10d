// Hooks that prune or transform weights during shortest-distance search.

use wfa_core::{KTropicalWeight, PathWeight};

/// Verdict of a [`WeightFilter`] on a state or transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Process normally.
    Continue,
    /// Ignore this state or transition.
    Skip,
    /// End the search; distances found so far are returned.
    Stop,
}

/// Inspects the search as it runs.
///
/// `S`, `T` and `W` are the state, transition and weight types of the
/// automaton being searched.
pub trait WeightFilter<S, T, W> {
    /// Called when `state` is taken off the queue with residual `weight`.
    fn filter_state(&self, _state: &S, _weight: &W) -> FilterResult {
        FilterResult::Continue
    }

    /// Called before relaxing `transition` from `state` to `next_state`.
    /// `next_weight` is the distance `next_state` would get, already passed
    /// through [`filter_weight`](Self::filter_weight).
    fn filter_transition(
        &self,
        _state: &S,
        _state_weight: &W,
        _transition: &T,
        _next_state: &S,
        _next_weight: &W,
    ) -> FilterResult {
        FilterResult::Continue
    }

    /// Applied to a candidate distance before it is stored.
    fn filter_weight(&self, weight: W) -> W {
        weight
    }
}

/// Lets everything through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultWeightFilter;

impl<S, T, W> WeightFilter<S, T, W> for DefaultWeightFilter {}

/// Drops k-best entries whose path fails a predicate.
///
/// Used with k-tropical weights to restrict the k-best search to paths with
/// some property, e.g. paths avoiding a transition. States and transitions
/// none of whose entries pass are skipped.
#[derive(Clone)]
pub struct PathWeightFilter<P> {
    predicate: P,
}

impl<P> PathWeightFilter<P> {
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<P> PathWeightFilter<P> {
    fn verdict<W, T>(&self, weight: &KTropicalWeight<W, T>) -> FilterResult
    where
        P: Fn(&PathWeight<W, T>) -> bool,
    {
        if weight.iter().any(|pw| (self.predicate)(pw)) {
            FilterResult::Continue
        } else {
            FilterResult::Skip
        }
    }
}

impl<S, T, W, P> WeightFilter<S, T, KTropicalWeight<W, T>> for PathWeightFilter<P>
where
    P: Fn(&PathWeight<W, T>) -> bool,
{
    fn filter_state(&self, _state: &S, weight: &KTropicalWeight<W, T>) -> FilterResult {
        self.verdict(weight)
    }

    fn filter_transition(
        &self,
        _state: &S,
        _state_weight: &KTropicalWeight<W, T>,
        _transition: &T,
        _next_state: &S,
        next_weight: &KTropicalWeight<W, T>,
    ) -> FilterResult {
        self.verdict(next_weight)
    }

    fn filter_weight(&self, weight: KTropicalWeight<W, T>) -> KTropicalWeight<W, T> {
        weight.into_iter().filter(|pw| (self.predicate)(pw)).collect()
    }
}
