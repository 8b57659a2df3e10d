// The lazy automaton contract and topological orders.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;
use wfa_core::Semiring;

use crate::Weight;

/// A weighted automaton whose states and transitions are produced on demand.
///
/// States and transitions are opaque identifiers compared by value. An
/// implementation never has to enumerate all of its states: algorithms only
/// ask for the initial states and then follow `transitions_out`, so an
/// automaton may describe an infinite or combinatorially large graph as long as
/// the part reachable from a query is finite.
///
/// Initial and final weights generalize initial and final flags: a state is
/// initial (final) when its initial (final) weight is not the semiring's zero.
/// A transition without a label is an epsilon transition.
pub trait Automaton {
    type State: Clone + Eq + Hash + fmt::Debug;
    type Transition: Clone + Eq + Hash + fmt::Debug;
    type Label: Clone + Eq + Hash + fmt::Debug;
    type Semiring: Semiring;

    fn semiring(&self) -> &Self::Semiring;

    /// States with a non-zero initial weight.
    fn initial_states(&self) -> Vec<Self::State>;

    fn initial_weight(&self, state: &Self::State) -> <Self::Semiring as Semiring>::Weight;

    fn final_weight(&self, state: &Self::State) -> <Self::Semiring as Semiring>::Weight;

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition>;

    /// State a transition leaves from.
    fn source(&self, transition: &Self::Transition) -> Self::State;

    /// State a transition leads to.
    fn target(&self, transition: &Self::Transition) -> Self::State;

    /// Label of a transition, `None` for epsilon.
    fn label(&self, transition: &Self::Transition) -> Option<Self::Label>;

    fn transition_weight(&self, transition: &Self::Transition) -> <Self::Semiring as Semiring>::Weight;

    /// A total order of the states in which every transition leads forward,
    /// if the automaton knows one.
    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        None
    }
}

/// An automaton that can also be walked backwards.
///
/// Required by operations that need the final states up front or the incoming
/// transitions of a state (reversal, weight pushing).
pub trait ReverselyAccessibleAutomaton: Automaton {
    /// States with a non-zero final weight.
    fn final_states(&self) -> Vec<Self::State>;

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition>;
}

impl<A: Automaton + ?Sized> Automaton for &A {
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &Self::Semiring {
        (**self).semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        (**self).initial_states()
    }

    fn initial_weight(&self, state: &Self::State) -> Weight<Self> {
        (**self).initial_weight(state)
    }

    fn final_weight(&self, state: &Self::State) -> Weight<Self> {
        (**self).final_weight(state)
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        (**self).transitions_out(state)
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        (**self).source(transition)
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        (**self).target(transition)
    }

    fn label(&self, transition: &Self::Transition) -> Option<Self::Label> {
        (**self).label(transition)
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<Self> {
        (**self).transition_weight(transition)
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        (**self).topological_order()
    }
}

impl<A: ReverselyAccessibleAutomaton + ?Sized> ReverselyAccessibleAutomaton for &A {
    fn final_states(&self) -> Vec<Self::State> {
        (**self).final_states()
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        (**self).transitions_in(state)
    }
}

/// Rank of every state in a topological order.
///
/// States without a rank sort after all ranked states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder<S: Eq + Hash> {
    ranks: HashMap<S, usize>,
}

impl<S: Eq + Hash> TopologicalOrder<S> {
    /// Build an order from states listed first to last.
    pub fn from_sequence(states: impl IntoIterator<Item = S>) -> Self {
        let ranks = states
            .into_iter()
            .enumerate()
            .map(|(rank, state)| (state, rank))
            .collect();
        Self { ranks }
    }

    pub fn rank(&self, state: &S) -> Option<usize> {
        self.ranks.get(state).copied()
    }

    pub fn compare(&self, s1: &S, s2: &S) -> Ordering {
        match (self.rank(s1), self.rank(s2)) {
            (Some(r1), Some(r2)) => r1.cmp(&r2),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// States in order, first rank first.
    pub fn states(&self) -> Vec<&S> {
        let mut states: Vec<(&S, usize)> = self.ranks.iter().map(|(s, &r)| (s, r)).collect();
        states.sort_unstable_by_key(|&(_, rank)| rank);
        states.into_iter().map(|(s, _)| s).collect()
    }

    /// Translate the order to another state type, shifting every rank by `offset`.
    pub fn map<U: Eq + Hash>(&self, offset: usize, f: impl Fn(&S) -> U) -> TopologicalOrder<U> {
        let ranks = self
            .ranks
            .iter()
            .map(|(state, &rank)| (f(state), rank + offset))
            .collect();
        TopologicalOrder { ranks }
    }

    /// The same states, last rank first.
    pub fn reversed(&self) -> Self
    where
        S: Clone,
    {
        let last = self.ranks.values().copied().max().unwrap_or(0);
        let ranks = self
            .ranks
            .iter()
            .map(|(state, &rank)| (state.clone(), last - rank))
            .collect();
        Self { ranks }
    }

    /// Concatenate two orders: every state of `self` ranks before every state of `other`.
    pub fn chain<T: Eq + Hash, U: Eq + Hash>(
        &self,
        other: &TopologicalOrder<T>,
        left: impl Fn(&S) -> U,
        right: impl Fn(&T) -> U,
    ) -> TopologicalOrder<U> {
        let offset = self.ranks.values().copied().max().map_or(0, |max| max + 1);
        let mut ranks: HashMap<U, usize> = self.map(0, left).ranks;
        ranks.extend(other.map(offset, right).ranks);
        TopologicalOrder { ranks }
    }
}
