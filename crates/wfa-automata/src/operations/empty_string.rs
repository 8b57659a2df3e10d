use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use wfa_core::Semiring;

use crate::{Automaton, ReverselyAccessibleAutomaton, Weight};

/// The only state of an [`EmptyString`] automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmptyStringState;

/// Accepts exactly the empty string, with weight one.
///
/// A single state that is both initial and final, without transitions.
pub struct EmptyString<S, L> {
    semiring: S,
    _label: PhantomData<fn() -> L>,
}

impl<S, L> EmptyString<S, L> {
    pub fn new(semiring: S) -> Self {
        Self {
            semiring,
            _label: PhantomData,
        }
    }
}

impl<S, L> Automaton for EmptyString<S, L>
where
    S: Semiring,
    L: Clone + Eq + Hash + fmt::Debug,
{
    type State = EmptyStringState;
    type Transition = Infallible;
    type Label = L;
    type Semiring = S;

    fn semiring(&self) -> &S {
        &self.semiring
    }

    fn initial_states(&self) -> Vec<EmptyStringState> {
        vec![EmptyStringState]
    }

    fn initial_weight(&self, _state: &EmptyStringState) -> Weight<Self> {
        self.semiring.one()
    }

    fn final_weight(&self, _state: &EmptyStringState) -> Weight<Self> {
        self.semiring.one()
    }

    fn transitions_out(&self, _state: &EmptyStringState) -> Vec<Infallible> {
        Vec::new()
    }

    fn source(&self, transition: &Infallible) -> EmptyStringState {
        match *transition {}
    }

    fn target(&self, transition: &Infallible) -> EmptyStringState {
        match *transition {}
    }

    fn label(&self, transition: &Infallible) -> Option<L> {
        match *transition {}
    }

    fn transition_weight(&self, transition: &Infallible) -> Weight<Self> {
        match *transition {}
    }
}

impl<S, L> ReverselyAccessibleAutomaton for EmptyString<S, L>
where
    S: Semiring,
    L: Clone + Eq + Hash + fmt::Debug,
{
    fn final_states(&self) -> Vec<EmptyStringState> {
        vec![EmptyStringState]
    }

    fn transitions_in(&self, _state: &EmptyStringState) -> Vec<Infallible> {
        Vec::new()
    }
}
