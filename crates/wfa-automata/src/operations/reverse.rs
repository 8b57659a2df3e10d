use std::cell::OnceCell;

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// The operand with every transition turned around.
///
/// Initial and final weights swap roles. Reversing twice gives back the
/// operand.
pub struct Reverse<A: Automaton> {
    operand: A,
    order: OnceCell<Option<TopologicalOrder<A::State>>>,
}

impl<A: ReverselyAccessibleAutomaton> Reverse<A> {
    pub fn new(operand: A) -> Self {
        Self {
            operand,
            order: OnceCell::new(),
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }
}

impl<A: ReverselyAccessibleAutomaton> Automaton for Reverse<A> {
    type State = A::State;
    type Transition = A::Transition;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<A::State> {
        self.operand.final_states()
    }

    fn initial_weight(&self, state: &A::State) -> Weight<A> {
        self.operand.final_weight(state)
    }

    fn final_weight(&self, state: &A::State) -> Weight<A> {
        self.operand.initial_weight(state)
    }

    fn transitions_out(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_in(state)
    }

    fn source(&self, transition: &A::Transition) -> A::State {
        self.operand.target(transition)
    }

    fn target(&self, transition: &A::Transition) -> A::State {
        self.operand.source(transition)
    }

    fn label(&self, transition: &A::Transition) -> Option<A::Label> {
        self.operand.label(transition)
    }

    fn transition_weight(&self, transition: &A::Transition) -> Weight<A> {
        self.operand.transition_weight(transition)
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<A::State>> {
        self.order
            .get_or_init(|| self.operand.topological_order().map(TopologicalOrder::reversed))
            .as_ref()
    }
}

impl<A: ReverselyAccessibleAutomaton> ReverselyAccessibleAutomaton for Reverse<A> {
    fn final_states(&self) -> Vec<A::State> {
        self.operand.initial_states()
    }

    fn transitions_in(&self, state: &A::State) -> Vec<A::Transition> {
        self.operand.transitions_out(state)
    }
}
