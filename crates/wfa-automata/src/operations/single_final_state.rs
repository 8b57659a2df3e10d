use std::cell::OnceCell;

use wfa_core::Semiring;

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// State of a [`SingleFinalState`] automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndState<S> {
    Inner(S),
    /// The added final state.
    End,
}

/// Transition of a [`SingleFinalState`] automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndTransition<S, T> {
    Inner(T),
    /// Epsilon from a final state of the operand into the end state,
    /// weighted by that state's final weight.
    Exit(S),
}

/// The operand with one fresh final state of weight one, the only final
/// state of the result.
///
/// Every accepted path of the operand ends with an [`EndTransition::Exit`]
/// carrying the final weight it used to end with.
pub struct SingleFinalState<A: Automaton> {
    operand: A,
    order: OnceCell<Option<TopologicalOrder<EndState<A::State>>>>,
}

impl<A: Automaton> SingleFinalState<A> {
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

impl<A: Automaton> Automaton for SingleFinalState<A> {
    type State = EndState<A::State>;
    type Transition = EndTransition<A::State, A::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        self.operand
            .initial_states()
            .into_iter()
            .map(EndState::Inner)
            .collect()
    }

    fn initial_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            EndState::Inner(s) => self.operand.initial_weight(s),
            EndState::End => self.semiring().zero(),
        }
    }

    fn final_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            EndState::Inner(_) => self.semiring().zero(),
            EndState::End => self.semiring().one(),
        }
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            EndState::Inner(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .operand
                    .transitions_out(s)
                    .into_iter()
                    .map(EndTransition::Inner)
                    .collect();
                if !self.semiring().is_zero(&self.operand.final_weight(s)) {
                    transitions.push(EndTransition::Exit(s.clone()));
                }
                transitions
            }
            EndState::End => Vec::new(),
        }
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            EndTransition::Inner(t) => EndState::Inner(self.operand.source(t)),
            EndTransition::Exit(s) => EndState::Inner(s.clone()),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            EndTransition::Inner(t) => EndState::Inner(self.operand.target(t)),
            EndTransition::Exit(_) => EndState::End,
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            EndTransition::Inner(t) => self.operand.label(t),
            EndTransition::Exit(_) => None,
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            EndTransition::Inner(t) => self.operand.transition_weight(t),
            EndTransition::Exit(s) => self.operand.final_weight(s),
        }
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        self.order
            .get_or_init(|| {
                let inner = self.operand.topological_order()?;
                let end = TopologicalOrder::from_sequence([EndState::End]);
                Some(inner.chain(&end, |s| EndState::Inner(s.clone()), EndState::clone))
            })
            .as_ref()
    }
}

impl<A: ReverselyAccessibleAutomaton> ReverselyAccessibleAutomaton for SingleFinalState<A> {
    fn final_states(&self) -> Vec<Self::State> {
        vec![EndState::End]
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            EndState::Inner(s) => self
                .operand
                .transitions_in(s)
                .into_iter()
                .map(EndTransition::Inner)
                .collect(),
            EndState::End => self
                .operand
                .final_states()
                .into_iter()
                .map(EndTransition::Exit)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecAutomaton;
    use wfa_core::TropicalSemiring;

    fn two_ends() -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        a.add_states(3);
        a.set_initial(0).unwrap();
        a.set_final_weight(1, 2.0).unwrap();
        a.set_final_weight(2, 0.5).unwrap();
        a.add_transition(0, 1, 'a', 1.0).unwrap();
        a.add_transition(1, 2, 'b', 1.0).unwrap();
        a
    }

    #[test]
    fn final_states_exit_to_end() {
        let a = two_ends();
        let e = SingleFinalState::new(&a);
        let out = e.transitions_out(&EndState::Inner(1));
        assert_eq!(out, vec![EndTransition::Inner(1), EndTransition::Exit(1)]);
        assert_eq!(e.transition_weight(&out[1]), 2.0);
        assert_eq!(e.target(&out[1]), EndState::End);
        assert_eq!(e.label(&out[1]), None);
        assert!(e.transitions_out(&EndState::Inner(0)).iter().all(|t| matches!(t, EndTransition::Inner(_))));
    }

    #[test]
    fn only_end_is_final() {
        let a = two_ends();
        let e = SingleFinalState::new(&a);
        assert_eq!(e.final_weight(&EndState::Inner(2)), f64::INFINITY);
        assert_eq!(e.final_weight(&EndState::End), 0.0);
        assert_eq!(e.final_states(), vec![EndState::End]);
        assert_eq!(
            e.transitions_in(&EndState::End),
            vec![EndTransition::Exit(1), EndTransition::Exit(2)]
        );
    }

    #[test]
    fn end_ranks_last() {
        let a = two_ends();
        let e = SingleFinalState::new(&a);
        let order = e.topological_order().unwrap();
        assert_eq!(order.rank(&EndState::End), Some(3));
        assert!(order.rank(&EndState::Inner(0)) < order.rank(&EndState::Inner(2)));
    }
}
