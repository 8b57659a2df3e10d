use std::cell::OnceCell;

use wfa_core::Semiring;

use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// State of a [`SingleInitialState`] automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StartState<S> {
    /// The added initial state.
    Start,
    Inner(S),
}

/// Transition of a [`SingleInitialState`] automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StartTransition<S, T> {
    /// Epsilon from the start state into an initial state of the operand,
    /// weighted by that state's initial weight.
    Enter(S),
    Inner(T),
}

/// The operand with one fresh initial state of weight one.
///
/// The fresh state reaches every initial state of the operand through an
/// epsilon transition carrying the state's initial weight, so single-source
/// algorithms can run from [`StartState::Start`] and account for all initial
/// weights at once.
pub struct SingleInitialState<A: Automaton> {
    operand: A,
    initial: OnceCell<Vec<A::State>>,
    order: OnceCell<Option<TopologicalOrder<StartState<A::State>>>>,
}

impl<A: Automaton> SingleInitialState<A> {
    pub fn new(operand: A) -> Self {
        Self {
            operand,
            initial: OnceCell::new(),
            order: OnceCell::new(),
        }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    fn operand_initial_states(&self) -> &[A::State] {
        self.initial.get_or_init(|| self.operand.initial_states())
    }
}

impl<A: Automaton> Automaton for SingleInitialState<A> {
    type State = StartState<A::State>;
    type Transition = StartTransition<A::State, A::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.operand.semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        vec![StartState::Start]
    }

    fn initial_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            StartState::Start => self.semiring().one(),
            StartState::Inner(_) => self.semiring().zero(),
        }
    }

    fn final_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            StartState::Start => self.semiring().zero(),
            StartState::Inner(s) => self.operand.final_weight(s),
        }
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            StartState::Start => self
                .operand_initial_states()
                .iter()
                .cloned()
                .map(StartTransition::Enter)
                .collect(),
            StartState::Inner(s) => self
                .operand
                .transitions_out(s)
                .into_iter()
                .map(StartTransition::Inner)
                .collect(),
        }
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            StartTransition::Enter(_) => StartState::Start,
            StartTransition::Inner(t) => StartState::Inner(self.operand.source(t)),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            StartTransition::Enter(s) => StartState::Inner(s.clone()),
            StartTransition::Inner(t) => StartState::Inner(self.operand.target(t)),
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            StartTransition::Enter(_) => None,
            StartTransition::Inner(t) => self.operand.label(t),
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            StartTransition::Enter(s) => self.operand.initial_weight(s),
            StartTransition::Inner(t) => self.operand.transition_weight(t),
        }
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        self.order
            .get_or_init(|| {
                let inner = self.operand.topological_order()?;
                let start = TopologicalOrder::from_sequence([StartState::Start]);
                Some(start.chain(inner, StartState::clone, |s| StartState::Inner(s.clone())))
            })
            .as_ref()
    }
}

impl<A: ReverselyAccessibleAutomaton> ReverselyAccessibleAutomaton for SingleInitialState<A> {
    fn final_states(&self) -> Vec<Self::State> {
        self.operand
            .final_states()
            .into_iter()
            .map(StartState::Inner)
            .collect()
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            StartState::Start => Vec::new(),
            StartState::Inner(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .operand
                    .transitions_in(s)
                    .into_iter()
                    .map(StartTransition::Inner)
                    .collect();
                if !self.semiring().is_zero(&self.operand.initial_weight(s)) {
                    transitions.push(StartTransition::Enter(s.clone()));
                }
                transitions
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VecAutomaton;
    use wfa_core::TropicalSemiring;

    fn two_starts() -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        a.add_states(3);
        a.set_initial_weight(0, 1.0).unwrap();
        a.set_initial_weight(1, 4.0).unwrap();
        a.set_final(2).unwrap();
        a.add_transition(0, 2, 'a', 1.0).unwrap();
        a.add_transition(1, 2, 'b', 1.0).unwrap();
        a
    }

    #[test]
    fn start_enters_every_initial_state() {
        let a = two_starts();
        let s = SingleInitialState::new(&a);
        assert_eq!(s.initial_states(), vec![StartState::Start]);
        let out = s.transitions_out(&StartState::Start);
        assert_eq!(out, vec![StartTransition::Enter(0), StartTransition::Enter(1)]);
        assert_eq!(s.transition_weight(&out[1]), 4.0);
        assert_eq!(s.label(&out[0]), None);
        assert_eq!(s.target(&out[0]), StartState::Inner(0));
    }

    #[test]
    fn incoming_includes_enter() {
        let a = two_starts();
        let s = SingleInitialState::new(&a);
        assert_eq!(
            s.transitions_in(&StartState::Inner(0)),
            vec![StartTransition::Enter(0)]
        );
        assert_eq!(s.final_states(), vec![StartState::Inner(2)]);
    }

    #[test]
    fn start_ranks_first() {
        let a = two_starts();
        let s = SingleInitialState::new(&a);
        let order = s.topological_order().unwrap();
        assert_eq!(order.rank(&StartState::Start), Some(0));
        assert!(order.rank(&StartState::Inner(2)) > order.rank(&StartState::Inner(0)));
    }
}
