use std::cell::OnceCell;

use wfa_core::Semiring;

use crate::operations::single_initial_state::StartState;
use crate::{Automaton, ReverselyAccessibleAutomaton, Weight};

/// Transition of a [`Closure`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClosureTransition<S, T> {
    /// Epsilon from the fresh start state into an initial state of the operand.
    Enter(S),
    Inner(T),
    /// Epsilon from a final state back to an initial state of the operand.
    Loop(S, S),
}

/// Kleene star: zero or more repetitions of the operand.
///
/// A fresh start state accepts the empty string and enters the operand. Every
/// final state of the operand loops back to the operand's initial states. A
/// weighted closure multiplies every exit (final weight) by `stop` and every
/// entry into the operand by `cont`, so over the real semiring with
/// `stop + cont = 1` the number of repetitions is geometrically distributed.
pub struct Closure<A: Automaton> {
    operand: A,
    weights: Option<(Weight<A>, Weight<A>)>,
    initial: OnceCell<Vec<A::State>>,
    finals: OnceCell<Vec<A::State>>,
}

impl<A: Automaton> Closure<A> {
    pub fn new(operand: A) -> Self {
        Self {
            operand,
            weights: None,
            initial: OnceCell::new(),
            finals: OnceCell::new(),
        }
    }

    pub fn weighted(operand: A, stop: Weight<A>, cont: Weight<A>) -> Self {
        Self {
            operand,
            weights: Some((stop, cont)),
            initial: OnceCell::new(),
            finals: OnceCell::new(),
        }
    }

    fn operand_initial_states(&self) -> &[A::State] {
        self.initial.get_or_init(|| self.operand.initial_states())
    }

    fn stop(&self) -> Option<&Weight<A>> {
        self.weights.as_ref().map(|(stop, _)| stop)
    }

    fn cont(&self) -> Option<&Weight<A>> {
        self.weights.as_ref().map(|(_, cont)| cont)
    }

    /// `scale ⊗ weight`, or `weight` when unweighted.
    fn scaled(&self, scale: Option<&Weight<A>>, weight: Weight<A>) -> Weight<A> {
        match scale {
            Some(scale) => self.operand.semiring().multiply(scale, &weight),
            None => weight,
        }
    }
}

impl<A: Automaton> Automaton for Closure<A> {
    type State = StartState<A::State>;
    type Transition = ClosureTransition<A::State, A::Transition>;
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
        let weight = match state {
            StartState::Start => self.semiring().one(),
            StartState::Inner(s) => self.operand.final_weight(s),
        };
        self.scaled(self.stop(), weight)
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            StartState::Start => self
                .operand_initial_states()
                .iter()
                .cloned()
                .map(ClosureTransition::Enter)
                .collect(),
            StartState::Inner(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .operand
                    .transitions_out(s)
                    .into_iter()
                    .map(ClosureTransition::Inner)
                    .collect();
                if !self.semiring().is_zero(&self.operand.final_weight(s)) {
                    transitions.extend(
                        self.operand_initial_states()
                            .iter()
                            .map(|i| ClosureTransition::Loop(s.clone(), i.clone())),
                    );
                }
                transitions
            }
        }
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            ClosureTransition::Enter(_) => StartState::Start,
            ClosureTransition::Inner(t) => StartState::Inner(self.operand.source(t)),
            ClosureTransition::Loop(f, _) => StartState::Inner(f.clone()),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            ClosureTransition::Enter(i) | ClosureTransition::Loop(_, i) => StartState::Inner(i.clone()),
            ClosureTransition::Inner(t) => StartState::Inner(self.operand.target(t)),
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            ClosureTransition::Inner(t) => self.operand.label(t),
            ClosureTransition::Enter(_) | ClosureTransition::Loop(..) => None,
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            ClosureTransition::Inner(t) => self.operand.transition_weight(t),
            ClosureTransition::Enter(i) => {
                self.scaled(self.cont(), self.operand.initial_weight(i))
            }
            ClosureTransition::Loop(f, i) => {
                let semiring = self.semiring();
                let entry = self.scaled(self.cont(), self.operand.initial_weight(i));
                semiring.multiply(&self.operand.final_weight(f), &entry)
            }
        }
    }
}

impl<A: ReverselyAccessibleAutomaton> ReverselyAccessibleAutomaton for Closure<A> {
    fn final_states(&self) -> Vec<Self::State> {
        let mut states = vec![StartState::Start];
        states.extend(self.operand.final_states().into_iter().map(StartState::Inner));
        states
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            StartState::Start => Vec::new(),
            StartState::Inner(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .operand
                    .transitions_in(s)
                    .into_iter()
                    .map(ClosureTransition::Inner)
                    .collect();
                if !self.semiring().is_zero(&self.operand.initial_weight(s)) {
                    transitions.push(ClosureTransition::Enter(s.clone()));
                    let finals = self.finals.get_or_init(|| self.operand.final_states());
                    transitions.extend(
                        finals
                            .iter()
                            .map(|f| ClosureTransition::Loop(f.clone(), s.clone())),
                    );
                }
                transitions
            }
        }
    }
}
