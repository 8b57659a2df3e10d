use std::cell::OnceCell;

use wfa_core::Semiring;

use crate::operations::Either;
use crate::{Automaton, ReverselyAccessibleAutomaton, TopologicalOrder, Weight};

/// Transition of a [`Concatenation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConcatTransition<S1, S2, T1, T2> {
    First(T1),
    Second(T2),
    /// Epsilon from a final state of the first operand to an initial state
    /// of the second, weighted `final ⊗ initial`.
    Join(S1, S2),
}

/// Paths of the first operand followed by paths of the second.
pub struct Concatenation<A: Automaton, B: Automaton> {
    first: A,
    second: B,
    second_initial: OnceCell<Vec<B::State>>,
    first_final: OnceCell<Vec<A::State>>,
    order: OnceCell<Option<TopologicalOrder<Either<A::State, B::State>>>>,
}

impl<A, B> Concatenation<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            second_initial: OnceCell::new(),
            first_final: OnceCell::new(),
            order: OnceCell::new(),
        }
    }

    fn second_initial_states(&self) -> &[B::State] {
        self.second_initial
            .get_or_init(|| self.second.initial_states())
    }
}

impl<A, B> Automaton for Concatenation<A, B>
where
    A: Automaton,
    B: Automaton<Label = A::Label, Semiring = A::Semiring>,
{
    type State = Either<A::State, B::State>;
    type Transition = ConcatTransition<A::State, B::State, A::Transition, B::Transition>;
    type Label = A::Label;
    type Semiring = A::Semiring;

    fn semiring(&self) -> &A::Semiring {
        self.first.semiring()
    }

    fn initial_states(&self) -> Vec<Self::State> {
        self.first
            .initial_states()
            .into_iter()
            .map(Either::First)
            .collect()
    }

    fn initial_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            Either::First(s) => self.first.initial_weight(s),
            Either::Second(_) => self.semiring().zero(),
        }
    }

    fn final_weight(&self, state: &Self::State) -> Weight<A> {
        match state {
            Either::First(_) => self.semiring().zero(),
            Either::Second(s) => self.second.final_weight(s),
        }
    }

    fn transitions_out(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            Either::First(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .first
                    .transitions_out(s)
                    .into_iter()
                    .map(ConcatTransition::First)
                    .collect();
                if !self.semiring().is_zero(&self.first.final_weight(s)) {
                    transitions.extend(
                        self.second_initial_states()
                            .iter()
                            .map(|i| ConcatTransition::Join(s.clone(), i.clone())),
                    );
                }
                transitions
            }
            Either::Second(s) => self
                .second
                .transitions_out(s)
                .into_iter()
                .map(ConcatTransition::Second)
                .collect(),
        }
    }

    fn source(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            ConcatTransition::First(t) => Either::First(self.first.source(t)),
            ConcatTransition::Second(t) => Either::Second(self.second.source(t)),
            ConcatTransition::Join(f, _) => Either::First(f.clone()),
        }
    }

    fn target(&self, transition: &Self::Transition) -> Self::State {
        match transition {
            ConcatTransition::First(t) => Either::First(self.first.target(t)),
            ConcatTransition::Second(t) => Either::Second(self.second.target(t)),
            ConcatTransition::Join(_, i) => Either::Second(i.clone()),
        }
    }

    fn label(&self, transition: &Self::Transition) -> Option<A::Label> {
        match transition {
            ConcatTransition::First(t) => self.first.label(t),
            ConcatTransition::Second(t) => self.second.label(t),
            ConcatTransition::Join(..) => None,
        }
    }

    fn transition_weight(&self, transition: &Self::Transition) -> Weight<A> {
        match transition {
            ConcatTransition::First(t) => self.first.transition_weight(t),
            ConcatTransition::Second(t) => self.second.transition_weight(t),
            ConcatTransition::Join(f, i) => self
                .semiring()
                .multiply(&self.first.final_weight(f), &self.second.initial_weight(i)),
        }
    }

    fn topological_order(&self) -> Option<&TopologicalOrder<Self::State>> {
        self.order
            .get_or_init(|| {
                let first = self.first.topological_order()?;
                let second = self.second.topological_order()?;
                Some(first.chain(
                    second,
                    |s| Either::First(s.clone()),
                    |s| Either::Second(s.clone()),
                ))
            })
            .as_ref()
    }
}

impl<A, B> ReverselyAccessibleAutomaton for Concatenation<A, B>
where
    A: ReverselyAccessibleAutomaton,
    B: ReverselyAccessibleAutomaton<Label = A::Label, Semiring = A::Semiring>,
{
    fn final_states(&self) -> Vec<Self::State> {
        self.second
            .final_states()
            .into_iter()
            .map(Either::Second)
            .collect()
    }

    fn transitions_in(&self, state: &Self::State) -> Vec<Self::Transition> {
        match state {
            Either::First(s) => self
                .first
                .transitions_in(s)
                .into_iter()
                .map(ConcatTransition::First)
                .collect(),
            Either::Second(s) => {
                let mut transitions: Vec<Self::Transition> = self
                    .second
                    .transitions_in(s)
                    .into_iter()
                    .map(ConcatTransition::Second)
                    .collect();
                if !self.semiring().is_zero(&self.second.initial_weight(s)) {
                    let finals = self.first_final.get_or_init(|| self.first.final_states());
                    transitions.extend(
                        finals
                            .iter()
                            .map(|f| ConcatTransition::Join(f.clone(), s.clone())),
                    );
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

    fn single(label: char, weight: f64) -> VecAutomaton<char, TropicalSemiring> {
        let mut a = VecAutomaton::new(TropicalSemiring);
        a.add_states(2);
        a.set_initial_weight(0, 0.5).unwrap();
        a.set_final_weight(1, 0.25).unwrap();
        a.add_transition(0, 1, label, weight).unwrap();
        a
    }

    #[test]
    fn joins_final_to_initial() {
        let (a, b) = (single('a', 1.0), single('b', 2.0));
        let c = Concatenation::new(&a, &b);
        assert_eq!(c.initial_states(), vec![Either::First(0)]);
        assert_eq!(c.final_weight(&Either::First(1)), f64::INFINITY);

        let out = c.transitions_out(&Either::First(1));
        assert_eq!(out, vec![ConcatTransition::Join(1, 0)]);
        assert_eq!(c.label(&out[0]), None);
        assert_eq!(c.transition_weight(&out[0]), 0.75);
        assert_eq!(c.target(&out[0]), Either::Second(0));

        assert_eq!(
            c.transitions_in(&Either::Second(0)),
            vec![ConcatTransition::Join(1, 0)]
        );
        assert_eq!(c.final_states(), vec![Either::Second(1)]);
    }

    #[test]
    fn order_spans_both_operands() {
        let (a, b) = (single('a', 1.0), single('b', 2.0));
        let c = Concatenation::new(&a, &b);
        let order = c.topological_order().unwrap();
        assert!(order.rank(&Either::First(1)) < order.rank(&Either::Second(0)));
    }
}
